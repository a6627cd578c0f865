//! OCF container and OPF package parsing.

use std::io::{Cursor, Read};
use std::sync::Arc;

use roxmltree::{Document, Node, ParsingOptions};
use tracing::{debug, instrument, warn};
use zip::ZipArchive;
use zip::result::ZipError;

use super::error::EpubError;
use super::nav::{parse_nav_document, parse_ncx};
use super::text::section_paragraphs;
use super::{NavPoint, resolve_relative, split_fragment};

const CONTAINER_PATH: &str = "META-INF/container.xml";
const OPF_MEDIA_TYPE: &str = "application/oebps-package+xml";
const NCX_MEDIA_TYPE: &str = "application/x-dtbncx+xml";

/// Descriptive metadata from the package `<metadata>` block.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PackageMetadata {
    /// First `dc:title`.
    pub title: Option<String>,
    /// All `dc:creator` values in document order.
    pub creators: Vec<String>,
    /// First `dc:language`.
    pub language: Option<String>,
    /// First `dc:identifier`.
    pub identifier: Option<String>,
}

/// A manifest entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct ManifestItem {
    /// Manifest id.
    pub id: String,
    /// Container path.
    pub href: String,
    /// Declared media type.
    pub media_type: String,
    /// Space-separated `properties` split into tokens.
    pub properties: Vec<String>,
}

/// A spine entry in reading order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SpineItem {
    /// Manifest id the itemref points at.
    pub idref: String,
    /// Container path of the content document.
    pub href: String,
    /// False when the itemref is marked `linear="no"`.
    pub linear: bool,
}

/// A parsed EPUB package backed by the original container bytes.
#[derive(Debug, Clone)]
pub struct EpubPackage {
    bytes: Arc<[u8]>,
    package_path: String,
    metadata: PackageMetadata,
    spine: Vec<SpineItem>,
    toc: Vec<NavPoint>,
}

impl EpubPackage {
    /// Parses the container, package document and table of contents.
    ///
    /// A navigation document or NCX that cannot be parsed is logged and
    /// leaves the table of contents empty; the package itself still loads.
    ///
    /// # Errors
    ///
    /// Returns [`EpubError`] if the bytes are not a zip archive, the container
    /// or package document is missing, or either is malformed XML.
    #[instrument(skip(bytes), fields(bytes = bytes.len()))]
    pub fn from_bytes(bytes: Arc<[u8]>) -> Result<Self, EpubError> {
        let mut archive = ZipArchive::new(Cursor::new(&bytes[..]))?;

        let container = read_text(&mut archive, CONTAINER_PATH)?;
        let package_path = rootfile_path(&container)?;
        debug!(package = %package_path, "located package document");

        let opf = read_text(&mut archive, &package_path)?;
        let doc = parse_xml(&package_path, &opf)?;

        let metadata = parse_metadata(&doc);
        let manifest = parse_manifest(&doc, &package_path);
        let (spine, ncx_id) = parse_spine(&doc, &manifest);
        let toc = load_toc(&mut archive, &manifest, ncx_id.as_deref());
        drop(archive);

        debug!(
            spine = spine.len(),
            toc = toc.len(),
            manifest = manifest.len(),
            "parsed package"
        );

        Ok(Self {
            bytes,
            package_path,
            metadata,
            spine,
            toc,
        })
    }

    /// Returns the container path of the package document.
    #[must_use]
    pub fn package_path(&self) -> &str {
        &self.package_path
    }

    /// Returns the descriptive metadata.
    #[must_use]
    pub fn metadata(&self) -> &PackageMetadata {
        &self.metadata
    }

    /// Returns the spine in reading order.
    #[must_use]
    pub fn spine(&self) -> &[SpineItem] {
        &self.spine
    }

    /// Returns the flattened table of contents (possibly empty).
    #[must_use]
    pub fn toc(&self) -> &[NavPoint] {
        &self.toc
    }

    /// Returns the spine position of the document `href` points into.
    ///
    /// Any fragment on `href` is ignored.
    #[must_use]
    pub fn spine_index(&self, href: &str) -> Option<usize> {
        let (path, _) = split_fragment(href);
        self.spine.iter().position(|item| item.href == path)
    }

    /// Reads the content document at `href` and reduces it to text paragraphs.
    ///
    /// # Errors
    ///
    /// Returns [`EpubError`] if the document is missing, not UTF-8, or
    /// cannot be rendered as text.
    pub fn section_text(&self, href: &str) -> Result<Vec<String>, EpubError> {
        let (path, _) = split_fragment(href);
        let mut archive = ZipArchive::new(Cursor::new(&self.bytes[..]))?;
        let markup = read_text(&mut archive, path)?;
        section_paragraphs(&markup).map_err(|source| EpubError::markup(path, source))
    }
}

fn read_text(archive: &mut ZipArchive<Cursor<&[u8]>>, path: &str) -> Result<String, EpubError> {
    let mut file = match archive.by_name(path) {
        Ok(file) => file,
        Err(ZipError::FileNotFound) => return Err(EpubError::missing(path)),
        Err(error) => return Err(EpubError::Archive(error)),
    };

    let mut buffer = Vec::new();
    file.read_to_end(&mut buffer)
        .map_err(|source| EpubError::io(path, source))?;

    let text = String::from_utf8(buffer).map_err(|_| EpubError::Encoding {
        path: path.to_string(),
    })?;
    Ok(match text.strip_prefix('\u{feff}') {
        Some(stripped) => stripped.to_string(),
        None => text,
    })
}

pub(super) fn parse_xml<'input>(
    path: &str,
    text: &'input str,
) -> Result<Document<'input>, EpubError> {
    let mut options = ParsingOptions::default();
    options.allow_dtd = true;
    Document::parse_with_options(text, options).map_err(|source| EpubError::xml(path, source))
}

pub(super) fn is_named(node: &Node<'_, '_>, name: &str) -> bool {
    node.is_element() && node.tag_name().name() == name
}

fn rootfile_path(container: &str) -> Result<String, EpubError> {
    let doc = parse_xml(CONTAINER_PATH, container)?;
    let rootfiles: Vec<Node<'_, '_>> = doc
        .descendants()
        .filter(|node| is_named(node, "rootfile"))
        .collect();

    rootfiles
        .iter()
        .find(|node| node.attribute("media-type") == Some(OPF_MEDIA_TYPE))
        .or_else(|| rootfiles.first())
        .and_then(|node| node.attribute("full-path"))
        .map(|path| resolve_relative("", path))
        .filter(|path| !path.is_empty())
        .ok_or(EpubError::MissingRootfile)
}

fn element_text(node: &Node<'_, '_>) -> Option<String> {
    let text: String = node
        .descendants()
        .filter(|n| n.is_text())
        .filter_map(|n| n.text())
        .collect();
    let normalized = text.split_whitespace().collect::<Vec<_>>().join(" ");
    if normalized.is_empty() {
        None
    } else {
        Some(normalized)
    }
}

fn parse_metadata(doc: &Document<'_>) -> PackageMetadata {
    let mut metadata = PackageMetadata::default();
    let Some(block) = doc.descendants().find(|node| is_named(node, "metadata")) else {
        return metadata;
    };

    for node in block.descendants().filter(|n| n.is_element()) {
        match node.tag_name().name() {
            "title" if metadata.title.is_none() => metadata.title = element_text(&node),
            "creator" => {
                if let Some(creator) = element_text(&node) {
                    metadata.creators.push(creator);
                }
            }
            "language" if metadata.language.is_none() => {
                metadata.language = element_text(&node);
            }
            "identifier" if metadata.identifier.is_none() => {
                metadata.identifier = element_text(&node);
            }
            _ => {}
        }
    }

    metadata
}

fn parse_manifest(doc: &Document<'_>, package_path: &str) -> Vec<ManifestItem> {
    let Some(manifest) = doc.descendants().find(|node| is_named(node, "manifest")) else {
        warn!("package document has no manifest");
        return Vec::new();
    };

    manifest
        .children()
        .filter(|node| is_named(node, "item"))
        .filter_map(|node| {
            let id = node.attribute("id")?;
            let href = node.attribute("href")?;
            Some(ManifestItem {
                id: id.to_string(),
                href: resolve_relative(package_path, href),
                media_type: node.attribute("media-type").unwrap_or_default().to_string(),
                properties: node
                    .attribute("properties")
                    .unwrap_or_default()
                    .split_whitespace()
                    .map(str::to_string)
                    .collect(),
            })
        })
        .collect()
}

/// Returns the spine and the manifest id named by its `toc` attribute.
fn parse_spine(doc: &Document<'_>, manifest: &[ManifestItem]) -> (Vec<SpineItem>, Option<String>) {
    let Some(spine) = doc.descendants().find(|node| is_named(node, "spine")) else {
        warn!("package document has no spine");
        return (Vec::new(), None);
    };

    let items = spine
        .children()
        .filter(|node| is_named(node, "itemref"))
        .filter_map(|node| {
            let idref = node.attribute("idref")?;
            let Some(item) = manifest.iter().find(|item| item.id == idref) else {
                warn!(idref, "spine references unknown manifest item");
                return None;
            };
            Some(SpineItem {
                idref: idref.to_string(),
                href: item.href.clone(),
                linear: node.attribute("linear") != Some("no"),
            })
        })
        .collect();

    (items, spine.attribute("toc").map(str::to_string))
}

fn load_toc(
    archive: &mut ZipArchive<Cursor<&[u8]>>,
    manifest: &[ManifestItem],
    ncx_id: Option<&str>,
) -> Vec<NavPoint> {
    if let Some(nav) = manifest
        .iter()
        .find(|item| item.properties.iter().any(|p| p == "nav"))
    {
        match read_text(archive, &nav.href).and_then(|text| parse_nav_document(&nav.href, &text)) {
            Ok(entries) if !entries.is_empty() => return entries,
            Ok(_) => debug!(nav = %nav.href, "navigation document has no entries"),
            Err(error) => warn!(nav = %nav.href, error = %error, "failed to read navigation document"),
        }
    }

    let ncx = ncx_id
        .and_then(|id| manifest.iter().find(|item| item.id == id))
        .or_else(|| manifest.iter().find(|item| item.media_type == NCX_MEDIA_TYPE));
    if let Some(ncx) = ncx {
        match read_text(archive, &ncx.href).and_then(|text| parse_ncx(&ncx.href, &text)) {
            Ok(entries) => return entries,
            Err(error) => warn!(ncx = %ncx.href, error = %error, "failed to read NCX"),
        }
    }

    Vec::new()
}
