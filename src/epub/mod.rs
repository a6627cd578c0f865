//! EPUB container, package and navigation parsing.
//!
//! An EPUB is a zip container (OCF) whose `META-INF/container.xml` names a
//! package document (OPF). The package lists the manifest, the reading order
//! (spine) and points at the navigation document (EPUB 3) or NCX (EPUB 2)
//! that carries the table of contents.
//!
//! # Overview
//!
//! - [`EpubPackage`] - Parsed package with spine, table of contents and section access
//! - [`PackageMetadata`] - Title, creators and language from the OPF metadata block
//! - [`NavPoint`] - One flattened table-of-contents entry
//! - [`EpubError`] - Container and XML errors
//!
//! All hrefs exposed by this module are container paths (relative to the zip
//! root, percent-decoded), optionally followed by a `#fragment`.

mod error;
mod nav;
mod package;
mod text;

pub use error::EpubError;
pub use package::{EpubPackage, PackageMetadata, SpineItem};
pub use text::section_paragraphs;

/// One table-of-contents entry, flattened depth-first from the navigation document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NavPoint {
    /// Display label.
    pub label: String,
    /// Container path of the target document, with optional fragment.
    pub href: String,
}

impl NavPoint {
    /// Creates a navigation point.
    #[must_use]
    pub fn new(label: impl Into<String>, href: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            href: href.into(),
        }
    }
}

/// Splits `href` into its document path and optional fragment.
#[must_use]
pub fn split_fragment(href: &str) -> (&str, Option<&str>) {
    match href.split_once('#') {
        Some((path, fragment)) => (path, Some(fragment)),
        None => (href, None),
    }
}

/// Resolves `href` relative to the document at `base_document`.
///
/// The result is a normalized, percent-decoded container path. An href that
/// is only a fragment resolves to `base_document` itself.
#[must_use]
pub(crate) fn resolve_relative(base_document: &str, href: &str) -> String {
    let (raw_path, fragment) = split_fragment(href.trim());
    let decoded = urlencoding::decode(raw_path)
        .map_or_else(|_| raw_path.to_string(), std::borrow::Cow::into_owned);

    let joined = if decoded.is_empty() {
        base_document.to_string()
    } else if let Some(absolute) = decoded.strip_prefix('/') {
        absolute.to_string()
    } else {
        match base_document.rsplit_once('/') {
            Some((dir, _)) => format!("{dir}/{decoded}"),
            None => decoded,
        }
    };

    let mut segments: Vec<&str> = Vec::new();
    for segment in joined.split('/') {
        match segment {
            "" | "." => {}
            ".." => {
                segments.pop();
            }
            other => segments.push(other),
        }
    }

    let path = segments.join("/");
    match fragment {
        Some(fragment) if !fragment.is_empty() => format!("{path}#{fragment}"),
        _ => path,
    }
}
