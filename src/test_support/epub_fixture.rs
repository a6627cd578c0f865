//! In-memory EPUB containers for tests.
//!
//! Shared by unit tests and, through a `#[path]` include, by the integration
//! tests, so it only depends on `std` and `zip`.

use std::io::{Cursor, Write};

use zip::ZipWriter;
use zip::write::SimpleFileOptions;

/// Where the fixture's table of contents lives.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TocStyle {
    /// EPUB 3 navigation document listing every chapter.
    Nav,
    /// EPUB 3 navigation document with an empty `toc` list.
    EmptyNav,
    /// EPUB 2 NCX listing every chapter.
    Ncx,
    /// No navigation metadata at all.
    None,
}

/// Builds an EPUB with one content document per `(title, paragraphs)` chapter.
///
/// Chapters live at `OEBPS/text/ch{N}.xhtml` (1-indexed).
pub fn build_epub(chapters: &[(&str, &[&str])], toc: TocStyle) -> Vec<u8> {
    build_epub_with_non_linear(chapters, toc, &[])
}

/// Like [`build_epub`], with the 1-indexed `non_linear` chapters marked
/// `linear="no"` in the spine.
#[allow(clippy::unwrap_used)]
pub fn build_epub_with_non_linear(
    chapters: &[(&str, &[&str])],
    toc: TocStyle,
    non_linear: &[usize],
) -> Vec<u8> {
    let mut writer = ZipWriter::new(Cursor::new(Vec::new()));
    let stored = SimpleFileOptions::default().compression_method(zip::CompressionMethod::Stored);

    let mut add = |name: &str, body: &str| {
        writer.start_file(name, stored).unwrap();
        writer.write_all(body.as_bytes()).unwrap();
    };

    add("mimetype", "application/epub+zip");
    add(
        "META-INF/container.xml",
        r#"<?xml version="1.0"?>
<container version="1.0" xmlns="urn:oasis:names:tc:opendocument:xmlns:container">
  <rootfiles>
    <rootfile full-path="OEBPS/content.opf" media-type="application/oebps-package+xml"/>
  </rootfiles>
</container>"#,
    );
    add("OEBPS/content.opf", &package_document(chapters, toc, non_linear));

    for (index, (title, paragraphs)) in chapters.iter().enumerate() {
        let body: String = paragraphs.iter().map(|p| format!("<p>{p}</p>\n")).collect();
        add(
            &format!("OEBPS/text/ch{}.xhtml", index + 1),
            &format!(
                r#"<?xml version="1.0" encoding="UTF-8"?>
<!DOCTYPE html>
<html xmlns="http://www.w3.org/1999/xhtml">
<head><title>{title}</title></head>
<body>
<h1>{title}</h1>
{body}</body>
</html>"#
            ),
        );
    }

    match toc {
        TocStyle::Nav | TocStyle::EmptyNav => {
            let items: String = if toc == TocStyle::Nav {
                chapters
                    .iter()
                    .enumerate()
                    .map(|(i, (title, _))| {
                        format!("<li><a href=\"text/ch{}.xhtml\">{title}</a></li>\n", i + 1)
                    })
                    .collect()
            } else {
                String::new()
            };
            add(
                "OEBPS/nav.xhtml",
                &format!(
                    r#"<?xml version="1.0" encoding="UTF-8"?>
<html xmlns="http://www.w3.org/1999/xhtml" xmlns:epub="http://www.idpf.org/2007/ops">
<head><title>Contents</title></head>
<body><nav epub:type="toc"><ol>
{items}</ol></nav></body>
</html>"#
                ),
            );
        }
        TocStyle::Ncx => {
            let points: String = chapters
                .iter()
                .enumerate()
                .map(|(i, (title, _))| {
                    format!(
                        "<navPoint id=\"p{n}\" playOrder=\"{n}\"><navLabel><text>{title}</text></navLabel><content src=\"text/ch{n}.xhtml\"/></navPoint>\n",
                        n = i + 1
                    )
                })
                .collect();
            add(
                "OEBPS/toc.ncx",
                &format!(
                    r#"<?xml version="1.0"?>
<ncx xmlns="http://www.daisy.org/z3986/2005/ncx/" version="2005-1">
<navMap>
{points}</navMap>
</ncx>"#
                ),
            );
        }
        TocStyle::None => {}
    }

    writer.finish().unwrap().into_inner()
}

fn package_document(chapters: &[(&str, &[&str])], toc: TocStyle, non_linear: &[usize]) -> String {
    let mut manifest = String::new();
    match toc {
        TocStyle::Nav | TocStyle::EmptyNav => manifest.push_str(
            "<item id=\"nav\" href=\"nav.xhtml\" media-type=\"application/xhtml+xml\" properties=\"nav\"/>\n",
        ),
        TocStyle::Ncx => manifest.push_str(
            "<item id=\"ncx\" href=\"toc.ncx\" media-type=\"application/x-dtbncx+xml\"/>\n",
        ),
        TocStyle::None => {}
    }
    let mut spine = String::new();
    for index in 1..=chapters.len() {
        manifest.push_str(&format!(
            "<item id=\"ch{index}\" href=\"text/ch{index}.xhtml\" media-type=\"application/xhtml+xml\"/>\n"
        ));
        let linear = if non_linear.contains(&index) { " linear=\"no\"" } else { "" };
        spine.push_str(&format!("<itemref idref=\"ch{index}\"{linear}/>\n"));
    }
    let spine_toc = if toc == TocStyle::Ncx { " toc=\"ncx\"" } else { "" };

    format!(
        r#"<?xml version="1.0" encoding="UTF-8"?>
<package xmlns="http://www.idpf.org/2007/opf" version="3.0" unique-identifier="uid">
  <metadata xmlns:dc="http://purl.org/dc/elements/1.1/">
    <dc:identifier id="uid">urn:uuid:librova-fixture</dc:identifier>
    <dc:title>Fixture Book</dc:title>
    <dc:creator>Ada Writer</dc:creator>
    <dc:language>en</dc:language>
  </metadata>
  <manifest>
{manifest}  </manifest>
  <spine{spine_toc}>
{spine}  </spine>
</package>"#
    )
}
