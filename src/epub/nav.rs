//! Table-of-contents extraction from EPUB 3 navigation documents and EPUB 2 NCX files.

use roxmltree::Node;

use super::error::EpubError;
use super::package::{is_named, parse_xml};
use super::{NavPoint, resolve_relative};

const OPS_NAMESPACE: &str = "http://www.idpf.org/2007/ops";

/// Flattens the `toc` nav of an EPUB 3 navigation document, depth-first.
///
/// Falls back to the first `<nav>` when none is typed `toc`. Anchors without
/// an href or a label are skipped.
pub(crate) fn parse_nav_document(doc_path: &str, text: &str) -> Result<Vec<NavPoint>, EpubError> {
    let doc = parse_xml(doc_path, text)?;
    let navs: Vec<Node<'_, '_>> = doc.descendants().filter(|node| is_named(node, "nav")).collect();

    let Some(toc) = navs.iter().find(|nav| is_toc_nav(nav)).or_else(|| navs.first()) else {
        return Ok(Vec::new());
    };

    Ok(toc
        .descendants()
        .filter(|node| is_named(node, "a"))
        .filter_map(|anchor| {
            let href = anchor.attribute("href")?;
            let label = normalized_text(&anchor)?;
            Some(NavPoint::new(label, resolve_relative(doc_path, href)))
        })
        .collect())
}

/// Flattens the `navMap` of an NCX document in play order.
pub(crate) fn parse_ncx(doc_path: &str, text: &str) -> Result<Vec<NavPoint>, EpubError> {
    let doc = parse_xml(doc_path, text)?;

    Ok(doc
        .descendants()
        .filter(|node| is_named(node, "navPoint"))
        .filter_map(|point| {
            let label = point
                .children()
                .find(|child| is_named(child, "navLabel"))
                .and_then(|label| normalized_text(&label))?;
            let src = point
                .children()
                .find(|child| is_named(child, "content"))
                .and_then(|content| content.attribute("src"))?;
            Some(NavPoint::new(label, resolve_relative(doc_path, src)))
        })
        .collect())
}

fn is_toc_nav(nav: &Node<'_, '_>) -> bool {
    let typed = nav
        .attribute((OPS_NAMESPACE, "type"))
        .is_some_and(|value| value.split_whitespace().any(|token| token == "toc"));
    typed || nav.attribute("role") == Some("doc-toc")
}

fn normalized_text(node: &Node<'_, '_>) -> Option<String> {
    let joined = node
        .descendants()
        .filter(|n| n.is_text())
        .filter_map(|n| n.text())
        .collect::<Vec<_>>()
        .join(" ");
    let label = joined.split_whitespace().collect::<Vec<_>>().join(" ");
    if label.is_empty() { None } else { Some(label) }
}
