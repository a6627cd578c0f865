//! Reduction of XHTML content documents to plain text paragraphs.
//!
//! Content documents routinely carry HTML entities that are not valid XML
//! without a DTD, so they go through an HTML parser rather than `roxmltree`.

/// Render width handed to `html2text`. Wide enough that it never wraps;
/// line breaking happens at pagination time.
const RENDER_WIDTH: usize = 10_000;

/// Renders a content document and returns its non-empty paragraphs.
///
/// Block-level elements and `<br>` start a new paragraph. Entities are
/// decoded, `<head>` is dropped and whitespace is collapsed to single spaces.
///
/// # Errors
///
/// Returns the renderer's error if the document cannot be laid out.
pub fn section_paragraphs(markup: &str) -> Result<Vec<String>, html2text::Error> {
    let text = html2text::config::plain_no_decorate().string_from_read(markup.as_bytes(), RENDER_WIDTH)?;

    Ok(text
        .lines()
        .map(|line| line.split_whitespace().collect::<Vec<_>>().join(" "))
        .filter(|line| !line.is_empty())
        .collect())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_section_paragraphs_splits_blocks_and_drops_head() {
        let markup = r#"<html><head><title>Ignored</title><style>p { color: red }</style></head>
<body><h1>Chapter   One</h1><p>It was a <em>dark</em>
night.</p><p>Second<br/>line</p></body></html>"#;

        let paragraphs = section_paragraphs(markup).unwrap();

        assert!(paragraphs[0].ends_with("Chapter One"), "got: {paragraphs:?}");
        assert_eq!(paragraphs[1..], ["It was a dark night.", "Second", "line"]);
        assert!(!paragraphs.iter().any(|p| p.contains("Ignored") || p.contains("color")));
    }

    #[test]
    fn test_section_paragraphs_decodes_entities() {
        let markup = "<p>Fish &amp; chips &#8212; &#x2019;tis&nbsp;fine &lt;ok&gt;</p>";
        assert_eq!(
            section_paragraphs(markup).unwrap(),
            ["Fish & chips \u{2014} \u{2019}tis fine <ok>"]
        );
    }

    #[test]
    fn test_section_paragraphs_decodes_named_html_entities() {
        let markup = "<p>caf&eacute; &ldquo;quoted&rdquo; it&rsquo;s</p>";
        assert_eq!(
            section_paragraphs(markup).unwrap(),
            ["caf\u{e9} \u{201c}quoted\u{201d} it\u{2019}s"]
        );
    }

    #[test]
    fn test_section_paragraphs_attribute_markup_does_not_leak() {
        let markup = r#"<p><img alt="x > y" src="a.png"/>Hello</p>"#;

        let paragraphs = section_paragraphs(markup).unwrap();

        let text = paragraphs.join("\n");
        assert!(text.contains("Hello"), "got: {text}");
        assert!(!text.contains("src="), "got: {text}");
        assert!(!text.contains("a.png"), "got: {text}");
    }

    #[test]
    fn test_section_paragraphs_keeps_escaped_ampersand_literal() {
        assert_eq!(section_paragraphs("<p>&amp;lt;</p>").unwrap(), ["&lt;"]);
    }

    #[test]
    fn test_section_paragraphs_empty_document() {
        let paragraphs = section_paragraphs("<html><body><script>x()</script></body></html>").unwrap();
        assert!(paragraphs.is_empty(), "got: {paragraphs:?}");
    }
}
