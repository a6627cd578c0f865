//! Line wrapping of paragraphs into fixed-size pages.

/// Lays `paragraphs` out into pages of `lines_per_page` lines, each wrapped
/// to `width` columns.
///
/// Paragraphs are separated by a blank line, which is dropped when it would
/// open a page. The result always holds at least one (possibly empty) page.
#[must_use]
pub fn paginate(paragraphs: &[String], width: usize, lines_per_page: usize) -> Vec<String> {
    let width = width.max(1);
    let lines_per_page = lines_per_page.max(1);

    let mut lines: Vec<String> = Vec::new();
    for paragraph in paragraphs {
        if !lines.is_empty() {
            lines.push(String::new());
        }
        lines.extend(textwrap::wrap(paragraph, width).into_iter().map(|line| line.into_owned()));
    }

    let mut pages = Vec::new();
    let mut current: Vec<String> = Vec::with_capacity(lines_per_page);
    for line in lines {
        if current.is_empty() && line.is_empty() {
            continue;
        }
        current.push(line);
        if current.len() == lines_per_page {
            pages.push(std::mem::take(&mut current).join("\n"));
        }
    }

    if !current.is_empty() || pages.is_empty() {
        pages.push(current.join("\n"));
    }
    pages
}
