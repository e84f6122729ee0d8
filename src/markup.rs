//! Finding messages are markdown, but they end up inside raw HTML table cells
//! where hosts do not render markdown. They are converted to inline HTML before
//! rendering, and that HTML form is what a later run reads back and compares.

use pulldown_cmark::{Event, Options, Parser, html};

use crate::finding::Finding;

/// Convert a markdown message to HTML fit for a table cell.
///
/// Raw HTML in the message is escaped rather than passed through, so no
/// message can close the cell or the table it sits in. A single paragraph
/// loses its `<p>` wrapper.
pub fn inline_html(markdown: &str) -> String {
    let parser = Parser::new_ext(markdown.trim(), Options::ENABLE_STRIKETHROUGH).map(
        |event| match event {
            Event::Html(raw) | Event::InlineHtml(raw) => Event::Text(raw),
            other => other,
        },
    );
    let mut out = String::new();
    html::push_html(&mut out, parser);

    let out = out.trim();
    match out
        .strip_prefix("<p>")
        .and_then(|rest| rest.strip_suffix("</p>"))
    {
        Some(inner) if !inner.contains("<p>") => inner.to_string(),
        _ => out.to_string(),
    }
}

/// The finding as it will appear in a rendered body: same location and
/// sticky flag, message in cell HTML.
pub fn rendered(finding: &Finding) -> Finding {
    Finding {
        message: inline_html(&finding.message),
        ..finding.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn plain_text_is_unchanged() {
        assert_eq!(inline_html("PR is larger than 500 lines"), "PR is larger than 500 lines");
    }

    #[test]
    fn code_spans_are_escaped() {
        assert_eq!(
            inline_html("Close the `</td>` tag"),
            "Close the <code>&lt;/td&gt;</code> tag"
        );
    }

    #[test]
    fn raw_html_is_escaped() {
        let html = inline_html("Stray </td> and <td> and </table>");
        assert!(!html.contains("</td>"));
        assert!(!html.contains("<td"));
        assert!(!html.contains("</table>"));
        assert!(html.contains("&lt;/table&gt;"));
    }

    #[test]
    fn links_become_anchors() {
        assert_eq!(
            inline_html("See [the docs](https://example.com/docs)"),
            r#"See <a href="https://example.com/docs">the docs</a>"#
        );
    }

    #[test]
    fn surrounding_whitespace_is_dropped() {
        assert_eq!(inline_html("  Trailing space "), "Trailing space");
    }

    #[test]
    fn several_paragraphs_keep_their_wrappers() {
        let html = inline_html("first\n\nsecond");
        assert!(html.starts_with("<p>first</p>"));
        assert!(html.ends_with("<p>second</p>"));
    }

    #[test]
    fn rendered_keeps_location() {
        let finding = Finding::new("Use `?`").sticky().at("src/a.rs", 3);
        assert_eq!(
            rendered(&finding),
            Finding::new("Use <code>?</code>").sticky().at("src/a.rs", 3)
        );
    }
}
