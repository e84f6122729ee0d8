//! Recovers typed findings from the tables of a previously posted comment.
//!
//! Messages come back in the cell HTML form produced by
//! [`markup::inline_html`](crate::markup::inline_html), which is also the form
//! current findings are compared in.

use std::collections::BTreeMap;
use std::sync::LazyLock;

use regex::Regex;
use tracing::{debug, warn};

use crate::finding::{Category, Finding};
use crate::scanner::{RawTable, scan_tables};

/// Findings recovered from the last comment, keyed by category.
pub type PreviousFindings = BTreeMap<Category, Vec<Finding>>;

static ROW: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?is)<td\s+data-sticky="(true|false)"([^>]*)>(.*?)</td>"#).expect("row regex")
});

static ATTR: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"\b(data-[a-z-]+)="([^"]*)""#).expect("attr regex"));

static MARKDOWN_LINK: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\[[^\]]*\]\([^)\s]*\)").expect("markdown link regex"));

static ANCHOR_LINK: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?is)^<a\s[^>]*>.*?</a>").expect("anchor regex"));

/// Separator placed between a rendered link and the message text.
pub(crate) const LINK_SEPARATOR: &str = " - ";

/// Parse every recognised table in `body` into per-category findings.
///
/// Never fails: unparseable markup yields no findings, which reconciles as a
/// cold start. Categories with no findings are omitted.
pub fn parse_comment(body: &str) -> PreviousFindings {
    let mut previous = PreviousFindings::new();
    for table in scan_tables(body) {
        let Some(category) = classify(&table) else {
            debug!(title = %table.title, "ignoring table with unrecognised title");
            continue;
        };
        let findings = findings_from_table(table.markup);
        if findings.is_empty() {
            continue;
        }
        previous.entry(category).or_default().extend(findings);
    }
    previous
}

/// Decide the category of a recognised table. The explicit `data-kind`
/// attribute wins over the free-text title.
pub fn classify(table: &RawTable<'_>) -> Option<Category> {
    table
        .kind
        .as_deref()
        .and_then(Category::from_title)
        .or_else(|| Category::from_title(&table.title))
}

/// Extract the findings of one table, in row order.
///
/// A resolved row of a sticky finding is read back as that finding, so it is
/// listed as resolved again on every run until the finding fires once more.
/// Resolved rows of ordinary findings are one-run notices and are left out.
pub fn findings_from_table(markup: &str) -> Vec<Finding> {
    let mut findings = Vec::new();
    for caps in ROW.captures_iter(markup) {
        let sticky = caps[1].eq_ignore_ascii_case("true");
        let attrs = RowAttrs::parse(&caps[2]);
        if attrs.resolved && !sticky {
            continue;
        }
        match parse_row(sticky, &attrs, &caps[3]) {
            Some(finding) => findings.push(finding),
            None => warn!(row = %caps[0].trim(), "skipping malformed findings row"),
        }
    }
    findings
}

#[derive(Debug, Default)]
struct RowAttrs {
    file: Option<String>,
    line: Option<String>,
    resolved: bool,
}

impl RowAttrs {
    fn parse(raw: &str) -> Self {
        let mut attrs = RowAttrs::default();
        for caps in ATTR.captures_iter(raw) {
            match &caps[1] {
                "data-file" => attrs.file = Some(unescape_attr(&caps[2])),
                "data-line" => attrs.line = Some(caps[2].to_string()),
                "data-resolved" => attrs.resolved = caps[2].eq_ignore_ascii_case("true"),
                _ => {}
            }
        }
        attrs
    }
}

fn parse_row(sticky: bool, attrs: &RowAttrs, content: &str) -> Option<Finding> {
    // A lazy match that swallowed a neighbouring cell means this row never closed.
    if content.to_ascii_lowercase().contains("<td") {
        return None;
    }

    let (file, line) = match (&attrs.file, &attrs.line) {
        (Some(file), Some(line)) => (Some(file.clone()), Some(line.trim().parse::<u32>().ok()?)),
        (None, None) => (None, None),
        _ => return None,
    };

    let mut message = strip_del(content.trim());
    if let (Some(file), Some(line)) = (&file, line) {
        message = strip_link(message, file, line);
    }
    let message = message.trim();
    if message.is_empty() {
        return None;
    }

    Some(Finding {
        message: message.to_string(),
        sticky,
        file,
        line,
    })
}

fn strip_del(content: &str) -> &str {
    content
        .strip_prefix("<del>")
        .and_then(|rest| rest.strip_suffix("</del>"))
        .unwrap_or(content)
}

/// Remove a leading link fragment, in whichever style the host rendered it.
fn strip_link<'a>(content: &'a str, file: &str, line: u32) -> &'a str {
    let plain = escape_attr(&format!("{file}#L{line}"));
    let link_len = MARKDOWN_LINK
        .find(content)
        .or_else(|| ANCHOR_LINK.find(content))
        .map(|m| m.end())
        .or_else(|| content.starts_with(&plain).then_some(plain.len()));

    match link_len {
        Some(len) => {
            let rest = &content[len..];
            rest.strip_prefix(LINK_SEPARATOR).unwrap_or(rest)
        }
        None => content,
    }
}

pub(crate) fn escape_attr(value: &str) -> String {
    value
        .replace('&', "&amp;")
        .replace('"', "&quot;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
}

fn unescape_attr(value: &str) -> String {
    value
        .replace("&quot;", "\"")
        .replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&amp;", "&")
}
