//! Locates findings tables inside a previously posted comment body.
//!
//! This is a regex shim rather than an HTML parser: older comments must keep
//! parsing exactly as they were written. Two header markers are recognised,
//! tried in order for every table:
//!
//! - legacy: `<th width="100%" ...>TITLE</th>`
//! - current: `<th ... data-danger-table="true" ...>TITLE</th>`
//!
//! Tables carrying neither marker belong to someone else and are skipped.

use std::sync::LazyLock;

use regex::Regex;
use tracing::debug;

static TABLE_START: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)<table\b").expect("table start regex"));

static TABLE_END: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)</table\s*>").expect("table end regex"));

static LEGACY_HEADER: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?is)<th\s+width="100%"([^>]*)>(.*?)</th>"#).expect("legacy header regex")
});

static CURRENT_HEADER: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?is)<th\b([^>]*\bdata-danger-table="true"[^>]*)>(.*?)</th>"#)
        .expect("current header regex")
});

static KIND_ATTR: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"(?i)\bdata-kind="([^"]*)""#).expect("kind attr regex"));

/// Which header marker identified a table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TableMarker {
    Legacy,
    Current,
}

/// A recognised table fragment together with its captured title.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawTable<'a> {
    pub marker: TableMarker,
    /// Header cell text, e.g. `2 Errors`.
    pub title: String,
    /// Value of the header's `data-kind` attribute, when present.
    pub kind: Option<String>,
    /// The table markup, from `<table` up to (not including) `</table>`.
    pub markup: &'a str,
}

/// Split a comment body into table fragments and keep the ones carrying one
/// of our header markers.
pub fn scan_tables(body: &str) -> Vec<RawTable<'_>> {
    let mut tables = Vec::new();
    for fragment in TABLE_END.split(body) {
        let Some(start) = TABLE_START.find(fragment) else {
            continue;
        };
        let markup = &fragment[start.start()..];
        match match_header(markup) {
            Some((marker, attrs, title)) => {
                let kind = KIND_ATTR
                    .captures(attrs)
                    .map(|caps| caps[1].trim().to_string());
                tables.push(RawTable {
                    marker,
                    title: title.trim().to_string(),
                    kind,
                    markup,
                });
            }
            None => debug!("skipping table without a findings header"),
        }
    }
    tables
}

fn match_header(markup: &str) -> Option<(TableMarker, &str, &str)> {
    if let Some(caps) = LEGACY_HEADER.captures(markup) {
        let (attrs, title) = (caps.get(1)?, caps.get(2)?);
        return Some((TableMarker::Legacy, attrs.as_str(), title.as_str()));
    }
    let caps = CURRENT_HEADER.captures(markup)?;
    let (attrs, title) = (caps.get(1)?, caps.get(2)?);
    Some((TableMarker::Current, attrs.as_str(), title.as_str()))
}
