use serde::Serialize;

use crate::equivalence::Equivalence;
use crate::extract::{LINK_SEPARATOR, PreviousFindings, escape_attr};
use crate::finding::{Category, Finding};
use crate::links::LinkRenderer;
use crate::markup;

/// Messages of previous findings that no current finding is equivalent to,
/// deduplicated by text in first-seen order.
pub fn resolved_messages(
    current: &[Finding],
    previous: &[Finding],
    equivalence: &dyn Equivalence,
) -> Vec<String> {
    resolved_entries(current, previous, equivalence)
        .into_iter()
        .map(|entry| entry.message)
        .collect()
}

/// One line in a table's resolved section.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ResolvedEntry {
    pub message: String,
    /// Set when any of the collapsed findings was sticky. Sticky entries are
    /// read back by the next run and stay listed.
    pub sticky: bool,
    /// Location attributes of the first collapsed finding, already escaped.
    pub attrs: String,
}

/// Same selection as [`resolved_messages`], keeping what a later run needs to
/// read a sticky entry back.
pub fn resolved_entries(
    current: &[Finding],
    previous: &[Finding],
    equivalence: &dyn Equivalence,
) -> Vec<ResolvedEntry> {
    let mut entries: Vec<ResolvedEntry> = Vec::new();
    let gone = previous
        .iter()
        .filter(|old| !current.iter().any(|now| equivalence.equivalent(now, old)));
    for old in gone {
        match entries.iter_mut().find(|e| e.message == old.message) {
            Some(entry) => entry.sticky |= old.sticky,
            None => entries.push(ResolvedEntry {
                message: old.message.clone(),
                sticky: old.sticky,
                attrs: location_attrs(old),
            }),
        }
    }
    entries
}

/// One finding as it appears in a table row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RenderedFinding {
    /// Message with the location link in front, when there is one.
    pub message: String,
    pub sticky: bool,
    /// Extra `<td>` attributes carrying the location, already escaped.
    pub attrs: String,
}

impl RenderedFinding {
    /// `finding` must already be in rendered form (see [`markup::rendered`]).
    pub fn new(finding: &Finding, links: &dyn LinkRenderer) -> Self {
        let link = links.render(finding);
        let message = if link.is_empty() || finding.location().is_none() {
            finding.message.clone()
        } else {
            format!("{link}{LINK_SEPARATOR}{}", finding.message)
        };
        Self {
            message,
            sticky: finding.sticky,
            attrs: location_attrs(finding),
        }
    }
}

fn location_attrs(finding: &Finding) -> String {
    match finding.location() {
        Some((file, line)) => format!(
            r#" data-file="{}" data-line="{line}""#,
            escape_attr(file)
        ),
        None => String::new(),
    }
}

/// Render record for one category. Lives only while a body is being built.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FindingsTable {
    pub title: String,
    pub glyph: String,
    pub heading: String,
    pub rows: Vec<RenderedFinding>,
    pub resolved: Vec<ResolvedEntry>,
    pub count: usize,
    /// Whether the table has anything to show at all.
    pub visible: bool,
}

impl FindingsTable {
    /// Build the table for `category`, reconciling `current` against the
    /// previous findings of that category only. Current findings are compared
    /// in rendered form, the form previous findings were read back in.
    pub fn build(
        category: Category,
        current: &[Finding],
        previous: &PreviousFindings,
        links: &dyn LinkRenderer,
        equivalence: &dyn Equivalence,
    ) -> Self {
        let current: Vec<Finding> = current.iter().map(markup::rendered).collect();
        let rows: Vec<RenderedFinding> = current
            .iter()
            .map(|finding| RenderedFinding::new(finding, links))
            .collect();
        let earlier = previous.get(&category).map(Vec::as_slice).unwrap_or_default();
        let resolved = resolved_entries(&current, earlier, equivalence);
        let count = rows.len();

        let heading = if count > 0 {
            format!("{count} {}", category.plural_title(count))
        } else {
            format!(":white_check_mark: {} resolved", category.plural_title(0))
        };

        Self {
            title: category.title().to_string(),
            glyph: category.glyph().to_string(),
            heading,
            visible: count > 0 || !resolved.is_empty(),
            rows,
            resolved,
            count,
        }
    }
}
