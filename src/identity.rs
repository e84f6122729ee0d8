/// A comment already on the request, as listed by the host.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Comment {
    /// Host-specific comment id, kept opaque.
    pub id: String,
    pub body: String,
}

impl Comment {
    pub fn new(id: impl Into<String>, body: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            body: body.into(),
        }
    }

    /// Whether this comment was posted under `run_id`.
    pub fn belongs_to(&self, run_id: &str) -> bool {
        body_belongs_to(&self.body, run_id)
    }
}

/// The literal marker tying a body to a run identifier.
pub fn marker(run_id: &str) -> String {
    format!("generated_by_{run_id}")
}

/// Run identifiers end up inside an HTML comment and are matched by prefix,
/// so they are restricted to identifier characters.
pub fn is_valid_run_id(run_id: &str) -> bool {
    !run_id.is_empty() && run_id.chars().all(is_marker_char)
}

fn is_marker_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '_' || c == '-'
}

/// Substring check for the marker, rejecting matches that continue into a
/// longer identifier (`danger` must not claim `generated_by_danger2`).
pub fn body_belongs_to(body: &str, run_id: &str) -> bool {
    marker_count(body, run_id) > 0
}

/// Number of standalone marker occurrences for `run_id` in `body`.
pub fn marker_count(body: &str, run_id: &str) -> usize {
    let needle = marker(run_id);
    body.match_indices(&needle)
        .filter(|(start, _)| {
            !body[start + needle.len()..]
                .chars()
                .next()
                .is_some_and(is_marker_char)
        })
        .count()
}

/// Pick the comment this run posted earlier, if any. The first match wins.
pub fn find_own<'a>(comments: &'a [Comment], run_id: &str) -> Option<&'a Comment> {
    comments.iter().find(|c| c.belongs_to(run_id))
}
