use crate::finding::{Finding, Report};

/// Build a `Report` from per-category findings, with no notes.
pub fn report(errors: &[Finding], warnings: &[Finding], messages: &[Finding]) -> Report {
    Report {
        errors: errors.to_vec(),
        warnings: warnings.to_vec(),
        messages: messages.to_vec(),
        markdowns: Vec::new(),
    }
}
