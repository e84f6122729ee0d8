#![allow(dead_code)]

use std::path::{Path, PathBuf};

use prnotes::annotate::Annotator;
use prnotes::equivalence::Structural;
use prnotes::finding::{Finding, Report};
use prnotes::links::PlainLinks;
use prnotes::templates::TemplateRenderer;

/// A comment as Danger-era tooling posted it: legacy width marker, sticky rows only.
pub const LEGACY_COMMENT: &str = r#"<table>
  <thead>
    <tr>
      <th width="50"></th>
      <th width="100%">
        2 Errors
      </th>
     </tr>
  </thead>
  <tbody>
    <tr>
      <td>:no_entry_sign:</td>
      <td data-sticky="true">Please include a CHANGELOG entry.</td>
    </tr>
    <tr>
      <td>:no_entry_sign:</td>
      <td data-sticky="true">PR is classed as Work in Progress</td>
    </tr>
  </tbody>
</table>

| Module | Coverage |
|--------|----------|
| core   | 91%      |

<table>
  <tr><th>Reviewer</th><th>Status</th></tr>
  <tr><td>alice</td><td>approved</td></tr>
</table>

<p align="right" data-meta="generated_by_danger">
  Generated by :no_entry_sign: <a href="https://danger.systems/">Danger</a>
</p>
"#;

pub fn renderer(host: &str) -> TemplateRenderer {
    TemplateRenderer::new(host, None).unwrap()
}

/// Render the summary body the way a default-configured run would.
pub fn render_plain(report: &Report, previous: Option<&str>, run_id: &str) -> String {
    let renderer = renderer("github");
    let annotator = Annotator::new(&renderer, &PlainLinks, &Structural, run_id);
    annotator.summary_body(report, previous).unwrap()
}

pub fn report(errors: Vec<Finding>, warnings: Vec<Finding>, messages: Vec<Finding>) -> Report {
    Report {
        errors,
        warnings,
        messages,
        markdowns: Vec::new(),
    }
}

/// Write a JSON findings report into `dir` and return its path.
pub fn write_report(dir: &Path, json: &str) -> PathBuf {
    let path = dir.join("findings.json");
    std::fs::write(&path, json).unwrap();
    path
}
