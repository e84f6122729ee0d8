//! One pass of the comment pipeline: previous body → previous findings →
//! reconciliation → rendered body → host update.

use tracing::{debug, info};

use crate::equivalence::Equivalence;
use crate::error::Result;
use crate::extract::{PreviousFindings, parse_comment};
use crate::finding::{Category, Report};
use crate::host::{HostApi, update_or_create_comment};
use crate::identity::find_own;
use crate::links::LinkRenderer;
use crate::reconcile::FindingsTable;
use crate::templates::{InlineContext, NoteContext, SummaryContext, TemplateRenderer};

/// A rendered body meant for an inline review comment at `file:line`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InlineBody {
    pub file: String,
    pub line: u32,
    pub body: String,
}

pub struct Annotator<'a> {
    renderer: &'a TemplateRenderer,
    links: &'a dyn LinkRenderer,
    equivalence: &'a dyn Equivalence,
    run_id: String,
}

impl<'a> Annotator<'a> {
    pub fn new(
        renderer: &'a TemplateRenderer,
        links: &'a dyn LinkRenderer,
        equivalence: &'a dyn Equivalence,
        run_id: impl Into<String>,
    ) -> Self {
        Self {
            renderer,
            links,
            equivalence,
            run_id: run_id.into(),
        }
    }

    pub fn run_id(&self) -> &str {
        &self.run_id
    }

    /// Reconcile `report` against the findings recovered from the previous
    /// body and render the summary comment.
    pub fn summary_body(&self, report: &Report, previous_body: Option<&str>) -> Result<String> {
        let previous = previous_body.map(parse_comment).unwrap_or_default();
        let ctx = self.summary_context(report, &previous);
        self.renderer.render_summary(&ctx)
    }

    pub fn summary_context(&self, report: &Report, previous: &PreviousFindings) -> SummaryContext {
        let tables = Category::TABLES
            .iter()
            .map(|&category| {
                FindingsTable::build(
                    category,
                    report.findings(category),
                    previous,
                    self.links,
                    self.equivalence,
                )
            })
            .collect();
        SummaryContext {
            tables,
            notes: report.markdowns.iter().map(|m| m.message.clone()).collect(),
            run_id: self.run_id.clone(),
        }
    }

    /// Inline bodies for every located finding and note, in category order.
    pub fn inline_bodies(&self, report: &Report) -> Result<Vec<InlineBody>> {
        let mut bodies = Vec::new();
        for category in Category::TABLES {
            for finding in report.findings(category) {
                let Some((file, line)) = finding.location() else {
                    continue;
                };
                let body = self.renderer.render_inline(&InlineContext {
                    category,
                    finding: finding.clone(),
                    resolved: false,
                    run_id: self.run_id.clone(),
                })?;
                bodies.push(InlineBody {
                    file: file.to_string(),
                    line,
                    body,
                });
            }
        }
        for note in &report.markdowns {
            let Some((file, line)) = note.location() else {
                continue;
            };
            let body = self.renderer.render_inline_note(&NoteContext {
                note: note.message.clone(),
                run_id: self.run_id.clone(),
            })?;
            bodies.push(InlineBody {
                file: file.to_string(),
                line,
                body,
            });
        }
        Ok(bodies)
    }

    /// Find this run's earlier comment, render the new body in full, then
    /// update or create the comment. Returns the comment id.
    pub fn post(&self, host: &dyn HostApi, report: &Report) -> Result<String> {
        let comments = host.list_comments()?;
        let existing = find_own(&comments, &self.run_id);
        match existing {
            Some(comment) => debug!(id = %comment.id, run_id = %self.run_id, "found previous comment"),
            None => debug!(run_id = %self.run_id, "no previous comment"),
        }

        let body = self.summary_body(report, existing.map(|c| c.body.as_str()))?;
        let id = update_or_create_comment(host, existing, &body)?;
        info!(id = %id, host = self.renderer.host(), "findings comment posted");
        Ok(id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::equivalence::Structural;
    use crate::error::Error;
    use crate::finding::Finding;
    use crate::identity::Comment;
    use crate::links::PlainLinks;
    use crate::test_helpers::report;
    use std::cell::RefCell;

    struct FakeHost {
        comments: Vec<Comment>,
        writes: RefCell<Vec<(Option<String>, String)>>,
        fail_list: bool,
    }

    impl FakeHost {
        fn with(comments: Vec<Comment>) -> Self {
            Self {
                comments,
                writes: RefCell::new(Vec::new()),
                fail_list: false,
            }
        }
    }

    impl HostApi for FakeHost {
        fn list_comments(&self) -> Result<Vec<Comment>> {
            if self.fail_list {
                return Err(Error::Host("gh failed: 500".into()));
            }
            Ok(self.comments.clone())
        }

        fn create_comment(&self, body: &str) -> Result<String> {
            self.writes.borrow_mut().push((None, body.to_string()));
            Ok("100".into())
        }

        fn update_comment(&self, id: &str, body: &str) -> Result<String> {
            self.writes
                .borrow_mut()
                .push((Some(id.to_string()), body.to_string()));
            Ok(id.to_string())
        }
    }

    fn renderer() -> TemplateRenderer {
        TemplateRenderer::new("github", None).unwrap()
    }

    #[test]
    fn post_creates_when_no_own_comment() {
        let renderer = renderer();
        let annotator = Annotator::new(&renderer, &PlainLinks, &Structural, "danger");
        let host = FakeHost::with(vec![Comment::new("1", "<!-- generated_by_other -->")]);
        let id = annotator
            .post(&host, &report(&[Finding::new("Boom")], &[], &[]))
            .unwrap();
        assert_eq!(id, "100");
        let writes = host.writes.borrow();
        assert_eq!(writes.len(), 1);
        assert_eq!(writes[0].0, None);
        assert!(writes[0].1.contains("Boom"));
    }

    #[test]
    fn post_updates_own_comment_and_reports_resolution() {
        let renderer = renderer();
        let annotator = Annotator::new(&renderer, &PlainLinks, &Structural, "danger");
        let first = annotator
            .summary_body(&report(&[Finding::new("Old").sticky()], &[], &[]), None)
            .unwrap();
        let host = FakeHost::with(vec![
            Comment::new("1", "<!-- generated_by_other -->"),
            Comment::new("2", first),
        ]);

        annotator.post(&host, &Report::default()).unwrap();

        let writes = host.writes.borrow();
        assert_eq!(writes[0].0.as_deref(), Some("2"));
        assert!(writes[0].1.contains("<del>Old</del>"));
        assert!(writes[0].1.contains(":white_check_mark: Errors resolved"));
    }

    #[test]
    fn host_failure_is_fatal_and_nothing_is_written() {
        let renderer = renderer();
        let annotator = Annotator::new(&renderer, &PlainLinks, &Structural, "danger");
        let mut host = FakeHost::with(Vec::new());
        host.fail_list = true;
        let err = annotator.post(&host, &Report::default()).unwrap_err();
        assert_eq!(err.kind(), "Host");
        assert!(host.writes.borrow().is_empty());
    }

    #[test]
    fn unparseable_previous_body_is_a_cold_start() {
        let renderer = renderer();
        let annotator = Annotator::new(&renderer, &PlainLinks, &Structural, "danger");
        let body = annotator
            .summary_body(
                &report(&[Finding::new("New")], &[], &[]),
                Some("<table><th width=\"100%\">Error<td data-sticky=\"true\">"),
            )
            .unwrap();
        assert!(body.contains("1 Error"));
        assert!(!body.contains("resolved"));
    }

    #[test]
    fn notes_are_rendered_in_summary() {
        let renderer = renderer();
        let annotator = Annotator::new(&renderer, &PlainLinks, &Structural, "danger");
        let mut input = Report::default();
        input.markdowns.push(Finding::new("## Bundle size\n\n+2kb"));
        let body = annotator.summary_body(&input, None).unwrap();
        assert!(body.contains("## Bundle size\n\n+2kb"));
    }

    #[test]
    fn inline_bodies_only_for_located_findings() {
        let renderer = renderer();
        let annotator = Annotator::new(&renderer, &PlainLinks, &Structural, "danger");
        let mut input = report(
            &[Finding::new("No location")],
            &[Finding::new("Unwrap").at("src/main.rs", 8)],
            &[],
        );
        input
            .markdowns
            .push(Finding::new("Split this module").at("src/lib.rs", 1));
        let bodies = annotator.inline_bodies(&input).unwrap();
        assert_eq!(bodies.len(), 2);
        assert_eq!((bodies[0].file.as_str(), bodies[0].line), ("src/main.rs", 8));
        assert!(bodies[0].body.contains(":warning: Unwrap"));
        assert!(bodies[1].body.contains("Split this module"));
        assert!(bodies.iter().all(|b| b.body.contains("generated_by_danger")));
    }
}
