use std::path::Path;

use serde::Serialize;
use tracing::{debug, warn};

use crate::error::{Error, Result};
use crate::finding::{Category, Finding};
use crate::identity::marker_count;
use crate::reconcile::FindingsTable;

const DEFAULT_GITHUB: &str = include_str!("default_templates/github.md");
const DEFAULT_GITHUB_INLINE: &str = include_str!("default_templates/github_inline.md");
const DEFAULT_GITLAB: &str = include_str!("default_templates/gitlab.md");
const DEFAULT_GITLAB_INLINE: &str = include_str!("default_templates/gitlab_inline.md");

const BUILTIN: &[(&str, &str)] = &[
    ("github", DEFAULT_GITHUB),
    ("github_inline", DEFAULT_GITHUB_INLINE),
    ("gitlab", DEFAULT_GITLAB),
    ("gitlab_inline", DEFAULT_GITLAB_INLINE),
];

const TEMPLATE_EXTENSION: &str = "md";

/// Which body is being produced.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TemplateMode {
    Summary,
    Inline,
    InlineNote,
}

impl TemplateMode {
    /// Template name for a host variant, e.g. `github` or `gitlab_inline`.
    pub fn template_name(self, host: &str) -> String {
        match self {
            TemplateMode::Summary => host.to_string(),
            TemplateMode::Inline | TemplateMode::InlineNote => format!("{host}_inline"),
        }
    }
}

/// Context for the request-wide summary comment.
#[derive(Debug, Clone, Serialize)]
pub struct SummaryContext {
    pub tables: Vec<FindingsTable>,
    pub notes: Vec<String>,
    pub run_id: String,
}

/// Context for a review comment anchored to one finding's file and line.
#[derive(Debug, Clone)]
pub struct InlineContext {
    pub category: Category,
    pub finding: Finding,
    pub resolved: bool,
    pub run_id: String,
}

/// Context for a single free-form note posted inline.
#[derive(Debug, Clone)]
pub struct NoteContext {
    pub note: String,
    pub run_id: String,
}

/// What inline templates see; both inline modes share one template.
#[derive(Debug, Serialize)]
struct InlineView<'a> {
    findings: Vec<InlineFindingView<'a>>,
    notes: Vec<&'a str>,
    run_id: &'a str,
}

#[derive(Debug, Serialize)]
struct InlineFindingView<'a> {
    glyph: &'a str,
    message: &'a str,
    resolved: bool,
}

/// Named, swappable comment templates for one host variant.
///
/// Built-in templates are compiled in; files named `<template>.md` in the
/// override directory replace a built-in of the same name or add a new host
/// variant.
pub struct TemplateRenderer {
    host: String,
    engine: upon::Engine<'static>,
}

impl TemplateRenderer {
    pub fn new(host: &str, override_dir: Option<&Path>) -> Result<Self> {
        let mut engine = upon::Engine::new();
        for (name, source) in BUILTIN {
            add_template(&mut engine, name.to_string(), source.to_string())?;
        }
        if let Some(dir) = override_dir {
            load_overrides(&mut engine, dir)?;
        }

        let renderer = Self {
            host: host.to_string(),
            engine,
        };
        for mode in [TemplateMode::Summary, TemplateMode::Inline] {
            let name = mode.template_name(host);
            if renderer.engine.get_template(&name).is_none() {
                return Err(Error::TemplateNotFound(name));
            }
        }
        Ok(renderer)
    }

    pub fn host(&self) -> &str {
        &self.host
    }

    pub fn render_summary(&self, ctx: &SummaryContext) -> Result<String> {
        self.render(TemplateMode::Summary, ctx, &ctx.run_id)
    }

    pub fn render_inline(&self, ctx: &InlineContext) -> Result<String> {
        let view = InlineView {
            findings: vec![InlineFindingView {
                glyph: ctx.category.glyph(),
                message: &ctx.finding.message,
                resolved: ctx.resolved,
            }],
            notes: Vec::new(),
            run_id: &ctx.run_id,
        };
        self.render(TemplateMode::Inline, &view, &ctx.run_id)
    }

    pub fn render_inline_note(&self, ctx: &NoteContext) -> Result<String> {
        let view = InlineView {
            findings: Vec::new(),
            notes: vec![ctx.note.as_str()],
            run_id: &ctx.run_id,
        };
        self.render(TemplateMode::InlineNote, &view, &ctx.run_id)
    }

    /// Render the template for `mode` and check the identity marker made it
    /// into the body.
    pub fn render<S: Serialize>(&self, mode: TemplateMode, ctx: &S, run_id: &str) -> Result<String> {
        let name = mode.template_name(&self.host);
        let template = self
            .engine
            .get_template(&name)
            .ok_or_else(|| Error::TemplateNotFound(name.clone()))?;
        let body = template
            .render(ctx)
            .to_string()
            .map_err(|e| Error::Template(format!("failed to render {name}: {e}")))?;

        match marker_count(&body, run_id) {
            0 => Err(Error::MissingMarker(name)),
            1 => Ok(body),
            n => {
                warn!(template = %name, occurrences = n, "identity marker appears more than once");
                Ok(body)
            }
        }
    }
}

fn add_template(engine: &mut upon::Engine<'static>, name: String, source: String) -> Result<()> {
    engine
        .add_template(name.clone(), source)
        .map_err(|e| Error::Template(format!("failed to compile template {name}: {e}")))
}

fn load_overrides(engine: &mut upon::Engine<'static>, dir: &Path) -> Result<()> {
    for entry in std::fs::read_dir(dir)? {
        let path = entry?.path();
        if path.extension().and_then(|e| e.to_str()) != Some(TEMPLATE_EXTENSION) {
            continue;
        }
        let Some(name) = path.file_stem().and_then(|s| s.to_str()) else {
            continue;
        };
        let source = std::fs::read_to_string(&path).map_err(|e| {
            Error::Template(format!(
                "failed to read override template {}: {e}",
                path.display()
            ))
        })?;
        debug!(template = name, path = %path.display(), "loaded template override");
        add_template(engine, name.to_string(), source)?;
    }
    Ok(())
}
