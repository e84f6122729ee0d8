use std::fmt;

use serde::Deserialize;

/// One reported issue or note.
///
/// Equality here is plain structural equality; reconciliation never uses it
/// directly and goes through an [`Equivalence`](crate::equivalence::Equivalence)
/// instead.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Finding {
    pub message: String,
    #[serde(default)]
    pub sticky: bool,
    #[serde(default)]
    pub file: Option<String>,
    #[serde(default)]
    pub line: Option<u32>,
}

impl Finding {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            sticky: false,
            file: None,
            line: None,
        }
    }

    pub fn sticky(mut self) -> Self {
        self.sticky = true;
        self
    }

    pub fn at(mut self, file: impl Into<String>, line: u32) -> Self {
        self.file = Some(file.into());
        self.line = Some(line);
        self
    }

    /// File and line, only when both are known.
    pub fn location(&self) -> Option<(&str, u32)> {
        match (&self.file, self.line) {
            (Some(file), Some(line)) => Some((file.as_str(), line)),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Category {
    Error,
    Warning,
    Message,
    FreeformNote,
}

impl Category {
    /// Categories rendered as findings tables, in display order.
    pub const TABLES: [Category; 3] = [Category::Error, Category::Warning, Category::Message];

    pub fn title(self) -> &'static str {
        match self {
            Category::Error => "Error",
            Category::Warning => "Warning",
            Category::Message => "Message",
            Category::FreeformNote => "Markdown",
        }
    }

    /// Emoji shortcode understood by both GitHub and GitLab.
    pub fn glyph(self) -> &'static str {
        match self {
            Category::Error => "no_entry_sign",
            Category::Warning => "warning",
            Category::Message => "book",
            Category::FreeformNote => "memo",
        }
    }

    pub fn symbol(self) -> &'static str {
        match self {
            Category::Error => "\u{1F6AB}",
            Category::Warning => "\u{26A0}\u{FE0F}",
            Category::Message => "\u{1F4D6}",
            Category::FreeformNote => "\u{1F4DD}",
        }
    }

    /// Title with an English plural suffix unless `count == 1`.
    pub fn plural_title(self, count: usize) -> String {
        pluralize(self.title(), count)
    }

    /// Map a table title back to a category. `None` means the table is not
    /// one of ours and must be ignored.
    pub fn from_title(title: &str) -> Option<Self> {
        let lower = title.to_lowercase();
        if lower.contains("error") {
            Some(Category::Error)
        } else if lower.contains("warning") {
            Some(Category::Warning)
        } else if lower.contains("message") {
            Some(Category::Message)
        } else if lower.contains("markdown") || lower.contains("note") {
            Some(Category::FreeformNote)
        } else {
            None
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.title())
    }
}

pub fn pluralize(word: &str, count: usize) -> String {
    if count == 1 {
        word.to_string()
    } else {
        format!("{word}s")
    }
}

/// Findings produced by the current run, as handed over by the rule engine.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Report {
    #[serde(default)]
    pub errors: Vec<Finding>,
    #[serde(default)]
    pub warnings: Vec<Finding>,
    #[serde(default)]
    pub messages: Vec<Finding>,
    #[serde(default)]
    pub markdowns: Vec<Finding>,
}

impl Report {
    pub fn parse(json: &str) -> crate::error::Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn findings(&self, category: Category) -> &[Finding] {
        match category {
            Category::Error => &self.errors,
            Category::Warning => &self.warnings,
            Category::Message => &self.messages,
            Category::FreeformNote => &self.markdowns,
        }
    }
}
