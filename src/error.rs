use std::path::PathBuf;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("config file not found: {0}")]
    ConfigNotFound(PathBuf),

    #[error("config parse error: {0}")]
    ConfigParse(#[from] toml::de::Error),

    #[error("config validation error: {0}")]
    ConfigValidation(String),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("invalid findings report: {0}")]
    Json(#[from] serde_json::Error),

    #[error("template not found: {0}")]
    TemplateNotFound(String),

    #[error("template error: {0}")]
    Template(String),

    #[error("template {0} rendered a body without the identity marker")]
    MissingMarker(String),

    #[error("host api error: {0}")]
    Host(String),
}

impl Error {
    /// Stable variant name, printed next to the message so users can tell
    /// tool bugs apart from transient host failures.
    pub fn kind(&self) -> &'static str {
        match self {
            Error::ConfigNotFound(_) => "ConfigNotFound",
            Error::ConfigParse(_) => "ConfigParse",
            Error::ConfigValidation(_) => "ConfigValidation",
            Error::Io(_) => "Io",
            Error::Json(_) => "Json",
            Error::TemplateNotFound(_) => "TemplateNotFound",
            Error::Template(_) => "Template",
            Error::MissingMarker(_) => "MissingMarker",
            Error::Host(_) => "Host",
        }
    }
}

pub type Result<T> = std::result::Result<T, Error>;
