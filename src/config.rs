use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::cli::Cli;
use crate::error::{Error, Result};
use crate::identity::is_valid_run_id;

pub const DEFAULT_CONFIG_PATH: &str = ".prnotes.toml";
pub const DEFAULT_RUN_ID: &str = "danger";

const KNOWN_EQUIVALENCE: &[&str] = &["structural", "ignore-location"];

#[derive(Debug, Clone, Deserialize, Default, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct ConfigFile {
    pub host: Option<String>,
    pub run_id: Option<String>,
    pub template_dir: Option<PathBuf>,
    pub equivalence: Option<String>,
    pub repo: Option<String>,
    pub repo_url: Option<String>,
    pub head_sha: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    pub host: String,
    pub run_id: String,
    pub template_dir: Option<PathBuf>,
    pub equivalence: String,
    pub repo: Option<String>,
    pub repo_url: Option<String>,
    pub head_sha: Option<String>,
}

impl Config {
    /// Load the config file and merge CLI flags over it. A missing file is
    /// only an error when its path was given explicitly.
    pub fn load(cli: &Cli) -> Result<Self> {
        let file_config = match &cli.config {
            Some(path) => read_config(path)?,
            None => {
                let path = Path::new(DEFAULT_CONFIG_PATH);
                if path.exists() {
                    read_config(path)?
                } else {
                    ConfigFile::default()
                }
            }
        };

        let config = merge(file_config, cli);
        validate_merged(&config)?;
        Ok(config)
    }
}

fn read_config(path: &Path) -> Result<ConfigFile> {
    if !path.exists() {
        return Err(Error::ConfigNotFound(path.to_path_buf()));
    }
    let content = std::fs::read_to_string(path)?;
    parse_config(&content)
}

pub fn parse_config(content: &str) -> Result<ConfigFile> {
    let config: ConfigFile = toml::from_str(content)?;
    validate(&config)?;
    Ok(config)
}

fn validate(config: &ConfigFile) -> Result<()> {
    if let Some(ref run_id) = config.run_id {
        validate_run_id(run_id)?;
    }
    if let Some(ref equivalence) = config.equivalence {
        validate_equivalence(equivalence)?;
    }
    if let Some(ref host) = config.host
        && host.trim().is_empty()
    {
        return Err(Error::ConfigValidation("host must not be empty".to_string()));
    }
    Ok(())
}

/// CLI values bypass file validation, so the merged result is checked again.
fn validate_merged(config: &Config) -> Result<()> {
    validate_run_id(&config.run_id)?;
    validate_equivalence(&config.equivalence)?;
    if config.host.trim().is_empty() {
        return Err(Error::ConfigValidation("host must not be empty".to_string()));
    }
    Ok(())
}

fn validate_run_id(run_id: &str) -> Result<()> {
    if is_valid_run_id(run_id) {
        Ok(())
    } else {
        Err(Error::ConfigValidation(format!(
            "invalid run_id: {run_id:?} (expected letters, digits, '_' or '-')"
        )))
    }
}

fn validate_equivalence(equivalence: &str) -> Result<()> {
    if KNOWN_EQUIVALENCE.contains(&equivalence) {
        Ok(())
    } else {
        Err(Error::ConfigValidation(format!(
            "unknown equivalence: {equivalence} (expected: structural, ignore-location)"
        )))
    }
}

pub fn merge(file: ConfigFile, cli: &Cli) -> Config {
    Config {
        host: cli
            .host
            .clone()
            .or(file.host)
            .unwrap_or_else(|| "github".to_string()),
        run_id: cli
            .run_id
            .clone()
            .or(file.run_id)
            .unwrap_or_else(|| DEFAULT_RUN_ID.to_string()),
        template_dir: cli.template_dir.clone().or(file.template_dir),
        equivalence: cli
            .equivalence
            .clone()
            .or(file.equivalence)
            .unwrap_or_else(|| "structural".to_string()),
        repo: cli.repo().or(file.repo),
        repo_url: cli.repo_url.clone().or(file.repo_url),
        head_sha: cli.head_sha.clone().or(file.head_sha),
    }
}
