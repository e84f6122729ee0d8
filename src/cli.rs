use std::path::PathBuf;

use clap::{Parser, Subcommand};

/// prnotes — keep one findings comment per run up to date on a pull request
#[derive(Parser, Debug, Clone)]
#[command(name = "prnotes", version, about)]
pub struct Cli {
    #[command(subcommand)]
    pub command: CliCommand,

    /// Path to config file (default: .prnotes.toml, optional)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Host template variant (github, gitlab, or any override name)
    #[arg(long, global = true)]
    pub host: Option<String>,

    /// Identifier of this configuration; separates comments of parallel runs
    #[arg(long, global = true)]
    pub run_id: Option<String>,

    /// Directory with `<template>.md` files overriding the built-in templates
    #[arg(long, global = true)]
    pub template_dir: Option<PathBuf>,

    /// Equivalence policy for reconciliation (structural, ignore-location)
    #[arg(long, global = true)]
    pub equivalence: Option<String>,

    /// Repository URL used to link findings to files
    #[arg(long, global = true)]
    pub repo_url: Option<String>,

    /// Head commit SHA used to link findings to files
    #[arg(long, global = true)]
    pub head_sha: Option<String>,

    /// Log at debug level
    #[arg(long, short, global = true)]
    pub verbose: bool,
}

#[derive(Subcommand, Debug, Clone)]
pub enum CliCommand {
    /// Render the summary comment body to stdout
    Render {
        /// JSON report with this run's findings
        #[arg(long)]
        findings: PathBuf,

        /// File holding the previously posted comment body
        #[arg(long)]
        previous: Option<PathBuf>,
    },

    /// Update or create the findings comment on a pull/merge request
    Post {
        /// JSON report with this run's findings
        #[arg(long)]
        findings: PathBuf,

        /// Pull request number (merge request iid on GitLab)
        #[arg(long)]
        pr: u64,

        /// Repository (`owner/name` or GitLab project path)
        #[arg(long)]
        repo: Option<String>,

        /// Print the body instead of posting it
        #[arg(long)]
        dry_run: bool,
    },

    /// Print a one-line status description for the report
    Status {
        /// JSON report with this run's findings
        #[arg(long)]
        findings: PathBuf,
    },
}

impl Cli {
    /// Repository given to the `post` subcommand, if any.
    pub fn repo(&self) -> Option<String> {
        match &self.command {
            CliCommand::Post { repo, .. } => repo.clone(),
            _ => None,
        }
    }
}
