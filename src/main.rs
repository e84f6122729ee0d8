use std::error::Error as _;
use std::path::Path;

use clap::Parser;
use tracing::info;
use tracing_subscriber::EnvFilter;

use prnotes::annotate::Annotator;
use prnotes::cli::{Cli, CliCommand};
use prnotes::config::Config;
use prnotes::equivalence;
use prnotes::error::{Error, Result};
use prnotes::finding::Report;
use prnotes::host::HostApi;
use prnotes::host::github::GitHubHost;
use prnotes::host::gitlab::GitLabHost;
use prnotes::links;
use prnotes::status;
use prnotes::templates::TemplateRenderer;

fn init_logging(verbose: bool) {
    let default = if verbose { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

fn main() {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    if let Err(e) = run(&cli) {
        eprintln!("{}", report_error(&e));
        std::process::exit(1);
    }
}

/// `error: <message> (<Kind>)` plus the chain of underlying causes.
fn report_error(err: &Error) -> String {
    let mut message = format!("error: {err} ({})", err.kind());
    let mut source = err.source();
    while let Some(cause) = source {
        message.push_str(&format!("\n\tcaused by: {cause}"));
        source = cause.source();
    }
    message
}

fn run(cli: &Cli) -> Result<()> {
    let config = Config::load(cli)?;
    info!(?config, "config loaded");

    match &cli.command {
        CliCommand::Status { findings } => {
            let report = read_report(findings)?;
            println!(
                "{}",
                status::describe(report.errors.len(), report.warnings.len())
            );
            Ok(())
        }
        CliCommand::Render { findings, previous } => {
            let report = read_report(findings)?;
            let previous = previous
                .as_deref()
                .map(std::fs::read_to_string)
                .transpose()?;
            with_annotator(&config, |annotator| {
                let body = annotator.summary_body(&report, previous.as_deref())?;
                println!("{body}");
                Ok(())
            })
        }
        CliCommand::Post {
            findings,
            pr,
            dry_run,
            ..
        } => {
            let report = read_report(findings)?;
            let host = host_api(&config, *pr)?;
            with_annotator(&config, |annotator| {
                if *dry_run {
                    let comments = host.list_comments()?;
                    let existing = prnotes::identity::find_own(&comments, annotator.run_id());
                    let body =
                        annotator.summary_body(&report, existing.map(|c| c.body.as_str()))?;
                    println!("{body}");
                    return Ok(());
                }
                let id = annotator.post(&*host, &report)?;
                println!("{id}");
                Ok(())
            })
        }
    }
}

fn with_annotator<F>(config: &Config, f: F) -> Result<()>
where
    F: FnOnce(&Annotator<'_>) -> Result<()>,
{
    let renderer = TemplateRenderer::new(&config.host, config.template_dir.as_deref())?;
    let links = links::for_host(
        &config.host,
        config.repo_url.as_deref(),
        config.head_sha.as_deref(),
    );
    let policy = equivalence::by_name(&config.equivalence).ok_or_else(|| {
        Error::ConfigValidation(format!("unknown equivalence: {}", config.equivalence))
    })?;
    let annotator = Annotator::new(
        &renderer,
        &*links,
        &*policy,
        config.run_id.clone(),
    );
    f(&annotator)
}

fn host_api(config: &Config, pr: u64) -> Result<Box<dyn HostApi>> {
    match config.host.as_str() {
        "github" => Ok(Box::new(GitHubHost::new(config.repo.clone(), pr))),
        "gitlab" => Ok(Box::new(GitLabHost::new(config.repo.clone(), pr))),
        other => Err(Error::ConfigValidation(format!(
            "posting is not supported for host {other} (expected: github, gitlab)"
        ))),
    }
}

fn read_report(path: &Path) -> Result<Report> {
    let json = std::fs::read_to_string(path)?;
    Report::parse(&json)
}
