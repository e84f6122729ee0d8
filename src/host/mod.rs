pub mod github;
pub mod gitlab;

use std::process::Command;
use std::thread;
use std::time::Duration;

use tracing::{info, warn};

use crate::error::{Error, Result};
use crate::identity::Comment;

const MAX_RETRIES: u32 = 3;
const INITIAL_BACKOFF_MS: u64 = 500;

/// The git forge, as far as posting the findings comment is concerned.
pub trait HostApi {
    /// All comments currently on the request.
    fn list_comments(&self) -> Result<Vec<Comment>>;

    /// Post a new comment. Returns its id.
    fn create_comment(&self, body: &str) -> Result<String>;

    /// Replace the body of an existing comment. Returns its id.
    fn update_comment(&self, id: &str, body: &str) -> Result<String>;
}

/// Update `existing` in place when there is one, otherwise post a new comment.
pub fn update_or_create_comment(
    host: &dyn HostApi,
    existing: Option<&Comment>,
    body: &str,
) -> Result<String> {
    match existing {
        Some(comment) if comment.body == body => {
            info!(id = %comment.id, "comment already up to date");
            Ok(comment.id.clone())
        }
        Some(comment) => {
            let id = host.update_comment(&comment.id, body)?;
            info!(id = %id, "updated comment");
            Ok(id)
        }
        None => {
            let id = host.create_comment(body)?;
            info!(id = %id, "created comment");
            Ok(id)
        }
    }
}

/// Abstraction over a forge CLI (`gh`, `glab`) for testability.
pub trait CliClient {
    /// Run with the client's retry policy. Only for calls that are safe to
    /// repeat: reads and in-place updates.
    fn run(&self, args: &[&str]) -> Result<String>;

    /// Run exactly once. A timed-out create may still have landed, and a
    /// second attempt would post a duplicate.
    fn run_once(&self, args: &[&str]) -> Result<String>;
}

/// Runs a forge CLI binary, with exponential backoff on retried calls.
pub struct CommandClient {
    program: String,
    initial_backoff_ms: u64,
    max_retries: u32,
}

impl CommandClient {
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
            initial_backoff_ms: INITIAL_BACKOFF_MS,
            max_retries: MAX_RETRIES,
        }
    }

    fn invoke(&self, args: &[&str]) -> Result<String> {
        let program = &self.program;
        let output = Command::new(program)
            .args(args)
            .output()
            .map_err(|e| Error::Host(format!("failed to run {program}: {e}")))?;

        if output.status.success() {
            String::from_utf8(output.stdout)
                .map_err(|e| Error::Host(format!("invalid utf8 from {program}: {e}")))
        } else {
            let stderr = String::from_utf8_lossy(&output.stderr);
            Err(Error::Host(format!("{program} failed: {}", stderr.trim())))
        }
    }
}

impl CliClient for CommandClient {
    fn run(&self, args: &[&str]) -> Result<String> {
        retry_with_backoff_ms(
            || self.invoke(args),
            self.initial_backoff_ms,
            self.max_retries,
        )
    }

    fn run_once(&self, args: &[&str]) -> Result<String> {
        self.invoke(args)
    }
}

fn retry_with_backoff_ms<F, T>(f: F, initial_backoff_ms: u64, max_retries: u32) -> Result<T>
where
    F: Fn() -> Result<T>,
{
    let mut backoff_ms = initial_backoff_ms;
    let mut attempt = 1;
    loop {
        match f() {
            Ok(val) => return Ok(val),
            Err(e) if attempt < max_retries => {
                warn!(attempt, error = %e, backoff_ms, "retrying after host error");
                thread::sleep(Duration::from_millis(backoff_ms));
                backoff_ms *= 2;
                attempt += 1;
            }
            Err(e) => return Err(e),
        }
    }
}
