use serde::Deserialize;
use tracing::debug;

use crate::error::{Error, Result};
use crate::identity::Comment;

use super::{CliClient, CommandClient, HostApi};

#[derive(Debug, Deserialize)]
struct GhComment {
    id: u64,
    body: Option<String>,
}

/// Pull request conversation comments through `gh api`.
pub struct GitHubHost {
    /// `owner/name`; `None` lets `gh` resolve the repository of the checkout.
    repo: Option<String>,
    pr: u64,
    client: Box<dyn CliClient>,
}

impl GitHubHost {
    pub fn new(repo: Option<String>, pr: u64) -> Self {
        Self {
            repo,
            pr,
            client: Box::new(CommandClient::new("gh")),
        }
    }

    #[cfg(test)]
    fn with_client(repo: Option<&str>, pr: u64, client: Box<dyn CliClient>) -> Self {
        Self {
            repo: repo.map(str::to_string),
            pr,
            client,
        }
    }

    fn repo_path(&self) -> String {
        match &self.repo {
            Some(repo) => format!("repos/{repo}"),
            None => "repos/{owner}/{repo}".to_string(),
        }
    }

    fn send_body(&self, method: &str, endpoint: &str, body: &str) -> Result<String> {
        let field = format!("body={body}");
        let args = ["api", "-X", method, endpoint, "-f", field.as_str()];
        // POST creates a new comment on every attempt.
        let json = if method == "POST" {
            self.client.run_once(&args)?
        } else {
            self.client.run(&args)?
        };
        let comment: GhComment = serde_json::from_str(&json)
            .map_err(|e| Error::Host(format!("failed to parse gh response: {e}")))?;
        Ok(comment.id.to_string())
    }
}

impl HostApi for GitHubHost {
    fn list_comments(&self) -> Result<Vec<Comment>> {
        let endpoint = format!("{}/issues/{}/comments", self.repo_path(), self.pr);
        let output = self.client.run(&[
            "api",
            "--paginate",
            &endpoint,
            "--jq",
            ".[] | {id, body}",
        ])?;

        let mut comments = Vec::new();
        for line in output.lines().filter(|l| !l.trim().is_empty()) {
            let gh: GhComment = serde_json::from_str(line)
                .map_err(|e| Error::Host(format!("failed to parse gh comment: {e}")))?;
            comments.push(Comment::new(gh.id.to_string(), gh.body.unwrap_or_default()));
        }
        debug!(count = comments.len(), pr = self.pr, "listed pull request comments");
        Ok(comments)
    }

    fn create_comment(&self, body: &str) -> Result<String> {
        let endpoint = format!("{}/issues/{}/comments", self.repo_path(), self.pr);
        self.send_body("POST", &endpoint, body)
    }

    fn update_comment(&self, id: &str, body: &str) -> Result<String> {
        let endpoint = format!("{}/issues/comments/{id}", self.repo_path());
        self.send_body("PATCH", &endpoint, body)
    }
}
