use serde::Deserialize;
use tracing::debug;

use crate::error::{Error, Result};
use crate::identity::Comment;

use super::{CliClient, CommandClient, HostApi};

const NOTES_PER_PAGE: u32 = 100;

#[derive(Debug, Deserialize)]
struct GlabNote {
    id: u64,
    #[serde(default)]
    body: String,
    #[serde(default)]
    system: bool,
}

/// Merge request notes through `glab api`.
pub struct GitLabHost {
    /// Project path such as `group/project`; `None` lets `glab` resolve it.
    project: Option<String>,
    iid: u64,
    client: Box<dyn CliClient>,
}

impl GitLabHost {
    pub fn new(project: Option<String>, iid: u64) -> Self {
        Self {
            project,
            iid,
            client: Box::new(CommandClient::new("glab")),
        }
    }

    #[cfg(test)]
    fn with_client(project: Option<&str>, iid: u64, client: Box<dyn CliClient>) -> Self {
        Self {
            project: project.map(str::to_string),
            iid,
            client,
        }
    }

    fn notes_path(&self) -> String {
        let project = match &self.project {
            Some(path) => path.replace('/', "%2F"),
            None => ":id".to_string(),
        };
        format!("projects/{project}/merge_requests/{}/notes", self.iid)
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
        let note: GlabNote = serde_json::from_str(&json)
            .map_err(|e| Error::Host(format!("failed to parse glab response: {e}")))?;
        Ok(note.id.to_string())
    }
}

impl HostApi for GitLabHost {
    fn list_comments(&self) -> Result<Vec<Comment>> {
        let endpoint = format!("{}?per_page={NOTES_PER_PAGE}", self.notes_path());
        let json = self.client.run(&["api", "--paginate", &endpoint])?;

        // `--paginate` prints one JSON array per page, back to back.
        let mut comments = Vec::new();
        for page in serde_json::Deserializer::from_str(&json).into_iter::<Vec<GlabNote>>() {
            let page = page.map_err(|e| Error::Host(format!("failed to parse glab notes: {e}")))?;
            comments.extend(
                page.into_iter()
                    .filter(|n| !n.system)
                    .map(|n| Comment::new(n.id.to_string(), n.body)),
            );
        }
        debug!(count = comments.len(), iid = self.iid, "listed merge request notes");
        Ok(comments)
    }

    fn create_comment(&self, body: &str) -> Result<String> {
        self.send_body("POST", &self.notes_path(), body)
    }

    fn update_comment(&self, id: &str, body: &str) -> Result<String> {
        let endpoint = format!("{}/{id}", self.notes_path());
        self.send_body("PUT", &endpoint, body)
    }
}
