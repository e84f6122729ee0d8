use crate::extract::escape_attr;
use crate::finding::Finding;

/// Produces the link placed in front of a finding that points at a file and
/// line. The result goes into a table cell as HTML. Implementations must be
/// pure: the same finding always renders the same link.
pub trait LinkRenderer {
    /// Returns an empty string when the finding has no location.
    fn render(&self, finding: &Finding) -> String;
}

impl<F> LinkRenderer for F
where
    F: Fn(&Finding) -> String,
{
    fn render(&self, finding: &Finding) -> String {
        self(finding)
    }
}

/// `file#Lline`, with no URL.
#[derive(Debug, Default, Clone, Copy)]
pub struct PlainLinks;

impl LinkRenderer for PlainLinks {
    fn render(&self, finding: &Finding) -> String {
        finding
            .location()
            .map(|(file, line)| escape_attr(&format!("{file}#L{line}")))
            .unwrap_or_default()
    }
}

/// Links into a GitHub repository's blob view at a fixed commit.
#[derive(Debug, Clone)]
pub struct GitHubLinks {
    pub repo_url: String,
    pub sha: String,
}

impl LinkRenderer for GitHubLinks {
    fn render(&self, finding: &Finding) -> String {
        blob_link(finding, &self.repo_url, "blob", &self.sha)
    }
}

/// Links into a GitLab project's blob view at a fixed commit.
#[derive(Debug, Clone)]
pub struct GitLabLinks {
    pub repo_url: String,
    pub sha: String,
}

impl LinkRenderer for GitLabLinks {
    fn render(&self, finding: &Finding) -> String {
        blob_link(finding, &self.repo_url, "-/blob", &self.sha)
    }
}

fn blob_link(finding: &Finding, repo_url: &str, blob: &str, sha: &str) -> String {
    let Some((file, line)) = finding.location() else {
        return String::new();
    };
    let repo_url = repo_url.trim_end_matches('/');
    let label = format!("{file}#L{line}");
    let href = format!("{repo_url}/{blob}/{sha}/{label}");
    format!(
        r#"<a href="{}">{}</a>"#,
        escape_attr(&href),
        escape_attr(&label)
    )
}

/// Pick the link style for a host variant. Without a repo URL and commit the
/// plain style is the only one that can be rendered.
pub fn for_host(host: &str, repo_url: Option<&str>, sha: Option<&str>) -> Box<dyn LinkRenderer> {
    match (host, repo_url, sha) {
        ("github", Some(url), Some(sha)) => Box::new(GitHubLinks {
            repo_url: url.to_string(),
            sha: sha.to_string(),
        }),
        ("gitlab", Some(url), Some(sha)) => Box::new(GitLabLinks {
            repo_url: url.to_string(),
            sha: sha.to_string(),
        }),
        _ => Box::new(PlainLinks),
    }
}
