//! Git hosting providers behind one capability interface.
//!
//! Supports GitHub, Azure DevOps and Bitbucket Cloud. Which one a repository
//! uses is detected once from its remote URL, confirmed by the user, and
//! cached under `git.repo.<escaped remote url>.server`.

mod azure;
mod bitbucket;
mod github;

pub use azure::AzureProvider;
pub use bitbucket::BitbucketProvider;
pub use github::GithubProvider;

use async_trait::async_trait;
use colored::Colorize;
use serde_json::Value;
use std::fmt;

use crate::{
    credentials::Credentials, git::RepositoryIdentity, prompt::Prompter, store::ConfigStore,
    Error, Result,
};

/// Supported hosting services.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ProviderKind {
    Github,
    Azure,
    Bitbucket,
}

impl ProviderKind {
    /// Detection and selection order.
    pub const ALL: [ProviderKind; 3] = [ProviderKind::Github, ProviderKind::Azure, ProviderKind::Bitbucket];

    pub fn as_str(self) -> &'static str {
        match self {
            ProviderKind::Github => "github",
            ProviderKind::Azure => "azure",
            ProviderKind::Bitbucket => "bitbucket",
        }
    }

    /// Substring of a remote URL that suggests this provider.
    pub fn host_marker(self) -> &'static str {
        match self {
            ProviderKind::Github => "github.com",
            ProviderKind::Azure => "azure.com",
            ProviderKind::Bitbucket => "bitbucket.org",
        }
    }
}

impl fmt::Display for ProviderKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for ProviderKind {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        ProviderKind::ALL
            .into_iter()
            .find(|k| k.as_str() == s)
            .ok_or_else(|| Error::UnknownProvider(s.to_string()))
    }
}

/// What to open a pull/merge request for.
#[derive(Debug, Clone, PartialEq)]
pub struct PullRequestDraft {
    pub source_branch: String,
    pub target_branch: String,
    pub title: String,
    pub description: String,
}

/// A created pull/merge request.
#[derive(Debug, Clone, PartialEq)]
pub struct PullRequest {
    pub id: u64,
    pub url: String,
}

/// Capabilities every provider exposes with the same shape.
#[async_trait]
pub trait GitProvider: Send + Sync {
    fn kind(&self) -> ProviderKind;

    /// Open a pull request (merge request) for `draft` on the repository behind `repo`.
    async fn create_pull_request(
        &self,
        credentials: &Credentials,
        repo: &RepositoryIdentity,
        draft: &PullRequestDraft,
    ) -> Result<PullRequest>;
}

/// Closed set of provider implementations.
#[derive(Debug, Clone)]
pub enum Provider {
    Github(GithubProvider),
    Azure(AzureProvider),
    Bitbucket(BitbucketProvider),
}

impl Provider {
    pub fn new(kind: ProviderKind) -> Self {
        match kind {
            ProviderKind::Github => Provider::Github(GithubProvider::new()),
            ProviderKind::Azure => Provider::Azure(AzureProvider::new()),
            ProviderKind::Bitbucket => Provider::Bitbucket(BitbucketProvider::new()),
        }
    }
}

#[async_trait]
impl GitProvider for Provider {
    fn kind(&self) -> ProviderKind {
        match self {
            Provider::Github(p) => p.kind(),
            Provider::Azure(p) => p.kind(),
            Provider::Bitbucket(p) => p.kind(),
        }
    }

    async fn create_pull_request(
        &self,
        credentials: &Credentials,
        repo: &RepositoryIdentity,
        draft: &PullRequestDraft,
    ) -> Result<PullRequest> {
        let result = match self {
            Provider::Github(p) => p.create_pull_request(credentials, repo, draft).await,
            Provider::Azure(p) => p.create_pull_request(credentials, repo, draft).await,
            Provider::Bitbucket(p) => p.create_pull_request(credentials, repo, draft).await,
        };
        result.map_err(|e| e.into_provider(self.kind()))
    }
}

/// Fresh implementation for `identifier` (`github`, `azure` or `bitbucket`).
pub fn get_provider(identifier: &str) -> Result<Provider> {
    identifier.parse::<ProviderKind>().map(Provider::new)
}

/// Guess the provider from `remote_url` and have the user confirm it; fall
/// back to an explicit choice when nothing matches or the guess is rejected.
pub fn detect_provider(remote_url: &str, prompter: &dyn Prompter) -> Result<ProviderKind> {
    let detected = ProviderKind::ALL
        .into_iter()
        .filter(|kind| remote_url.contains(kind.host_marker()))
        .last();
    tracing::debug!(remote_url, ?detected, "provider detection");

    match detected {
        Some(kind) => {
            let question = format!(
                "Looks like this is repository from {}. Is this correct?",
                kind.as_str().bright_blue()
            );
            if prompter.confirm(&question, false)? {
                return Ok(kind);
            }
        }
        None => tracing::warn!(remote_url, "not able to detect git server"),
    }

    let labels: Vec<&str> = ProviderKind::ALL.iter().map(|k| k.as_str()).collect();
    let index = prompter.select("Which git server uses this repository?", &labels)?;
    ProviderKind::ALL
        .get(index)
        .copied()
        .ok_or_else(|| Error::UnknownProvider(index.to_string()))
}

pub fn server_key(repo: &RepositoryIdentity) -> String {
    format!("git.repo.{}.server", repo.key_segment())
}

/// Cached provider for `repo`, detecting (and persisting) it on first use.
pub fn resolve_provider_for_repository(
    store: &dyn ConfigStore,
    prompter: &dyn Prompter,
    repo: &RepositoryIdentity,
) -> Result<ProviderKind> {
    let key = server_key(repo);
    if let Some(cached) = store.get_str(&key)? {
        match cached.parse::<ProviderKind>() {
            Ok(kind) => return Ok(kind),
            Err(_) => tracing::warn!(%repo, value = %cached, "ignoring invalid cached provider"),
        }
    }

    let kind = detect_provider(repo.url(), prompter)?;
    store.set(&key, Value::String(kind.as_str().to_string()))?;
    tracing::debug!(%repo, provider = %kind, "provider binding saved");
    Ok(kind)
}

/// Host and path segments of an HTTPS, `ssh://` or scp-style (`git@host:path`)
/// remote, with a trailing `.git` removed from the last segment.
pub(crate) fn remote_parts(remote_url: &str) -> Option<(String, Vec<String>)> {
    let trimmed = remote_url.trim().trim_end_matches('/');

    let (host, path) = if trimmed.contains("://") {
        let parsed = url::Url::parse(trimmed).ok()?;
        let host = parsed.host_str()?.to_string();
        let segments: Vec<String> = parsed.path_segments()?.map(str::to_string).collect();
        (host, segments)
    } else {
        let (left, right) = trimmed.split_once(':')?;
        let host = left.rsplit('@').next()?.to_string();
        (host, right.split('/').map(str::to_string).collect())
    };

    let mut segments: Vec<String> = path.into_iter().filter(|s| !s.is_empty()).collect();
    if let Some(last) = segments.last_mut() {
        if let Some(stripped) = last.strip_suffix(".git") {
            *last = stripped.to_string();
        }
    }
    if host.is_empty() || segments.is_empty() {
        return None;
    }
    Some((host, segments))
}
