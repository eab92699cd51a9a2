use async_trait::async_trait;
use serde::Deserialize;
use serde_json::{json, Value};

use super::{remote_parts, GitProvider, ProviderKind, PullRequest, PullRequestDraft};
use crate::{credentials::Credentials, git::RepositoryIdentity, Error, Result};

const API_VERSION: &str = "7.0";

#[derive(Debug, Clone, Default)]
pub struct AzureProvider;

impl AzureProvider {
    pub fn new() -> Self {
        Self
    }
}

/// Organization, project and repository of an Azure DevOps remote.
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct AzureRepo {
    pub organization: String,
    pub project: String,
    pub repository: String,
}

impl AzureRepo {
    fn base(&self) -> String {
        format!("https://dev.azure.com/{}/{}", self.organization, self.project)
    }

    pub fn pull_requests_endpoint(&self) -> String {
        format!(
            "{}/_apis/git/repositories/{}/pullrequests?api-version={}",
            self.base(),
            self.repository,
            API_VERSION
        )
    }

    pub fn web_url(&self, id: u64) -> String {
        format!("{}/_git/{}/pullrequest/{}", self.base(), self.repository, id)
    }
}

/// Accepts `https://dev.azure.com/{org}/{project}/_git/{repo}`,
/// `https://{org}.visualstudio.com/{project}/_git/{repo}` and
/// `git@ssh.dev.azure.com:v3/{org}/{project}/{repo}`.
pub(crate) fn parse_remote(url: &str) -> Result<AzureRepo> {
    let invalid = || Error::InvalidRemoteUrl(url.trim().to_string());
    let (host, segs) = remote_parts(url).ok_or_else(invalid)?;
    let segs: Vec<&str> = segs.iter().map(String::as_str).collect();

    let (organization, project, repository) = match (host.as_str(), segs.as_slice()) {
        ("dev.azure.com", [org, project, "_git", repo]) => (*org, *project, *repo),
        ("ssh.dev.azure.com", ["v3", org, project, repo]) => (*org, *project, *repo),
        (h, [project, "_git", repo]) if h.ends_with(".visualstudio.com") => {
            let org = h.trim_end_matches(".visualstudio.com");
            (org, *project, *repo)
        }
        _ => return Err(invalid()),
    };

    Ok(AzureRepo {
        organization: organization.to_string(),
        project: project.to_string(),
        repository: repository.to_string(),
    })
}

fn request_body(draft: &PullRequestDraft) -> Value {
    json!({
        "sourceRefName": format!("refs/heads/{}", draft.source_branch),
        "targetRefName": format!("refs/heads/{}", draft.target_branch),
        "title": draft.title,
        "description": draft.description,
    })
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct CreatedPullRequest {
    pull_request_id: u64,
}

#[async_trait]
impl GitProvider for AzureProvider {
    fn kind(&self) -> ProviderKind {
        ProviderKind::Azure
    }

    async fn create_pull_request(
        &self,
        credentials: &Credentials,
        repo: &RepositoryIdentity,
        draft: &PullRequestDraft,
    ) -> Result<PullRequest> {
        let target = parse_remote(repo.url()).map_err(|e| e.into_provider(ProviderKind::Azure))?;
        let endpoint = target.pull_requests_endpoint();
        tracing::debug!(%endpoint, "creating Azure DevOps pull request");

        let response = reqwest::Client::new()
            .post(&endpoint)
            .basic_auth("", Some(&credentials.token))
            .json(&request_body(draft))
            .send()
            .await
            .map_err(|e| Error::provider(ProviderKind::Azure, e))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(Error::provider(ProviderKind::Azure, format!("HTTP {}: {}", status, body)));
        }

        let created: CreatedPullRequest = response
            .json()
            .await
            .map_err(|e| Error::provider(ProviderKind::Azure, e))?;

        Ok(PullRequest {
            id: created.pull_request_id,
            url: target.web_url(created.pull_request_id),
        })
    }
}
