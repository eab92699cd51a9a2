use async_trait::async_trait;
use serde::Deserialize;
use serde_json::{json, Value};

use super::{remote_parts, GitProvider, ProviderKind, PullRequest, PullRequestDraft};
use crate::{credentials::Credentials, git::RepositoryIdentity, Error, Result};

const API_BASE: &str = "https://api.bitbucket.org/2.0";

#[derive(Debug, Clone, Default)]
pub struct BitbucketProvider;

impl BitbucketProvider {
    pub fn new() -> Self {
        Self
    }
}

/// `(workspace, repo_slug)` from a Bitbucket Cloud remote.
pub(crate) fn parse_workspace_repo(url: &str) -> Result<(String, String)> {
    match remote_parts(url) {
        Some((host, segments)) if host.ends_with("bitbucket.org") && segments.len() == 2 => {
            Ok((segments[0].clone(), segments[1].clone()))
        }
        _ => Err(Error::InvalidRemoteUrl(url.trim().to_string())),
    }
}

fn request_body(draft: &PullRequestDraft) -> Value {
    json!({
        "title": draft.title,
        "description": draft.description,
        "source": { "branch": { "name": draft.source_branch } },
        "destination": { "branch": { "name": draft.target_branch } },
    })
}

#[derive(Debug, Deserialize)]
struct Href {
    href: String,
}

#[derive(Debug, Deserialize)]
struct Links {
    html: Option<Href>,
}

#[derive(Debug, Deserialize)]
struct CreatedPullRequest {
    id: u64,
    links: Option<Links>,
}

#[async_trait]
impl GitProvider for BitbucketProvider {
    fn kind(&self) -> ProviderKind {
        ProviderKind::Bitbucket
    }

    async fn create_pull_request(
        &self,
        credentials: &Credentials,
        repo: &RepositoryIdentity,
        draft: &PullRequestDraft,
    ) -> Result<PullRequest> {
        let (workspace, slug) =
            parse_workspace_repo(repo.url()).map_err(|e| e.into_provider(ProviderKind::Bitbucket))?;
        let username = credentials.username.as_deref().ok_or_else(|| {
            Error::MissingCredentials {
                provider: ProviderKind::Bitbucket,
                what: "username",
            }
            .into_provider(ProviderKind::Bitbucket)
        })?;
        let endpoint = format!("{}/repositories/{}/{}/pullrequests", API_BASE, workspace, slug);
        tracing::debug!(%endpoint, "creating Bitbucket pull request");

        let response = reqwest::Client::new()
            .post(&endpoint)
            .basic_auth(username, Some(&credentials.token))
            .json(&request_body(draft))
            .send()
            .await
            .map_err(|e| Error::provider(ProviderKind::Bitbucket, e))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(Error::provider(ProviderKind::Bitbucket, format!("HTTP {}: {}", status, body)));
        }

        let created: CreatedPullRequest = response
            .json()
            .await
            .map_err(|e| Error::provider(ProviderKind::Bitbucket, e))?;

        let url = created
            .links
            .and_then(|l| l.html)
            .map(|h| h.href)
            .unwrap_or_else(|| format!("https://bitbucket.org/{}/{}/pull-requests/{}", workspace, slug, created.id));

        Ok(PullRequest { id: created.id, url })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_https_remote_with_user() {
        let (ws, slug) = parse_workspace_repo("https://jdoe@bitbucket.org/team/app.git").unwrap();
        assert_eq!(ws, "team");
        assert_eq!(slug, "app");
    }

    #[test]
    fn test_parse_ssh_remote() {
        let (ws, slug) = parse_workspace_repo("git@bitbucket.org:team/app.git").unwrap();
        assert_eq!(ws, "team");
        assert_eq!(slug, "app");
    }

    #[test]
    fn test_parse_rejects_other_hosts() {
        assert!(parse_workspace_repo("git@github.com:team/app.git").is_err());
    }

    #[test]
    fn test_request_body_shape() {
        let draft = PullRequestDraft {
            source_branch: "hotfix/1.0.1".to_string(),
            target_branch: "master".to_string(),
            title: "Hotfix 1.0.1".to_string(),
            description: String::new(),
        };
        let body = request_body(&draft);
        assert_eq!(body["source"]["branch"]["name"], "hotfix/1.0.1");
        assert_eq!(body["destination"]["branch"]["name"], "master");
    }

    #[test]
    fn test_created_pull_request_link_is_optional() {
        let created: CreatedPullRequest = serde_json::from_str(r#"{"id": 7}"#).unwrap();
        assert_eq!(created.id, 7);
        assert!(created.links.is_none());
    }

    #[tokio::test]
    async fn test_missing_username_is_reported_before_any_request() {
        let creds = Credentials {
            username: None,
            token: "secret".to_string(),
        };
        let repo = RepositoryIdentity::new("git@bitbucket.org:team/app.git");
        let draft = PullRequestDraft {
            source_branch: "feature/x".to_string(),
            target_branch: "develop".to_string(),
            title: "x".to_string(),
            description: String::new(),
        };
        let err = BitbucketProvider::new()
            .create_pull_request(&creds, &repo, &draft)
            .await
            .unwrap_err();
        match err {
            Error::ProviderOperationFailed { provider, source } => {
                assert_eq!(provider, ProviderKind::Bitbucket);
                assert!(matches!(
                    source.downcast_ref::<Error>(),
                    Some(Error::MissingCredentials { what: "username", .. })
                ));
            }
            other => panic!("expected ProviderOperationFailed, got {other:?}"),
        }
    }
}
