use async_trait::async_trait;
use octocrab::Octocrab;

use super::{remote_parts, GitProvider, ProviderKind, PullRequest, PullRequestDraft};
use crate::{credentials::Credentials, git::RepositoryIdentity, Error, Result};

#[derive(Debug, Clone, Default)]
pub struct GithubProvider;

impl GithubProvider {
    pub fn new() -> Self {
        Self
    }
}

/// Build an authenticated Octocrab client.
pub fn client(token: &str) -> Result<Octocrab> {
    Octocrab::builder()
        .personal_token(token.to_string())
        .build()
        .map_err(|e| Error::provider(ProviderKind::Github, e))
}

/// `(owner, repo)` from an HTTPS or SSH GitHub remote.
pub(crate) fn parse_owner_repo(url: &str) -> Result<(String, String)> {
    match remote_parts(url) {
        Some((host, segments)) if host.ends_with("github.com") && segments.len() == 2 => {
            Ok((segments[0].clone(), segments[1].clone()))
        }
        _ => Err(Error::InvalidRemoteUrl(url.trim().to_string())),
    }
}

#[async_trait]
impl GitProvider for GithubProvider {
    fn kind(&self) -> ProviderKind {
        ProviderKind::Github
    }

    async fn create_pull_request(
        &self,
        credentials: &Credentials,
        repo: &RepositoryIdentity,
        draft: &PullRequestDraft,
    ) -> Result<PullRequest> {
        let (owner, name) =
            parse_owner_repo(repo.url()).map_err(|e| e.into_provider(ProviderKind::Github))?;
        let gh = client(&credentials.token)?;

        tracing::debug!(%owner, repo = %name, head = %draft.source_branch, base = %draft.target_branch, "creating GitHub PR");
        let pr = gh
            .pulls(&owner, &name)
            .create(&draft.title, &draft.source_branch, &draft.target_branch)
            .body(&draft.description)
            .send()
            .await
            .map_err(|e| Error::provider(ProviderKind::Github, e))?;

        let number = pr.number;
        let url = pr
            .html_url
            .map(|u| u.to_string())
            .unwrap_or_else(|| format!("https://github.com/{}/{}/pull/{}", owner, name, number));

        Ok(PullRequest { id: number, url })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_https_with_git_suffix() {
        let (owner, repo) = parse_owner_repo("https://github.com/acme/myrepo.git").unwrap();
        assert_eq!(owner, "acme");
        assert_eq!(repo, "myrepo");
    }

    #[test]
    fn test_parse_ssh_with_trailing_newline() {
        let (owner, repo) = parse_owner_repo("git@github.com:acme/myrepo.git\n").unwrap();
        assert_eq!(owner, "acme");
        assert_eq!(repo, "myrepo");
    }

    #[test]
    fn test_parse_ssh_scheme_url() {
        let (owner, repo) = parse_owner_repo("ssh://git@github.com/acme/myrepo").unwrap();
        assert_eq!(owner, "acme");
        assert_eq!(repo, "myrepo");
    }

    #[test]
    fn test_parse_url_with_hyphens_and_dots_in_names() {
        let (owner, repo) = parse_owner_repo("https://github.com/my-org/my.repo_name.git").unwrap();
        assert_eq!(owner, "my-org");
        assert_eq!(repo, "my.repo_name");
    }

    #[test]
    fn test_parse_non_github_url_returns_error() {
        let result = parse_owner_repo("https://gitlab.com/acme/myrepo.git");
        assert!(matches!(result, Err(Error::InvalidRemoteUrl(_))));
    }

    #[test]
    fn test_parse_owner_only_url_returns_error() {
        assert!(parse_owner_repo("https://github.com/acme").is_err());
    }

    #[tokio::test]
    async fn test_foreign_remote_fails_as_provider_error() {
        let creds = Credentials {
            username: None,
            token: "secret".to_string(),
        };
        let repo = RepositoryIdentity::new("https://gitlab.com/acme/myrepo.git");
        let draft = PullRequestDraft {
            source_branch: "feature/x".to_string(),
            target_branch: "develop".to_string(),
            title: "x".to_string(),
            description: String::new(),
        };
        let err = crate::providers::get_provider("github")
            .unwrap()
            .create_pull_request(&creds, &repo, &draft)
            .await
            .unwrap_err();
        match err {
            Error::ProviderOperationFailed { provider, source } => {
                assert_eq!(provider, ProviderKind::Github);
                assert!(matches!(source.downcast_ref::<Error>(), Some(Error::InvalidRemoteUrl(_))));
            }
            other => panic!("expected ProviderOperationFailed, got {other:?}"),
        }
    }
}
