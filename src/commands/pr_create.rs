use colored::Colorize;
use std::path::Path;

use crate::{
    credentials,
    git::{self, RepositoryIdentity},
    prompt::Prompter,
    providers::{self, GitProvider, ProviderKind, PullRequest, PullRequestDraft},
    resolver::SourceResolver,
    store::ConfigStore,
    Result,
};

#[derive(Debug, Clone, Default)]
pub struct PrCreateOptions {
    pub title: Option<String>,
    /// Target branch, bypassing resolution.
    pub target: Option<String>,
    pub description: Option<String>,
}

/// Everything needed to open the pull request, gathered before any network call.
#[derive(Debug, Clone)]
pub struct PreparedPullRequest {
    pub repo: RepositoryIdentity,
    pub provider: ProviderKind,
    pub draft: PullRequestDraft,
}

/// Resolve provider, target branch and texts for a pull request from the current branch.
pub fn prepare(
    root: &Path,
    store: &dyn ConfigStore,
    prompter: &dyn Prompter,
    opts: PrCreateOptions,
) -> Result<PreparedPullRequest> {
    let repo = git::repository_identity(root)?;
    let current = git::current_branch(root)?;
    let resolver = SourceResolver::new(store, Some(&repo));

    let target = match opts.target {
        Some(branch) => branch,
        None => resolver.resolve_source_branch(&current)?,
    };
    let provider = providers::resolve_provider_for_repository(store, prompter, &repo)?;

    let title = match opts.title {
        Some(title) => title,
        None => prompter.input(
            &format!("Pull request title (empty uses {})", current),
            true,
        )?,
    };
    let title = match title.trim() {
        "" => current.clone(),
        t => t.to_string(),
    };
    let description = match opts.description {
        Some(d) => d,
        None => prompter.input("Description (optional)", true)?,
    };

    Ok(PreparedPullRequest {
        repo,
        provider,
        draft: PullRequestDraft {
            source_branch: current,
            target_branch: target,
            title,
            description,
        },
    })
}

/// Entry point for `branchflow pr-create`.
pub async fn run(
    root: &Path,
    store: &dyn ConfigStore,
    prompter: &dyn Prompter,
    opts: PrCreateOptions,
) -> Result<PullRequest> {
    git::check_installation()?;
    let prepared = prepare(root, store, prompter, opts)?;
    let provider = providers::get_provider(prepared.provider.as_str())?;
    let credentials = credentials::resolve(prepared.provider, store, prompter)?;

    let pb = super::spinner();
    pb.set_message(format!(
        "Creating pull request {} → {} on {}...",
        prepared.draft.source_branch, prepared.draft.target_branch, prepared.provider
    ));
    let result = provider
        .create_pull_request(&credentials, &prepared.repo, &prepared.draft)
        .await;
    pb.finish_and_clear();
    let pr = result?;

    println!(
        "{} Created pull request #{} {}",
        "✓".green().bold(),
        pr.id.to_string().yellow(),
        pr.url.dimmed()
    );
    Ok(pr)
}
