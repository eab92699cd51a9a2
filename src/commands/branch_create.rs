use colored::Colorize;
use std::path::Path;

use crate::{
    branch::{compose_branch_name, BranchKind, Role},
    git,
    prompt::Prompter,
    resolver::SourceResolver,
    store::ConfigStore,
    Error, Result,
};

#[derive(Debug, Clone, Default)]
pub struct BranchCreateOptions {
    /// Issue id from the command line; prompted for when absent.
    pub issue_id: Option<String>,
    /// Explicit source branch, bypassing resolution.
    pub from: Option<String>,
    pub push: bool,
    pub kind: Option<BranchKind>,
    pub description: Option<String>,
}

/// What the new branch is called, before anything touches git.
#[derive(Debug, Clone, PartialEq)]
pub struct BranchAnswers {
    pub kind: BranchKind,
    pub issue_id: String,
    pub description: String,
}

impl BranchAnswers {
    pub fn branch_name(&self) -> String {
        compose_branch_name(self.kind, &self.issue_id, &self.description)
    }
}

/// Fill in whatever the options left open by asking.
pub fn collect_answers(opts: &BranchCreateOptions, prompter: &dyn Prompter) -> Result<BranchAnswers> {
    let kind = match opts.kind {
        Some(kind) => kind,
        None => {
            let labels: Vec<&str> = BranchKind::ALL.iter().map(|k| k.as_str()).collect();
            let index = prompter.select("Select the branch type:", &labels)?;
            BranchKind::ALL[index.min(BranchKind::ALL.len() - 1)]
        }
    };

    let issue_id = match opts.issue_id.as_deref().map(str::trim).filter(|s| !s.is_empty()) {
        Some(id) => id.to_string(),
        None => prompter
            .input("Enter the issue ID: e.g. CJP-100, CORN-2000 or GIS-205", false)?
            .trim()
            .to_string(),
    };

    let description = match &opts.description {
        Some(d) => d.clone(),
        None => prompter.input(
            "Enter a description for the branch. If empty none description text will be appended to branch name",
            true,
        )?,
    };

    Ok(BranchAnswers {
        kind,
        issue_id,
        description,
    })
}

/// Create the branch described by `answers` in the repository at `root`.
///
/// Order: resolve source → check existence → update source → create →
/// merge develop (release only) → push (optional). Nothing is rolled back if
/// a later step fails.
pub fn execute(
    root: &Path,
    store: &dyn ConfigStore,
    answers: &BranchAnswers,
    from: Option<&str>,
    push: bool,
) -> Result<String> {
    let new_branch = answers.branch_name();
    let repo = git::repository_identity(root).ok();
    let resolver = SourceResolver::new(store, repo.as_ref());

    let source = match from {
        Some(branch) => branch.to_string(),
        None => resolver.resolve_source_branch(&new_branch)?,
    };
    let current = git::current_branch(root)?;
    tracing::debug!(%new_branch, %source, %current, "branch-create");

    let pb = super::spinner();

    pb.set_message("Checking existing branches...");
    if git::local_branch_exists(root, &new_branch)? {
        return Err(Error::BranchExists {
            branch: new_branch,
            remote: false,
        });
    }
    if git::remote_branch_exists(root, &new_branch)? {
        return Err(Error::BranchExists {
            branch: new_branch,
            remote: true,
        });
    }

    pb.set_message(format!("Pulling most recent changes from branch {}...", source));
    if current == source {
        git::pull(root)?;
    } else {
        git::fetch_into(root, &source)?;
    }

    pb.set_message("Creating new branch...");
    git::create_branch(root, &new_branch, &source)?;

    if answers.kind == BranchKind::Release {
        let develop = resolver.effective_role_branch(Role::Develop)?;
        pb.set_message(format!("Merging most recent changes from {}...", develop));
        if current != develop {
            git::fetch_into(root, &develop)?;
        }
        git::merge(root, &develop)?;
    }

    if push {
        pb.set_message("Pushing branch to remote...");
        git::push_upstream(root, &new_branch)?;
    }

    pb.finish_and_clear();
    println!(
        "{} Created and changed to branch {} (from {})",
        "✓".green().bold(),
        new_branch.bold(),
        source.cyan()
    );
    Ok(new_branch)
}

/// Entry point for `branchflow branch-create`.
pub fn run(
    root: &Path,
    store: &dyn ConfigStore,
    prompter: &dyn Prompter,
    opts: BranchCreateOptions,
) -> Result<String> {
    git::check_installation()?;
    let answers = collect_answers(&opts, prompter)?;
    execute(root, store, &answers, opts.from.as_deref(), opts.push)
}
