use colored::Colorize;
use std::path::Path;

use crate::{branch::Role, git, resolver::SourceResolver, store::ConfigStore, Error, Result};

#[derive(Debug, Clone, Default)]
pub struct BranchSyncOptions {
    /// Explicit branch to pull from, bypassing resolution.
    pub from: Option<String>,
    pub rebase: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub enum SyncOutcome {
    /// The current branch is master or develop; nothing was pulled.
    Skipped { branch: String },
    Synced { branch: String, source: String },
}

/// Entry point for `branchflow branch-sync`: pull the resolved source branch
/// into the current branch.
pub fn run(root: &Path, store: &dyn ConfigStore, opts: BranchSyncOptions) -> Result<SyncOutcome> {
    git::check_installation()?;

    let current = git::current_branch(root)?;
    let repo = git::repository_identity(root).ok();
    let resolver = SourceResolver::new(store, repo.as_ref());

    let source = match opts.from {
        Some(branch) => branch,
        None => resolver.resolve_source_branch(&current)?,
    };

    let master = resolver.effective_role_branch(Role::Master)?;
    let develop = resolver.effective_role_branch(Role::Develop)?;
    if current == master || current == develop {
        println!(
            "{} You are in a source branch: {}. Doing nothing.",
            "!".yellow().bold(),
            current.bold().underline()
        );
        return Ok(SyncOutcome::Skipped { branch: current });
    }

    println!(
        "{} Syncing {} with {}{}",
        "→".blue().bold(),
        current.cyan(),
        source.cyan(),
        if opts.rebase { " (rebase)" } else { "" }
    );

    let code = git::pull_from(root, &source, opts.rebase)?;
    if code != 0 {
        let mut command = format!("git pull origin {} --ff", source);
        if opts.rebase {
            command.push_str(" --rebase");
        }
        return Err(Error::CommandFailed {
            command,
            code,
            stderr: String::new(),
        });
    }

    println!("{} {} is up to date with {}.", "✓".green().bold(), current.cyan(), source.cyan());
    Ok(SyncOutcome::Synced {
        branch: current,
        source,
    })
}
