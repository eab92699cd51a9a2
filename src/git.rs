use git2::Repository;
use std::fmt;
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};

use crate::{store::escape_segment, Error, Result};

/// Exit code and captured output of a git invocation.
#[derive(Debug, Clone)]
pub struct CommandOutput {
    pub code: i32,
    pub stdout: String,
    pub stderr: String,
}

impl CommandOutput {
    pub fn success(&self) -> bool {
        self.code == 0
    }
}

fn describe(args: &[&str]) -> String {
    format!("git {}", args.join(" "))
}

fn git(root: &Path) -> Command {
    let mut cmd = Command::new("git");
    cmd.arg("-C").arg(root);
    cmd
}

/// Run git in `root`, capturing output. A nonzero exit is not an error here.
pub fn exec(root: &Path, args: &[&str]) -> Result<CommandOutput> {
    tracing::debug!(command = %describe(args), root = %root.display(), "running");
    let output = git(root).args(args).output()?;
    let result = CommandOutput {
        code: output.status.code().unwrap_or(-1),
        stdout: String::from_utf8_lossy(&output.stdout).to_string(),
        stderr: String::from_utf8_lossy(&output.stderr).to_string(),
    };
    tracing::debug!(code = result.code, "finished");
    Ok(result)
}

/// Like [`exec`], but a nonzero exit becomes [`Error::CommandFailed`].
pub fn exec_checked(root: &Path, args: &[&str]) -> Result<CommandOutput> {
    let output = exec(root, args)?;
    if !output.success() {
        return Err(Error::CommandFailed {
            command: describe(args),
            code: output.code,
            stderr: output.stderr.trim().to_string(),
        });
    }
    Ok(output)
}

/// Run git with the terminal attached (progress and prompts visible). Returns the exit code.
pub fn exec_attached(root: &Path, args: &[&str]) -> Result<i32> {
    tracing::debug!(command = %describe(args), root = %root.display(), "running attached");
    let status = git(root)
        .args(args)
        .stdin(Stdio::inherit())
        .stdout(Stdio::inherit())
        .stderr(Stdio::inherit())
        .status()?;
    Ok(status.code().unwrap_or(-1))
}

/// Fail with [`Error::GitNotInstalled`] unless `git --version` runs.
pub fn check_installation() -> Result<()> {
    match Command::new("git").arg("--version").output() {
        Ok(out) if out.status.success() => Ok(()),
        _ => Err(Error::GitNotInstalled),
    }
}

/// Find the git repository root from the current directory.
pub fn repo_root() -> Result<PathBuf> {
    let repo = Repository::discover(".").map_err(|_| Error::NotAGitRepository)?;
    let workdir = repo.workdir().ok_or(Error::NotAGitRepository)?;
    Ok(workdir.to_path_buf())
}

/// Name of the checked-out branch, as `git branch --show-current` reports it:
/// the branch HEAD points at even before its first commit, empty when detached.
pub fn current_branch(root: &Path) -> Result<String> {
    let repo = Repository::open(root)?;
    if repo.head_detached()? {
        return Ok(String::new());
    }
    let head = repo.find_reference("HEAD")?;
    Ok(head
        .symbolic_target()
        .and_then(|target| target.strip_prefix("refs/heads/"))
        .unwrap_or_default()
        .to_string())
}

/// `remote.origin.url`, trimmed.
pub fn remote_url(root: &Path) -> Result<String> {
    let out = exec(root, &["config", "--get", "remote.origin.url"])?;
    let url = out.stdout.trim();
    if !out.success() || url.is_empty() {
        return Err(Error::NotAGitRepository);
    }
    Ok(url.to_string())
}

pub fn repository_identity(root: &Path) -> Result<RepositoryIdentity> {
    remote_url(root).map(RepositoryIdentity::new)
}

/// True when `branch` exists locally or is the checked-out branch.
pub fn local_branch_exists(root: &Path, branch: &str) -> Result<bool> {
    let out = exec_checked(root, &["branch", "--list", "--format=%(refname:short)", branch])?;
    if out.stdout.lines().any(|l| l.trim() == branch) {
        return Ok(true);
    }
    Ok(current_branch(root).map(|c| c == branch).unwrap_or(false))
}

pub fn remote_branch_exists(root: &Path, branch: &str) -> Result<bool> {
    let out = exec_checked(root, &["ls-remote", "--heads", "origin", branch])?;
    Ok(!out.stdout.trim().is_empty())
}

/// `git pull` on the current branch.
pub fn pull(root: &Path) -> Result<()> {
    exec_checked(root, &["pull"]).map(|_| ())
}

/// Fast-forward local `branch` to `origin/branch` without checking it out.
pub fn fetch_into(root: &Path, branch: &str) -> Result<()> {
    let refspec = format!("{}:{}", branch, branch);
    exec_checked(root, &["fetch", "origin", &refspec]).map(|_| ())
}

/// Create `branch_name` at `base_ref` and check it out.
pub fn create_branch(root: &Path, branch_name: &str, base_ref: &str) -> Result<()> {
    exec_checked(root, &["checkout", "-b", branch_name, base_ref]).map(|_| ())
}

pub fn merge(root: &Path, branch: &str) -> Result<()> {
    exec_checked(root, &["merge", branch]).map(|_| ())
}

pub fn push_upstream(root: &Path, branch: &str) -> Result<()> {
    exec_checked(root, &["push", "--set-upstream", "origin", branch]).map(|_| ())
}

/// `git pull origin <source> --ff [--rebase]`, attached to the terminal.
pub fn pull_from(root: &Path, source: &str, rebase: bool) -> Result<i32> {
    let mut args = vec!["pull", "origin", source, "--ff"];
    if rebase {
        args.push("--rebase");
    }
    exec_attached(root, &args)
}

/// Stable identity of a repository: its origin URL. Every clone of the same
/// remote shares the same stored settings.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct RepositoryIdentity {
    url: String,
}

impl RepositoryIdentity {
    pub fn new(url: impl AsRef<str>) -> Self {
        Self {
            url: url.as_ref().trim().to_string(),
        }
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    /// The URL with dots escaped, usable as one config key segment.
    pub fn key_segment(&self) -> String {
        escape_segment(&self.url)
    }
}

impl fmt::Display for RepositoryIdentity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.url)
    }
}
