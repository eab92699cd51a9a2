//! Temporary repositories shaped like a branchflow project: a work tree with
//! `master` and `develop`, both pushed to a bare `origin`.

#![allow(dead_code)]

use std::fs;
use std::path::{Path, PathBuf};
use std::process::Command as StdCommand;
use tempfile::TempDir;

pub fn git(root: &Path, args: &[&str]) -> String {
    let out = StdCommand::new("git").args(args).current_dir(root).output().unwrap();
    assert!(
        out.status.success(),
        "git {:?} failed: {}",
        args,
        String::from_utf8_lossy(&out.stderr)
    );
    String::from_utf8_lossy(&out.stdout).trim().to_string()
}

pub fn commit_file(root: &Path, name: &str, contents: &str) {
    fs::write(root.join(name), contents).unwrap();
    git(root, &["add", "."]);
    git(root, &["commit", "-m", &format!("add {name}")]);
}

/// Work tree checked out on `develop`, which is one commit ahead of `master`.
pub fn make_workflow_repo() -> (TempDir, PathBuf) {
    let dir = TempDir::new().unwrap();
    let root = dir.path().join("work");
    let origin = dir.path().join("origin.git");
    fs::create_dir_all(&root).unwrap();

    StdCommand::new("git")
        .args(["init", "--bare", "-b", "master", origin.to_str().unwrap()])
        .output()
        .unwrap();

    git(&root, &["init", "-b", "master"]);
    git(&root, &["config", "user.email", "test@example.com"]);
    git(&root, &["config", "user.name", "Test"]);
    git(&root, &["remote", "add", "origin", origin.to_str().unwrap()]);

    commit_file(&root, "README.md", "hello");
    git(&root, &["push", "-u", "origin", "master"]);

    git(&root, &["checkout", "-b", "develop"]);
    commit_file(&root, "develop.txt", "in progress");
    git(&root, &["push", "-u", "origin", "develop"]);

    (dir, root)
}

/// Work tree with no remote at all, checked out on `branch`.
pub fn make_bare_work_tree(branch: &str) -> (TempDir, PathBuf) {
    let dir = TempDir::new().unwrap();
    let root = dir.path().to_path_buf();
    git(&root, &["init", "-b", "master"]);
    git(&root, &["config", "user.email", "test@example.com"]);
    git(&root, &["config", "user.name", "Test"]);
    commit_file(&root, "README.md", "hello");
    if branch != "master" {
        git(&root, &["checkout", "-b", branch]);
    }
    (dir, root)
}

pub fn current_branch(root: &Path) -> String {
    git(root, &["rev-parse", "--abbrev-ref", "HEAD"])
}
