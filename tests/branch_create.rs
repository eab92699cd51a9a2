//! `branch-create` against a real repository with a bare origin.

mod common;

use branchflow::{
    branch::BranchKind,
    commands::branch_create::{execute, BranchAnswers},
    git,
    resolver::repo_roles_key,
    store::{ConfigStore, MemoryStore},
    Error,
};
use common::{current_branch, git as run_git, make_workflow_repo};
use serde_json::json;

fn answers(kind: BranchKind, issue_id: &str, description: &str) -> BranchAnswers {
    BranchAnswers {
        kind,
        issue_id: issue_id.to_string(),
        description: description.to_string(),
    }
}

// ── source selection ──────────────────────────────────────────────────────────

#[test]
fn test_feature_branch_starts_from_develop() {
    let (dir, root) = make_workflow_repo();
    let _keep = dir;
    let store = MemoryStore::new();

    let name = execute(&root, &store, &answers(BranchKind::Feature, "CJP-100", "Login page"), None, false).unwrap();

    assert_eq!(name, "feature/CJP-100-login_page");
    assert_eq!(current_branch(&root), name);
    assert!(root.join("develop.txt").exists(), "feature should contain develop's work");
}

#[test]
fn test_hotfix_branch_starts_from_master() {
    let (dir, root) = make_workflow_repo();
    let _keep = dir;
    let store = MemoryStore::new();

    let name = execute(&root, &store, &answers(BranchKind::Hotfix, "CORN-2000", ""), None, false).unwrap();

    assert_eq!(name, "hotfix/CORN-2000");
    assert_eq!(current_branch(&root), name);
    assert!(!root.join("develop.txt").exists(), "hotfix must not carry develop's work");
}

#[test]
fn test_release_branch_merges_develop() {
    let (dir, root) = make_workflow_repo();
    let _keep = dir;
    let store = MemoryStore::new();

    let name = execute(&root, &store, &answers(BranchKind::Release, "GIS-205", "q1"), None, false).unwrap();

    assert_eq!(name, "release/GIS-205-q1");
    assert_eq!(current_branch(&root), name);
    assert!(root.join("develop.txt").exists(), "release should include develop after the merge");
}

#[test]
fn test_from_overrides_resolution() {
    let (dir, root) = make_workflow_repo();
    let _keep = dir;
    let store = MemoryStore::new();

    execute(&root, &store, &answers(BranchKind::Feature, "CJP-7", ""), Some("master"), false).unwrap();

    assert!(!root.join("develop.txt").exists());
}

#[test]
fn test_repository_binding_changes_source() {
    let (dir, root) = make_workflow_repo();
    let _keep = dir;
    let store = MemoryStore::new();
    let repo = git::repository_identity(&root).unwrap();
    store
        .set(&repo_roles_key(&repo), json!({ "develop": "master" }))
        .unwrap();

    execute(&root, &store, &answers(BranchKind::Feature, "CJP-8", ""), None, false).unwrap();

    assert!(!root.join("develop.txt").exists(), "develop role is bound to master for this repo");
}

// ── existing branches ─────────────────────────────────────────────────────────

#[test]
fn test_existing_local_branch_is_an_early_exit() {
    let (dir, root) = make_workflow_repo();
    let _keep = dir;
    run_git(&root, &["branch", "feature/CJP-1"]);

    let err = execute(&root, &MemoryStore::new(), &answers(BranchKind::Feature, "CJP-1", ""), None, false)
        .unwrap_err();

    assert!(matches!(err, Error::BranchExists { ref branch, remote: false } if branch == "feature/CJP-1"));
    assert!(err.is_early_exit());
    assert_eq!(current_branch(&root), "develop", "nothing should have been checked out");
}

#[test]
fn test_existing_remote_branch_is_an_early_exit() {
    let (dir, root) = make_workflow_repo();
    let _keep = dir;
    run_git(&root, &["push", "origin", "develop:refs/heads/feature/CJP-2"]);

    let err = execute(&root, &MemoryStore::new(), &answers(BranchKind::Feature, "CJP-2", ""), None, false)
        .unwrap_err();

    assert!(matches!(err, Error::BranchExists { remote: true, .. }));
    assert_eq!(err.to_string(), "The branch feature/CJP-2 already exists in remote.");
}

// ── push ──────────────────────────────────────────────────────────────────────

#[test]
fn test_push_sets_upstream() {
    let (dir, root) = make_workflow_repo();
    let _keep = dir;

    let name = execute(&root, &MemoryStore::new(), &answers(BranchKind::Feature, "CJP-9", ""), None, true).unwrap();

    assert!(git::remote_branch_exists(&root, &name).unwrap());
    let upstream = run_git(&root, &["rev-parse", "--abbrev-ref", "@{u}"]);
    assert_eq!(upstream, format!("origin/{name}"));
}

#[test]
fn test_no_push_by_default() {
    let (dir, root) = make_workflow_repo();
    let _keep = dir;

    let name = execute(&root, &MemoryStore::new(), &answers(BranchKind::Feature, "CJP-10", ""), None, false).unwrap();

    assert!(!git::remote_branch_exists(&root, &name).unwrap());
}
