//! Source-branch resolution: which branch a branch is created from or synced with.
//!
//! Role bindings are looked up with this precedence:
//!
//! 1. repository binding (`git.branch.repo.<escaped remote url>.<role>`)
//! 2. global binding (`git.branch.default.<role>`)
//! 3. the hardcoded role name (`master` / `develop`)
//!
//! Nothing is cached: every call reads the store again.

use serde_json::{Map, Value};

use crate::{
    branch::{is_hotfix_or_release, Role, Scope},
    git::RepositoryIdentity,
    store::ConfigStore,
    Error, Result,
};

/// Role a branch has to be based on, given the develop name in effect.
pub fn role_needed(branch: &str, develop: &str) -> Role {
    if branch == develop || is_hotfix_or_release(branch) {
        Role::Master
    } else {
        Role::Develop
    }
}

pub fn global_role_key(role: Role) -> String {
    format!("git.branch.default.{}", role)
}

pub fn repo_roles_key(repo: &RepositoryIdentity) -> String {
    format!("git.branch.repo.{}", repo.key_segment())
}

pub struct SourceResolver<'a> {
    store: &'a dyn ConfigStore,
    repo: Option<&'a RepositoryIdentity>,
}

impl<'a> SourceResolver<'a> {
    /// `repo` is `None` outside of a repository; lookups then use global scope only.
    pub fn new(store: &'a dyn ConfigStore, repo: Option<&'a RepositoryIdentity>) -> Self {
        Self { store, repo }
    }

    fn repo_bindings(&self) -> Result<Option<Map<String, Value>>> {
        let Some(repo) = self.repo else {
            return Ok(None);
        };
        match self.store.get(&repo_roles_key(repo))? {
            Some(Value::Object(map)) => Ok(Some(map)),
            _ => Ok(None),
        }
    }

    /// Raw binding at `scope`; `None` when unset there.
    pub fn get_role_branch(&self, scope: Scope, role: Role) -> Result<Option<String>> {
        match scope {
            Scope::Global => self.store.get_str(&global_role_key(role)),
            Scope::Repository => Ok(self.repo_bindings()?.and_then(|map| bound(&map, role))),
        }
    }

    /// Persist a global binding.
    pub fn set_role_branch(&self, role: Role, name: &str) -> Result<()> {
        tracing::debug!(%role, name, "setting global role branch");
        self.store.set(&global_role_key(role), Value::String(name.to_string()))
    }

    /// Persist a binding for the current repository.
    pub fn set_repo_role_branch(&self, role: Role, name: &str) -> Result<()> {
        let repo = self.repo.ok_or(Error::NotAGitRepository)?;
        tracing::debug!(%role, name, repo = %repo, "setting repository role branch");
        self.store.set(
            &format!("{}.{}", repo_roles_key(repo), role),
            Value::String(name.to_string()),
        )
    }

    /// Global binding, falling back to the hardcoded name.
    pub fn global_role_branch(&self, role: Role) -> Result<String> {
        Ok(self
            .get_role_branch(Scope::Global, role)?
            .unwrap_or_else(|| role.default_branch().to_string()))
    }

    /// Repository binding, else global binding, else the hardcoded name.
    pub fn effective_role_branch(&self, role: Role) -> Result<String> {
        match self.get_role_branch(Scope::Repository, role)? {
            Some(name) => Ok(name),
            None => self.global_role_branch(role),
        }
    }

    /// Branch that `branch` should be created from / pulled against.
    ///
    /// The needed role is decided twice: once with the hardcoded develop
    /// name for the repository lookup, once with the global develop name for
    /// the global lookup. With a renamed global develop branch the two can
    /// differ.
    pub fn resolve_source_branch(&self, branch: &str) -> Result<String> {
        let default_role = role_needed(branch, Role::Develop.default_branch());
        if let Some(source) = self.repo_bindings()?.and_then(|map| bound(&map, default_role)) {
            tracing::debug!(branch, role = %default_role, source = %source, "repository binding wins");
            return Ok(source);
        }

        let global_develop = self.global_role_branch(Role::Develop)?;
        let global_role = role_needed(branch, &global_develop);
        let source = self.global_role_branch(global_role)?;
        tracing::debug!(branch, role = %global_role, source = %source, "resolved from global scope");
        Ok(source)
    }
}

fn bound(map: &Map<String, Value>, role: Role) -> Option<String> {
    map.get(role.as_str())
        .and_then(Value::as_str)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
}
