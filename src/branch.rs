//! Branch naming conventions: categories, protected roles, new branch names.

use std::fmt;

/// Logical position of a long-lived branch in the branching model.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Role {
    Master,
    Develop,
}

impl Role {
    pub const ALL: [Role; 2] = [Role::Master, Role::Develop];

    /// Config key fragment, also the hardcoded default branch name.
    pub fn as_str(self) -> &'static str {
        match self {
            Role::Master => "master",
            Role::Develop => "develop",
        }
    }

    /// Branch name used when neither repository nor global config binds the role.
    pub fn default_branch(self) -> &'static str {
        self.as_str()
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Where a role binding lives.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Scope {
    Global,
    Repository,
}

/// Kind of branch a user can create.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BranchKind {
    Feature,
    Hotfix,
    Release,
}

impl BranchKind {
    pub const ALL: [BranchKind; 3] = [BranchKind::Feature, BranchKind::Hotfix, BranchKind::Release];

    pub fn as_str(self) -> &'static str {
        match self {
            BranchKind::Feature => "feature",
            BranchKind::Hotfix => "hotfix",
            BranchKind::Release => "release",
        }
    }
}

impl fmt::Display for BranchKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for BranchKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        BranchKind::ALL
            .into_iter()
            .find(|k| k.as_str() == s)
            .ok_or_else(|| format!("unknown branch type '{}' (expected feature, hotfix or release)", s))
    }
}

/// Classification result for an arbitrary branch name.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BranchCategory {
    Feature,
    Hotfix,
    Release,
    /// A protected role branch (master/develop under the names in effect).
    Other,
}

/// True iff `name` matches `^(hotfix|release)[/-].+` (case-sensitive).
pub fn is_hotfix_or_release(name: &str) -> bool {
    hotfix_or_release(name).is_some()
}

fn hotfix_or_release(name: &str) -> Option<BranchCategory> {
    let (category, rest) = if let Some(rest) = name.strip_prefix("hotfix") {
        (BranchCategory::Hotfix, rest)
    } else if let Some(rest) = name.strip_prefix("release") {
        (BranchCategory::Release, rest)
    } else {
        return None;
    };

    let suffix = rest.strip_prefix('/').or_else(|| rest.strip_prefix('-'))?;
    if suffix.is_empty() {
        return None;
    }
    Some(category)
}

/// Classify against the hardcoded role names.
pub fn classify(name: &str) -> BranchCategory {
    classify_with_roles(name, Role::Master.default_branch(), Role::Develop.default_branch())
}

/// Classify against the role names currently in effect.
pub fn classify_with_roles(name: &str, master: &str, develop: &str) -> BranchCategory {
    if let Some(category) = hotfix_or_release(name) {
        return category;
    }
    if name == master || name == develop {
        return BranchCategory::Other;
    }
    BranchCategory::Feature
}

/// Build `<kind>/<issue>[-<description>]`; the description is lowercased
/// with whitespace runs collapsed to `_`.
pub fn compose_branch_name(kind: BranchKind, issue_id: &str, description: &str) -> String {
    let description = description
        .split_whitespace()
        .collect::<Vec<_>>()
        .join("_")
        .to_lowercase();

    if description.is_empty() {
        format!("{}/{}", kind, issue_id.trim())
    } else {
        format!("{}/{}-{}", kind, issue_id.trim(), description)
    }
}
