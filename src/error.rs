//! Error types for branchflow operations.

use thiserror::Error;

use crate::providers::ProviderKind;

/// Result type alias for branchflow operations
pub type Result<T> = std::result::Result<T, Error>;

/// Boxed cause carried by provider failures.
pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Error type for branchflow operations
#[derive(Error, Debug)]
pub enum Error {
    /// `git --version` could not be run
    #[error("Git is not installed")]
    GitNotInstalled,

    /// No repository or no `origin` remote
    #[error("You are not in a git project (no remote origin configured)")]
    NotAGitRepository,

    /// Identifier outside of github/azure/bitbucket
    #[error("Unknown git provider '{0}'")]
    UnknownProvider(String),

    /// Any failure coming out of a provider implementation
    #[error("{provider} request failed: {source}")]
    ProviderOperationFailed {
        provider: ProviderKind,
        #[source]
        source: BoxError,
    },

    /// The branch to create is already there
    #[error("The branch {branch} already exists{}.", remote_suffix(.remote))]
    BranchExists { branch: String, remote: bool },

    /// A git invocation exited nonzero
    #[error("`{command}` failed (exit code {code}){}", stderr_suffix(.stderr))]
    CommandFailed {
        command: String,
        code: i32,
        stderr: String,
    },

    /// No token/username available for a provider
    #[error("Missing {what} for {provider}")]
    MissingCredentials {
        provider: ProviderKind,
        what: &'static str,
    },

    /// Remote URL does not have the shape a provider expects
    #[error("Cannot parse remote URL: {0}")]
    InvalidRemoteUrl(String),

    /// Malformed configuration file or key
    #[error("Configuration error: {0}")]
    Store(String),

    /// Interactive prompt failed (closed stdin, no tty)
    #[error("Prompt error: {0}")]
    Prompt(#[from] dialoguer::Error),

    /// libgit2 failure while inspecting the repository
    #[error("Git error: {0}")]
    Git(#[from] git2::Error),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization/deserialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl Error {
    /// True for aborts the user is expected to hit (branch already exists),
    /// as opposed to crashed commands or misconfiguration.
    pub fn is_early_exit(&self) -> bool {
        matches!(self, Error::BranchExists { .. })
    }

    /// Process exit code to report for this error.
    pub fn exit_code(&self) -> i32 {
        match self {
            Error::CommandFailed { code, .. } if *code != 0 => *code,
            _ => 1,
        }
    }

    /// Wrap as a failure of `provider`, leaving provider failures as they are.
    pub(crate) fn into_provider(self, provider: ProviderKind) -> Self {
        match self {
            Error::ProviderOperationFailed { .. } => self,
            other => Error::provider(provider, other),
        }
    }

    pub(crate) fn provider(provider: ProviderKind, source: impl Into<BoxError>) -> Self {
        Error::ProviderOperationFailed {
            provider,
            source: source.into(),
        }
    }
}

fn remote_suffix(remote: &bool) -> &'static str {
    if *remote { " in remote" } else { "" }
}

fn stderr_suffix(stderr: &str) -> String {
    match stderr.trim() {
        "" => String::new(),
        text => format!(": {}", text),
    }
}
