use serde_json::Value;
use std::process::Command;

use crate::{
    prompt::Prompter, providers::ProviderKind, store::ConfigStore, Error, Result,
};

/// Authentication for one provider API call.
#[derive(Debug, Clone, PartialEq)]
pub struct Credentials {
    pub username: Option<String>,
    pub token: String,
}

/// Root of the personal data stored for `kind` (`git.providers.<kind>`).
pub fn provider_key(kind: ProviderKind) -> String {
    format!("git.providers.{}", kind)
}

fn token_env(kind: ProviderKind) -> &'static str {
    match kind {
        ProviderKind::Github => "GITHUB_TOKEN",
        ProviderKind::Azure => "AZURE_DEVOPS_TOKEN",
        ProviderKind::Bitbucket => "BITBUCKET_APP_PASSWORD",
    }
}

/// Token from `gh auth token`, if the gh CLI is installed and logged in.
fn gh_cli_token() -> Option<String> {
    let output = Command::new("gh").args(["auth", "token"]).output().ok()?;
    let token = String::from_utf8_lossy(&output.stdout).trim().to_string();
    (output.status.success() && !token.is_empty()).then_some(token)
}

/// Resolve credentials from the environment, the store, and finally a prompt
/// (whose answer is saved for next time). GitHub also tries `gh auth token` first.
pub fn resolve(kind: ProviderKind, store: &dyn ConfigStore, prompter: &dyn Prompter) -> Result<Credentials> {
    if kind == ProviderKind::Github {
        if let Some(token) = gh_cli_token() {
            return Ok(Credentials { username: None, token });
        }
    }
    resolve_with(kind, store, prompter, |name| {
        std::env::var(name).ok().filter(|v| !v.is_empty())
    })
}

/// [`resolve`] with an explicit environment lookup and no gh CLI.
pub fn resolve_with(
    kind: ProviderKind,
    store: &dyn ConfigStore,
    prompter: &dyn Prompter,
    env: impl Fn(&str) -> Option<String>,
) -> Result<Credentials> {
    let username = if kind == ProviderKind::Bitbucket {
        Some(lookup(kind, store, prompter, &env, Field::Username)?)
    } else {
        None
    };
    let token = lookup(kind, store, prompter, &env, Field::Token)?;
    Ok(Credentials { username, token })
}

#[derive(Clone, Copy)]
enum Field {
    Username,
    Token,
}

impl Field {
    fn key(self) -> &'static str {
        match self {
            Field::Username => "username",
            Field::Token => "token",
        }
    }

    fn env(self, kind: ProviderKind) -> &'static str {
        match self {
            Field::Username => "BITBUCKET_USERNAME",
            Field::Token => token_env(kind),
        }
    }
}

fn lookup(
    kind: ProviderKind,
    store: &dyn ConfigStore,
    prompter: &dyn Prompter,
    env: &impl Fn(&str) -> Option<String>,
    field: Field,
) -> Result<String> {
    if let Some(value) = env(field.env(kind)) {
        return Ok(value);
    }

    let key = format!("{}.{}", provider_key(kind), field.key());
    if let Some(value) = store.get_str(&key)? {
        return Ok(value);
    }

    let answer = match field {
        Field::Username => prompter.input(&format!("Enter your {} username", kind), false)?,
        Field::Token => prompter.password(&format!(
            "Enter your {} access token (or set {})",
            kind,
            token_env(kind)
        ))?,
    };
    let answer = answer.trim().to_string();
    if answer.is_empty() {
        return Err(Error::MissingCredentials {
            provider: kind,
            what: field.key(),
        });
    }
    store.set(&key, Value::String(answer.clone()))?;
    Ok(answer)
}
