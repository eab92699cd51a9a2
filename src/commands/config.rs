use colored::Colorize;
use comfy_table::{presets::UTF8_FULL, Attribute, Cell, Color, ContentArrangement, Table};

use crate::{
    branch::{Role, Scope},
    credentials::provider_key,
    git::RepositoryIdentity,
    prompt::Prompter,
    providers::ProviderKind,
    resolver::{repo_roles_key, SourceResolver},
    store::ConfigStore,
    Error, Result,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigAction {
    ShowAll,
    ShowPath,
    Clear,
    ShowBranches,
    ChangeDefaultBranches,
    ChangeProjectBranches,
    RemoveProviderData,
    RemoveProjectData,
}

impl ConfigAction {
    pub const MENU: [ConfigAction; 8] = [
        ConfigAction::ShowAll,
        ConfigAction::ShowPath,
        ConfigAction::Clear,
        ConfigAction::ShowBranches,
        ConfigAction::ChangeDefaultBranches,
        ConfigAction::ChangeProjectBranches,
        ConfigAction::RemoveProviderData,
        ConfigAction::RemoveProjectData,
    ];

    pub fn label(self) -> &'static str {
        match self {
            ConfigAction::ShowAll => "Show all settings",
            ConfigAction::ShowPath => "Show settings location",
            ConfigAction::Clear => "Clear all settings",
            ConfigAction::ShowBranches => "Show default branches",
            ConfigAction::ChangeDefaultBranches => "Change global default branches",
            ConfigAction::ChangeProjectBranches => "Change branches for this project",
            ConfigAction::RemoveProviderData => "Remove personal provider data",
            ConfigAction::RemoveProjectData => "Remove data for this project",
        }
    }
}

/// Entry point for `branchflow config`; shows the menu when no action is given.
///
/// An action passed in (from a flag) runs without confirmation. `repo` is
/// `None` outside of a repository, which only matters for the project actions.
pub fn run(
    store: &dyn ConfigStore,
    prompter: &dyn Prompter,
    repo: Option<&RepositoryIdentity>,
    action: Option<ConfigAction>,
) -> Result<()> {
    let from_flag = action.is_some();
    let action = match action {
        Some(action) => action,
        None => {
            let labels: Vec<&str> = ConfigAction::MENU.iter().map(|a| a.label()).collect();
            let index = prompter.select("What do you want to do?", &labels)?;
            ConfigAction::MENU[index.min(ConfigAction::MENU.len() - 1)]
        }
    };
    tracing::debug!(?action, "config");

    match action {
        ConfigAction::ShowAll => println!("{}", serde_json::to_string_pretty(&store.all()?)?),
        ConfigAction::ShowPath => println!("{}", location(store)),
        ConfigAction::Clear if from_flag => clear_all(store)?,
        ConfigAction::Clear => {
            clear(store, prompter)?;
        }
        ConfigAction::ShowBranches => println!("{}", branches_table(store, repo)?),
        ConfigAction::ChangeDefaultBranches => change_default_branches(store, prompter)?,
        ConfigAction::ChangeProjectBranches => {
            change_project_branches(store, prompter, repo.ok_or(Error::NotAGitRepository)?)?
        }
        ConfigAction::RemoveProviderData => remove_provider_data(store, prompter)?,
        ConfigAction::RemoveProjectData => {
            remove_project_data(store, repo.ok_or(Error::NotAGitRepository)?)?
        }
    }
    Ok(())
}

pub fn location(store: &dyn ConfigStore) -> String {
    match store.location() {
        Some(path) => path.display().to_string(),
        None => "(in memory)".to_string(),
    }
}

/// Wipe the store after confirmation. Returns whether anything was cleared.
pub fn clear(store: &dyn ConfigStore, prompter: &dyn Prompter) -> Result<bool> {
    if !prompter.confirm("This removes every saved setting and credential. Continue?", false)? {
        println!("{} Nothing was removed.", "!".yellow().bold());
        return Ok(false);
    }
    clear_all(store)?;
    Ok(true)
}

pub fn clear_all(store: &dyn ConfigStore) -> Result<()> {
    store.clear()?;
    println!("{} Settings cleared.", "✓".green().bold());
    Ok(())
}

/// Role bindings per scope, with the branch actually used in the last column.
pub fn branches_table(store: &dyn ConfigStore, repo: Option<&RepositoryIdentity>) -> Result<Table> {
    let resolver = SourceResolver::new(store, repo);

    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_header(vec![
            Cell::new("Role").add_attribute(Attribute::Bold),
            Cell::new("Global").add_attribute(Attribute::Bold),
            Cell::new("Project").add_attribute(Attribute::Bold),
            Cell::new("Effective").add_attribute(Attribute::Bold),
        ]);

    for role in Role::ALL {
        let global = resolver.get_role_branch(Scope::Global, role)?;
        let project = resolver.get_role_branch(Scope::Repository, role)?;
        let effective = resolver.effective_role_branch(role)?;
        table.add_row(vec![
            Cell::new(role.as_str()),
            Cell::new(global.unwrap_or_else(|| format!("({})", role.default_branch()))),
            Cell::new(project.unwrap_or_else(|| "-".to_string())),
            Cell::new(effective).fg(Color::Green),
        ]);
    }
    Ok(table)
}

fn ask_role_branch(prompter: &dyn Prompter, role: Role, current: &str) -> Result<Option<String>> {
    let answer = prompter.input(
        &format!("Name of the {} branch (empty keeps {})", role, current),
        true,
    )?;
    let answer = answer.trim();
    Ok((!answer.is_empty()).then(|| answer.to_string()))
}

pub fn change_default_branches(store: &dyn ConfigStore, prompter: &dyn Prompter) -> Result<()> {
    let resolver = SourceResolver::new(store, None);
    for role in Role::ALL {
        let current = resolver.global_role_branch(role)?;
        if let Some(name) = ask_role_branch(prompter, role, &current)? {
            resolver.set_role_branch(role, &name)?;
            println!("{} Global {} branch is now {}", "✓".green().bold(), role, name.cyan());
        }
    }
    Ok(())
}

pub fn change_project_branches(
    store: &dyn ConfigStore,
    prompter: &dyn Prompter,
    repo: &RepositoryIdentity,
) -> Result<()> {
    let resolver = SourceResolver::new(store, Some(repo));
    for role in Role::ALL {
        let current = resolver.effective_role_branch(role)?;
        if let Some(name) = ask_role_branch(prompter, role, &current)? {
            resolver.set_repo_role_branch(role, &name)?;
            println!(
                "{} {} branch for {} is now {}",
                "✓".green().bold(),
                role,
                repo.url().dimmed(),
                name.cyan()
            );
        }
    }
    Ok(())
}

/// Delete stored credentials for every provider, or for the one picked.
pub fn remove_provider_data(store: &dyn ConfigStore, prompter: &dyn Prompter) -> Result<()> {
    let mut labels = vec!["All providers"];
    labels.extend(ProviderKind::ALL.iter().map(|k| k.as_str()));
    let index = prompter.select("Which provider data do you want to remove?", &labels)?;

    let key = match index.checked_sub(1).and_then(|i| ProviderKind::ALL.get(i)) {
        Some(kind) => provider_key(*kind),
        None => "git.providers".to_string(),
    };
    store.delete(&key)?;
    println!("{} Removed {}", "✓".green().bold(), labels[index.min(labels.len() - 1)]);
    Ok(())
}

/// Forget the provider binding and branch bindings of `repo`.
pub fn remove_project_data(store: &dyn ConfigStore, repo: &RepositoryIdentity) -> Result<()> {
    store.delete(&format!("git.repo.{}", repo.key_segment()))?;
    store.delete(&repo_roles_key(repo))?;
    println!("{} Removed saved data for {}", "✓".green().bold(), repo.url().dimmed());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::prompt::{Answer, ScriptedPrompter};
    use crate::providers::server_key;
    use crate::store::MemoryStore;
    use serde_json::json;

    const URL: &str = "git@github.com:acme/widgets.git";

    fn seeded() -> MemoryStore {
        let store = MemoryStore::new();
        let repo = RepositoryIdentity::new(URL);
        store.set("git.providers.github.token", json!("gh")).unwrap();
        store.set("git.providers.azure.token", json!("az")).unwrap();
        store.set(&server_key(&repo), json!("github")).unwrap();
        store.set("git.branch.default.develop", json!("dev")).unwrap();
        store
            .set(&format!("{}.master", repo_roles_key(&repo)), json!("main"))
            .unwrap();
        store
    }

    // ── provider data ──

    #[test]
    fn test_remove_one_provider() {
        let store = seeded();
        let prompter = ScriptedPrompter::new([Answer::Select(2)]);
        remove_provider_data(&store, &prompter).unwrap();

        let doc = store.all().unwrap();
        assert!(doc["git"]["providers"].get("azure").is_none());
        assert_eq!(doc["git"]["providers"]["github"]["token"], "gh");
    }

    #[test]
    fn test_remove_all_providers() {
        let store = seeded();
        let prompter = ScriptedPrompter::new([Answer::Select(0)]);
        remove_provider_data(&store, &prompter).unwrap();

        let doc = store.all().unwrap();
        assert!(doc["git"].get("providers").is_none());
        assert_eq!(doc["git"]["branch"]["default"]["develop"], "dev");
    }

    // ── project data ──

    #[test]
    fn test_remove_project_data_drops_both_bindings() {
        let store = seeded();
        let repo = RepositoryIdentity::new(URL);
        remove_project_data(&store, &repo).unwrap();

        let doc = store.all().unwrap();
        assert!(doc["git"]["repo"].get(URL).is_none());
        assert!(doc["git"]["branch"]["repo"].get(URL).is_none());
        assert_eq!(doc["git"]["branch"]["default"]["develop"], "dev");
    }

    #[test]
    fn test_project_action_outside_repository() {
        let store = seeded();
        let prompter = ScriptedPrompter::new([]);
        let err = run(&store, &prompter, None, Some(ConfigAction::RemoveProjectData)).unwrap_err();
        assert!(matches!(err, Error::NotAGitRepository));
    }

    // ── branches ──

    #[test]
    fn test_change_default_branches_keeps_empty_answers() {
        let store = seeded();
        let prompter = ScriptedPrompter::new([
            Answer::Text("trunk".to_string()),
            Answer::Text("  ".to_string()),
        ]);
        change_default_branches(&store, &prompter).unwrap();

        let resolver = SourceResolver::new(&store, None);
        assert_eq!(resolver.global_role_branch(Role::Master).unwrap(), "trunk");
        assert_eq!(resolver.global_role_branch(Role::Develop).unwrap(), "dev");
    }

    #[test]
    fn test_change_project_branches() {
        let store = seeded();
        let repo = RepositoryIdentity::new(URL);
        let prompter = ScriptedPrompter::new([
            Answer::Text(String::new()),
            Answer::Text("integration".to_string()),
        ]);
        change_project_branches(&store, &prompter, &repo).unwrap();

        let resolver = SourceResolver::new(&store, Some(&repo));
        assert_eq!(resolver.effective_role_branch(Role::Master).unwrap(), "main");
        assert_eq!(resolver.effective_role_branch(Role::Develop).unwrap(), "integration");
    }

    #[test]
    fn test_branches_table_shows_every_scope() {
        let store = seeded();
        let repo = RepositoryIdentity::new(URL);
        let rendered = branches_table(&store, Some(&repo)).unwrap().to_string();
        assert!(rendered.contains("main"));
        assert!(rendered.contains("dev"));
        assert!(rendered.contains("(master)"));
    }

    // ── clear ──

    #[test]
    fn test_clear_requires_confirmation() {
        let store = seeded();
        let prompter = ScriptedPrompter::new([Answer::Confirm(false)]);
        assert!(!clear(&store, &prompter).unwrap());
        assert!(store.all().unwrap().get("git").is_some());

        let prompter = ScriptedPrompter::new([Answer::Confirm(true)]);
        assert!(clear(&store, &prompter).unwrap());
        assert_eq!(store.all().unwrap(), json!({}));
    }

    #[test]
    fn test_clear_flag_does_not_ask() {
        let store = seeded();
        let prompter = ScriptedPrompter::new([]);
        run(&store, &prompter, None, Some(ConfigAction::Clear)).unwrap();
        assert_eq!(prompter.asked(), 0);
        assert_eq!(store.all().unwrap(), json!({}));
    }

    #[test]
    fn test_clear_from_menu_still_confirms() {
        let store = seeded();
        let prompter = ScriptedPrompter::new([Answer::Select(2), Answer::Confirm(false)]);
        run(&store, &prompter, None, None).unwrap();
        assert_eq!(prompter.asked(), 2);
        assert!(store.all().unwrap().get("git").is_some());
    }

    #[test]
    fn test_menu_dispatch() {
        let store = seeded();
        let prompter = ScriptedPrompter::new([Answer::Select(1)]);
        run(&store, &prompter, None, None).unwrap();
        assert_eq!(prompter.remaining(), 0);
    }
}
