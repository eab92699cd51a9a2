use anyhow::{Context, Result};
use branchflow::{
    branch::BranchKind,
    commands::{
        self,
        branch_create::BranchCreateOptions,
        branch_sync::BranchSyncOptions,
        config::ConfigAction,
        pr_create::PrCreateOptions,
    },
    git, logging,
    prompt::TerminalPrompter,
    store::FileStore,
};
use clap::{CommandFactory, Parser, Subcommand};
use clap_complete::generate;
use colored::Colorize;

#[derive(Parser)]
#[command(
    name = "branchflow",
    version,
    about = "Feature, hotfix and release branches without remembering where they come from",
    long_about = "branchflow creates and syncs workflow branches from the right source branch.\n\
                  Hotfix and release branches start from master, everything else from develop;\n\
                  both names can be overridden globally or per repository. It also opens pull\n\
                  requests on GitHub, Azure DevOps and Bitbucket."
)]
struct Cli {
    /// Print diagnostic logs to stderr
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Create a feature, hotfix or release branch from its source branch
    BranchCreate {
        /// Issue id used in the branch name (prompted for when omitted)
        issue_id: Option<String>,

        /// Source branch to create from instead of the resolved one
        #[arg(long, value_name = "BRANCH")]
        from: Option<String>,

        /// Push the new branch and set its upstream
        #[arg(short, long)]
        push: bool,

        /// Branch type (prompted for when omitted)
        #[arg(long = "type", value_name = "TYPE")]
        kind: Option<BranchKind>,

        /// Description appended to the branch name
        #[arg(long)]
        description: Option<String>,
    },

    /// Pull the source branch into the current branch
    BranchSync {
        /// Branch to pull from instead of the resolved one
        #[arg(short, long, value_name = "BRANCH")]
        from: Option<String>,

        /// Rebase instead of merging
        #[arg(short, long)]
        rebase: bool,
    },

    /// Open a pull request from the current branch into its source branch
    PrCreate {
        #[arg(long)]
        title: Option<String>,

        /// Target branch instead of the resolved one
        #[arg(long, value_name = "BRANCH")]
        target: Option<String>,

        #[arg(long)]
        description: Option<String>,
    },

    /// Show or change saved settings (interactive without flags)
    Config {
        /// Print the settings file location
        #[arg(short, long, conflicts_with_all = ["all", "clear"])]
        path: bool,

        /// Print every saved setting
        #[arg(short, long, conflicts_with = "clear")]
        all: bool,

        /// Remove every saved setting
        #[arg(short, long)]
        clear: bool,
    },

    /// Generate shell completion scripts
    Completions {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: clap_complete::Shell,
    },
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    logging::init(cli.verbose);

    if let Err(err) = run(cli).await {
        let code = match err.downcast_ref::<branchflow::Error>() {
            Some(e) if e.is_early_exit() => {
                eprintln!("{} {}", "!".yellow().bold(), e);
                e.exit_code()
            }
            Some(e) => {
                eprintln!("{} {}", "✗".red().bold(), e.to_string().red());
                e.exit_code()
            }
            None => {
                eprintln!("{} {}", "✗".red().bold(), format!("{:#}", err).red());
                1
            }
        };
        std::process::exit(code);
    }
}

async fn run(cli: Cli) -> Result<()> {
    let store = || FileStore::open_default().context("could not locate the settings file");
    let prompter = TerminalPrompter::new();

    match cli.command {
        Commands::BranchCreate {
            issue_id,
            from,
            push,
            kind,
            description,
        } => {
            let root = git::repo_root()?;
            let opts = BranchCreateOptions {
                issue_id,
                from,
                push,
                kind,
                description,
            };
            commands::branch_create::run(&root, &store()?, &prompter, opts)?;
        }
        Commands::BranchSync { from, rebase } => {
            let root = git::repo_root()?;
            commands::branch_sync::run(&root, &store()?, BranchSyncOptions { from, rebase })?;
        }
        Commands::PrCreate {
            title,
            target,
            description,
        } => {
            let root = git::repo_root()?;
            let opts = PrCreateOptions {
                title,
                target,
                description,
            };
            commands::pr_create::run(&root, &store()?, &prompter, opts).await?;
        }
        Commands::Config { path, all, clear } => {
            let action = if path {
                Some(ConfigAction::ShowPath)
            } else if all {
                Some(ConfigAction::ShowAll)
            } else if clear {
                Some(ConfigAction::Clear)
            } else {
                None
            };
            let repo = git::repo_root()
                .ok()
                .and_then(|root| git::repository_identity(&root).ok());
            commands::config::run(&store()?, &prompter, repo.as_ref(), action)?;
        }
        Commands::Completions { shell } => {
            generate(shell, &mut Cli::command(), "branchflow", &mut std::io::stdout());
        }
    }

    Ok(())
}
