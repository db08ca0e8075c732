//! Gitscribe CLI - encrypted AI model profile management

use async_trait::async_trait;
use clap::{Parser, Subcommand};
use dialoguer::Select;
use gitscribe_core::healer::{DefaultModelHealer, ModelPrompter};
use gitscribe_core::repository::SettingsRepository;
use gitscribe_core::settings::ModelProfile;
use gitscribe_core::{Error, Result};

#[derive(Parser)]
#[command(name = "gitscribe")]
#[command(author, version, about = "AI commit-message CLI with encrypted model profiles", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Verbose output (debug-level logging)
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Quiet mode (minimal output)
    #[arg(short, long, global = true)]
    quiet: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Manage model profiles
    Models {
        #[command(subcommand)]
        action: ModelAction,
    },

    /// Manage model aliases
    Alias {
        #[command(subcommand)]
        action: AliasAction,
    },
}

#[derive(Subcommand)]
enum ModelAction {
    /// List all model profiles
    List,
    /// Show one profile by id, name, or alias
    Show { reference: String },
    /// Find profiles by substring of id, name, or alias
    Find { term: String },
    /// Add a new model profile
    Add {
        /// Unique profile name
        name: String,
        /// Provider identifier (e.g. openai, anthropic)
        #[arg(short, long)]
        provider: String,
        /// Endpoint kind understood by the provider client
        #[arg(short, long, default_value = "chat")]
        kind: String,
        /// Provider-side model identifier
        #[arg(short, long)]
        model: String,
        /// API key for the provider
        #[arg(long)]
        api_key: String,
        /// Alias for the new profile (repeatable)
        #[arg(short, long = "alias")]
        aliases: Vec<String>,
        /// Make this profile the default
        #[arg(long)]
        default: bool,
    },
    /// Update an existing profile
    Update {
        /// Profile to update (id, name, or alias)
        reference: String,
        #[arg(long)]
        name: Option<String>,
        #[arg(short, long)]
        provider: Option<String>,
        #[arg(short, long)]
        kind: Option<String>,
        #[arg(short, long)]
        model: Option<String>,
        #[arg(long)]
        api_key: Option<String>,
    },
    /// Delete a profile
    Delete { reference: String },
    /// Set the default profile
    SetDefault { reference: String },
    /// Show the default profile, offering repair if it is dangling
    Default,
}

#[derive(Subcommand)]
enum AliasAction {
    /// Attach an alias to a profile
    Add { reference: String, alias: String },
    /// Detach an alias from a profile (no-op if absent)
    Remove { reference: String, alias: String },
}

/// Interactive prompter backed by the terminal
struct TerminalPrompter;

#[async_trait]
impl ModelPrompter for TerminalPrompter {
    async fn select(&self, title: &str, choices: &[String]) -> Result<Option<usize>> {
        let title = title.to_string();
        let items = choices.to_vec();

        // dialoguer is blocking, so we spawn a blocking task
        tokio::task::spawn_blocking(move || {
            Select::new()
                .with_prompt(title)
                .items(&items)
                .default(0)
                .interact_opt()
                .map_err(|e| Error::Io(std::io::Error::other(e.to_string())))
        })
        .await
        .map_err(|e| Error::Io(std::io::Error::other(e.to_string())))?
    }

    fn notify(&self, message: &str) {
        println!("{}", message);
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Verbosity is an explicit input to the subscriber, not a global switch
    let directive = if cli.verbose {
        "gitscribe=debug"
    } else {
        "gitscribe=warn"
    };
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env().add_directive(directive.parse()?),
        )
        .with_writer(std::io::stderr)
        .init();

    tracing::debug!(
        config_dir = %gitscribe_core::store::EncryptedStore::config_dir()?.display(),
        "resolved config directory"
    );
    let repository = SettingsRepository::at_default_location()?;

    if let Err(e) = run(cli, &repository).await {
        eprintln!("Error [{}]: {}", e.code(), e);
        if let Some(suggestion) = e.suggestion() {
            eprintln!("Try: {}", suggestion);
        }
        std::process::exit(1);
    }
    Ok(())
}

async fn run(cli: Cli, repository: &SettingsRepository) -> Result<()> {
    match cli.command {
        Commands::Models { action } => cmd_models(repository, action, cli.quiet).await,
        Commands::Alias { action } => cmd_alias(repository, action, cli.quiet).await,
    }
}

// ============================================================================
// Command Implementations
// ============================================================================

async fn cmd_models(repo: &SettingsRepository, action: ModelAction, quiet: bool) -> Result<()> {
    match action {
        ModelAction::List => {
            let settings = repo.load_settings().await?;
            if settings.models.is_empty() {
                if !quiet {
                    println!("No models configured.");
                    println!("\nAdd one with: gitscribe models add <name> --provider <provider> --model <model> --api-key <key>");
                }
                return Ok(());
            }
            if !quiet {
                println!("Models:");
            }
            for m in &settings.models {
                let default_marker = match &settings.default_model_id {
                    Some(id) if *id == m.id => " (default)",
                    _ => "",
                };
                println!("  {} - {}/{}{}", m.name, m.provider, m.model_id, default_marker);
            }
            if settings.default_is_dangling() && !quiet {
                println!("\nWarning: the default model no longer exists.");
                println!("Repair it with: gitscribe models default");
            }
        }

        ModelAction::Show { reference } => {
            let profile = repo
                .get_model(&reference)
                .await?
                .ok_or_else(|| Error::ModelNotFound(reference))?;
            print_profile(&profile);
        }

        ModelAction::Find { term } => {
            let hits = repo.get_models_by_partial_match(&term).await?;
            if hits.is_empty() {
                if !quiet {
                    println!("No models match '{}'.", term);
                }
                return Ok(());
            }
            for m in &hits {
                println!("  {} - {}/{}", m.name, m.provider, m.model_id);
            }
        }

        ModelAction::Add {
            name,
            provider,
            kind,
            model,
            api_key,
            aliases,
            default,
        } => {
            let mut profile = ModelProfile::new(&name, provider, kind, model, api_key);
            profile.aliases = aliases;
            let id = profile.id.clone();
            repo.add_model(profile).await?;
            if default {
                repo.set_default_model(&id).await?;
            }
            if !quiet {
                println!("Model '{}' added.", name);
                if default {
                    println!("Model '{}' is now the default.", name);
                }
            }
        }

        ModelAction::Update {
            reference,
            name,
            provider,
            kind,
            model,
            api_key,
        } => {
            let mut profile = repo
                .get_model(&reference)
                .await?
                .ok_or_else(|| Error::ModelNotFound(reference))?;
            if let Some(name) = name {
                profile.name = name;
            }
            if let Some(provider) = provider {
                profile.provider = provider;
            }
            if let Some(kind) = kind {
                profile.kind = kind;
            }
            if let Some(model) = model {
                profile.model_id = model;
            }
            if let Some(api_key) = api_key {
                profile.api_key = api_key;
            }
            let display_name = profile.name.clone();
            repo.update_model(profile).await?;
            if !quiet {
                println!("Model '{}' updated.", display_name);
            }
        }

        ModelAction::Delete { reference } => {
            let removed = repo.delete_model(&reference).await?;
            if !quiet {
                println!("Model '{}' deleted.", removed.name);
            }
        }

        ModelAction::SetDefault { reference } => {
            let target = repo.set_default_model(&reference).await?;
            if !quiet {
                println!("Model '{}' is now the default.", target.name);
            }
        }

        ModelAction::Default => {
            let settings = repo.load_settings().await?;
            if settings.default_model_id.is_none() {
                if !quiet {
                    println!("No default model set.");
                    println!("\nSet one with: gitscribe models set-default <name>");
                }
                return Ok(());
            }
            match repo.get_default_model().await? {
                Some(profile) => print_profile(&profile),
                None => {
                    // Dangling default: offer the explicit repair path
                    let healer = DefaultModelHealer::new(Box::new(TerminalPrompter));
                    let healed = healer.heal(repo).await?;
                    print_profile(&healed);
                }
            }
        }
    }
    Ok(())
}

async fn cmd_alias(repo: &SettingsRepository, action: AliasAction, quiet: bool) -> Result<()> {
    match action {
        AliasAction::Add { reference, alias } => {
            repo.add_alias(&reference, &alias).await?;
            if !quiet {
                println!("Alias '{}' added to '{}'.", alias, reference);
            }
        }
        AliasAction::Remove { reference, alias } => {
            repo.remove_alias(&reference, &alias).await?;
            if !quiet {
                println!("Alias '{}' removed from '{}'.", alias, reference);
            }
        }
    }
    Ok(())
}

fn print_profile(profile: &ModelProfile) {
    println!("Model: {}", profile.name);
    println!("  ID: {}", profile.id);
    println!("  Provider: {}", profile.provider);
    println!("  Kind: {}", profile.kind);
    println!("  Model ID: {}", profile.model_id);
    if !profile.aliases.is_empty() {
        println!("  Aliases: {}", profile.aliases.join(", "));
    }
    println!("  API key: {}", profile.redacted_api_key());
    println!("  Created: {}", profile.created_at.format("%Y-%m-%d %H:%M:%S"));
    println!("  Updated: {}", profile.updated_at.format("%Y-%m-%d %H:%M:%S"));
}
