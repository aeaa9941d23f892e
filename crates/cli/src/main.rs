mod commands;
mod fields;

use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::{anyhow, Context, Result};
use clap::{Parser, Subcommand};
use colored::Colorize;
use commands::agile::{BoardCommand, SprintCommand};
use commands::auth::AuthCommand;
use commands::config::ConfigCommand;
use commands::search::SearchArgs;
use commands::tickets::CreateArgs;
use ticketbridge_api::RemoteServiceError;
use ticketbridge_auth::CredentialStore;
use ticketbridge_jira::{Settings, Source, TicketCreator, TicketRequestContext};
use ticketbridge_output::{OutputFormat, OutputRenderer};
use tracing_subscriber::{fmt, EnvFilter};

#[derive(Parser, Debug)]
#[command(name = "ticketbridge", version, about = "Create Jira tickets for product sources", long_about = None)]
struct Cli {
    /// Source whose Jira instance receives the request (a or b)
    #[arg(short, long, global = true, env = "TICKETBRIDGE_SOURCE")]
    source: Option<Source>,

    /// User the request is made on behalf of (defaults to $USER)
    #[arg(short, long, global = true, env = "TICKETBRIDGE_USER")]
    user: Option<String>,

    /// Deployment environment of the caller, recorded in logs
    #[arg(long, global = true, env = "TICKETBRIDGE_ENVIRONMENT")]
    environment: Option<String>,

    /// Path to settings file (defaults to ~/.ticketbridge/config.yaml)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Output format for command results
    #[arg(long, global = true, value_enum, default_value_t = OutputFormat::Table)]
    output: OutputFormat,

    /// Enable verbose logging
    #[arg(long, global = true)]
    debug: bool,

    #[command(subcommand)]
    command: TicketCommand,
}

#[derive(Subcommand, Debug, Clone)]
enum TicketCommand {
    #[command(flatten)]
    Jira(JiraCommand),
    /// Authentication commands
    #[command(subcommand)]
    Auth(AuthCommand),
    /// Settings file commands
    #[command(subcommand)]
    Config(ConfigCommand),
}

/// Commands that talk to the Jira instance of the selected source.
#[derive(Subcommand, Debug, Clone)]
enum JiraCommand {
    /// Create a ticket from key=value fields or a JSON file
    Create(CreateArgs),
    /// Add a comment to an issue
    Comment {
        /// Issue key (e.g. PROJ-42)
        key: String,
        /// Comment text
        body: String,
    },
    /// Move an issue through a workflow transition
    Transition {
        /// Issue key (e.g. PROJ-42)
        key: String,
        /// Transition id
        transition_id: u64,
    },
    /// Search issues with JQL
    Search(SearchArgs),
    /// Sprint commands
    #[command(subcommand)]
    Sprint(SprintCommand),
    /// Board commands
    #[command(subcommand)]
    Board(BoardCommand),
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    if let Err(err) = init_tracing(cli.debug) {
        eprintln!("{} {err}", "error:".red().bold());
        return ExitCode::FAILURE;
    }

    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            report(&err);
            ExitCode::FAILURE
        }
    }
}

fn report(err: &anyhow::Error) {
    eprintln!("{} {err}", "error:".red().bold());
    for cause in err.chain().skip(1) {
        eprintln!("  {} {cause}", "caused by:".dimmed());
    }

    let hint = err
        .chain()
        .find_map(|cause| cause.downcast_ref::<RemoteServiceError>())
        .and_then(RemoteServiceError::suggestion);
    if let Some(hint) = hint {
        eprintln!("  {} {hint}", "hint:".yellow());
    }
}

async fn run(cli: Cli) -> Result<()> {
    let renderer = OutputRenderer::new(cli.output);

    match cli.command {
        TicketCommand::Config(command) => {
            commands::config::handle(command, cli.config.as_deref(), &renderer)
        }
        TicketCommand::Auth(command) => {
            let store = CredentialStore::default_location().ok_or_else(|| {
                anyhow!("Unable to locate the home directory for the credential store")
            })?;
            commands::auth::handle(command, cli.source, &store, &renderer)
        }
        TicketCommand::Jira(command) => {
            let settings = Settings::load(cli.config.as_ref())?;
            let source = cli.source.ok_or_else(|| {
                anyhow!("No source selected. Pass --source or set TICKETBRIDGE_SOURCE.")
            })?;
            let context = request_context(cli.user, cli.environment)?;

            tracing::debug!(
                source = %source,
                user = %context.username,
                environment = context.environment.as_deref().unwrap_or("-"),
                "Resolved request context"
            );

            let creator = TicketCreator::new(context, source, &settings)
                .with_context(|| format!("Unable to set up Jira access for source '{source}'"))?;

            run_jira(&creator, command, &renderer).await
        }
    }
}

async fn run_jira(
    creator: &TicketCreator,
    command: JiraCommand,
    renderer: &OutputRenderer,
) -> Result<()> {
    match command {
        JiraCommand::Create(args) => commands::tickets::create(creator, args, renderer).await,
        JiraCommand::Comment { key, body } => {
            commands::tickets::comment(creator, &key, &body, renderer).await
        }
        JiraCommand::Transition { key, transition_id } => {
            commands::tickets::transition(creator, &key, transition_id, renderer).await
        }
        JiraCommand::Search(args) => commands::search::search(creator, args, renderer).await,
        JiraCommand::Sprint(command) => commands::agile::handle_sprint(creator, command, renderer).await,
        JiraCommand::Board(command) => commands::agile::handle_board(creator, command, renderer).await,
    }
}

fn request_context(user: Option<String>, environment: Option<String>) -> Result<TicketRequestContext> {
    let username = user
        .or_else(|| std::env::var("USER").ok())
        .filter(|u| !u.trim().is_empty())
        .ok_or_else(|| anyhow!("No user given. Pass --user or set TICKETBRIDGE_USER."))?;

    let context = TicketRequestContext::new(username);
    Ok(match environment {
        Some(env) => context.with_environment(env),
        None => context,
    })
}

fn init_tracing(debug: bool) -> Result<()> {
    let default = if debug {
        "info,ticketbridge=debug,ticketbridge_jira=debug,ticketbridge_api=debug"
    } else {
        "info"
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));

    fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init()
        .map_err(|err| anyhow!("failed to initialize logger: {err}"))
}
