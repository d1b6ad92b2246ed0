mod cmd;
mod config;
mod context;
mod credentials;
mod domain;
mod error;
mod identity;
mod infra;
mod services;
mod storage;
#[cfg(test)]
mod testing;
mod views;
mod workflow;

use std::sync::Arc;

use clap::{Parser, Subcommand};
use tracing::warn;
use tracing_subscriber::EnvFilter;

use crate::cmd::analysis::{self, AnalysisArgs};
use crate::cmd::auth::{self, LoginArgs};
use crate::cmd::config::{self as config_cmd, ConfigArgs};
use crate::cmd::entry::{self, EntryArgs};
use crate::cmd::parse::{self, ParseArgs};
use crate::cmd::team::{self, MemberArgs, TeamCommand};
use crate::config::AppConfig;
use crate::context::AppContext;
use crate::credentials::{CredentialChain, KeyStore};
use crate::error::{AppError, AppResult};
use crate::identity::{IdentityStore, Session};
use crate::infra::llm::OpenAiClient;
use crate::infra::work_api::WorkApiClient;
use crate::storage::LocalStorage;

#[derive(Parser)]
#[command(name = "worklog", author, version, about = "Team work tracking from the terminal")]
struct Cli {
    /// Log debug output to stderr.
    #[arg(short, long, global = true)]
    verbose: bool,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Remember who you are on this machine.
    Login(LoginArgs),
    /// Forget the current user (the roster is kept).
    Logout,
    /// Show the current user.
    Whoami,
    /// List users who have logged in on this machine.
    Users,
    /// Become a previously seen user.
    Switch { username: String },
    /// Manage CLI configuration.
    Config(ConfigArgs),
    /// Manage teams.
    #[command(subcommand)]
    Team(TeamCommand),
    /// Manage team members.
    Member(MemberArgs),
    /// Record, list and edit work entries.
    Entry(EntryArgs),
    /// Extract work entries from free-form text with the language model.
    Parse(ParseArgs),
    /// Team and personal analysis.
    Analysis(AnalysisArgs),
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    if let Err(error) = run(cli.command).await {
        eprintln!("Error: {error}");
        if let Some(raw) = error.raw_response() {
            eprintln!("Raw response:\n{raw}");
        }
        std::process::exit(1);
    }
}

fn init_tracing(verbose: bool) {
    let default_level = if verbose { "debug" } else { "warn" };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)),
        )
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

async fn run(command: Commands) -> AppResult<()> {
    let output = match command {
        Commands::Config(args) => return config_cmd::run(args.command),
        Commands::Login(args) => {
            let user = auth::login(&mut open_identity()?, args)?;
            format!("Logged in as {}.\n", auth::describe_user(&user))
        }
        Commands::Logout => {
            open_identity()?.logout()?;
            "Logged out.\n".to_string()
        }
        Commands::Whoami => match open_identity()?.session() {
            Ok(session) => format!("{}\n", auth::describe_user(session.user())),
            Err(AppError::Identity(_)) => "Not logged in.\n".to_string(),
            Err(err) => return Err(err),
        },
        Commands::Users => {
            let mut out = String::new();
            for line in auth::roster(&open_identity()?)? {
                out.push_str(&line);
                out.push('\n');
            }
            out
        }
        Commands::Switch { username } => {
            auth::switch(&mut open_identity()?, &username)?;
            format!("Switched to {}.\n", username.trim())
        }
        Commands::Team(command) => team::run_team(&load_context()?, command).await?,
        Commands::Member(args) => team::run_member(&load_context()?, args).await?,
        Commands::Entry(args) => {
            let session = open_identity()?.session()?;
            entry::run(&load_context()?, &session, args).await?
        }
        Commands::Parse(args) => {
            let session = open_identity()?.session()?;
            let ctx = load_context()?;
            let credentials = open_credentials(&ctx.config)?;
            let text = parse::read_input(args.file.as_ref())?;
            parse::run(&ctx, &session, credentials, &text, &args).await?
        }
        Commands::Analysis(args) => {
            let session = open_identity()?.current_user()?.map(Session::new);
            let ctx = load_context()?;
            let load_credentials = || open_credentials(&ctx.config);
            analysis::run(&ctx, session.as_ref(), &load_credentials, args).await?
        }
    };

    print!("{output}");
    Ok(())
}

fn open_identity() -> AppResult<IdentityStore> {
    let config = AppConfig::load()?;
    Ok(IdentityStore::new(LocalStorage::open(&config.storage_path)?))
}

fn open_credentials(config: &AppConfig) -> AppResult<CredentialChain> {
    let store = KeyStore::new(LocalStorage::open(&config.storage_path)?);
    Ok(CredentialChain::standard(store))
}

fn load_context() -> AppResult<AppContext> {
    let config = AppConfig::load()?;
    if config.api_token.is_none() {
        warn!("work API token not configured; requests are sent unauthenticated");
    }
    Ok(build_context(config))
}

fn build_context(config: AppConfig) -> AppContext {
    let work_api = Arc::new(WorkApiClient::new(
        config.api_base_url.clone(),
        config.api_token.clone(),
    ));
    let language_model = Arc::new(OpenAiClient::new(config.openai_base_url.clone()));
    AppContext::new(config, work_api, language_model)
}
