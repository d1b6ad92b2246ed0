use std::io::{self, Write};

use clap::{Args, Subcommand};

use crate::config::{AppConfig, StoredConfig, config_file_path};
use crate::credentials::{CredentialChain, KeyStore};
use crate::error::{AppError, AppResult};
use crate::storage::LocalStorage;

#[derive(Args, Debug, Clone)]
pub struct ConfigArgs {
    #[command(subcommand)]
    pub command: ConfigCommand,
}

#[derive(Subcommand, Debug, Clone)]
pub enum ConfigCommand {
    /// Run the interactive configuration wizard.
    Init,
    /// Show the stored configuration (secrets masked).
    Show,
    /// Store the language model API key locally.
    SetKey {
        /// The key; read from stdin when omitted.
        key: Option<String>,
    },
    /// Remove the locally stored language model API key.
    ClearKey,
    /// Report which source supplies the language model API key.
    KeyStatus,
}

pub fn run(command: ConfigCommand) -> AppResult<()> {
    match command {
        ConfigCommand::Init => run_init(),
        ConfigCommand::Show => run_show(),
        ConfigCommand::SetKey { key } => run_set_key(key),
        ConfigCommand::ClearKey => run_clear_key(),
        ConfigCommand::KeyStatus => run_key_status(),
    }
}

fn run_init() -> AppResult<()> {
    let mut cfg = StoredConfig::load()?;

    println!("Configuring worklog.");
    println!("Press Enter to keep the current value, '-' to clear it.");
    println!("Secrets are stored in the local config file; protect your filesystem accordingly.");
    println!();

    apply_prompt(
        "Work API base URL (e.g., https://curieus.net)",
        &mut cfg.api_base_url,
        false,
    )?;
    apply_prompt("Work API token", &mut cfg.api_token, true)?;
    apply_prompt("Default team", &mut cfg.default_team, false)?;
    apply_prompt("Language model", &mut cfg.openai_model, false)?;
    apply_prompt(
        "Language model base URL (e.g., https://api.openai.com)",
        &mut cfg.openai_base_url,
        false,
    )?;

    cfg.save()?;

    let path = config_file_path()?;
    println!("\nConfiguration saved to {}", path.display());
    println!("Use `worklog config set-key` to store the language model API key.");
    Ok(())
}

fn run_show() -> AppResult<()> {
    let cfg = StoredConfig::load()?;
    let path = config_file_path()?;

    println!("Configuration file: {}", path.display());
    println!("Work API base URL: {}", display_value(&cfg.api_base_url));
    println!("Work API token: {}", mask_secret(&cfg.api_token));
    println!("Default team: {}", display_value(&cfg.default_team));
    println!("Language model: {}", display_value(&cfg.openai_model));
    println!(
        "Language model base URL: {}",
        display_value(&cfg.openai_base_url)
    );

    Ok(())
}

fn open_key_store() -> AppResult<KeyStore> {
    let config = AppConfig::load()?;
    Ok(KeyStore::new(LocalStorage::open(&config.storage_path)?))
}

fn run_set_key(key: Option<String>) -> AppResult<()> {
    let key = match key {
        Some(key) => key,
        None => {
            let mut stdout = io::stdout();
            write!(stdout, "Language model API key: ")?;
            stdout.flush()?;
            let mut input = String::new();
            io::stdin().read_line(&mut input)?;
            input
        }
    };
    if key.trim().is_empty() {
        return Err(AppError::Configuration("API key must not be empty".to_string()));
    }

    let mut store = open_key_store()?;
    store.set_key(&key)?;
    println!("API key stored ({}).", mask_secret(&Some(key.trim().to_string())));
    Ok(())
}

fn run_clear_key() -> AppResult<()> {
    let mut store = open_key_store()?;
    store.remove_key()?;
    println!("Stored API key removed.");
    Ok(())
}

fn run_key_status() -> AppResult<()> {
    let chain = CredentialChain::standard(open_key_store()?);
    match chain.resolve() {
        Some(credential) => println!("API key available from {}.", credential.source),
        None => println!("No API key configured; text parsing is unavailable."),
    }
    Ok(())
}

fn apply_prompt(field: &str, target: &mut Option<String>, secret: bool) -> AppResult<()> {
    match prompt(field, target.as_deref(), secret)? {
        PromptAction::Keep => {}
        PromptAction::Clear => *target = None,
        PromptAction::Set(value) => *target = Some(value),
    }
    Ok(())
}

fn prompt(field: &str, current: Option<&str>, secret: bool) -> AppResult<PromptAction> {
    let mut stdout = io::stdout();

    match (current, secret) {
        (Some(_), true) => write!(stdout, "{field} [****] (Enter to keep, '-' to clear): ")?,
        (Some(value), false) => {
            write!(stdout, "{field} [{value}] (Enter to keep, '-' to clear): ")?
        }
        (None, _) => write!(stdout, "{field} (Enter to skip): ")?,
    }
    stdout.flush()?;

    let mut input = String::new();
    io::stdin().read_line(&mut input)?;
    Ok(PromptAction::parse(&input))
}

fn display_value(value: &Option<String>) -> String {
    value
        .as_deref()
        .filter(|v| !v.is_empty())
        .map(|v| v.to_string())
        .unwrap_or_else(|| "<not set>".to_string())
}

fn mask_secret(value: &Option<String>) -> String {
    match value {
        Some(token) if token.chars().count() > 6 => {
            let chars: Vec<char> = token.chars().collect();
            let prefix: String = chars[..3].iter().collect();
            let suffix: String = chars[chars.len() - 3..].iter().collect();
            format!("{prefix}***{suffix}")
        }
        Some(token) if !token.is_empty() => "***".to_string(),
        _ => "<not set>".to_string(),
    }
}

#[derive(Debug, PartialEq)]
enum PromptAction {
    Keep,
    Clear,
    Set(String),
}

impl PromptAction {
    fn parse(input: &str) -> Self {
        let trimmed = input.trim();
        if trimmed.is_empty() {
            PromptAction::Keep
        } else if trimmed == "-" {
            PromptAction::Clear
        } else {
            PromptAction::Set(trimmed.to_string())
        }
    }
}
