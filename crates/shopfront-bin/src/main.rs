//! Shopfront CLI - Command-line client for the Shopfront backend.

mod commands;
mod output;

use anyhow::Result;
use clap::{Parser, Subcommand};
use shopfront_api::ApiClient;
use shopfront_core::{init_logging, Config, Paths};
use shopfront_session::SessionState;
use shopfront_storage::FileStore;
use std::sync::Arc;
use tracing::debug;

/// Shopfront CLI - Manage your account and payments from the terminal.
#[derive(Parser)]
#[command(name = "shopfront")]
#[command(about = "Shopfront CLI for account and payment management")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Output format (text or json)
    #[arg(short, long, default_value = "text", global = true)]
    format: output::OutputFormat,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, default_value = "warn", global = true)]
    log_level: String,
}

#[derive(Subcommand)]
enum Commands {
    /// Manage authentication
    Auth {
        #[command(subcommand)]
        command: AuthCommands,
    },

    /// Manage payments and subscriptions
    Payments {
        #[command(subcommand)]
        command: PaymentCommands,
    },
}

#[derive(Subcommand)]
enum AuthCommands {
    /// Create a new account
    Register,

    /// Login with email and password
    Login,

    /// Login with Google
    Google,

    /// Login with WeChat
    Wechat,

    /// Check authentication status
    Status,

    /// Logout and clear the stored session
    Logout,
}

#[derive(Subcommand)]
enum PaymentCommands {
    /// Show payment history
    History,

    /// List available subscription plans
    Plans,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    init_logging(&cli.log_level);

    let paths = Paths::new()?;
    paths.ensure_dirs()?;
    let config = Config::load(&paths)?;
    debug!(server_url = %config.server_url, "Loaded configuration");

    let store = Arc::new(FileStore::new(paths.credentials_file()));
    let session = SessionState::handle(store);
    let client = ApiClient::new(&config, session)?;

    match cli.command {
        Commands::Auth { command } => match command {
            AuthCommands::Register => commands::auth::register(&client, &cli.format).await,
            AuthCommands::Login => commands::auth::login(&client, &cli.format).await,
            AuthCommands::Google => commands::auth::login_with_google(&client, &cli.format).await,
            AuthCommands::Wechat => commands::auth::login_with_wechat(&client, &cli.format).await,
            AuthCommands::Status => commands::auth::status(&client, &cli.format).await,
            AuthCommands::Logout => commands::auth::logout(&client, &cli.format).await,
        },
        Commands::Payments { command } => match command {
            PaymentCommands::History => commands::payments::history(&client, &cli.format).await,
            PaymentCommands::Plans => commands::payments::plans(&client, &cli.format).await,
        },
    }
}
