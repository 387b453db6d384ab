use std::net::SocketAddr;
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use orderdesk_core::UserId;
use teloxide::prelude::*;
use tracing::{error, info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod bot;
mod cli;
mod config;
mod handlers;
mod messenger;
mod services;
mod state;

use crate::config::BotConfig;
pub use crate::state::AppState;

#[derive(Parser)]
#[command(name = "orderdesk-bot")]
#[command(version, about = "Telegram order desk and digital store bot", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the bot and the HTTP endpoints (default)
    Serve,
    /// Edit the admin file offline
    Admins {
        /// Admin file to edit
        #[arg(long, env = "ADMINS_FILE", default_value = "admins.json", global = true)]
        file: PathBuf,
        #[command(subcommand)]
        action: AdminAction,
    },
}

#[derive(Subcommand)]
enum AdminAction {
    /// Print every admin id
    List,
    /// Add an admin id
    Add { id: UserId },
    /// Remove an admin id
    Remove { id: UserId },
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                "orderdesk_bot=info,orderdesk_core=info,tower_http=info".into()
            }),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    match cli.command.unwrap_or(Commands::Serve) {
        Commands::Serve => serve().await,
        Commands::Admins { file, action } => match action {
            AdminAction::List => cli::list_admins(&file).await,
            AdminAction::Add { id } => cli::add_admin(&file, id).await,
            AdminAction::Remove { id } => cli::remove_admin(&file, id).await,
        },
    }
}

async fn serve() -> Result<()> {
    let config = BotConfig::load()?;
    info!("Starting orderdesk bot v{}...", env!("CARGO_PKG_VERSION"));
    info!("Admin file: {}", config.admins_file.display());
    info!("Digital store: {}", if config.store_enabled() { "enabled" } else { "disabled" });

    let bot = Bot::new(config.bot_token.clone());
    let me = bot
        .get_me()
        .await
        .context("Bot failed to connect to Telegram, check BOT_TOKEN")?;
    let username = me.username.clone().unwrap_or_default();
    info!("Bot connected as: @{}", username);

    let state = AppState::build(&config, bot.clone(), &username).await?;
    let (shutdown_tx, _) = tokio::sync::broadcast::channel(1);

    let webhook = config.webhook_endpoint();
    let polling = match &webhook {
        Some(endpoint) => {
            let url = reqwest::Url::parse(endpoint)
                .with_context(|| format!("Invalid WEBHOOK_URL: {}", endpoint))?;
            let mut request = bot.set_webhook(url);
            if let Some(secret) = &config.webhook_secret {
                request = request.secret_token(secret.clone());
            }
            request.await.context("Failed to register webhook")?;
            info!("Webhook registered at {}", endpoint);
            None
        }
        None => {
            bot.delete_webhook()
                .await
                .context("Failed to clear webhook before polling")?;
            Some(tokio::spawn(bot::run_bot(
                bot.clone(),
                shutdown_tx.subscribe(),
                state.clone(),
            )))
        }
    };

    let app = handlers::router(state);
    let addr = SocketAddr::from(([0, 0, 0, 0], config.port));
    info!("HTTP listening on {}", addr);
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    let _ = shutdown_tx.send(());
    if let Some(task) = polling {
        if let Err(e) = task.await {
            error!("Polling task failed: {}", e);
        }
    }
    if webhook.is_some() {
        match bot.delete_webhook().await {
            Ok(_) => info!("Webhook removed"),
            Err(e) => warn!("Failed to remove webhook: {}", e),
        }
    }
    info!("Shutdown complete");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            error!("Failed to listen for Ctrl+C: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                error!("Failed to listen for SIGTERM: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };
    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
    info!("Shutdown signal received");
}
