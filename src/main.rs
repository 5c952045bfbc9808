//! Threadbot CLI entry point.

use anyhow::Context as _;
use clap::Parser;
use std::sync::Arc;
use threadbot::config::Config;
use threadbot::conversation::engine::ChatEngine;
use threadbot::conversation::store::HistoryStore;
use threadbot::llm::GeminiClient;
use threadbot::messaging::discord::DiscordHandler;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "threadbot")]
#[command(about = "A Discord bot that holds threaded conversations backed by Gemini")]
struct Cli {
    /// Enable debug logging
    #[arg(short, long)]
    debug: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let filter = if cli.debug {
        EnvFilter::new("debug")
    } else {
        EnvFilter::new("info")
    };
    tracing_subscriber::fmt().with_env_filter(filter).init();

    let config = Config::load().context("failed to load configuration from environment")?;
    tracing::info!(model = %config.gemini.model, "configuration loaded");

    let pool = threadbot::db::connect_lazy(&config.database);
    match threadbot::db::init_schema(&pool).await {
        Ok(()) => tracing::info!("database schema ready"),
        // The store degrades per call, so keep serving; writes will warn
        // until the database comes back.
        Err(error) => {
            tracing::warn!(%error, "could not initialize database schema, continuing without it")
        }
    }

    let store = Arc::new(HistoryStore::new(pool));
    let provider = Arc::new(
        GeminiClient::new(config.gemini.clone()).context("failed to build gemini client")?,
    );
    let engine = Arc::new(ChatEngine::new(store, provider, config.history_window));

    let mut client = serenity::Client::builder(&config.discord_token, DiscordHandler::intents())
        .event_handler(DiscordHandler::new(engine))
        .await
        .context("failed to build discord client")?;

    tracing::info!("starting discord client");
    tokio::select! {
        result = client.start() => {
            result.context("discord client stopped")?;
        }
        _ = tokio::signal::ctrl_c() => {
            tracing::info!("shutdown signal received");
        }
    }

    Ok(())
}
