//! # chatmoted: chatmote daemon
//!
//! Composition root that wires all adapters together and starts the server.
//!
//! ## Responsibilities
//! - Parse configuration (config file, env vars)
//! - Initialize logging
//! - Initialize the `SQLite` connection pool, run migrations and seed the
//!   default settings
//! - Build the simulated host page and its chatters
//! - Launch the background, content and page contexts
//! - Build the axum router on top of the background endpoint
//! - Bind to a TCP port and serve
//! - Handle graceful shutdown (Ctrl-C)
//!
//! ## Dependency rule
//! This is the **only** crate that depends on all other crates.
//! It is the wiring layer: no domain logic belongs here.

mod config;

use std::sync::Arc;

use chatmote_adapter_http_axum::state::AppState;
use chatmote_adapter_simulated::{Chatter, SimulatedPage, StaticCatalog};
use chatmote_adapter_storage_sqlite_sqlx::SqliteSettingsStore;
use chatmote_app::contexts::{Host, launch};
use tracing_subscriber::EnvFilter;

use crate::config::{Config, SimulationConfig};

fn init_tracing(filter: &str) {
    let filter = EnvFilter::try_new(filter).unwrap_or_else(|err| {
        eprintln!("invalid log filter {filter:?} ({err}), falling back to info");
        EnvFilter::new("info")
    });
    tracing_subscriber::fmt().with_env_filter(filter).init();
}

fn simulated_page(config: &SimulationConfig) -> SimulatedPage {
    let page = SimulatedPage::new(config.nickname.clone());
    if config.working_chat {
        page.with_working_chat()
    } else {
        page
    }
}

fn catalog(config: &SimulationConfig) -> StaticCatalog {
    if config.emoticons.is_empty() {
        StaticCatalog::demo()
    } else {
        StaticCatalog::new(config.emoticons.clone())
    }
}

async fn shutdown_signal() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %err, "cannot listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    tracing::info!("shutdown requested");
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let config = Config::load()?;
    init_tracing(&config.logging.filter);

    // Database
    let db = chatmote_adapter_storage_sqlite_sqlx::Config {
        database_url: config.database_url().to_string(),
    }
    .build()
    .await?;
    let settings = Arc::new(SqliteSettingsStore::new(db.pool().clone()));
    settings.install_defaults().await?;

    // Host page
    let page = Arc::new(simulated_page(&config.simulation));
    let catalog = catalog(&config.simulation);
    tracing::info!(
        nickname = page.nickname(),
        emoticons = catalog.len(),
        "simulated page ready"
    );

    // Contexts
    let contexts = launch(
        Host {
            page: Arc::clone(&page),
            globals: Arc::clone(&page),
            settings: Arc::clone(&settings),
            catalog,
            toasts: Arc::clone(&page),
        },
        config.router.options(),
    )
    .await;
    let chatter = Chatter::new(
        config.simulation.chatters.clone(),
        config.simulation.chat_interval(),
    )
    .spawn(Arc::clone(&page));

    // HTTP
    let state = AppState::new(
        contexts.background.clone(),
        settings,
        contexts.subscribe_status(),
    );
    let app = chatmote_adapter_http_axum::router::build(state);

    let bind_addr = config.bind_addr();
    let listener = tokio::net::TcpListener::bind(&bind_addr).await?;
    tracing::info!(addr = %bind_addr, "chatmoted listening");
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    if let Some(chatter) = chatter {
        chatter.abort();
    }
    contexts.shutdown().await;
    Ok(())
}
