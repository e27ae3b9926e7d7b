mod app_state;
mod camera;
mod config;
mod core;
mod polling;
mod printer;
mod printer_service;
mod web;

use std::{env, sync::Arc};

use anyhow::Context;
use app_state::AppState;
use config::AppConfig;
use crate::core::state::PrinterConfig;
use printer::factory::{ClientFactory, RegisteredClients};
use tracing::{info, warn};
use tracing_appender::rolling;

/// One-shot `get_printer_state` plus a short summary against the printer
/// described by `PRINTER_TYPE`, `PRINTER_URL` and `PRINTER_API_KEY`.
async fn probe_printer() -> anyhow::Result<()> {
    let printer_config = PrinterConfig {
        printer_type: env::var("PRINTER_TYPE").ok(),
        base_url: env::var("PRINTER_URL").context("PRINTER_URL is required")?,
        api_key: env::var("PRINTER_API_KEY").unwrap_or_default(),
        name: "probe".to_owned(),
    };
    let client = RegisteredClients.create(&printer_config)?;
    let state = client.get_printer_state().await?;
    println!("{}", serde_json::to_string_pretty(&state)?);

    println!("{}", printer::summary(client.as_ref()).await?);
    Ok(())
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let _ = dotenvy::dotenv();

    if env::args().any(|arg| arg == "--probe-printer") {
        return probe_printer().await;
    }

    let config = AppConfig::from_env()?;

    tokio::fs::create_dir_all(&config.log_dir).await?;
    let file_appender = rolling::daily(&config.log_dir, "printlink.log");
    let (non_blocking, _log_guard) = tracing_appender::non_blocking(file_appender);

    tracing_subscriber::fmt()
        .with_ansi(false)
        .with_writer(non_blocking)
        .with_max_level(if config.log_debug {
            tracing::Level::DEBUG
        } else {
            tracing::Level::INFO
        })
        .init();

    if config.api_token.is_none() {
        warn!("API_TOKEN not set; control routes are open");
    }

    let state = Arc::new(AppState::new(config.clone()));
    let app = web::routes::build_router(state.clone());

    info!("{} listening on {}", config.app_name, config.bind_addr);
    let listener = tokio::net::TcpListener::bind(config.bind_addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(async {
            let _ = tokio::signal::ctrl_c().await;
        })
        .await?;

    info!("shutting down printer polling");
    state.shutdown().await;

    Ok(())
}
