// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0
use anyhow::{Context, Result};
use clap::Parser;
use kube::Client;
use tracing::{error, info};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use imagepullsecret_patcher::config::{Cli, Config};
use imagepullsecret_patcher::sync::SyncManager;

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    // RUST_LOG takes precedence over --debug
    let default_level = if cli.debug { "debug" } else { "info" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::registry()
        .with(fmt::layer())
        .with(filter)
        .init();

    info!("Application started");

    // Fatal errors are logged once here and nowhere else
    if let Err(e) = run(cli).await {
        error!("{:#}", e);
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> Result<()> {
    let config = Config::from_cli(cli)?;
    info!(
        "Configuration loaded: secret_name={}, force={}, managed_only={}, run_once={}, all_service_accounts={}, loop_duration={:?}",
        config.secret_name,
        config.force,
        config.managed_only,
        config.run_once,
        config.all_service_accounts,
        config.loop_duration
    );

    let client = Client::try_default()
        .await
        .context("Failed to create Kubernetes client")?;
    info!("Connected to Kubernetes cluster");

    SyncManager::new(client, &config).run().await?;

    Ok(())
}
