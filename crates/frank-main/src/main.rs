// Copyright (c) 2025 SOLARE S.R.O.
//
// This file is part of FluxION.
//
// Licensed under the Creative Commons Attribution-NonCommercial-NoDerivatives 4.0 International
// (CC BY-NC-ND 4.0). You may use and share this file for non-commercial purposes only and you may not
// create derivatives. See <https://creativecommons.org/licenses/by-nc-nd/4.0/>.
//
// This software is provided "AS IS", without warranty of any kind.
//
// For commercial licensing, please contact: info@solare.cz

//! Frank Energie price service: keeps a refreshed snapshot of market prices
//! and account data, renewing tokens as they expire.

mod config;

use anyhow::{Context, Result};
use chrono::Utc;
use clap::{Parser, Subcommand};
use config::AppConfig;
use frank_api::FrankEnergieApi;
use frank_core::{
    ConfigEntry, ConfigEntryStore, FrankEnergieCoordinator, JsonFileStore, RefreshHandle,
    UpdateScheduler, UpdateStatus,
};
use frank_types::{Price, RefreshSnapshot};
use frank_types::constants::{ATTRIBUTION, CONF_SITE_REFERENCE};
use serde_json::Value;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;
use tracing::{error, info, warn};
use tracing_subscriber::{EnvFilter, FmtSubscriber};

/// How often the config entry is re-read while waiting for new credentials
const REAUTH_POLL_INTERVAL: Duration = Duration::from_secs(60);

#[derive(Debug, Parser)]
#[command(name = "frank-energie", version, about = "Frank Energie price service")]
struct Cli {
    /// Configuration file (TOML or JSON)
    #[arg(short, long)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Refresh on the configured interval until interrupted (default)
    Run,
    /// Refresh once and print the snapshot as JSON
    Once,
    /// Log in and store the issued tokens in the config entry
    Login {
        #[arg(long)]
        email: String,
        #[arg(long)]
        password: String,
        #[arg(long)]
        site_reference: Option<String>,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let (config, source) = AppConfig::load(cli.config.as_deref())?;

    // RUST_LOG wins over the configured level
    let subscriber = FmtSubscriber::builder()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .or_else(|_| EnvFilter::try_new(&config.log_level))
                .unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .finish();
    tracing::subscriber::set_global_default(subscriber)
        .context("Failed to install tracing subscriber")?;

    info!("Loaded configuration from {}", source);

    let store = Arc::new(
        JsonFileStore::open(&config.entry_path).with_context(|| {
            format!("Failed to open config entry {}", config.entry_path.display())
        })?,
    );
    let api = Arc::new(FrankEnergieApi::with_base_url(
        config.data_url.clone(),
        store.entry().tokens(),
    )?);

    match cli.command.unwrap_or(Command::Run) {
        Command::Run => run(&config, api, store).await,
        Command::Once => once(&config, api, store).await,
        Command::Login {
            email,
            password,
            site_reference,
        } => login(&api, store.as_ref(), &email, &password, site_reference).await,
    }
}

async fn login(
    api: &FrankEnergieApi,
    store: &JsonFileStore,
    email: &str,
    password: &str,
    site_reference: Option<String>,
) -> Result<()> {
    let tokens = api.login(email, password).await.context("Login failed")?;

    let mut data = ConfigEntry::token_data(&tokens);
    if let Some(site_reference) = site_reference {
        data.insert(CONF_SITE_REFERENCE.to_string(), Value::String(site_reference));
    }
    store.update_entry(data)?;

    info!("Stored tokens in {}", store.path().display());
    Ok(())
}

async fn once(
    config: &AppConfig,
    api: Arc<FrankEnergieApi>,
    store: Arc<JsonFileStore>,
) -> Result<()> {
    let mut coordinator = FrankEnergieCoordinator::new(api, store)
        .with_update_interval(config.update_interval());

    let snapshot = match coordinator.refresh_at(Utc::now()).await {
        Ok(snapshot) => snapshot,
        Err(e) if e.is_reauth() => {
            return Err(e).context("Run `frank-energie login` to store new credentials");
        }
        Err(e) => return Err(e.into()),
    };
    println!("{}", serde_json::to_string_pretty(snapshot.as_ref())?);
    Ok(())
}

async fn run(
    config: &AppConfig,
    api: Arc<FrankEnergieApi>,
    store: Arc<JsonFileStore>,
) -> Result<()> {
    let store_handle: Arc<dyn ConfigEntryStore> = store.clone();
    let coordinator = FrankEnergieCoordinator::new(Arc::clone(&api), store_handle)
        .with_update_interval(config.update_interval());

    info!(
        "Starting Frank Energie service ({}, site reference: {})",
        ATTRIBUTION,
        coordinator.site_reference().as_deref().unwrap_or("none")
    );

    let scheduler = UpdateScheduler::new(coordinator);
    tokio::spawn(log_snapshots(scheduler.subscribe()));
    tokio::spawn(watch_for_reauth(
        scheduler.status(),
        scheduler.handle(),
        api,
        store,
    ));

    scheduler
        .run(async {
            if let Err(e) = tokio::signal::ctrl_c().await {
                error!("Failed to listen for shutdown signal: {e}");
            }
        })
        .await;

    info!("Shutting down");
    Ok(())
}

/// Stand-in consumer: report the current prices whenever a snapshot arrives
async fn log_snapshots(mut data: watch::Receiver<Option<Arc<RefreshSnapshot>>>) {
    while data.changed().await.is_ok() {
        let Some(snapshot) = data.borrow_and_update().clone() else {
            continue;
        };

        let now = Utc::now();
        let electricity = snapshot.electricity.current(now).map(Price::total);
        let gas = snapshot.gas.current(now).map(Price::total);
        info!(
            "💰 Prices now: electricity {:?} EUR/kWh, gas {:?} EUR/m³ ({} upcoming electricity prices)",
            electricity,
            gas,
            snapshot.electricity.future_prices(now).len()
        );

        if let Some(summary) = &snapshot.month_summary {
            info!(
                "   Month: {:.2} EUR actual vs {:.2} EUR expected until {}",
                summary.actual_costs_until_last_meter_reading_date,
                summary.expected_costs_until_last_meter_reading_date,
                summary.last_meter_reading_date
            );
        }
    }
}

/// Resume polling once the config entry gets new tokens or a new site reference
async fn watch_for_reauth(
    mut status: watch::Receiver<UpdateStatus>,
    handle: RefreshHandle,
    api: Arc<FrankEnergieApi>,
    store: Arc<JsonFileStore>,
) {
    while status.changed().await.is_ok() {
        let reauth_reason = match &*status.borrow_and_update() {
            UpdateStatus::ReauthRequired(reason) => reason.clone(),
            _ => continue,
        };

        error!(
            "Reauthentication required ({}). Run `frank-energie login` to store new credentials",
            reauth_reason
        );

        let rejected_tokens = api.tokens();
        let rejected_site = store.entry().site_reference().map(str::to_string);
        loop {
            tokio::time::sleep(REAUTH_POLL_INTERVAL).await;

            match store.reload() {
                Ok(entry) => {
                    let tokens = entry.tokens();
                    let new_tokens = tokens.is_some() && tokens != rejected_tokens;
                    let new_site = entry.site_reference() != rejected_site.as_deref();
                    if new_tokens || new_site {
                        info!("New credentials found, resuming updates");
                        api.set_tokens(tokens);
                        if !handle.request_refresh() {
                            return;
                        }
                        break;
                    }
                }
                Err(e) => warn!("Failed to reload config entry: {e}"),
            }
        }
    }
}
