mod config;
mod dedup;
mod geo;
mod notify;
mod relevance;
mod scheduler;
mod session;
mod spawn;
mod species;

use crate::config::Config;
use crate::geo::{LatLng, ReverseGeocoder};
use crate::notify::Dispatcher;
use crate::relevance::SpeciesRarityEngine;
use crate::scheduler::PollScheduler;
use crate::session::GameClient;
use std::path::Path;
use std::time::Duration;
use tracing::{error, info};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env if present
    let _ = dotenvy::dotenv();

    // Load config
    let config = if Path::new("spawnwatch.toml").exists() {
        Config::load(Path::new("spawnwatch.toml"))?
    } else {
        Config::from_env()?
    };

    // Initialize logging
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(&config.logging.level));

    if config.logging.json {
        tracing_subscriber::fmt()
            .json()
            .with_env_filter(env_filter)
            .init();
    } else {
        tracing_subscriber::fmt()
            .with_env_filter(env_filter)
            .init();
    }

    info!("spawnwatch v{} starting", env!("CARGO_PKG_VERSION"));

    let http = reqwest::Client::builder()
        .user_agent(concat!("spawnwatch/", env!("CARGO_PKG_VERSION")))
        .timeout(Duration::from_secs(30))
        .build()?;

    // --- Session Init ---
    let location = config.location();
    let mut session = GameClient::new(config.game.api_url.clone(), http.clone());
    let player = match session
        .init(
            &config.game.username,
            &config.game.password,
            &config.game.auth_provider,
            &location,
        )
        .await
    {
        Ok(player) => player,
        Err(e) => {
            error!(error = %e, "session init failed");
            std::process::exit(2);
        }
    };
    info!(location = %player.location_name, "current location");
    info!(
        lat = player.latitude,
        lon = player.longitude,
        alt = player.altitude,
        "session position"
    );

    let profile = match session.get_profile().await {
        Ok(profile) => profile,
        Err(e) => {
            error!(error = %e, "profile fetch failed");
            std::process::exit(3);
        }
    };
    info!(username = %profile.username, "profile loaded");

    // --- Pipeline Wiring ---
    let anchor = LatLng::new(player.latitude, player.longitude);
    let engine = SpeciesRarityEngine::from_config(&config.relevance);

    let webhook_url = config.webhook_url().map(str::to_string);
    if webhook_url.is_none() {
        info!("SLACK_WEBHOOK_URL not set - notifications will only be logged");
    }
    let geocoder = ReverseGeocoder::new(http.clone(), config.notify.geocode_url.clone());
    let dispatcher = Dispatcher::new(http, webhook_url, geocoder);

    let mut scheduler =
        PollScheduler::new(session, engine, dispatcher, anchor, config.poll.offset_deg);

    // --- Poll Loop ---
    // The first tick fires immediately, then on the fixed period. Cycles
    // are awaited here, so they never overlap.
    let mut ticker = tokio::time::interval(Duration::from_secs(config.poll.interval_secs));
    info!(
        interval_secs = config.poll.interval_secs,
        "entering poll loop - press Ctrl+C to stop"
    );

    loop {
        tokio::select! {
            _ = ticker.tick() => {
                if let Err(e) = scheduler.run_cycle().await {
                    error!(error = %e, "session desynced, exiting");
                    std::process::exit(3);
                }
            }

            _ = tokio::signal::ctrl_c() => {
                info!("shutting down...");
                break;
            }
        }
    }

    Ok(())
}
