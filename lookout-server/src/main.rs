//! Lookout Server
//!
//! Resolves public profile lookups through an asynchronous scraping actor,
//! fronted by a TTL cache.
//!
//! Architecture:
//! - Configuration: settings from the environment (and `.env`)
//! - Repositories: HTTP communication with the actor
//! - Services: polling, lookup coordination, alerts
//! - Cache: in-memory TTL store with a background sweep
//! - API: axum router with per-IP rate limits

mod api;
mod cache;
mod config;
mod repository;
mod service;

use anyhow::{Context, Result};
use lookout_client::{ActorClient, TelegramClient};
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use crate::api::rate_limit::RateLimit;
use crate::api::{AppState, RateLimits};
use crate::cache::{CacheStore, InMemoryCacheStore, spawn_sweeper};
use crate::config::Config;
use crate::repository::HttpActorRepository;
use crate::service::alert::wait_for_drain;
use crate::service::{CacheTtl, JobPoller, PollSettings, ProfileService, QueuedAlertSink};

/// Time allowed for queued alerts to go out after the server stops
const ALERT_DRAIN_GRACE: Duration = Duration::from_secs(5);

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "lookout_server=info,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting Lookout Server...");

    // Load environment variables from .env file (if exists)
    match dotenvy::dotenv() {
        Ok(_) => info!("Loaded environment variables from .env file"),
        Err(_) => info!("No .env file found, using system environment variables"),
    }

    let config = Config::from_env().context("Failed to load configuration")?;
    config.validate().context("Invalid configuration")?;
    info!(
        "Loaded configuration: actor={}, base_url={}",
        config.actor_id, config.apify_base_url
    );

    // One outbound client shared by every component
    let http = reqwest::Client::builder()
        .timeout(config.request_timeout)
        .build()
        .context("Failed to build HTTP client")?;

    let telegram = config.telegram.as_ref().map(|telegram| {
        TelegramClient::new(&telegram.bot_token, &telegram.chat_id, http.clone())
    });
    if telegram.is_none() {
        warn!("Telegram is not configured, alerts will only be logged");
    }
    let (alerts, alert_task) = QueuedAlertSink::spawn(config.alert_queue_capacity, telegram);

    let actor = ActorClient::with_client(
        &config.apify_base_url,
        &config.apify_token,
        &config.actor_id,
        http.clone(),
    );
    let poller = JobPoller::new(
        Arc::new(HttpActorRepository::new(actor)),
        PollSettings {
            interval: config.poll_interval,
            max_wait: config.max_wait,
        },
    );

    let cache: Arc<dyn CacheStore> = Arc::new(InMemoryCacheStore::new());
    let _sweeper = spawn_sweeper(Arc::clone(&cache), config.cache_sweep_interval);

    let profiles = ProfileService::new(
        cache,
        poller,
        alerts.clone(),
        CacheTtl {
            positive: config.cache_ttl,
            negative: config.negative_cache_ttl,
        },
    );

    info!("Services initialized");

    let limits = RateLimits {
        scrape: RateLimit::per_minute(config.scrape_rate_per_minute),
        image: RateLimit::per_minute(config.image_rate_per_minute),
    };
    spawn_limiter_pruning(limits.clone(), config.cache_sweep_interval);

    let state = AppState {
        profiles: Arc::new(profiles),
        alerts,
        http,
        image_max_bytes: config.image_max_bytes,
    };

    // Build router with all API endpoints
    let app = api::create_router(state, limits, api::cors_layer(&config.allowed_origins));

    info!("Listening on {}", config.bind_addr);

    let listener = tokio::net::TcpListener::bind(&config.bind_addr)
        .await
        .with_context(|| format!("Failed to bind to {}", config.bind_addr))?;

    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .with_graceful_shutdown(shutdown_signal())
    .await
    .context("Server error")?;

    // The router held the last alert sinks; the queue closes once it is dropped
    if !wait_for_drain(alert_task, ALERT_DRAIN_GRACE).await {
        warn!("Queued alerts were not delivered before shutdown");
    }

    info!("Server shutdown complete");
    Ok(())
}

/// Drops idle rate limiter buckets on the cache sweep schedule
fn spawn_limiter_pruning(limits: RateLimits, every: Duration) {
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(every);
        loop {
            ticker.tick().await;
            limits.scrape.prune();
            limits.image.prune();
        }
    });
}

async fn shutdown_signal() {
    use tokio::signal;

    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            warn!("Failed to listen for Ctrl+C: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
            }
            Err(e) => {
                warn!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            info!("Received Ctrl+C signal");
        },
        _ = terminate => {
            info!("Received terminate signal");
        },
    }

    info!("Shutting down gracefully...");
}
