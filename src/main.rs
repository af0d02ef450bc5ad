//! Application entry point for the `plant-buddy` service.
//!
//! This binary orchestrates the full startup sequence:
//! - Loading configuration from environment variables or `.env`
//! - Initializing structured logging/tracing
//! - Loading and indexing the plant catalog
//! - Connecting the optional PostgreSQL telemetry store and creating its schema
//! - Setting up the optional plant identification client
//! - Mounting all API routes via the `routes` gateway
//! - Binding the Axum HTTP server and serving requests
//!
//! # Environment Variables
//! See [`plant_buddy::config::load_from_env`] for the service settings, plus:
//! - `APP_LOG_LEVEL` (optional) – log verbosity (default: `debug`)
//! - `APP_SPAN_EVENTS` (optional) – span event mode for tracing
//! - `FORCE_COLOR` (optional) – force colored output on or off
use std::{env, io::IsTerminal, net::SocketAddr};

use anyhow::Result;
use axum::Router;
use dotenvy::dotenv;
use sqlx::postgres::PgPoolOptions;
use tracing_subscriber::filter::EnvFilter;
use tracing_subscriber::fmt::format::FmtSpan;

use plant_buddy::identify::PlantNetClient;
use plant_buddy::{config, load_catalog, routes, schema};
use plant_buddy::{AppState, ExactResolver, FuzzyResolver, HealthScorer, Resolver};

// ---

#[tokio::main]
async fn main() -> Result<()> {
    // ---
    dotenv().ok();
    init_tracing();

    let cfg = config::load_from_env()?;
    cfg.log_config();

    let catalog = load_catalog(&cfg.catalog_path)?;

    let pool = match &cfg.db_url {
        Some(db_url) => {
            tracing::info!("Attempting to connect to database");
            let pool = PgPoolOptions::new()
                .max_connections(cfg.db_pool_max)
                .connect(db_url)
                .await
                .map_err(|e| anyhow::anyhow!("Failed to connect to database: {}", e))?;
            tracing::info!("Successfully connected to database");

            schema::create_schema(&pool).await?;
            Some(pool)
        }
        None => {
            tracing::warn!("DATABASE_URL not set, readings are kept in memory only");
            None
        }
    };

    let identifier = cfg
        .plantnet_api_key
        .as_ref()
        .map(|key| PlantNetClient::new(cfg.plantnet_api_url.clone(), key.clone()));
    if identifier.is_none() {
        tracing::warn!("PLANTNET_API_KEY not set, image identification is disabled");
    }

    let resolver = Resolver::new(
        ExactResolver::default(),
        FuzzyResolver::new(cfg.match_threshold, cfg.suggestion_limit),
        FuzzyResolver::new(cfg.suggestion_threshold, cfg.suggestion_limit),
    );
    let state = AppState::new(
        catalog,
        resolver,
        HealthScorer::new(cfg.local_zone),
        pool,
        identifier,
    );

    // Build app from routes gateway
    let app: Router = routes::router(state);

    let addr = SocketAddr::from(([0, 0, 0, 0], cfg.port));
    tracing::info!("Listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

// ---

/// Install the global subscriber. Colors follow `FORCE_COLOR` or the TTY,
/// span events follow `APP_SPAN_EVENTS` (`full`, `enter_exit`, else close
/// only) and the level comes from `RUST_LOG`, else `APP_LOG_LEVEL`.
fn init_tracing() {
    // ---
    let span_events = match env::var("APP_SPAN_EVENTS").as_deref() {
        Ok("full") => FmtSpan::FULL,
        Ok("enter_exit") => FmtSpan::ENTER | FmtSpan::EXIT,
        _ => FmtSpan::CLOSE,
    };

    let use_color = match env::var("FORCE_COLOR").as_deref() {
        Ok("1") | Ok("true") | Ok("yes") => true,
        Ok("0") | Ok("false") | Ok("no") => false,
        _ => std::io::stdout().is_terminal(),
    };

    let env_filter = if env::var("RUST_LOG").is_ok() {
        EnvFilter::from_default_env()
    } else {
        let level = match env::var("APP_LOG_LEVEL").ok().as_deref() {
            Some("trace") => "trace",
            Some("debug") => "debug",
            Some("info") => "info",
            Some("warn") => "warn",
            Some("error") => "error",
            _ => "debug",
        };
        EnvFilter::new(format!("{level},sqlx::query=warn,hyper=info,reqwest=info"))
    };

    tracing_subscriber::fmt()
        .with_target(true)
        .with_file(true)
        .with_line_number(true)
        .with_span_events(span_events)
        .with_env_filter(env_filter)
        .with_ansi(use_color)
        .compact()
        .init();
}
