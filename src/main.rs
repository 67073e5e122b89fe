use std::sync::Arc;

use actix_web::web;
use anyhow::Context;
use dotenv::dotenv;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use voicebuilder::config::AppConfig;
use voicebuilder::crypto::TokenCrypto;
use voicebuilder::db::{create_pool, run_migrations};
use voicebuilder::http_server::{run_http_server, AppState};
use voicebuilder::observability::metrics::Metrics;
use voicebuilder::services::query_cache::QueryCache;
use voicebuilder::services::rollup_scheduler::run_rollup_scheduler;

fn init_tracing(json: bool) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into());
    let registry = tracing_subscriber::registry().with(filter);

    if json {
        registry.with(tracing_subscriber::fmt::layer().json()).init();
    } else {
        registry.with(tracing_subscriber::fmt::layer()).init();
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenv().ok();

    let config = match AppConfig::from_env() {
        Ok(config) => config,
        Err(e) => {
            init_tracing(false);
            tracing::error!("Configuration error:\n{}", e);
            return Err(e.into());
        }
    };
    init_tracing(config.is_json_logging());

    let pool = create_pool(&config.database_url).context("Failed to create database pool")?;

    match run_migrations(&pool) {
        Ok(0) => tracing::info!("Database schema is up to date"),
        Ok(applied) => tracing::info!("Applied {} migration(s)", applied),
        Err(e) => {
            tracing::error!("Migration error: {}", e);
            anyhow::bail!("Database migration failed: {}", e);
        }
    }

    let crypto = TokenCrypto::from_hex_key(&config.token_encryption_key)?;
    let metrics = Arc::new(Metrics::new());

    if config.is_analytics_scheduler_active() {
        tokio::spawn(run_rollup_scheduler(pool.clone(), metrics.clone()));
    } else {
        tracing::info!("Analytics rollup scheduler disabled (set ANALYTICS_SCHEDULER=ACTIVE)");
    }

    let state = web::Data::new(AppState {
        pool,
        crypto,
        metrics,
        cache: QueryCache::new(config.cache_ttl),
        tool_webhook_base_url: config.tool_webhook_base_url.clone(),
    });

    run_http_server(state, config.port)
        .await
        .context("HTTP server error")?;

    Ok(())
}
