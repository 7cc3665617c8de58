/*
 * Responsibility
 * - load Config -> build dependencies -> assemble the Router
 * - apply HTTP middleware (request id, trace, limits, timeout)
 * - serve with axum::serve() until Ctrl-C
 */
use std::{panic, process};

use anyhow::{Context, Result};
use auth::{Authenticator, TokenCodec};
use axum::Router;
use sqlx::postgres::PgPoolOptions;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use crate::{
    api, config::Config, middleware, services::identity::PgSubjectChecker, state::AppState,
};

fn init_tracing() {
    // RUST_LOG wins if set, e.g. RUST_LOG=info,auth=debug,tower_http=debug
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info,tower_http=info"));

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer())
        .init();
}

fn init_panic_hook(abort_on_panic: bool) {
    let default_hook = panic::take_hook();

    panic::set_hook(Box::new(move |info| {
        tracing::error!(?info, "panic");

        // Development fails fast; production keeps serving.
        if abort_on_panic {
            process::abort();
        } else {
            default_hook(info);
        }
    }))
}

pub async fn run() -> Result<()> {
    init_tracing();
    let config = Config::from_env()?;
    init_panic_hook(!config.app_env.is_production());

    tracing::info!(
        "starting customers API in {:?} mode on {}",
        config.app_env,
        config.addr
    );

    let state = build_state(&config).await?;
    let app = build_router(state, &config);

    let listener = tokio::net::TcpListener::bind(config.addr)
        .await
        .with_context(|| format!("failed to bind {}", config.addr))?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("customers API stopped");
    Ok(())
}

async fn build_state(config: &Config) -> Result<AppState> {
    let db = PgPoolOptions::new()
        .max_connections(10)
        .connect(&config.database_url)
        .await
        .context("failed to connect to DATABASE_URL")?;

    let codec = TokenCodec::new(&config.auth_secret, config.token_ttl_seconds);

    // The customers table is the identity store, so tokens are verified in-process.
    let auth = Authenticator::local(codec.clone(), PgSubjectChecker::new(db.clone()))
        .with_cache(config.auth_cache_ttl, config.auth_cache_capacity);

    Ok(AppState::new(db, codec, auth))
}

fn build_router(state: AppState, config: &Config) -> Router {
    let router = Router::new()
        .nest("/api/v1", api::v1::routes(&state))
        .with_state(state);

    middleware::http::apply(router, config.request_timeout)
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    tracing::info!("shutdown signal received");
}
