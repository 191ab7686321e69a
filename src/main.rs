//! Binary entrypoint wiring the game engine, REST routes and backends.

use std::{env, net::SocketAddr, sync::Arc};

use anyhow::Context;
use axum::Router;
use tokio::net::TcpListener;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod config;
mod dao;
mod dto;
mod error;
mod routes;
mod services;
mod state;

use dao::{
    leaderboard::{LeaderboardStore, MemoryLeaderboard},
    question_source::{DirQuestionSource, QuestionSource},
};
use state::AppState;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_tracing();

    let config = config::AppConfig::load();
    let question_source = question_source_from_env()?;
    let leaderboard = leaderboard_from_env()?;

    let app_state = AppState::new(config, question_source, leaderboard);
    let app = build_router(app_state);

    let port = env::var("PORT")
        .or_else(|_| env::var("SERVER_PORT"))
        .ok()
        .and_then(|value| value.parse::<u16>().ok())
        .unwrap_or(8080);

    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    info!(%addr, "starting server");

    let listener = TcpListener::bind(addr).await.context("binding server")?;
    let service = app.into_make_service();
    axum::serve(listener, service)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("serving axum")?;

    Ok(())
}

/// Pick the question source: a remote corpus service when configured,
/// a local directory of `.txt` sets otherwise.
fn question_source_from_env() -> anyhow::Result<Arc<dyn QuestionSource>> {
    #[cfg(feature = "http-sets")]
    if let Ok(base_url) = env::var("QUESTION_SETS_URL") {
        info!(%base_url, "using remote question source");
        let source = dao::question_source::HttpQuestionSource::new(&base_url)?;
        return Ok(Arc::new(source));
    }

    let dir = env::var("QUESTION_SETS_DIR").unwrap_or_else(|_| "question-sets".into());
    info!(%dir, "using local question set directory");
    Ok(Arc::new(DirQuestionSource::new(dir)))
}

/// Pick the leaderboard backend: a remote score service when
/// configured, the in-memory store otherwise.
fn leaderboard_from_env() -> anyhow::Result<Arc<dyn LeaderboardStore>> {
    #[cfg(feature = "remote-leaderboard")]
    if let Ok(base_url) = env::var("LEADERBOARD_URL") {
        info!(%base_url, "using remote leaderboard");
        let store = dao::leaderboard::RemoteLeaderboard::new(&base_url)?;
        return Ok(Arc::new(store));
    }

    info!("using in-memory leaderboard");
    Ok(Arc::new(MemoryLeaderboard::new()))
}

/// Build the top-level router and attach cross-cutting middleware layers.
fn build_router(state: state::SharedState) -> Router<()> {
    routes::router(state)
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
}

/// Configure tracing subscribers so logs include spans by default.
fn init_tracing() {
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "info,tower_http=debug".into());
    tracing_subscriber::registry()
        .with(env_filter)
        .with(tracing_subscriber::fmt::layer())
        .init();
}

/// Wait for Ctrl+C or SIGTERM and shut the server down gracefully.
async fn shutdown_signal() {
    #[cfg(unix)]
    {
        use tokio::signal::unix::{SignalKind, signal};

        let mut term = signal(SignalKind::terminate()).expect("install SIGTERM handler");
        tokio::select! {
            _ = tokio::signal::ctrl_c() => {},
            _ = term.recv() => {},
        }
    }

    #[cfg(not(unix))]
    {
        let _ = tokio::signal::ctrl_c().await;
    }
}
