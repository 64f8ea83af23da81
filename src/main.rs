mod api;
mod clock;
mod comparator;
mod error;
mod judge;
mod ranking;
mod runner;
mod settings;
mod store;
mod verdict;

use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use tracing::info;

use crate::api::AppState;
use crate::runner::InterpreterRunner;
use crate::settings::Settings;
use crate::store::ContestStore;

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("arbiter=info".parse()?),
        )
        .init();

    dotenvy::dotenv().ok();

    let settings = Settings::from_env()?;

    info!("Starting Arbiter judge service...");

    let store = ContestStore::load(&settings.fixtures_path)
        .with_context(|| format!("Failed to load contest from {}", settings.fixtures_path))?;

    let (interpreter, args) = settings
        .interpreter
        .split_first()
        .context("Empty interpreter command")?;
    let runner = InterpreterRunner::new(
        interpreter.as_str(),
        args.to_vec(),
        settings.source_suffix.clone(),
        Duration::from_millis(settings.test_timeout_ms),
    );
    info!(
        "Runner ready: interpreter={:?}, timeout={}ms",
        settings.interpreter, settings.test_timeout_ms
    );

    let state = AppState {
        store: Arc::new(store),
        runner: Arc::new(runner),
    };
    let app = api::router(state);

    let listener = tokio::net::TcpListener::bind(&settings.bind_addr)
        .await
        .with_context(|| format!("Failed to bind {}", settings.bind_addr))?;
    info!("Listening on {}", settings.bind_addr);

    axum::serve(listener, app).await?;

    Ok(())
}
