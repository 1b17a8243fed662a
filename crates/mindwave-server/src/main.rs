//! Trial count server.
//!
//! Hosts the `/api/trials` endpoints in front of the hosted backend,
//! keeps the shared ledger cache warm with a background poller, and
//! mirrors counts into the durable state file so restarts start from
//! the last known values instead of the fallback constant.

use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::{bail, Context};
use tracing::info;
use tracing_subscriber::EnvFilter;

use mindwave_application::{FixedWindowLimiter, TrialLedger};
use mindwave_core::clock::system_clock;
use mindwave_core::durable::StateRepository;
use mindwave_gateway::BackendClient;
use mindwave_infrastructure::{ConfigService, TomlStateRepository};

mod routes;

use routes::AppState;

const DEFAULT_LISTEN_ADDR: &str = "127.0.0.1:8787";

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let config = ConfigService::new().get_config();
    let Some(backend) = config.backend else {
        bail!(
            "no backend configured; set MINDWAVE_BACKEND_URL and MINDWAVE_BACKEND_KEY \
             or add a [backend] section to config.toml"
        );
    };

    let clock = system_clock();
    let state_repository = Arc::new(TomlStateRepository::at_default_path()?);
    let client = Arc::new(BackendClient::new(&backend)?);

    let ledger = Arc::new(
        TrialLedger::new(client, clock.clone(), config.ledger.clone())
            .with_state_repository(state_repository.clone()),
    );

    // Warm the cache from the durable mirror before the first poll lands.
    let mirror = state_repository.get_state().await?.trial_mirror;
    if !mirror.is_empty() {
        info!(doses = mirror.len(), "seeding ledger from durable mirror");
        ledger.seed(mirror).await;
    }
    let poll_token = ledger.start_polling();

    let limiter = Arc::new(FixedWindowLimiter::new(config.rate_limit.clone(), clock));
    let app = routes::router(AppState {
        ledger: ledger.clone(),
        limiter,
    });

    let addr: SocketAddr = std::env::var("MINDWAVE_LISTEN")
        .unwrap_or_else(|_| DEFAULT_LISTEN_ADDR.to_string())
        .parse()
        .context("invalid MINDWAVE_LISTEN address")?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    info!(%addr, "trial server listening");

    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .with_graceful_shutdown(async move {
        let _ = tokio::signal::ctrl_c().await;
        info!("shutdown signal received");
        poll_token.cancel();
    })
    .await?;

    ledger.stop_polling();
    Ok(())
}
