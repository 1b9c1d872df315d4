// Main entry point - Dependency injection and server setup
mod application;
mod domain;
mod infrastructure;
mod presentation;

use std::{net::SocketAddr, sync::Arc};
use chrono::Utc;
use tracing_subscriber::EnvFilter;

use crate::application::city_service::CityService;
use crate::application::dashboard_service::DashboardService;
use crate::application::live_service::LiveService;
use crate::application::scheduler::{RefreshScheduler, ViewScope};
use crate::application::state_actor::{DashboardState, StateActor};
use crate::infrastructure::config::{load_app_config, load_widgets_config};
use crate::infrastructure::synthetic_repository::SyntheticRepository;
use crate::presentation::app_state::AppState;
use crate::presentation::router::build_router;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("energy_dashboard=info,tower_http=info")),
        )
        .init();

    let app_config = load_app_config()?;
    let widgets_config = load_widgets_config()?;
    tracing::info!(
        "Configuration loaded: {} shapes, refresh every {}s",
        widgets_config.shapes.len(),
        app_config.refresh.interval_secs
    );

    // Infrastructure
    let repository = Arc::new(SyntheticRepository::new(
        widgets_config.clone(),
        app_config.tariffs.clone(),
        app_config.generator.seed,
    ));

    // State owner and the shared refresh timer
    let (state, actor) = StateActor::spawn(DashboardState::seeded(
        app_config.refresh.clone(),
        app_config.generator.seed,
        Utc::now(),
    ));
    let scheduler = Arc::new(RefreshScheduler::start(app_config.refresh.interval()));
    tracing::debug!("Live feed ticks every {:?}", scheduler.period());

    // Application services
    let city_service = CityService::new(repository.clone());
    let dashboard_service = DashboardService::new(
        repository,
        widgets_config,
        app_config.tariffs.clone(),
        app_config.generator.seed,
    );
    let live_service = LiveService::new(scheduler.clone(), state.clone());

    let mut simulation = ViewScope::new("simulation");
    live_service.mount_simulation(&mut simulation);

    let app_state = Arc::new(AppState {
        city_service,
        dashboard_service,
        live_service,
        state,
    });
    let router = build_router(app_state);

    let addr: SocketAddr = app_config.server.bind_addr.parse()?;
    tracing::info!("Starting energy-dashboard service on {}", addr);

    axum::serve(tokio::net::TcpListener::bind(addr).await?, router)
        .with_graceful_shutdown(async {
            let _ = tokio::signal::ctrl_c().await;
        })
        .await?;

    simulation.teardown();
    if let Ok(scheduler) = Arc::try_unwrap(scheduler) {
        scheduler.shutdown();
    }
    actor.abort();
    tracing::info!("Shutdown complete");

    Ok(())
}
