use std::sync::Arc;

use anyhow::Context;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use floor_plan_designer::api;
use floor_plan_designer::config::AppConfig;
use floor_plan_designer::floor_plan::FloorPlan;
use floor_plan_designer::session::{LoadError, Session};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let dotenv_result = dotenvy::dotenv();

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    if let Err(err) = dotenv_result {
        if !matches!(err, dotenvy::Error::Io(ref io_err) if io_err.kind() == std::io::ErrorKind::NotFound)
        {
            warn!("Could not load .env: {}", err);
        }
    }

    let app_config = AppConfig::from_env();
    let session = Arc::new(Session::new(FloorPlan::empty(), app_config.placement.rules));

    let plan_path = app_config.floor_plan.path();
    match session.load_floor_plan_file(plan_path).await {
        Ok(_) => info!("Loaded floor plan from {}", plan_path.display()),
        Err(LoadError::Io { path, source }) => {
            warn!("No floor plan at {} ({}); starting without rooms.", path, source)
        }
        Err(err) => return Err(err).context("initial floor plan could not be loaded"),
    }

    info!("Floor-plan designer starting...");
    api::start_api_server(
        app_config.api.clone(),
        session,
        app_config.placement.snap_to_grid,
    )
    .await
    .context("API server terminated with an error")
}
