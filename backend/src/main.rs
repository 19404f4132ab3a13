//! Desk entry-point: loads settings, opens the desk and serves the API.

mod server;

use actix_web::web;
use color_eyre::eyre::{Result, WrapErr, eyre};
use ortho_config::OrthoConfig;
use tracing::warn;
use tracing_subscriber::{EnvFilter, fmt};

use complaint_desk::inbound::http::health::HealthState;
use server::{DeskSettings, ServerConfig, create_server};

/// Application bootstrap.
#[actix_web::main]
async fn main() -> Result<()> {
    color_eyre::install()?;
    if let Err(e) = fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .json()
        .try_init()
    {
        warn!(error = %e, "tracing init failed");
    }

    let settings = DeskSettings::load_from_iter(std::env::args_os())
        .map_err(|err| eyre!("failed to load desk settings: {err}"))?;
    let config = ServerConfig::from(&settings);

    let health_state = web::Data::new(HealthState::new());
    let server = create_server(health_state.clone(), config)
        .await
        .wrap_err("failed to start the complaint desk")?;
    let outcome = server.await;
    health_state.mark_unhealthy();
    outcome.wrap_err("complaint desk server stopped with an error")
}
