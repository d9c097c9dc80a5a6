use anyhow::Result;
use axum::Router;
use rate_impact_engine::{api, config, telemetry};
use config::Config;
use telemetry::init_tracing;
use tracing::{info, warn};

#[tokio::main]
async fn main() -> Result<()> {
    // A missing .env is fine outside local development
    let _ = dotenvy::dotenv();
    init_tracing();

    let cfg = Config::load()?;

    #[allow(unused_mut)]
    let mut app: Router = api::router(api::AppState::new(cfg.clone()), &cfg);

    #[cfg(feature = "swagger")]
    {
        app = api::with_swagger(app);
    }

    let addr = cfg.server.socket_addr()?;

    if cfg.server.host == "0.0.0.0" {
        warn!("binding to 0.0.0.0, the API is reachable from the network");
    }

    info!(
        %addr,
        horizon_years = cfg.projection.years,
        base_year = cfg.projection.base_year,
        "starting rate impact engine"
    );

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(telemetry::shutdown_signal())
        .await?;

    info!("shutdown complete");
    Ok(())
}
