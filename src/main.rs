use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use api_rest::{AppState, router};
use clinic_core::{DocumentStore, core_config_from_env};

/// Main entry point for the clinic booking platform
///
/// Loads `.env`, resolves configuration once, opens the document store and serves the REST
/// API (with Swagger UI at `/swagger-ui`).
///
/// # Environment Variables
/// - `CLINIC_REST_ADDR`: REST server address (default: "0.0.0.0:3000")
/// - `CLINIC_DATA_DIR`: Directory holding the document store (default: "clinic_data")
/// - `JWT_SECRET`: Staff token signing secret (required)
/// - `PATIENT_JWT_SECRET`: Patient token signing secret (default: `JWT_SECRET`)
/// - `JWT_EXPIRES_IN_DAYS`, `BCRYPT_COST`, `GOOGLE_CLIENT_ID`, `PLAN_LIMITS_ENFORCED`,
///   `BOOKING_UTC_OFFSET`
///
/// # Errors
/// Returns an error if the configuration is invalid, the store cannot be opened, the address
/// cannot be bound, or the server fails while running.
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("clinic=info".parse()?)
                .add_directive("api_rest=info".parse()?)
                .add_directive("tower_http=info".parse()?),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let cfg = Arc::new(core_config_from_env()?);
    let store = Arc::new(DocumentStore::open(cfg.data_dir())?);
    tracing::info!("++ Document store at {}", cfg.data_dir().display());
    if cfg.google_client_id().is_none() {
        tracing::warn!("GOOGLE_CLIENT_ID not set; Google sign-in is disabled");
    }

    let rest_addr = std::env::var("CLINIC_REST_ADDR").unwrap_or_else(|_| "0.0.0.0:3000".into());
    tracing::info!("++ Starting clinic REST on {}", rest_addr);

    let app = router(AppState::new(cfg, store));
    let listener = tokio::net::TcpListener::bind(&rest_addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("-- Clinic REST stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("failed to listen for shutdown signal: {}", e);
    }
}
