//! # Pilot Service
//!
//! Small HTTP surface over the state directory written by the `seed` command.
//!
//! ## Routes
//! - `GET /healthz`: liveness
//! - `GET /status`: version, boot time, state directory and record counts
//! - `GET /admin/pending?states=ghost,admin_approved&cohorts=cohort-A`: suggestions awaiting a decision
//! - `POST /admin/approve` `{ "ids": [...] }`: ghost to admin_approved
//! - `POST /consent` `{ "id" | "ids", "action": "accept" | "decline", "userId" }`
//! - `POST /admin/reset`: drop every suggestion, keep nodes
//!
//! Every mutation is appended to `events.log.jsonl` with `actor: "admin"`.
//! The consent answer is logged as `decision`, since `action` names the event.
//!
//! Request bodies are read as loose JSON. A missing or unparsable body is
//! treated as `null`, so every failure still answers 400 with
//! `{ "ok": false, "error": { "message" } }`.
//!
//! ## Notes
//! - Each request reads and rewrites whole files. Two concurrent writers race
//!   and the last rename wins, which is acceptable for a single-operator pilot.
//!
//! - Malformed records are skipped on read and therefore dropped by the next
//!   write. The skip is logged at `warn`.
use std::{sync::Arc, time::Duration};

use axum::{
    Router,
    http::{Method, header::CONTENT_TYPE},
    routing::{get, post},
};

use signal::{
    ctrl_c,
    unix::{SignalKind, signal},
};
use tokio::{net::TcpListener, signal};
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::{error, info};
use tracing_subscriber::{EnvFilter, fmt};

pub mod config;
pub mod error;
pub mod routes;
pub mod state;
pub mod utils;

use config::Config;
use error::AppError;
use routes::{
    approve_handler, consent_handler, healthz_handler, pending_handler, reset_handler,
    status_handler,
};
use state::State;

pub fn router(state: Arc<State>) -> Router {
    let cors = CorsLayer::new()
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers([CONTENT_TYPE])
        .max_age(Duration::from_secs(60 * 60));

    Router::new()
        .route("/healthz", get(healthz_handler))
        .route("/status", get(status_handler))
        .route("/admin/pending", get(pending_handler))
        .route("/admin/approve", post(approve_handler))
        .route("/admin/reset", post(reset_handler))
        .route("/consent", post(consent_handler))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

pub async fn start_server() -> Result<(), AppError> {
    fmt().with_env_filter(EnvFilter::from_default_env()).init();

    info!("Loading config...");
    let config = Config::load()?;

    let state_dir = config.state_dir.ensure(config.allow_init)?;
    info!(
        "State directory ready: {} (allow init: {})",
        state_dir.display(),
        config.allow_init
    );

    let address = config.address();
    let state = State::new(config);
    let app = router(state);

    info!("Binding to {address}");
    let listener = TcpListener::bind(&address).await?;
    info!("Pilot service listening on {address}");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Server shutting down...");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        match ctrl_c().await {
            Ok(()) => info!("Received Ctrl+C, shutting down"),
            Err(e) => {
                error!("Failed to install Ctrl+C handler: {e}");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal(SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
                info!("Received terminate signal, shutting down");
            }
            Err(e) => {
                error!("Failed to install signal handler: {e}");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}
