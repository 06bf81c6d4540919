//! The web front end: a single server-rendered page plus the form posts
//! that drive it. UI state lives in a per-session workspace.

use std::num::NonZeroU16;
use std::sync::Arc;

use axum::Router;
use axum::http::header::CONTENT_TYPE;
use axum::response::IntoResponse;
use tower_sessions::{Expiry, MemoryStore, SessionManagerLayer};
use tracing::{error, info};

use crate::constants::WORKSPACE_IDLE_MINUTES;
use crate::generator::ImageGenerator;

mod actions;
mod csrf;
pub(crate) mod flash;
mod prelude;
mod views;
mod workspace;

use actions::{
    dismiss_promo_handler, download_file_handler, download_handler, generate_handler,
    select_palette_handler,
};
use views::home_handler;
use workspace::WorkspaceStore;

#[derive(Clone, Debug)]
pub(crate) struct AppState {
    workspaces: WorkspaceStore,
}

impl AppState {
    fn new(generator: Arc<dyn ImageGenerator>) -> Self {
        Self {
            workspaces: WorkspaceStore::new(generator),
        }
    }
}

fn create_router() -> Router<AppState> {
    Router::new()
        .route("/", axum::routing::get(home_handler))
        .route("/static/styles.css", axum::routing::get(styles_handler))
        .route("/healthz", axum::routing::get(healthz_handler))
        .route("/palette", axum::routing::post(select_palette_handler))
        .route("/generate", axum::routing::post(generate_handler))
        .route(
            "/logos/{position}/download",
            axum::routing::post(download_handler),
        )
        .route(
            "/logos/{position}/file",
            axum::routing::get(download_file_handler),
        )
        .route("/promo/dismiss", axum::routing::post(dismiss_promo_handler))
}

fn build_app(state: AppState) -> Router {
    let session_layer = SessionManagerLayer::new(MemoryStore::default())
        .with_secure(false)
        .with_expiry(Expiry::OnInactivity(time::Duration::minutes(
            WORKSPACE_IDLE_MINUTES,
        )));
    create_router().layer(session_layer).with_state(state)
}

async fn styles_handler() -> impl IntoResponse {
    const STYLES: &str = include_str!(concat!(env!("CARGO_MANIFEST_DIR"), "/static/styles.css"));
    ([(CONTENT_TYPE, "text/css")], STYLES)
}

async fn healthz_handler() -> &'static str {
    "OK"
}

/// Serves the logo generator until the listener fails.
pub async fn setup_server(
    listen_addr: &str,
    port: NonZeroU16,
    generator: Arc<dyn ImageGenerator>,
) -> Result<(), anyhow::Error> {
    info!("Using image model {}", generator.model());
    let app = build_app(AppState::new(generator));

    let addr = format!("{}:{}", listen_addr, port);
    info!("Starting server on http://{}", addr);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    if let Err(err) = axum::serve(listener, app).await {
        error!("Server error: {}", err);
    }
    Ok(())
}
