pub mod export;

use std::{path::Path, sync::Arc};

use axum::{routing::get, Router};
use gfc_core::snapshot::Snapshot;
use tower_http::services::ServeDir;

pub fn router(snapshot: Arc<Snapshot>, data_dir: &Path, static_dir: &Path) -> Router {
    Router::new()
        .route("/export.ics", get(export::handler))
        .nest_service("/data", ServeDir::new(data_dir))
        .fallback_service(ServeDir::new(static_dir))
        .with_state(snapshot)
}
