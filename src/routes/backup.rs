use axum::{routing::{get, post}, Router};
use crate::handlers::backup::{export_backup, restore_backup};
use crate::state::AppState;

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/backup", get(export_backup))
        .route("/restore", post(restore_backup))
}
