use axum::{routing::get, Router};
use crate::handlers::config::{get_config, update_config};
use crate::state::AppState;

pub fn routes() -> Router<AppState> {
    Router::new().route("/config", get(get_config).put(update_config))
}
