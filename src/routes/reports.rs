use axum::{routing::{get, post}, Router};
use crate::handlers::report::daily_report;
use crate::handlers::stats::get_stats;
use crate::state::AppState;

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/reports/daily", post(daily_report))
        .route("/stats", get(get_stats))
}
