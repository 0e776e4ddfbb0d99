use axum::{routing::{get, post}, Router};
use crate::handlers::order::{create_order, list_orders, get_order, complete_order};
use crate::handlers::report::order_report;
use crate::state::AppState;

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/orders", get(list_orders).post(create_order))
        .route("/orders/{id}", get(get_order))
        .route("/orders/{id}/complete", post(complete_order))
        .route("/orders/{id}/report", get(order_report))
}
