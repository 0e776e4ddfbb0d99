pub mod products;
pub mod workers;
pub mod orders;
pub mod config;
pub mod reports;
pub mod backup;

use axum::Router;
use crate::state::AppState;

pub fn create_router() -> Router<AppState> {
    Router::new()
        .merge(products::routes())
        .merge(workers::routes())
        .merge(orders::routes())
        .merge(config::routes())
        .merge(reports::routes())
        .merge(backup::routes())
}
