use axum::{routing::get, Router};
use crate::handlers::worker::{
    get_workers, get_worker, create_worker, update_worker, delete_worker,
};
use crate::state::AppState;

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/workers", get(get_workers).post(create_worker))
        .route("/workers/{id}", get(get_worker).put(update_worker).delete(delete_worker))
}
