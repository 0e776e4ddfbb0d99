// src/handlers/stats.rs
use axum::{extract::State, Json};
use sqlx::SqlitePool;
use tracing::{error, instrument};

use crate::dtos::stats::StatsResponse;
use crate::models::order::status;
use crate::state::AppState;

async fn fetch_stats(pool: &SqlitePool) -> Result<StatsResponse, sqlx::Error> {
    let today = chrono::Local::now().date_naive();

    let (completed_today, revenue_today): (i64, i64) = sqlx::query_as(
        "SELECT COUNT(*), COALESCE(SUM(total), 0)
         FROM orders WHERE order_date = $1 AND status = $2",
    )
    .bind(today)
    .bind(status::COMPLETED)
    .fetch_one(pool)
    .await?;

    let pending_orders: i64 =
        sqlx::query_scalar("SELECT COUNT(*) FROM orders WHERE status = $1")
            .bind(status::PENDING)
            .fetch_one(pool)
            .await?;

    let active_workers: i64 =
        sqlx::query_scalar("SELECT COUNT(*) FROM workers WHERE active = 1")
            .fetch_one(pool)
            .await?;

    Ok(StatsResponse { completed_today, revenue_today, pending_orders, active_workers })
}

// GET /stats - Dashboard counters. A broken database yields zeros, not a 500.
#[instrument(skip(state))]
pub async fn get_stats(State(state): State<AppState>) -> Json<StatsResponse> {
    match fetch_stats(&state.db_pool).await {
        Ok(stats) => Json(stats),
        Err(e) => {
            error!(?e, "Failed to compute dashboard stats, serving zeros");
            Json(StatsResponse::default())
        }
    }
}
