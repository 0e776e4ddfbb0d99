// src/handlers/config.rs
use axum::{extract::State, Json};
use tracing::instrument;

use crate::commission::load_or_init_config;
use crate::dtos::config::{ConfigResponse, UpdateConfigRequest};
use crate::error::AppError;
use crate::models::config::CommissionConfig;
use crate::state::AppState;

// GET /config - Read the singleton configuration, creating defaults if absent
#[instrument(skip(state))]
pub async fn get_config(State(state): State<AppState>) -> Result<Json<ConfigResponse>, AppError> {
    let mut conn = state.db_pool.acquire().await?;
    let config = load_or_init_config(&mut conn).await?;
    Ok(Json(ConfigResponse::from(config)))
}

// PUT /config - Replace all configured amounts
#[instrument(skip(state, payload))]
pub async fn update_config(
    State(state): State<AppState>,
    Json(payload): Json<UpdateConfigRequest>,
) -> Result<Json<ConfigResponse>, AppError> {
    if payload.seller_commission < 0
        || payload.business_margin < 0
        || payload.investor_pool < 0
        || payload.preparer_rate < 0
        || payload.gift_wrap_fee < 0
    {
        return Err(AppError::validation("Configured amounts cannot be negative"));
    }

    let mut tx = state.db_pool.begin().await?;
    load_or_init_config(&mut tx).await?;

    let config = sqlx::query_as::<_, CommissionConfig>(
        "UPDATE commission_config SET
         seller_commission = $1,
         business_margin   = $2,
         investor_pool     = $3,
         preparer_rate     = $4,
         gift_wrap_fee     = $5
         WHERE id = 1
         RETURNING *",
    )
    .bind(payload.seller_commission)
    .bind(payload.business_margin)
    .bind(payload.investor_pool)
    .bind(payload.preparer_rate)
    .bind(payload.gift_wrap_fee)
    .fetch_one(&mut *tx)
    .await?;

    tx.commit().await?;
    Ok(Json(ConfigResponse::from(config)))
}
