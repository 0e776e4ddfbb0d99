// src/handlers/report.rs
use axum::extract::{Path, State};
use tracing::instrument;

use crate::error::AppError;
use crate::notify;
use crate::report;
use crate::state::AppState;

// GET /orders/:id/report - Financial breakdown of one order as plain text
#[instrument(skip(state), fields(id))]
pub async fn order_report(
    Path(id): Path<i64>,
    State(state): State<AppState>,
) -> Result<String, AppError> {
    report::build_order_report(&state.db_pool, id).await
}

// POST /reports/daily - Build today's consolidated report, push it to the
// WhatsApp gateway and return the text.
#[instrument(skip(state))]
pub async fn daily_report(State(state): State<AppState>) -> Result<String, AppError> {
    let message = report::build_daily_report(&state.db_pool).await?;

    if state.notify.is_configured() {
        notify::send_whatsapp_detached(state.notify.clone(), message.clone());
    } else {
        tracing::warn!("Admin phone not configured, daily report not sent");
    }

    Ok(message)
}
