// src/handlers/backup.rs
use axum::{extract::State, Json};
use serde::{Deserialize, Serialize};
use tracing::{info, instrument};

use crate::backup::{self, BackupDocument};
use crate::error::AppError;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct RestoreRequest {
    /// Restore wipes every table; the caller must acknowledge that.
    #[serde(default)]
    pub confirm: bool,
    pub backup: BackupDocument,
}

#[derive(Debug, Serialize)]
pub struct RestoreResponse {
    pub workers: usize,
    pub products: usize,
    pub orders: usize,
    pub commissions: usize,
}

// GET /backup - Export the whole database as a versioned JSON document
#[instrument(skip(state))]
pub async fn export_backup(State(state): State<AppState>) -> Result<Json<BackupDocument>, AppError> {
    let doc = backup::export(&state.db_pool).await?;
    info!(
        workers = doc.data.workers.len(),
        products = doc.data.products.len(),
        orders = doc.data.orders.len(),
        "Backup exported"
    );
    Ok(Json(doc))
}

// POST /restore - Destructive full restore from a backup document
#[instrument(skip(state, req))]
pub async fn restore_backup(
    State(state): State<AppState>,
    Json(req): Json<RestoreRequest>,
) -> Result<Json<RestoreResponse>, AppError> {
    if !req.confirm {
        return Err(AppError::validation(
            "Restore is destructive and replaces all data; set \"confirm\": true to proceed",
        ));
    }

    backup::restore(&state.db_pool, &req.backup).await?;
    info!(backup_date = %req.backup.backup_date, "Database restored from backup");

    Ok(Json(RestoreResponse {
        workers: req.backup.data.workers.len(),
        products: req.backup.data.products.len(),
        orders: req.backup.data.orders.len(),
        commissions: req.backup.data.commissions.len(),
    }))
}
