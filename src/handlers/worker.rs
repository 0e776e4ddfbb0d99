// src/handlers/worker.rs
use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use tracing::instrument;

use crate::dtos::worker::{CreateWorkerRequest, UpdateWorkerRequest, WorkerResponse};
use crate::error::AppError;
use crate::models::worker::{role, Worker};
use crate::state::AppState;

fn validate_role(candidate: &str) -> Result<(), AppError> {
    if role::ALL.contains(&candidate) {
        Ok(())
    } else {
        Err(AppError::validation(&format!(
            "Unknown role '{}', expected one of: {}",
            candidate,
            role::ALL.join(", ")
        )))
    }
}

// GET /workers - List all workers
#[instrument(skip(state))]
pub async fn get_workers(
    State(state): State<AppState>,
) -> Result<Json<Vec<WorkerResponse>>, AppError> {
    let workers = sqlx::query_as::<_, Worker>(
        "SELECT id, name, role, active, phone, total_earned FROM workers ORDER BY name",
    )
    .fetch_all(&state.db_pool)
    .await?;

    Ok(Json(workers.into_iter().map(WorkerResponse::from).collect()))
}

// GET /workers/:id - Get single worker
#[instrument(skip(state), fields(id))]
pub async fn get_worker(
    Path(id): Path<i64>,
    State(state): State<AppState>,
) -> Result<Json<WorkerResponse>, AppError> {
    let worker = sqlx::query_as::<_, Worker>(
        "SELECT id, name, role, active, phone, total_earned FROM workers WHERE id = $1",
    )
    .bind(id)
    .fetch_optional(&state.db_pool)
    .await?
    .ok_or_else(|| AppError::not_found("Worker not found"))?;

    Ok(Json(WorkerResponse::from(worker)))
}

// POST /workers - Create new worker
#[instrument(skip(state, payload))]
pub async fn create_worker(
    State(state): State<AppState>,
    Json(payload): Json<CreateWorkerRequest>,
) -> Result<(StatusCode, Json<WorkerResponse>), AppError> {
    if payload.name.trim().is_empty() {
        return Err(AppError::validation("Worker name is required"));
    }
    validate_role(&payload.role)?;

    let worker = sqlx::query_as::<_, Worker>(
        "INSERT INTO workers (name, role, phone) VALUES ($1, $2, $3)
         RETURNING id, name, role, active, phone, total_earned",
    )
    .bind(&payload.name)
    .bind(&payload.role)
    .bind(&payload.phone)
    .fetch_one(&state.db_pool)
    .await?;

    Ok((StatusCode::CREATED, Json(WorkerResponse::from(worker))))
}

// PUT /workers/:id - Update worker
#[instrument(skip(state, payload), fields(id))]
pub async fn update_worker(
    Path(id): Path<i64>,
    State(state): State<AppState>,
    Json(payload): Json<UpdateWorkerRequest>,
) -> Result<Json<WorkerResponse>, AppError> {
    if let Some(new_role) = &payload.role {
        validate_role(new_role)?;
    }

    let worker = sqlx::query_as::<_, Worker>(
        "UPDATE workers SET
         name   = COALESCE($1, name),
         role   = COALESCE($2, role),
         phone  = COALESCE($3, phone),
         active = COALESCE($4, active)
         WHERE id = $5
         RETURNING id, name, role, active, phone, total_earned",
    )
    .bind(payload.name)
    .bind(payload.role)
    .bind(payload.phone)
    .bind(payload.active)
    .bind(id)
    .fetch_optional(&state.db_pool)
    .await?
    .ok_or_else(|| AppError::not_found("Worker not found"))?;

    Ok(Json(WorkerResponse::from(worker)))
}

// DELETE /workers/:id - Deactivate worker
//
// Workers stay referenced by orders and commission rows; deactivation also
// removes investors from future pool splits.
#[instrument(skip(state), fields(id))]
pub async fn delete_worker(
    Path(id): Path<i64>,
    State(state): State<AppState>,
) -> Result<Json<()>, AppError> {
    let result = sqlx::query("UPDATE workers SET active = 0 WHERE id = $1")
        .bind(id)
        .execute(&state.db_pool)
        .await?;

    if result.rows_affected() == 0 {
        return Err(AppError::not_found("Worker not found"));
    }

    Ok(Json(()))
}
