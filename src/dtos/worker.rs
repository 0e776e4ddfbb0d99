// src/dtos/worker.rs
use serde::{Deserialize, Serialize};

#[derive(Debug, Deserialize)]
pub struct CreateWorkerRequest {
    pub name: String,
    pub role: String,
    pub phone: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct UpdateWorkerRequest {
    pub name: Option<String>,
    pub role: Option<String>,
    pub phone: Option<String>,
    pub active: Option<bool>,
}

#[derive(Debug, Serialize)]
pub struct WorkerResponse {
    pub id: i64,
    pub name: String,
    pub role: String,
    pub active: bool,
    pub phone: Option<String>,
    pub total_earned: i64,
}

impl From<crate::models::worker::Worker> for WorkerResponse {
    fn from(worker: crate::models::worker::Worker) -> Self {
        Self {
            id: worker.id,
            name: worker.name,
            role: worker.role,
            active: worker.active,
            phone: worker.phone,
            total_earned: worker.total_earned,
        }
    }
}
