// src/dtos/stats.rs
use serde::Serialize;

/// Dashboard counters. Defaults to all zeros, which is also what the
/// handler serves when the database is unreachable.
#[derive(Debug, Default, Serialize)]
pub struct StatsResponse {
    pub completed_today: i64,
    pub revenue_today: i64,
    pub pending_orders: i64,
    pub active_workers: i64,
}
