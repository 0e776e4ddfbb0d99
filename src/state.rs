// src/state.rs
use sqlx::SqlitePool;

use crate::notify::NotifySettings;

#[derive(Clone)]
pub struct AppState {
    pub db_pool: SqlitePool,
    pub notify: NotifySettings,
}

impl AppState {
    pub fn new(db_pool: SqlitePool, notify: NotifySettings) -> Self {
        Self { db_pool, notify }
    }
}
