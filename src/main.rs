// src/main.rs
mod backup;
mod commission;
mod database;
mod dtos;
mod error;
mod handlers;
mod models;
mod notify;
mod report;
mod routes;
mod state;
#[cfg(test)]
mod test_support;

use axum::{extract::State, http::StatusCode, response::IntoResponse, routing::get, Json, Router};
use dotenvy::dotenv;
use serde_json::json;
use std::net::{IpAddr, SocketAddr};
use tokio::net::TcpListener;
use tower_http::cors::CorsLayer;
use tracing_subscriber::fmt::init as tracing_init;

use crate::notify::NotifySettings;
use crate::state::AppState;

#[tokio::main]
async fn main() {
    // Initialize logging
    tracing_init();

    // Load environment variables
    dotenv().ok();

    // Create database pool and schema
    let database_url =
        std::env::var("DATABASE_URL").unwrap_or_else(|_| "sqlite:chocolates_byb.db".to_string());
    let db_pool = database::create_pool(&database_url)
        .await
        .expect("Failed to create database pool");
    database::init_schema(&db_pool)
        .await
        .expect("Failed to initialize database schema");

    // Create application state
    let notify = NotifySettings::from_env();
    if !notify.is_configured() {
        tracing::warn!("ADMIN_PHONE / CALLMEBOT_API_KEY not set, WhatsApp reports disabled");
    }
    let app_state = AppState::new(db_pool, notify);

    // Build application: CRUD API under /api, probes at the root
    let app = Router::new()
        .route("/", get(|| async { "Chocolates ByB API" }))
        .route("/health", get(health_check))
        .route("/ping", get(ping))
        .nest("/api", routes::create_router())
        .layer(CorsLayer::permissive())
        .with_state(app_state);

    // Start server with HOST/PORT env and graceful port selection
    let host_str = std::env::var("HOST").unwrap_or_else(|_| "127.0.0.1".to_string());
    let host: IpAddr = host_str.parse().unwrap_or_else(|_| "127.0.0.1".parse().unwrap());
    let base_port = std::env::var("PORT").ok().and_then(|p| p.parse::<u16>().ok()).unwrap_or(3000);

    // Try base_port..base_port+20 to avoid crash when address is in use
    let listener = {
        let mut bound = None;
        for offset in 0u16..=20 {
            let port = base_port.saturating_add(offset);
            let addr = SocketAddr::from((host, port));
            match TcpListener::bind(addr).await {
                Ok(l) => {
                    bound = Some((l, addr));
                    break;
                }
                Err(e) => {
                    if offset == 0 {
                        tracing::warn!(%addr, error=%e, "Port in use, trying next");
                    }
                }
            }
        }
        match bound {
            Some((l, addr)) => {
                tracing::info!("Server running on {}", addr);
                l
            }
            None => {
                tracing::error!("Failed to bind to any port starting at {} on {}", base_port, host);
                return;
            }
        }
    };

    if let Err(e) = axum::serve(listener, app).await {
        tracing::error!(error=%e, "Server error");
    }
}

async fn health_check(State(state): State<AppState>) -> impl IntoResponse {
    match sqlx::query("SELECT 1").execute(&state.db_pool).await {
        Ok(_) => (
            StatusCode::OK,
            Json(json!({"status": "ok", "app": "Chocolates ByB", "database": "connected"})),
        ),
        Err(e) => {
            tracing::error!(error=%e, "Healthcheck failed");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(json!({"status": "error", "message": e.to_string()})),
            )
        }
    }
}

async fn ping() -> Json<serde_json::Value> {
    Json(json!({"status": "pong", "timestamp": chrono::Utc::now().to_rfc3339()}))
}
