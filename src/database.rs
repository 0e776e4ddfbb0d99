// src/database.rs
use std::str::FromStr;

use sqlx::sqlite::{SqliteConnectOptions, SqlitePool, SqlitePoolOptions};

/// Create the SQLite connection pool. Foreign keys are enabled so that
/// deleting an order cascades to its items and commission rows.
pub async fn create_pool(database_url: &str) -> Result<SqlitePool, sqlx::Error> {
    let options = SqliteConnectOptions::from_str(database_url)?
        .create_if_missing(true)
        .foreign_keys(true);

    SqlitePoolOptions::new()
        .max_connections(5)
        .connect_with(options)
        .await
}

/// Create all tables if they do not exist yet. Idempotent; run at startup
/// and by tests against in-memory databases.
pub async fn init_schema(pool: &SqlitePool) -> Result<(), sqlx::Error> {
    sqlx::query(
        "CREATE TABLE IF NOT EXISTS products (
            id              INTEGER PRIMARY KEY AUTOINCREMENT,
            name            TEXT    NOT NULL,
            category        TEXT    NOT NULL,
            size            TEXT,
            sale_price      INTEGER NOT NULL,
            production_cost INTEGER NOT NULL,
            stock           INTEGER NOT NULL DEFAULT 0,
            active          BOOLEAN NOT NULL DEFAULT 1
        )",
    )
    .execute(pool)
    .await?;

    sqlx::query(
        "CREATE TABLE IF NOT EXISTS workers (
            id           INTEGER PRIMARY KEY AUTOINCREMENT,
            name         TEXT    NOT NULL,
            role         TEXT    NOT NULL,
            active       BOOLEAN NOT NULL DEFAULT 1,
            phone        TEXT,
            total_earned INTEGER NOT NULL DEFAULT 0
        )",
    )
    .execute(pool)
    .await?;

    sqlx::query(
        "CREATE TABLE IF NOT EXISTS orders (
            id               INTEGER PRIMARY KEY AUTOINCREMENT,
            order_number     INTEGER NOT NULL UNIQUE,
            order_date       DATE    NOT NULL,
            delivery_date    DATE    NOT NULL,
            delivery_window  TEXT,
            customer_name    TEXT    NOT NULL,
            customer_phone   TEXT,
            customer_address TEXT,
            seller_id        INTEGER REFERENCES workers(id),
            courier_id       INTEGER REFERENCES workers(id),
            preparer_id      INTEGER REFERENCES workers(id),
            status           TEXT    NOT NULL DEFAULT 'PENDING',
            subtotal         INTEGER NOT NULL,
            delivery_fee     INTEGER NOT NULL DEFAULT 0,
            total            INTEGER NOT NULL,
            notes            TEXT
        )",
    )
    .execute(pool)
    .await?;

    sqlx::query(
        "CREATE TABLE IF NOT EXISTS order_items (
            id            INTEGER PRIMARY KEY AUTOINCREMENT,
            order_id      INTEGER NOT NULL REFERENCES orders(id) ON DELETE CASCADE,
            product_id    INTEGER NOT NULL REFERENCES products(id),
            quantity      INTEGER NOT NULL,
            unit_price    INTEGER NOT NULL,
            gift_wrap     BOOLEAN NOT NULL DEFAULT 0,
            gift_wrap_fee INTEGER NOT NULL DEFAULT 0
        )",
    )
    .execute(pool)
    .await?;

    sqlx::query(
        "CREATE TABLE IF NOT EXISTS commissions (
            id        INTEGER PRIMARY KEY AUTOINCREMENT,
            order_id  INTEGER NOT NULL REFERENCES orders(id) ON DELETE CASCADE,
            worker_id INTEGER REFERENCES workers(id),
            kind      TEXT    NOT NULL,
            amount    INTEGER NOT NULL
        )",
    )
    .execute(pool)
    .await?;

    sqlx::query(
        "CREATE TABLE IF NOT EXISTS commission_config (
            id                INTEGER PRIMARY KEY CHECK (id = 1),
            seller_commission INTEGER NOT NULL DEFAULT 500,
            business_margin   INTEGER NOT NULL DEFAULT 200,
            investor_pool     INTEGER NOT NULL DEFAULT 500,
            preparer_rate     INTEGER NOT NULL DEFAULT 100,
            gift_wrap_fee     INTEGER NOT NULL DEFAULT 200
        )",
    )
    .execute(pool)
    .await?;

    Ok(())
}
