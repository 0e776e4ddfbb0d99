// src/test_support.rs
//
// Shared helpers for tests that need a database. Single-connection pools
// keep every test on its own private in-memory SQLite instance.
use chrono::NaiveDate;
use sqlx::sqlite::{SqlitePool, SqlitePoolOptions};

use crate::database;

pub async fn memory_pool() -> SqlitePool {
    let pool = SqlitePoolOptions::new()
        .max_connections(1)
        .connect("sqlite::memory:")
        .await
        .expect("failed to open in-memory database");
    sqlx::query("PRAGMA foreign_keys = ON")
        .execute(&pool)
        .await
        .expect("failed to enable foreign keys");
    database::init_schema(&pool).await.expect("failed to create schema");
    pool
}

pub async fn insert_worker(pool: &SqlitePool, name: &str, role: &str) -> i64 {
    sqlx::query_scalar::<_, i64>(
        "INSERT INTO workers (name, role) VALUES ($1, $2) RETURNING id",
    )
    .bind(name)
    .bind(role)
    .fetch_one(pool)
    .await
    .expect("failed to insert worker")
}

pub async fn insert_product(pool: &SqlitePool, name: &str, sale_price: i64, production_cost: i64) -> i64 {
    sqlx::query_scalar::<_, i64>(
        "INSERT INTO products (name, category, sale_price, production_cost)
         VALUES ($1, 'chocolate', $2, $3) RETURNING id",
    )
    .bind(name)
    .bind(sale_price)
    .bind(production_cost)
    .fetch_one(pool)
    .await
    .expect("failed to insert product")
}

pub async fn insert_order(
    pool: &SqlitePool,
    order_number: i64,
    seller_id: Option<i64>,
    courier_id: Option<i64>,
    preparer_id: Option<i64>,
    delivery_fee: i64,
) -> i64 {
    insert_order_on(
        pool,
        order_number,
        seller_id,
        courier_id,
        preparer_id,
        delivery_fee,
        chrono::Local::now().date_naive(),
    )
    .await
}

pub async fn insert_order_on(
    pool: &SqlitePool,
    order_number: i64,
    seller_id: Option<i64>,
    courier_id: Option<i64>,
    preparer_id: Option<i64>,
    delivery_fee: i64,
    order_date: NaiveDate,
) -> i64 {
    sqlx::query_scalar::<_, i64>(
        "INSERT INTO orders
         (order_number, order_date, delivery_date, customer_name,
          seller_id, courier_id, preparer_id, status, subtotal, delivery_fee, total)
         VALUES ($1, $2, $2, 'Test customer', $3, $4, $5, 'PENDING', 0, $6, $6)
         RETURNING id",
    )
    .bind(order_number)
    .bind(order_date)
    .bind(seller_id)
    .bind(courier_id)
    .bind(preparer_id)
    .bind(delivery_fee)
    .fetch_one(pool)
    .await
    .expect("failed to insert order")
}

pub async fn add_order_item(
    pool: &SqlitePool,
    order_id: i64,
    product_id: i64,
    quantity: i64,
    unit_price: i64,
) {
    sqlx::query(
        "INSERT INTO order_items (order_id, product_id, quantity, unit_price)
         VALUES ($1, $2, $3, $4)",
    )
    .bind(order_id)
    .bind(product_id)
    .bind(quantity)
    .bind(unit_price)
    .execute(pool)
    .await
    .expect("failed to insert order item");

    // keep the stored totals consistent with the items
    sqlx::query(
        "UPDATE orders SET
             subtotal = subtotal + $2 * $3,
             total    = subtotal + $2 * $3 + delivery_fee
         WHERE id = $1",
    )
    .bind(order_id)
    .bind(quantity)
    .bind(unit_price)
    .execute(pool)
    .await
    .expect("failed to update order totals");
}
