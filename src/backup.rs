// src/backup.rs
//
// Full-database export to a versioned JSON document and destructive restore.
// Restore preserves the original numeric ids and runs inside a single
// transaction, so a failed restore leaves the database untouched.
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use sqlx::SqlitePool;

use crate::error::AppError;
use crate::models::commission::CommissionRecord;
use crate::models::config::CommissionConfig;
use crate::models::order::{Order, OrderItem};
use crate::models::product::Product;
use crate::models::worker::Worker;

pub const BACKUP_VERSION: &str = "1.0";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BackupDocument {
    pub backup_date: String,
    pub version: String,
    pub data: BackupData,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BackupData {
    pub workers: Vec<WorkerBackup>,
    pub products: Vec<ProductBackup>,
    pub orders: Vec<OrderBackup>,
    pub commissions: Vec<CommissionBackup>,
    pub config: Option<ConfigBackup>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WorkerBackup {
    pub id: i64,
    pub name: String,
    pub role: String,
    pub active: bool,
    pub phone: Option<String>,
    pub total_earned: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProductBackup {
    pub id: i64,
    pub name: String,
    pub category: String,
    pub size: Option<String>,
    pub sale_price: i64,
    pub production_cost: i64,
    pub stock: i64,
    pub active: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrderBackup {
    pub id: i64,
    pub order_number: i64,
    pub order_date: NaiveDate,
    pub delivery_date: NaiveDate,
    pub delivery_window: Option<String>,
    pub customer_name: String,
    pub customer_phone: Option<String>,
    pub customer_address: Option<String>,
    pub seller_id: Option<i64>,
    pub courier_id: Option<i64>,
    pub preparer_id: Option<i64>,
    pub status: String,
    pub subtotal: i64,
    pub delivery_fee: i64,
    pub total: i64,
    pub notes: Option<String>,
    pub items: Vec<OrderItemBackup>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrderItemBackup {
    pub product_id: i64,
    pub quantity: i64,
    pub unit_price: i64,
    pub gift_wrap: bool,
    pub gift_wrap_fee: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CommissionBackup {
    pub order_id: i64,
    pub worker_id: Option<i64>,
    pub kind: String,
    pub amount: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConfigBackup {
    pub seller_commission: i64,
    pub business_margin: i64,
    pub investor_pool: i64,
    pub preparer_rate: i64,
    pub gift_wrap_fee: i64,
}

pub async fn export(pool: &SqlitePool) -> Result<BackupDocument, AppError> {
    let workers = sqlx::query_as::<_, Worker>(
        "SELECT id, name, role, active, phone, total_earned FROM workers ORDER BY id",
    )
    .fetch_all(pool)
    .await?
    .into_iter()
    .map(|w| WorkerBackup {
        id: w.id,
        name: w.name,
        role: w.role,
        active: w.active,
        phone: w.phone,
        total_earned: w.total_earned,
    })
    .collect();

    let products = sqlx::query_as::<_, Product>("SELECT * FROM products ORDER BY id")
        .fetch_all(pool)
        .await?
        .into_iter()
        .map(|p| ProductBackup {
            id: p.id,
            name: p.name,
            category: p.category,
            size: p.size,
            sale_price: p.sale_price,
            production_cost: p.production_cost,
            stock: p.stock,
            active: p.active,
        })
        .collect();

    let mut orders = Vec::new();
    for o in sqlx::query_as::<_, Order>("SELECT * FROM orders ORDER BY id")
        .fetch_all(pool)
        .await?
    {
        let items = sqlx::query_as::<_, OrderItem>(
            "SELECT * FROM order_items WHERE order_id = $1 ORDER BY id",
        )
        .bind(o.id)
        .fetch_all(pool)
        .await?
        .into_iter()
        .map(|i| OrderItemBackup {
            product_id: i.product_id,
            quantity: i.quantity,
            unit_price: i.unit_price,
            gift_wrap: i.gift_wrap,
            gift_wrap_fee: i.gift_wrap_fee,
        })
        .collect();

        orders.push(OrderBackup {
            id: o.id,
            order_number: o.order_number,
            order_date: o.order_date,
            delivery_date: o.delivery_date,
            delivery_window: o.delivery_window,
            customer_name: o.customer_name,
            customer_phone: o.customer_phone,
            customer_address: o.customer_address,
            seller_id: o.seller_id,
            courier_id: o.courier_id,
            preparer_id: o.preparer_id,
            status: o.status,
            subtotal: o.subtotal,
            delivery_fee: o.delivery_fee,
            total: o.total,
            notes: o.notes,
            items,
        });
    }

    let commissions = sqlx::query_as::<_, CommissionRecord>(
        "SELECT id, order_id, worker_id, kind, amount FROM commissions ORDER BY id",
    )
    .fetch_all(pool)
    .await?
    .into_iter()
    .map(|c| CommissionBackup {
        order_id: c.order_id,
        worker_id: c.worker_id,
        kind: c.kind,
        amount: c.amount,
    })
    .collect();

    let config = sqlx::query_as::<_, CommissionConfig>(
        "SELECT * FROM commission_config WHERE id = 1",
    )
    .fetch_optional(pool)
    .await?
    .map(|c| ConfigBackup {
        seller_commission: c.seller_commission,
        business_margin: c.business_margin,
        investor_pool: c.investor_pool,
        preparer_rate: c.preparer_rate,
        gift_wrap_fee: c.gift_wrap_fee,
    });

    Ok(BackupDocument {
        backup_date: chrono::Utc::now().to_rfc3339(),
        version: BACKUP_VERSION.to_string(),
        data: BackupData { workers, products, orders, commissions, config },
    })
}

/// Wipe every table and reinsert the backup contents, keeping the original
/// ids. All-or-nothing: any failure rolls the whole restore back.
pub async fn restore(pool: &SqlitePool, doc: &BackupDocument) -> Result<(), AppError> {
    if doc.version != BACKUP_VERSION {
        return Err(AppError::validation(&format!(
            "Unsupported backup version '{}', expected '{}'",
            doc.version, BACKUP_VERSION
        )));
    }

    let mut tx = pool.begin().await?;

    // child tables first so foreign keys stay satisfied
    for table in ["commissions", "order_items", "orders", "products", "workers", "commission_config"] {
        sqlx::query(&format!("DELETE FROM {table}")).execute(&mut *tx).await?;
    }

    for w in &doc.data.workers {
        sqlx::query(
            "INSERT INTO workers (id, name, role, active, phone, total_earned)
             VALUES ($1, $2, $3, $4, $5, $6)",
        )
        .bind(w.id)
        .bind(&w.name)
        .bind(&w.role)
        .bind(w.active)
        .bind(&w.phone)
        .bind(w.total_earned)
        .execute(&mut *tx)
        .await?;
    }

    for p in &doc.data.products {
        sqlx::query(
            "INSERT INTO products (id, name, category, size, sale_price, production_cost, stock, active)
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8)",
        )
        .bind(p.id)
        .bind(&p.name)
        .bind(&p.category)
        .bind(&p.size)
        .bind(p.sale_price)
        .bind(p.production_cost)
        .bind(p.stock)
        .bind(p.active)
        .execute(&mut *tx)
        .await?;
    }

    for o in &doc.data.orders {
        sqlx::query(
            "INSERT INTO orders
             (id, order_number, order_date, delivery_date, delivery_window,
              customer_name, customer_phone, customer_address,
              seller_id, courier_id, preparer_id, status,
              subtotal, delivery_fee, total, notes)
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15, $16)",
        )
        .bind(o.id)
        .bind(o.order_number)
        .bind(o.order_date)
        .bind(o.delivery_date)
        .bind(&o.delivery_window)
        .bind(&o.customer_name)
        .bind(&o.customer_phone)
        .bind(&o.customer_address)
        .bind(o.seller_id)
        .bind(o.courier_id)
        .bind(o.preparer_id)
        .bind(&o.status)
        .bind(o.subtotal)
        .bind(o.delivery_fee)
        .bind(o.total)
        .bind(&o.notes)
        .execute(&mut *tx)
        .await?;

        for i in &o.items {
            sqlx::query(
                "INSERT INTO order_items (order_id, product_id, quantity, unit_price, gift_wrap, gift_wrap_fee)
                 VALUES ($1, $2, $3, $4, $5, $6)",
            )
            .bind(o.id)
            .bind(i.product_id)
            .bind(i.quantity)
            .bind(i.unit_price)
            .bind(i.gift_wrap)
            .bind(i.gift_wrap_fee)
            .execute(&mut *tx)
            .await?;
        }
    }

    for c in &doc.data.commissions {
        sqlx::query(
            "INSERT INTO commissions (order_id, worker_id, kind, amount) VALUES ($1, $2, $3, $4)",
        )
        .bind(c.order_id)
        .bind(c.worker_id)
        .bind(&c.kind)
        .bind(c.amount)
        .execute(&mut *tx)
        .await?;
    }

    if let Some(c) = &doc.data.config {
        sqlx::query(
            "INSERT INTO commission_config
             (id, seller_commission, business_margin, investor_pool, preparer_rate, gift_wrap_fee)
             VALUES (1, $1, $2, $3, $4, $5)",
        )
        .bind(c.seller_commission)
        .bind(c.business_margin)
        .bind(c.investor_pool)
        .bind(c.preparer_rate)
        .bind(c.gift_wrap_fee)
        .execute(&mut *tx)
        .await?;
    }

    tx.commit().await?;
    Ok(())
}
