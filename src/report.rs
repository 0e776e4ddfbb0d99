// src/report.rs
//
// Text reports pushed to WhatsApp: a financial breakdown per completed
// order, and a consolidated daily report. Formatting is pure; the build_*
// functions only fetch rows and delegate.
use chrono::NaiveDate;
use sqlx::SqlitePool;

use crate::error::AppError;
use crate::models::commission::CommissionKind;
use crate::models::order::{status, Order};

/// One commission row resolved for display.
#[derive(Debug, Clone)]
pub struct CommissionLine {
    pub kind: String,
    pub worker_name: Option<String>,
    pub amount: i64,
}

/// The per-order slice of the daily report.
#[derive(Debug, Clone)]
pub struct OrderSummary {
    pub order_number: i64,
    pub customer_name: String,
    pub total: i64,
}

pub const NO_ORDERS_TODAY: &str = "No completed orders today";

fn kind_label(kind: CommissionKind) -> &'static str {
    match kind {
        CommissionKind::Seller => "SELLER",
        CommissionKind::Courier => "COURIER",
        CommissionKind::Preparer => "PREPARER",
        CommissionKind::BusinessMargin => "BUSINESS MARGIN",
        CommissionKind::InvestorShare => "INVESTOR SHARE",
        CommissionKind::ProductionCost => "PRODUCTION COST",
    }
}

/// Financial breakdown of a single order, one line per commission record.
pub fn order_report(order: &Order, lines: &[CommissionLine]) -> String {
    let mut out = format!(
        "[{}] Financial Report\nTotal billed: {} CUP\n\nDISTRIBUTION:\n",
        order.order_number, order.total
    );

    for line in lines {
        let Some(kind) = CommissionKind::from_str(&line.kind) else { continue };
        if kind.has_worker() {
            // skip rows whose worker no longer resolves
            if let Some(name) = &line.worker_name {
                out.push_str(&format!("{} ({}): {} CUP\n", kind_label(kind), name, line.amount));
            }
        } else {
            out.push_str(&format!("{}: {} CUP\n", kind_label(kind), line.amount));
        }
    }

    out
}

/// Per-worker earnings over a set of commission lines, grouped by worker
/// name in first-seen order.
pub fn aggregate_worker_earnings(lines: &[CommissionLine]) -> Vec<(String, i64)> {
    let mut earnings: Vec<(String, i64)> = Vec::new();
    for line in lines {
        let Some(name) = &line.worker_name else { continue };
        match earnings.iter_mut().find(|(n, _)| n == name) {
            Some((_, sum)) => *sum += line.amount,
            None => earnings.push((name.clone(), line.amount)),
        }
    }
    earnings
}

/// Consolidated report over today's completed orders.
pub fn daily_report(today: NaiveDate, orders: &[OrderSummary], lines: &[CommissionLine]) -> String {
    if orders.is_empty() {
        return NO_ORDERS_TODAY.to_string();
    }

    let total_billed: i64 = orders.iter().map(|o| o.total).sum();

    let mut out = format!(
        "DAILY REPORT - {}\n\nCompleted orders: {}\nTotal billed: {} CUP\n\nORDERS:\n",
        today.format("%d/%m/%Y"),
        orders.len(),
        total_billed
    );

    for order in orders {
        out.push_str(&format!(
            "- [{}] {}: {} CUP\n",
            order.order_number, order.customer_name, order.total
        ));
    }

    let earnings = aggregate_worker_earnings(lines);
    if !earnings.is_empty() {
        out.push_str("\nEARNINGS BY WORKER:\n");
        for (name, amount) in earnings {
            out.push_str(&format!("- {}: {} CUP\n", name, amount));
        }
    }

    out
}

async fn fetch_commission_lines(pool: &SqlitePool, order_id: i64) -> Result<Vec<CommissionLine>, sqlx::Error> {
    let rows = sqlx::query_as::<_, (String, Option<String>, i64)>(
        "SELECT c.kind, w.name, c.amount
         FROM commissions c
         LEFT JOIN workers w ON w.id = c.worker_id
         WHERE c.order_id = $1
         ORDER BY c.id",
    )
    .bind(order_id)
    .fetch_all(pool)
    .await?;

    Ok(rows
        .into_iter()
        .map(|(kind, worker_name, amount)| CommissionLine { kind, worker_name, amount })
        .collect())
}

pub async fn build_order_report(pool: &SqlitePool, order_id: i64) -> Result<String, AppError> {
    let order = sqlx::query_as::<_, Order>("SELECT * FROM orders WHERE id = $1")
        .bind(order_id)
        .fetch_optional(pool)
        .await?
        .ok_or_else(|| AppError::not_found("Order not found"))?;

    let lines = fetch_commission_lines(pool, order_id).await?;
    Ok(order_report(&order, &lines))
}

pub async fn build_daily_report(pool: &SqlitePool) -> Result<String, AppError> {
    let today = chrono::Local::now().date_naive();

    let orders: Vec<OrderSummary> = sqlx::query_as::<_, (i64, String, i64)>(
        "SELECT order_number, customer_name, total
         FROM orders
         WHERE order_date = $1 AND status = $2
         ORDER BY order_number",
    )
    .bind(today)
    .bind(status::COMPLETED)
    .fetch_all(pool)
    .await?
    .into_iter()
    .map(|(order_number, customer_name, total)| OrderSummary { order_number, customer_name, total })
    .collect();

    let rows = sqlx::query_as::<_, (String, Option<String>, i64)>(
        "SELECT c.kind, w.name, c.amount
         FROM commissions c
         JOIN orders o ON o.id = c.order_id
         LEFT JOIN workers w ON w.id = c.worker_id
         WHERE o.order_date = $1 AND o.status = $2
         ORDER BY o.order_number, c.id",
    )
    .bind(today)
    .bind(status::COMPLETED)
    .fetch_all(pool)
    .await?;

    let lines: Vec<CommissionLine> = rows
        .into_iter()
        .map(|(kind, worker_name, amount)| CommissionLine { kind, worker_name, amount })
        .collect();

    Ok(daily_report(today, &orders, &lines))
}
