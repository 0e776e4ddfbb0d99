// src/commission.rs
//
// Commission engine. Given a completed order, its items and the current
// configuration, derive the ledger rows: seller commission, courier fee,
// preparer piece-rate, business margin, investor shares and production cost.
// Recomputation is idempotent: prior rows for the order are deleted first.
use sqlx::{Sqlite, SqliteConnection, Transaction};

use crate::error::AppError;
use crate::models::commission::CommissionKind;
use crate::models::config::CommissionConfig;
use crate::models::order::Order;
use crate::models::worker::{role, Worker};

/// Quantity and per-unit production cost of one order line, the only item
/// data the engine needs.
#[derive(Debug, Clone, Copy)]
pub struct CostedItem {
    pub quantity: i64,
    pub production_cost: i64,
}

/// A commission row that has not been persisted yet.
#[derive(Debug, Clone)]
pub struct CommissionDraft {
    pub worker_id: Option<i64>,
    pub kind: CommissionKind,
    pub amount: i64,
}

/// Pure derivation of the commission set for one order.
///
/// Rules:
/// - seller assigned: one flat `seller_commission` row
/// - courier assigned and delivery fee charged: the courier earns exactly
///   that fee
/// - preparer assigned: `preparer_rate` per unit across all items
/// - one business-margin row always, with no worker reference
/// - the investor pool is split evenly (integer division) across active
///   investors; the division remainder is added to the business margin so
///   no amount is silently dropped
/// - one production-cost row always, representing capital recovery
pub fn compute_commissions(
    order: &Order,
    items: &[CostedItem],
    config: &CommissionConfig,
    investors: &[Worker],
) -> Vec<CommissionDraft> {
    let production_cost_total: i64 = items.iter().map(|i| i.production_cost * i.quantity).sum();
    let total_quantity: i64 = items.iter().map(|i| i.quantity).sum();

    let mut records = Vec::new();

    if let Some(seller_id) = order.seller_id {
        records.push(CommissionDraft {
            worker_id: Some(seller_id),
            kind: CommissionKind::Seller,
            amount: config.seller_commission,
        });
    }

    if let Some(courier_id) = order.courier_id {
        if order.delivery_fee > 0 {
            records.push(CommissionDraft {
                worker_id: Some(courier_id),
                kind: CommissionKind::Courier,
                amount: order.delivery_fee,
            });
        }
    }

    if let Some(preparer_id) = order.preparer_id {
        records.push(CommissionDraft {
            worker_id: Some(preparer_id),
            kind: CommissionKind::Preparer,
            amount: config.preparer_rate * total_quantity,
        });
    }

    // With zero active investors the pool stays unallocated, not an error.
    let mut margin = config.business_margin;
    let mut investor_shares = Vec::new();
    if !investors.is_empty() {
        let n = investors.len() as i64;
        let share = config.investor_pool / n;
        margin += config.investor_pool - share * n;
        for investor in investors {
            investor_shares.push(CommissionDraft {
                worker_id: Some(investor.id),
                kind: CommissionKind::InvestorShare,
                amount: share,
            });
        }
    }

    records.push(CommissionDraft {
        worker_id: None,
        kind: CommissionKind::BusinessMargin,
        amount: margin,
    });
    records.extend(investor_shares);

    records.push(CommissionDraft {
        worker_id: None,
        kind: CommissionKind::ProductionCost,
        amount: production_cost_total,
    });

    records
}

/// Load the singleton configuration row, creating it with defaults when
/// absent.
pub async fn load_or_init_config(
    conn: &mut SqliteConnection,
) -> Result<CommissionConfig, sqlx::Error> {
    if let Some(config) = sqlx::query_as::<_, CommissionConfig>(
        "SELECT id, seller_commission, business_margin, investor_pool, preparer_rate, gift_wrap_fee
         FROM commission_config WHERE id = 1",
    )
    .fetch_optional(&mut *conn)
    .await?
    {
        return Ok(config);
    }

    let defaults = CommissionConfig::default();
    sqlx::query(
        "INSERT OR IGNORE INTO commission_config
         (id, seller_commission, business_margin, investor_pool, preparer_rate, gift_wrap_fee)
         VALUES (1, $1, $2, $3, $4, $5)",
    )
    .bind(defaults.seller_commission)
    .bind(defaults.business_margin)
    .bind(defaults.investor_pool)
    .bind(defaults.preparer_rate)
    .bind(defaults.gift_wrap_fee)
    .execute(&mut *conn)
    .await?;

    sqlx::query_as::<_, CommissionConfig>(
        "SELECT id, seller_commission, business_margin, investor_pool, preparer_rate, gift_wrap_fee
         FROM commission_config WHERE id = 1",
    )
    .fetch_one(&mut *conn)
    .await
}

/// Recompute and persist the commission rows for one order inside the
/// caller's transaction. Existing rows for the order are replaced, never
/// accumulated.
pub async fn recompute_for_order(
    tx: &mut Transaction<'_, Sqlite>,
    order_id: i64,
) -> Result<Vec<CommissionDraft>, AppError> {
    let order = sqlx::query_as::<_, Order>("SELECT * FROM orders WHERE id = $1")
        .bind(order_id)
        .fetch_optional(&mut **tx)
        .await?
        .ok_or_else(|| AppError::not_found("Order not found"))?;

    let items: Vec<CostedItem> = sqlx::query_as::<_, (i64, i64)>(
        "SELECT oi.quantity, p.production_cost
         FROM order_items oi
         JOIN products p ON p.id = oi.product_id
         WHERE oi.order_id = $1
         ORDER BY oi.id",
    )
    .bind(order_id)
    .fetch_all(&mut **tx)
    .await?
    .into_iter()
    .map(|(quantity, production_cost)| CostedItem { quantity, production_cost })
    .collect();

    let config = load_or_init_config(&mut *tx).await?;

    let investors = sqlx::query_as::<_, Worker>(
        "SELECT id, name, role, active, phone, total_earned
         FROM workers WHERE role = $1 AND active = 1
         ORDER BY id",
    )
    .bind(role::INVESTOR)
    .fetch_all(&mut **tx)
    .await?;

    sqlx::query("DELETE FROM commissions WHERE order_id = $1")
        .bind(order_id)
        .execute(&mut **tx)
        .await?;

    let records = compute_commissions(&order, &items, &config, &investors);

    for record in &records {
        sqlx::query(
            "INSERT INTO commissions (order_id, worker_id, kind, amount) VALUES ($1, $2, $3, $4)",
        )
        .bind(order_id)
        .bind(record.worker_id)
        .bind(record.kind.as_str())
        .bind(record.amount)
        .execute(&mut **tx)
        .await?;
    }

    Ok(records)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::commission::CommissionRecord;
    use crate::test_support::{insert_order, insert_product, insert_worker, memory_pool, add_order_item};

    fn sample_order(seller: Option<i64>, courier: Option<i64>, preparer: Option<i64>, delivery_fee: i64) -> Order {
        Order {
            id: 1,
            order_number: 1,
            order_date: chrono::NaiveDate::from_ymd_opt(2025, 3, 10).unwrap(),
            delivery_date: chrono::NaiveDate::from_ymd_opt(2025, 3, 11).unwrap(),
            delivery_window: None,
            customer_name: "Maria".to_string(),
            customer_phone: None,
            customer_address: None,
            seller_id: seller,
            courier_id: courier,
            preparer_id: preparer,
            status: "PENDING".to_string(),
            subtotal: 0,
            delivery_fee,
            total: delivery_fee,
            notes: None,
        }
    }

    fn investor(id: i64, name: &str) -> Worker {
        Worker {
            id,
            name: name.to_string(),
            role: role::INVESTOR.to_string(),
            active: true,
            phone: None,
            total_earned: 0,
        }
    }

    fn amount_of(records: &[CommissionDraft], kind: CommissionKind) -> Vec<i64> {
        records.iter().filter(|r| r.kind == kind).map(|r| r.amount).collect()
    }

    #[test]
    fn worked_example_from_config_defaults() {
        // items (cost 800 x2, cost 500 x1), seller assigned, no courier,
        // two active investors, default config
        let order = sample_order(Some(10), None, None, 0);
        let items = [
            CostedItem { quantity: 2, production_cost: 800 },
            CostedItem { quantity: 1, production_cost: 500 },
        ];
        let config = CommissionConfig::default();
        let investors = [investor(20, "Ivan"), investor(21, "Igor")];

        let records = compute_commissions(&order, &items, &config, &investors);

        assert_eq!(amount_of(&records, CommissionKind::Seller), vec![500]);
        assert_eq!(amount_of(&records, CommissionKind::Courier), Vec::<i64>::new());
        assert_eq!(amount_of(&records, CommissionKind::BusinessMargin), vec![200]);
        assert_eq!(amount_of(&records, CommissionKind::InvestorShare), vec![250, 250]);
        assert_eq!(amount_of(&records, CommissionKind::ProductionCost), vec![2100]);

        let payout: i64 = records
            .iter()
            .filter(|r| r.kind != CommissionKind::ProductionCost)
            .map(|r| r.amount)
            .sum();
        assert_eq!(payout, 1200);
    }

    #[test]
    fn courier_record_requires_assignment_even_with_fee() {
        let order = sample_order(None, None, None, 300);
        let records = compute_commissions(&order, &[], &CommissionConfig::default(), &[]);
        assert!(amount_of(&records, CommissionKind::Courier).is_empty());
    }

    #[test]
    fn courier_earns_exactly_the_delivery_fee() {
        let order = sample_order(None, Some(7), None, 300);
        let records = compute_commissions(&order, &[], &CommissionConfig::default(), &[]);
        assert_eq!(amount_of(&records, CommissionKind::Courier), vec![300]);

        let free_delivery = sample_order(None, Some(7), None, 0);
        let records = compute_commissions(&free_delivery, &[], &CommissionConfig::default(), &[]);
        assert!(amount_of(&records, CommissionKind::Courier).is_empty());
    }

    #[test]
    fn preparer_rate_applies_per_unit() {
        let order = sample_order(None, None, Some(5), 0);
        let items = [
            CostedItem { quantity: 2, production_cost: 800 },
            CostedItem { quantity: 3, production_cost: 500 },
        ];
        let records = compute_commissions(&order, &items, &CommissionConfig::default(), &[]);
        assert_eq!(amount_of(&records, CommissionKind::Preparer), vec![100 * 5]);
    }

    #[test]
    fn investor_pool_remainder_goes_to_business_margin() {
        let order = sample_order(None, None, None, 0);
        let config = CommissionConfig { investor_pool: 500, ..CommissionConfig::default() };
        let investors = [investor(1, "a"), investor(2, "b"), investor(3, "c")];

        let records = compute_commissions(&order, &[], &config, &investors);

        let shares = amount_of(&records, CommissionKind::InvestorShare);
        assert_eq!(shares, vec![166, 166, 166]);
        assert!(shares.iter().sum::<i64>() <= config.investor_pool);
        // 500 mod 3 = 2 lands in the margin row
        assert_eq!(amount_of(&records, CommissionKind::BusinessMargin), vec![200 + 2]);
    }

    #[test]
    fn investor_shares_equal_pool_when_divisible() {
        let order = sample_order(None, None, None, 0);
        let config = CommissionConfig { investor_pool: 600, ..CommissionConfig::default() };
        let investors = [investor(1, "a"), investor(2, "b"), investor(3, "c")];

        let records = compute_commissions(&order, &[], &config, &investors);
        let shares = amount_of(&records, CommissionKind::InvestorShare);
        assert_eq!(shares.iter().sum::<i64>(), config.investor_pool);
        assert_eq!(amount_of(&records, CommissionKind::BusinessMargin), vec![200]);
    }

    #[test]
    fn no_active_investors_leaves_pool_unallocated() {
        let order = sample_order(None, None, None, 0);
        let records = compute_commissions(&order, &[], &CommissionConfig::default(), &[]);
        assert!(amount_of(&records, CommissionKind::InvestorShare).is_empty());
        assert_eq!(amount_of(&records, CommissionKind::BusinessMargin), vec![200]);
    }

    #[tokio::test]
    async fn recompute_is_idempotent() {
        let pool = memory_pool().await;
        let seller = insert_worker(&pool, "Maria", role::SELLER).await;
        insert_worker(&pool, "Ivan", role::INVESTOR).await;
        insert_worker(&pool, "Igor", role::INVESTOR).await;
        let product = insert_product(&pool, "Large chocolate", 1900, 800).await;
        let order_id = insert_order(&pool, 1, Some(seller), None, None, 0).await;
        add_order_item(&pool, order_id, product, 2, 1900).await;

        for _ in 0..2 {
            let mut tx = pool.begin().await.unwrap();
            recompute_for_order(&mut tx, order_id).await.unwrap();
            tx.commit().await.unwrap();
        }

        let records = sqlx::query_as::<_, CommissionRecord>(
            "SELECT id, order_id, worker_id, kind, amount FROM commissions WHERE order_id = $1 ORDER BY id",
        )
        .bind(order_id)
        .fetch_all(&pool)
        .await
        .unwrap();

        // seller + margin + 2 investor shares + production cost, once
        assert_eq!(records.len(), 5);
        let kinds: Vec<&str> = records.iter().map(|r| r.kind.as_str()).collect();
        assert_eq!(
            kinds,
            vec!["SELLER", "BUSINESS_MARGIN", "INVESTOR_SHARE", "INVESTOR_SHARE", "PRODUCTION_COST"]
        );
        assert_eq!(
            records.iter().find(|r| r.kind == "PRODUCTION_COST").unwrap().amount,
            1600
        );
    }

    #[tokio::test]
    async fn recompute_creates_missing_config_with_defaults() {
        let pool = memory_pool().await;
        let order_id = insert_order(&pool, 1, None, None, None, 0).await;

        let mut tx = pool.begin().await.unwrap();
        let records = recompute_for_order(&mut tx, order_id).await.unwrap();
        tx.commit().await.unwrap();

        let margin = records.iter().find(|r| r.kind == CommissionKind::BusinessMargin).unwrap();
        assert_eq!(margin.amount, 200);

        let config = sqlx::query_as::<_, CommissionConfig>(
            "SELECT * FROM commission_config WHERE id = 1",
        )
        .fetch_one(&pool)
        .await
        .unwrap();
        assert_eq!(config.seller_commission, 500);
    }
}
