// src/handlers/order.rs
use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use sqlx::SqlitePool;
use tracing::{info, instrument, warn};

use crate::commission;
use crate::dtos::order::{
    CommissionResponse, CreateOrderRequest, OrderListItem, OrderResponse,
};
use crate::error::AppError;
use crate::models::order::{status, Order, OrderItem};
use crate::models::product::Product;
use crate::models::worker::role;
use crate::notify;
use crate::report;
use crate::state::AppState;

/// Attempts at allocating a unique order number before giving up. Two
/// concurrent creations can pick the same max+1; the UNIQUE constraint
/// rejects the loser, which simply retries with a fresh number.
const ORDER_NUMBER_ATTEMPTS: u32 = 3;

fn is_unique_violation(err: &AppError) -> bool {
    matches!(
        err,
        AppError::DatabaseError(sqlx::Error::Database(db_err)) if db_err.is_unique_violation()
    )
}

async fn check_worker_role(
    pool: &SqlitePool,
    worker_id: Option<i64>,
    expected_role: &str,
) -> Result<(), AppError> {
    let Some(id) = worker_id else { return Ok(()) };

    let found: Option<String> =
        sqlx::query_scalar("SELECT role FROM workers WHERE id = $1 AND active = 1")
            .bind(id)
            .fetch_optional(pool)
            .await?;

    match found {
        Some(role) if role == expected_role => Ok(()),
        Some(role) => Err(AppError::validation(&format!(
            "Worker {} has role '{}', expected '{}'",
            id, role, expected_role
        ))),
        None => Err(AppError::validation(&format!("Worker {} not found or inactive", id))),
    }
}

/// One creation attempt: allocate max+1, write the order and its items in
/// a single transaction. A unique violation on the order number bubbles up
/// to the caller's retry loop.
async fn try_create_order(pool: &SqlitePool, req: &CreateOrderRequest) -> Result<i64, AppError> {
    let mut tx = pool.begin().await?;

    let order_number: i64 =
        sqlx::query_scalar("SELECT COALESCE(MAX(order_number), 0) + 1 FROM orders")
            .fetch_one(&mut *tx)
            .await?;

    let config = commission::load_or_init_config(&mut tx).await?;

    let order_id: i64 = sqlx::query_scalar(
        "INSERT INTO orders
         (order_number, order_date, delivery_date, delivery_window,
          customer_name, customer_phone, customer_address,
          seller_id, courier_id, preparer_id, status,
          subtotal, delivery_fee, total, notes)
         VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, 0, $12, $12, $13)
         RETURNING id",
    )
    .bind(order_number)
    .bind(chrono::Local::now().date_naive())
    .bind(req.delivery_date)
    .bind(&req.delivery_window)
    .bind(&req.customer_name)
    .bind(&req.customer_phone)
    .bind(&req.customer_address)
    .bind(req.seller_id)
    .bind(req.courier_id)
    .bind(req.preparer_id)
    .bind(status::PENDING)
    .bind(req.delivery_fee)
    .bind(&req.notes)
    .fetch_one(&mut *tx)
    .await?;

    let mut subtotal: i64 = 0;
    for item in &req.items {
        let product = sqlx::query_as::<_, Product>(
            "SELECT * FROM products WHERE id = $1 AND active = 1",
        )
        .bind(item.product_id)
        .fetch_optional(&mut *tx)
        .await?
        .ok_or_else(|| {
            AppError::validation(&format!("Product {} not found or inactive", item.product_id))
        })?;

        let unit_price = item.unit_price.unwrap_or(product.sale_price);
        if unit_price < 0 {
            return Err(AppError::validation("Unit price cannot be negative"));
        }
        let gift_wrap_fee = if item.gift_wrap { config.gift_wrap_fee } else { 0 };

        sqlx::query(
            "INSERT INTO order_items (order_id, product_id, quantity, unit_price, gift_wrap, gift_wrap_fee)
             VALUES ($1, $2, $3, $4, $5, $6)",
        )
        .bind(order_id)
        .bind(item.product_id)
        .bind(item.quantity)
        .bind(unit_price)
        .bind(item.gift_wrap)
        .bind(gift_wrap_fee)
        .execute(&mut *tx)
        .await?;

        subtotal += item.quantity * unit_price + gift_wrap_fee;
    }

    sqlx::query("UPDATE orders SET subtotal = $1, total = $1 + delivery_fee WHERE id = $2")
        .bind(subtotal)
        .bind(order_id)
        .execute(&mut *tx)
        .await?;

    tx.commit().await?;
    Ok(order_id)
}

// POST /orders - Create new order with its items
#[instrument(skip(state, req))]
pub async fn create_order(
    State(state): State<AppState>,
    Json(req): Json<CreateOrderRequest>,
) -> Result<(StatusCode, Json<OrderResponse>), AppError> {
    if req.items.is_empty() {
        return Err(AppError::validation("Order must contain at least one item"));
    }
    if req.customer_name.trim().is_empty() {
        return Err(AppError::validation("Customer name is required"));
    }
    if req.delivery_fee < 0 {
        return Err(AppError::validation("Delivery fee cannot be negative"));
    }
    for item in &req.items {
        if item.quantity <= 0 {
            return Err(AppError::validation("Quantity must be greater than 0"));
        }
    }

    check_worker_role(&state.db_pool, req.seller_id, role::SELLER).await?;
    check_worker_role(&state.db_pool, req.courier_id, role::COURIER).await?;
    check_worker_role(&state.db_pool, req.preparer_id, role::PREPARER).await?;

    for attempt in 1..=ORDER_NUMBER_ATTEMPTS {
        match try_create_order(&state.db_pool, &req).await {
            Ok(order_id) => {
                let response = fetch_order_by_id(&state.db_pool, order_id).await?;
                return Ok((StatusCode::CREATED, Json(response)));
            }
            Err(e) if is_unique_violation(&e) && attempt < ORDER_NUMBER_ATTEMPTS => {
                warn!(attempt, "Order number already taken, retrying");
            }
            Err(e) => return Err(e),
        }
    }

    Err(AppError::conflict("Could not allocate a unique order number"))
}

// GET /orders - List orders, newest first
#[instrument(skip(state))]
pub async fn list_orders(
    State(state): State<AppState>,
) -> Result<Json<Vec<OrderListItem>>, AppError> {
    let rows = sqlx::query_as::<_, (i64, i64, chrono::NaiveDate, chrono::NaiveDate, String, String, i64, i64)>(
        "SELECT o.id, o.order_number, o.order_date, o.delivery_date,
                o.customer_name, o.status, o.total, COUNT(oi.id)
         FROM orders o
         LEFT JOIN order_items oi ON oi.order_id = o.id
         GROUP BY o.id
         ORDER BY o.order_number DESC",
    )
    .fetch_all(&state.db_pool)
    .await?;

    Ok(Json(
        rows.into_iter()
            .map(
                |(id, order_number, order_date, delivery_date, customer_name, status, total, item_count)| {
                    OrderListItem {
                        id,
                        order_number,
                        order_date,
                        delivery_date,
                        customer_name,
                        status,
                        total,
                        item_count,
                    }
                },
            )
            .collect(),
    ))
}

// GET /orders/:id - Get single order with items and commissions
#[instrument(skip(state), fields(id))]
pub async fn get_order(
    Path(id): Path<i64>,
    State(state): State<AppState>,
) -> Result<Json<OrderResponse>, AppError> {
    fetch_order_by_id(&state.db_pool, id).await.map(Json)
}

// POST /orders/:id/complete - One-way PENDING -> COMPLETED transition.
// Runs the commission engine and credits worker earnings in the same
// transaction, then pushes the financial report after commit.
#[instrument(skip(state), fields(id))]
pub async fn complete_order(
    Path(id): Path<i64>,
    State(state): State<AppState>,
) -> Result<Json<OrderResponse>, AppError> {
    let mut tx = state.db_pool.begin().await?;

    let order = sqlx::query_as::<_, Order>("SELECT * FROM orders WHERE id = $1")
        .bind(id)
        .fetch_optional(&mut *tx)
        .await?
        .ok_or_else(|| AppError::not_found("Order not found"))?;

    if order.status == status::COMPLETED {
        return Err(AppError::conflict("Order is already completed"));
    }

    sqlx::query("UPDATE orders SET status = $1 WHERE id = $2")
        .bind(status::COMPLETED)
        .bind(id)
        .execute(&mut *tx)
        .await?;

    let records = commission::recompute_for_order(&mut tx, id).await?;

    // completion happens exactly once, so crediting here cannot double count
    for record in &records {
        if let Some(worker_id) = record.worker_id {
            sqlx::query("UPDATE workers SET total_earned = total_earned + $1 WHERE id = $2")
                .bind(record.amount)
                .bind(worker_id)
                .execute(&mut *tx)
                .await?;
        }
    }

    tx.commit().await?;
    info!(order_number = order.order_number, "Order completed");

    // best-effort notification, never part of the transaction
    if state.notify.is_configured() {
        match report::build_order_report(&state.db_pool, id).await {
            Ok(message) => notify::send_whatsapp_detached(state.notify.clone(), message),
            Err(e) => warn!(?e, "Failed to build order report for notification"),
        }
    }

    fetch_order_by_id(&state.db_pool, id).await.map(Json)
}

// Helper to fetch full order details
pub async fn fetch_order_by_id(pool: &SqlitePool, id: i64) -> Result<OrderResponse, AppError> {
    let order = sqlx::query_as::<_, Order>("SELECT * FROM orders WHERE id = $1")
        .bind(id)
        .fetch_optional(pool)
        .await?
        .ok_or_else(|| AppError::not_found("Order not found"))?;

    let items: Vec<(OrderItem, String)> = sqlx::query_as::<_, (i64, i64, i64, i64, i64, bool, i64, String)>(
        "SELECT oi.id, oi.order_id, oi.product_id, oi.quantity, oi.unit_price,
                oi.gift_wrap, oi.gift_wrap_fee, p.name
         FROM order_items oi
         JOIN products p ON p.id = oi.product_id
         WHERE oi.order_id = $1
         ORDER BY oi.id",
    )
    .bind(id)
    .fetch_all(pool)
    .await?
    .into_iter()
    .map(|(id, order_id, product_id, quantity, unit_price, gift_wrap, gift_wrap_fee, name)| {
        (
            OrderItem { id, order_id, product_id, quantity, unit_price, gift_wrap, gift_wrap_fee },
            name,
        )
    })
    .collect();

    let commissions = sqlx::query_as::<_, (i64, Option<i64>, Option<String>, String, i64)>(
        "SELECT c.id, c.worker_id, w.name, c.kind, c.amount
         FROM commissions c
         LEFT JOIN workers w ON w.id = c.worker_id
         WHERE c.order_id = $1
         ORDER BY c.id",
    )
    .bind(id)
    .fetch_all(pool)
    .await?
    .into_iter()
    .map(|(id, worker_id, worker_name, kind, amount)| CommissionResponse {
        id,
        worker_id,
        worker_name,
        kind,
        amount,
    })
    .collect();

    Ok(OrderResponse::from_parts(order, items, commissions))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dtos::order::CreateOrderItemRequest;
    use crate::notify::NotifySettings;
    use crate::test_support::{insert_order, insert_product, insert_worker, memory_pool};

    async fn test_state() -> AppState {
        AppState::new(memory_pool().await, NotifySettings::disabled())
    }

    fn order_request(
        items: Vec<CreateOrderItemRequest>,
        seller_id: Option<i64>,
        delivery_fee: i64,
    ) -> CreateOrderRequest {
        CreateOrderRequest {
            delivery_date: chrono::Local::now().date_naive(),
            delivery_window: None,
            customer_name: "Maria Perez".to_string(),
            customer_phone: None,
            customer_address: None,
            seller_id,
            courier_id: None,
            preparer_id: None,
            delivery_fee,
            notes: None,
            items,
        }
    }

    fn item(product_id: i64, quantity: i64) -> CreateOrderItemRequest {
        CreateOrderItemRequest { product_id, quantity, unit_price: None, gift_wrap: false }
    }

    #[tokio::test]
    async fn created_order_holds_total_invariant() {
        let state = test_state().await;
        let product = insert_product(&state.db_pool, "Large chocolate", 1900, 800).await;

        let (_, Json(order)) = create_order(
            State(state.clone()),
            Json(order_request(vec![item(product, 2)], None, 300)),
        )
        .await
        .unwrap();

        assert_eq!(order.subtotal, 3800);
        assert_eq!(order.delivery_fee, 300);
        assert_eq!(order.total, order.subtotal + order.delivery_fee);
        assert_eq!(order.status, "PENDING");
        assert_eq!(order.items.len(), 1);
        assert!(order.commissions.is_empty());
    }

    #[tokio::test]
    async fn order_numbers_are_sequential() {
        let state = test_state().await;
        let product = insert_product(&state.db_pool, "Medium chocolate", 1200, 500).await;

        let (_, Json(first)) = create_order(
            State(state.clone()),
            Json(order_request(vec![item(product, 1)], None, 0)),
        )
        .await
        .unwrap();
        let (_, Json(second)) = create_order(
            State(state.clone()),
            Json(order_request(vec![item(product, 1)], None, 0)),
        )
        .await
        .unwrap();

        assert_eq!(first.order_number, 1);
        assert_eq!(second.order_number, 2);
    }

    #[tokio::test]
    async fn duplicate_order_number_is_a_unique_violation() {
        let state = test_state().await;
        insert_order(&state.db_pool, 1, None, None, None, 0).await;

        // the same collision a concurrent creation would hit mid-allocation
        let err: AppError = sqlx::query(
            "INSERT INTO orders
             (order_number, order_date, delivery_date, customer_name, status, subtotal, delivery_fee, total)
             VALUES (1, $1, $1, 'Duplicate', 'PENDING', 0, 0, 0)",
        )
        .bind(chrono::Local::now().date_naive())
        .execute(&state.db_pool)
        .await
        .unwrap_err()
        .into();

        assert!(is_unique_violation(&err));
        assert!(!is_unique_violation(&AppError::conflict("already completed")));
        assert!(!is_unique_violation(&AppError::not_found("Order not found")));

        // allocation moves past the taken number and creation still succeeds
        let product = insert_product(&state.db_pool, "Large chocolate", 1900, 800).await;
        let (_, Json(order)) = create_order(
            State(state.clone()),
            Json(order_request(vec![item(product, 1)], None, 0)),
        )
        .await
        .unwrap();
        assert_eq!(order.order_number, 2);
    }

    #[tokio::test]
    async fn empty_order_is_rejected() {
        let state = test_state().await;
        let err = create_order(State(state), Json(order_request(vec![], None, 0))).await;
        assert!(matches!(err, Err(AppError::ValidationError(_))));
    }

    #[tokio::test]
    async fn gift_wrap_fee_comes_from_config() {
        let state = test_state().await;
        let product = insert_product(&state.db_pool, "Small chocolate", 900, 400).await;

        let mut req = order_request(vec![item(product, 1)], None, 0);
        req.items[0].gift_wrap = true;

        let (_, Json(order)) = create_order(State(state), Json(req)).await.unwrap();

        // default gift wrap fee is 200
        assert_eq!(order.items[0].gift_wrap_fee, 200);
        assert_eq!(order.subtotal, 900 + 200);
        assert_eq!(order.total, order.subtotal);
    }

    #[tokio::test]
    async fn completion_generates_commissions_and_credits_workers() {
        let state = test_state().await;
        let seller = insert_worker(&state.db_pool, "Laura", role::SELLER).await;
        insert_worker(&state.db_pool, "Ivan", role::INVESTOR).await;
        insert_worker(&state.db_pool, "Igor", role::INVESTOR).await;
        let big = insert_product(&state.db_pool, "Large chocolate", 1900, 800).await;
        let small = insert_product(&state.db_pool, "Medium chocolate", 1200, 500).await;

        let (_, Json(order)) = create_order(
            State(state.clone()),
            Json(order_request(vec![item(big, 2), item(small, 1)], Some(seller), 0)),
        )
        .await
        .unwrap();

        let Json(completed) = complete_order(Path(order.id), State(state.clone())).await.unwrap();

        assert_eq!(completed.status, "COMPLETED");
        let kinds: Vec<&str> = completed.commissions.iter().map(|c| c.kind.as_str()).collect();
        assert_eq!(
            kinds,
            vec!["SELLER", "BUSINESS_MARGIN", "INVESTOR_SHARE", "INVESTOR_SHARE", "PRODUCTION_COST"]
        );
        let production = completed.commissions.iter().find(|c| c.kind == "PRODUCTION_COST").unwrap();
        assert_eq!(production.amount, 2100);

        let earned: i64 = sqlx::query_scalar("SELECT total_earned FROM workers WHERE id = $1")
            .bind(seller)
            .fetch_one(&state.db_pool)
            .await
            .unwrap();
        assert_eq!(earned, 500);
    }

    #[tokio::test]
    async fn completing_twice_is_a_conflict() {
        let state = test_state().await;
        let product = insert_product(&state.db_pool, "Large chocolate", 1900, 800).await;
        let (_, Json(order)) = create_order(
            State(state.clone()),
            Json(order_request(vec![item(product, 1)], None, 0)),
        )
        .await
        .unwrap();

        complete_order(Path(order.id), State(state.clone())).await.unwrap();
        let second = complete_order(Path(order.id), State(state.clone())).await;
        assert!(matches!(second, Err(AppError::Conflict(_))));

        // still exactly one commission set
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM commissions WHERE order_id = $1")
            .bind(order.id)
            .fetch_one(&state.db_pool)
            .await
            .unwrap();
        assert_eq!(count, 2); // margin + production cost, no workers assigned
    }

    #[tokio::test]
    async fn seller_assignment_requires_seller_role() {
        let state = test_state().await;
        let courier = insert_worker(&state.db_pool, "Jose", role::COURIER).await;
        let product = insert_product(&state.db_pool, "Large chocolate", 1900, 800).await;

        let err = create_order(
            State(state),
            Json(order_request(vec![item(product, 1)], Some(courier), 0)),
        )
        .await;
        assert!(matches!(err, Err(AppError::ValidationError(_))));
    }
}
