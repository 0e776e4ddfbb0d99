// src/dtos/order.rs
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::models::order::{Order, OrderItem};

#[derive(Debug, Deserialize)]
pub struct CreateOrderRequest {
    pub delivery_date: NaiveDate,
    pub delivery_window: Option<String>,
    pub customer_name: String,
    pub customer_phone: Option<String>,
    pub customer_address: Option<String>,
    pub seller_id: Option<i64>,
    pub courier_id: Option<i64>,
    pub preparer_id: Option<i64>,
    #[serde(default)]
    pub delivery_fee: i64,
    pub notes: Option<String>,
    pub items: Vec<CreateOrderItemRequest>,
}

#[derive(Debug, Deserialize)]
pub struct CreateOrderItemRequest {
    pub product_id: i64,
    pub quantity: i64,
    /// Frozen at order time; defaults to the product's current sale price.
    pub unit_price: Option<i64>,
    #[serde(default)]
    pub gift_wrap: bool,
}

#[derive(Debug, Serialize)]
pub struct OrderItemResponse {
    pub id: i64,
    pub product_id: i64,
    pub product_name: String,
    pub quantity: i64,
    pub unit_price: i64,
    pub gift_wrap: bool,
    pub gift_wrap_fee: i64,
    pub line_total: i64,
}

#[derive(Debug, Serialize)]
pub struct CommissionResponse {
    pub id: i64,
    pub worker_id: Option<i64>,
    pub worker_name: Option<String>,
    pub kind: String,
    pub amount: i64,
}

#[derive(Debug, Serialize)]
pub struct OrderResponse {
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
    pub items: Vec<OrderItemResponse>,
    pub commissions: Vec<CommissionResponse>,
}

impl OrderResponse {
    pub fn from_parts(
        order: Order,
        items: Vec<(OrderItem, String)>,
        commissions: Vec<CommissionResponse>,
    ) -> Self {
        Self {
            id: order.id,
            order_number: order.order_number,
            order_date: order.order_date,
            delivery_date: order.delivery_date,
            delivery_window: order.delivery_window,
            customer_name: order.customer_name,
            customer_phone: order.customer_phone,
            customer_address: order.customer_address,
            seller_id: order.seller_id,
            courier_id: order.courier_id,
            preparer_id: order.preparer_id,
            status: order.status,
            subtotal: order.subtotal,
            delivery_fee: order.delivery_fee,
            total: order.total,
            notes: order.notes,
            items: items
                .into_iter()
                .map(|(item, product_name)| OrderItemResponse {
                    id: item.id,
                    product_id: item.product_id,
                    product_name,
                    quantity: item.quantity,
                    unit_price: item.unit_price,
                    gift_wrap: item.gift_wrap,
                    gift_wrap_fee: item.gift_wrap_fee,
                    line_total: item.quantity * item.unit_price + item.gift_wrap_fee,
                })
                .collect(),
            commissions,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct OrderListItem {
    pub id: i64,
    pub order_number: i64,
    pub order_date: NaiveDate,
    pub delivery_date: NaiveDate,
    pub customer_name: String,
    pub status: String,
    pub total: i64,
    pub item_count: i64,
}
