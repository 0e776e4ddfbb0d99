use chrono::NaiveDate;
use sqlx::FromRow;

pub mod status {
    pub const PENDING: &str = "PENDING";
    pub const COMPLETED: &str = "COMPLETED";
}

#[derive(Debug, Clone, FromRow)]
pub struct Order {
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
}

#[derive(Debug, Clone, FromRow)]
pub struct OrderItem {
    pub id: i64,
    pub order_id: i64,
    pub product_id: i64,
    pub quantity: i64,
    pub unit_price: i64,
    pub gift_wrap: bool,
    pub gift_wrap_fee: i64,
}
