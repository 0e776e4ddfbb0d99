use sqlx::FromRow;

#[derive(Debug, Clone, FromRow)]
pub struct Product {
    pub id: i64,
    pub name: String,
    pub category: String,
    pub size: Option<String>,
    pub sale_price: i64,
    pub production_cost: i64,
    pub stock: i64,
    pub active: bool,
}
