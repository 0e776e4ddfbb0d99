// src/dtos/product.rs
use serde::{Deserialize, Serialize};

#[derive(Debug, Deserialize)]
pub struct CreateProductRequest {
    pub name: String,
    pub category: String,
    pub size: Option<String>,
    pub sale_price: i64,
    pub production_cost: i64,
    #[serde(default)]
    pub stock: i64,
}

#[derive(Debug, Deserialize)]
pub struct UpdateProductRequest {
    pub name: Option<String>,
    pub category: Option<String>,
    pub size: Option<String>,
    pub sale_price: Option<i64>,
    pub production_cost: Option<i64>,
    pub stock: Option<i64>,
    pub active: Option<bool>,
}

#[derive(Debug, Serialize)]
pub struct ProductResponse {
    pub id: i64,
    pub name: String,
    pub category: String,
    pub size: Option<String>,
    pub sale_price: i64,
    pub production_cost: i64,
    pub stock: i64,
    pub active: bool,
}

impl From<crate::models::product::Product> for ProductResponse {
    fn from(product: crate::models::product::Product) -> Self {
        Self {
            id: product.id,
            name: product.name,
            category: product.category,
            size: product.size,
            sale_price: product.sale_price,
            production_cost: product.production_cost,
            stock: product.stock,
            active: product.active,
        }
    }
}
