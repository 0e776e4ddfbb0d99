// src/dtos/config.rs
use serde::{Deserialize, Serialize};

#[derive(Debug, Deserialize)]
pub struct UpdateConfigRequest {
    pub seller_commission: i64,
    pub business_margin: i64,
    pub investor_pool: i64,
    pub preparer_rate: i64,
    pub gift_wrap_fee: i64,
}

#[derive(Debug, Serialize)]
pub struct ConfigResponse {
    pub seller_commission: i64,
    pub business_margin: i64,
    pub investor_pool: i64,
    pub preparer_rate: i64,
    pub gift_wrap_fee: i64,
}

impl From<crate::models::config::CommissionConfig> for ConfigResponse {
    fn from(config: crate::models::config::CommissionConfig) -> Self {
        Self {
            seller_commission: config.seller_commission,
            business_margin: config.business_margin,
            investor_pool: config.investor_pool,
            preparer_rate: config.preparer_rate,
            gift_wrap_fee: config.gift_wrap_fee,
        }
    }
}
