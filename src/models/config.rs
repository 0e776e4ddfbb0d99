use sqlx::FromRow;

/// Singleton commission configuration (row id is always 1). Created lazily
/// with these defaults the first time it is read.
#[derive(Debug, Clone, FromRow)]
pub struct CommissionConfig {
    pub id: i64,
    pub seller_commission: i64,
    pub business_margin: i64,
    pub investor_pool: i64,
    pub preparer_rate: i64,
    pub gift_wrap_fee: i64,
}

impl Default for CommissionConfig {
    fn default() -> Self {
        Self {
            id: 1,
            seller_commission: 500,
            business_margin: 200,
            investor_pool: 500,
            preparer_rate: 100,
            gift_wrap_fee: 200,
        }
    }
}
