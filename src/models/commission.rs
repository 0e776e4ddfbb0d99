use sqlx::FromRow;

/// The six ledger row kinds a completed order can produce. `BusinessMargin`
/// and `ProductionCost` rows never reference a worker; `ProductionCost` is
/// capital recovery, not a payout.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommissionKind {
    Seller,
    Courier,
    Preparer,
    BusinessMargin,
    InvestorShare,
    ProductionCost,
}

impl CommissionKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            CommissionKind::Seller => "SELLER",
            CommissionKind::Courier => "COURIER",
            CommissionKind::Preparer => "PREPARER",
            CommissionKind::BusinessMargin => "BUSINESS_MARGIN",
            CommissionKind::InvestorShare => "INVESTOR_SHARE",
            CommissionKind::ProductionCost => "PRODUCTION_COST",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "SELLER" => Some(CommissionKind::Seller),
            "COURIER" => Some(CommissionKind::Courier),
            "PREPARER" => Some(CommissionKind::Preparer),
            "BUSINESS_MARGIN" => Some(CommissionKind::BusinessMargin),
            "INVESTOR_SHARE" => Some(CommissionKind::InvestorShare),
            "PRODUCTION_COST" => Some(CommissionKind::ProductionCost),
            _ => None,
        }
    }

    /// Kinds whose rows carry a worker reference. Business margin and
    /// production cost belong to the business itself.
    pub fn has_worker(&self) -> bool {
        !matches!(self, CommissionKind::BusinessMargin | CommissionKind::ProductionCost)
    }
}

#[derive(Debug, Clone, FromRow)]
pub struct CommissionRecord {
    pub id: i64,
    pub order_id: i64,
    pub worker_id: Option<i64>,
    pub kind: String,
    pub amount: i64,
}
