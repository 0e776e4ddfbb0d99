use sqlx::FromRow;

/// Worker roles. Stored as plain strings; role decides which commission
/// kinds a worker is eligible for.
pub mod role {
    pub const SELLER: &str = "seller";
    pub const COURIER: &str = "courier";
    pub const PREPARER: &str = "preparer";
    pub const INVESTOR: &str = "investor";

    pub const ALL: [&str; 4] = [SELLER, COURIER, PREPARER, INVESTOR];
}

#[derive(Debug, Clone, FromRow)]
pub struct Worker {
    pub id: i64,
    pub name: String,
    pub role: String,
    pub active: bool,
    pub phone: Option<String>,
    pub total_earned: i64,
}
