pub mod product;
pub mod worker;
pub mod order;
pub mod commission;
pub mod config;
