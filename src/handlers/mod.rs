pub mod product;
pub mod worker;
pub mod order;
pub mod config;
pub mod stats;
pub mod report;
pub mod backup;
