/// Lock-Order Domain Models
pub mod models;

pub use models::*;
