//! Application layer - the `Lockwatch` facade

pub mod toolkit;

pub use toolkit::Lockwatch;
