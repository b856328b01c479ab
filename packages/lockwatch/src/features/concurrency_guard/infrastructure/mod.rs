pub mod error;
pub mod guard;

pub use error::GuardError;
pub use guard::ConcurrencyGuard;
