//! Concurrency Guard
//!
//! Asserts that values believed to be externally serialized are never
//! accessed by two threads at once. Opt-in per type; meant for tests.
//!
//! ```rust,ignore
//! let guard = ConcurrencyGuard::default();
//! guard.set_detect::<LruCache>(true);
//! // at every point access is assumed exclusive:
//! guard.check(&cache);
//! // fails if `check` never ran while enabled:
//! guard.set_detect::<LruCache>(false);
//! ```

pub mod infrastructure;

pub use infrastructure::{ConcurrencyGuard, GuardError};
