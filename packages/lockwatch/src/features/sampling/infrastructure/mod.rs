pub mod error;
pub mod observer;
pub mod runtime_introspector;

pub use error::IntrospectionError;
pub use observer::{SamplingHandle, SamplingOrderObserver};
