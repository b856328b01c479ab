pub mod classifier;
pub mod context;
pub mod snapshot;

pub use classifier::{ClassifierRef, LockClassifier, WeakClassifier};
pub use context::CapturedContext;
pub use snapshot::ThreadSnapshot;
