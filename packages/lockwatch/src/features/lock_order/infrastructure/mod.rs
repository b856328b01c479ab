pub mod order_graph;
pub mod probe;
pub mod recorder;
pub mod sink;

pub use order_graph::{OrderGraph, RecordOutcome};
pub use probe::MonitorProbe;
pub use recorder::LockOrderRecorder;
pub use sink::CollectingSink;
