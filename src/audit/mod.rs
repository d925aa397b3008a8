pub mod logger;
pub mod reader;
pub mod sink;
pub mod types;

pub use logger::AuditLogger;
pub use reader::AuditReader;
pub use sink::{AuditSink, MemorySink, SinkError};
pub use types::*;
