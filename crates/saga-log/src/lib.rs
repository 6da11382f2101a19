//! Append-only audit log for saga and step state transitions.
//!
//! Every state transition a saga makes is recorded here before the
//! transition's effects become visible to the caller, so the log is never
//! behind the in-memory status. The step history is strictly append-only;
//! the saga-level summary entry is the one documented exception (see
//! [`SagaLog::update_latest_state`]).

pub mod entry;
pub mod error;
pub mod log;
pub mod memory;
pub mod postgres;

pub use entry::{LogEntry, Subject};
pub use error::{Result, SagaLogError};
pub use log::SagaLog;
pub use memory::InMemorySagaLog;
pub use postgres::PostgresSagaLog;
