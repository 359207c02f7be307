//! Progress reporting from a worker thread to a polling monitor thread,
//! under several synchronization strategies.

pub mod channel;
pub mod config;
pub mod demo;
pub mod error;
pub mod labels;
pub mod monitor;
pub mod session;
pub mod worker;

pub use channel::{
    AtomicChannel, LockedChannel, MemoryOrdering, ProgressChannel, SlotChannel, Snapshot,
    SplitAtomicChannel,
};
pub use config::RunConfig;
pub use demo::Demo;
pub use error::{ChannelError, ConfigError, MonitorError, RunError};
pub use labels::LabelTable;
pub use monitor::{format_line, Monitor, MonitorReport};
pub use session::RunReport;
pub use worker::{Worker, WorkerReport};
