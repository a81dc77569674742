//! # Dispatcher
//!
//! 遥测记录分发模块。
//!
//! 负责：
//! - 实现 `TelemetrySink`，供仿真循环逐条发布记录
//! - Fan-out 到多个 sinks (log / file / network)
//! - 每个 sink 独立队列与 worker，慢 sink 不阻塞仿真循环

pub mod dispatcher;
pub mod error;
pub mod handle;
pub mod metrics;
pub mod sinks;

pub use contracts::{TelemetryRecord, TelemetrySink};
pub use dispatcher::{Dispatcher, DispatcherBuilder, DispatcherConfig, create_dispatcher};
pub use error::DispatcherError;
pub use handle::{QueuedRecord, SinkHandle};
pub use metrics::{MetricsSnapshot, SinkMetrics};
pub use sinks::{FileSink, FileSinkConfig, LogSink, NetworkSink, NetworkSinkConfig};
