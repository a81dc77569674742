//! # Simulation
//!
//! 仿真主循环：每个 tick 推进发送速率与车辆位置，组装五类遥测记录交给 sink，然后按当前速率挂起。
//!
//! ## 时钟
//!
//! - `RealTime`: 墙钟时间，按速率 sleep
//! - `FixedStep`: 固定步长，确定性测试
//! - `Virtual`: 仿真时间按速率推进，不 sleep
//!
//! ## 退出
//!
//! 到达终点、外部中断 (watch channel)、或自定义停止条件。
//! 投递失败只记录日志；非有限数值与无法到达终点为致命错误。

mod clock;
mod error;
mod runner;
mod summary;

pub use clock::{Clock, SimulationClock};
pub use error::SimulationError;
pub use runner::{LoopProgress, STALL_TICK_LIMIT, SimulationLoop, channel_names};
pub use summary::{RunOutcome, RunSummary};
