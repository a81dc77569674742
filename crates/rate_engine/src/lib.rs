//! # Rate Engine
//!
//! 发送速率控制引擎。
//!
//! 负责：
//! - 指数衰减过渡 (`decay_rate`)
//! - 随机变化窗口规划 (`WindowPlanner`)
//! - 预热 / 稳定两阶段速率状态机 (`RateScheduler`)
//!
//! 速率单位为毫秒，表示两次发送之间的间隔；调度器本身不 sleep，由调用方负责挂起。
//!
//! ## 使用示例
//!
//! ```
//! use rand::{SeedableRng, rngs::StdRng};
//! use rate_engine::{RateScheduler, WindowPlanner};
//!
//! let config = contracts::RateConfig::default();
//! let mut rng = StdRng::seed_from_u64(7);
//! let schedule = WindowPlanner::from_rate_config(&config).plan(60, &mut rng);
//!
//! let mut scheduler = RateScheduler::new(config, schedule);
//! assert_eq!(scheduler.tick(0.0), 1000.0);
//! ```

mod decay;
mod planner;
mod scheduler;

pub use contracts::{ChangeKind, ChangeWindow, RateConfig};
pub use decay::decay_rate;
pub use planner::{PlannerConfig, WindowPlanner};
pub use scheduler::{ActiveTransition, RatePhase, RateScheduler, RateState};
