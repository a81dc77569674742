//! 仿真运行指标收集模块
//!
//! 每个 tick 记录速率、速度、剩余距离，并统计发布结果。

use metrics::{counter, gauge, histogram};

/// 单个 tick 的观测值
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TickSample {
    /// tick 序号 (从 1 开始)
    pub tick: u64,
    /// 当前发送间隔 (ms)
    pub rate_ms: f64,
    /// 当前速度 (km/h)
    pub speed_kmh: f64,
    /// 距终点剩余距离 (km)
    pub remaining_km: f64,
}

/// 从 TickSample 记录指标
///
/// 每个 tick 调用一次。
///
/// # Example
///
/// ```ignore
/// use observability::metrics::{record_tick_metrics, TickSample};
///
/// record_tick_metrics(&TickSample { tick: 1, rate_ms: 1000.0, speed_kmh: 24_000.0, remaining_km: 400.0 });
/// ```
pub fn record_tick_metrics(sample: &TickSample) {
    counter!("telemetry_sim_ticks_total").increment(1);
    gauge!("telemetry_sim_last_tick").set(sample.tick as f64);

    // 发送间隔
    gauge!("telemetry_sim_rate_ms").set(sample.rate_ms);
    histogram!("telemetry_sim_rate_ms_hist").record(sample.rate_ms);

    // 速度
    gauge!("telemetry_sim_speed_kmh").set(sample.speed_kmh);
    histogram!("telemetry_sim_speed_kmh_hist").record(sample.speed_kmh);

    gauge!("telemetry_sim_remaining_km").set(sample.remaining_km);
}

/// 记录单条遥测记录的发布结果
pub fn record_published(channel: &str, success: bool) {
    let status = if success { "success" } else { "failure" };
    counter!(
        "telemetry_sim_records_published_total",
        "channel" => channel.to_string(),
        "status" => status.to_string()
    )
    .increment(1);
}

/// 记录 sink 队列丢弃数
pub fn record_sink_dropped(sink_name: &str, dropped: u64) {
    if dropped > 0 {
        counter!(
            "telemetry_sim_sink_dropped_total",
            "sink" => sink_name.to_string()
        )
        .increment(dropped);
    }
}

/// 记录运行结束方式
pub fn record_run_outcome(outcome: &str) {
    counter!(
        "telemetry_sim_runs_total",
        "outcome" => outcome.to_string()
    )
    .increment(1);
}

/// 运行统计聚合器
///
/// 在内存中聚合指标，运行结束后输出摘要。
#[derive(Debug, Clone, Default)]
pub struct RunStatsAggregator {
    /// 总 tick 数
    pub total_ticks: u64,

    /// 发布成功的记录数
    pub records_published: u64,

    /// 发布失败的记录数
    pub delivery_failures: u64,

    /// 发送间隔统计
    pub rate_stats: RunningStats,

    /// 速度统计
    pub speed_stats: RunningStats,

    /// 最近一次剩余距离
    pub last_remaining_km: Option<f64>,
}

impl RunStatsAggregator {
    /// 创建新的聚合器
    pub fn new() -> Self {
        Self::default()
    }

    /// 更新 tick 统计
    pub fn update(&mut self, sample: &TickSample) {
        self.total_ticks += 1;
        self.rate_stats.push(sample.rate_ms);
        self.speed_stats.push(sample.speed_kmh);
        self.last_remaining_km = Some(sample.remaining_km);
    }

    /// 更新发布统计
    pub fn record_delivery(&mut self, success: bool) {
        if success {
            self.records_published += 1;
        } else {
            self.delivery_failures += 1;
        }
    }

    /// 生成摘要报告
    pub fn summary(&self) -> RunStatsSummary {
        let attempts = self.records_published + self.delivery_failures;
        RunStatsSummary {
            total_ticks: self.total_ticks,
            records_published: self.records_published,
            delivery_failures: self.delivery_failures,
            failure_rate: if attempts > 0 {
                self.delivery_failures as f64 / attempts as f64 * 100.0
            } else {
                0.0
            },
            rate_ms: StatsSummary::from(&self.rate_stats),
            speed_kmh: StatsSummary::from(&self.speed_stats),
            remaining_km: self.last_remaining_km,
        }
    }

    /// 重置统计
    pub fn reset(&mut self) {
        *self = Self::default();
    }
}

/// 运行统计摘要
#[derive(Debug, Clone, Default)]
pub struct RunStatsSummary {
    pub total_ticks: u64,
    pub records_published: u64,
    pub delivery_failures: u64,
    pub failure_rate: f64,
    pub rate_ms: StatsSummary,
    pub speed_kmh: StatsSummary,
    pub remaining_km: Option<f64>,
}

impl std::fmt::Display for RunStatsSummary {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "=== Run Summary ===")?;
        writeln!(f, "Total ticks: {}", self.total_ticks)?;
        writeln!(f, "Records published: {}", self.records_published)?;
        writeln!(
            f,
            "Delivery failures: {} ({:.2}%)",
            self.delivery_failures, self.failure_rate
        )?;
        writeln!(f, "Rate (ms): {}", self.rate_ms)?;
        writeln!(f, "Speed (km/h): {}", self.speed_kmh)?;
        if let Some(remaining) = self.remaining_km {
            writeln!(f, "Remaining distance: {:.3} km", remaining)?;
        }
        Ok(())
    }
}

/// 统计摘要
#[derive(Debug, Clone, Default)]
pub struct StatsSummary {
    pub count: u64,
    pub min: f64,
    pub max: f64,
    pub mean: f64,
    pub std_dev: f64,
}

impl From<&RunningStats> for StatsSummary {
    fn from(stats: &RunningStats) -> Self {
        Self {
            count: stats.count,
            min: stats.min,
            max: stats.max,
            mean: stats.mean(),
            std_dev: stats.std_dev(),
        }
    }
}

impl std::fmt::Display for StatsSummary {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.count == 0 {
            write!(f, "N/A")
        } else {
            write!(
                f,
                "min={:.3}, max={:.3}, mean={:.3}, std={:.3} (n={})",
                self.min, self.max, self.mean, self.std_dev, self.count
            )
        }
    }
}

/// 在线统计计算器 (Welford's algorithm)
#[derive(Debug, Clone, Default)]
pub struct RunningStats {
    count: u64,
    mean: f64,
    m2: f64,
    min: f64,
    max: f64,
}

impl RunningStats {
    /// 添加新值
    pub fn push(&mut self, value: f64) {
        self.count += 1;

        if self.count == 1 {
            self.min = value;
            self.max = value;
            self.mean = value;
            self.m2 = 0.0;
        } else {
            self.min = self.min.min(value);
            self.max = self.max.max(value);

            let delta = value - self.mean;
            self.mean += delta / self.count as f64;
            let delta2 = value - self.mean;
            self.m2 += delta * delta2;
        }
    }

    pub fn count(&self) -> u64 {
        self.count
    }

    pub fn mean(&self) -> f64 {
        if self.count == 0 { 0.0 } else { self.mean }
    }

    /// 样本方差
    pub fn variance(&self) -> f64 {
        if self.count < 2 {
            0.0
        } else {
            self.m2 / (self.count - 1) as f64
        }
    }

    pub fn std_dev(&self) -> f64 {
        self.variance().sqrt()
    }

    pub fn min(&self) -> f64 {
        self.min
    }

    pub fn max(&self) -> f64 {
        self.max
    }
}
