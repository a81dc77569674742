//! SimulationBlueprint - Config Loader 输出
//!
//! 描述一次完整的仿真运行：路线、运动模型、发送速率、时钟、通道、传输端点、车辆描述字段、输出路由。
//! 所有字段都有默认值，默认配置即西雅图 → 大学校园演示路线。

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use crate::{ChannelKind, Coordinate, SEATTLE, UNIVERSITY_CAMPUS};

/// 配置版本
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum ConfigVersion {
    #[default]
    V1,
}

/// 完整的仿真配置蓝图
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SimulationBlueprint {
    /// 配置版本
    pub version: ConfigVersion,

    /// 路线设置
    pub route: RouteConfig,

    /// 运动模型设置
    pub movement: MovementConfig,

    /// 发送速率设置
    pub rate: RateConfig,

    /// 时钟设置
    pub clock: ClockConfig,

    /// 各记录类型的通道名
    pub channels: ChannelsConfig,

    /// 传输端点
    pub transport: TransportConfig,

    /// 车辆静态描述字段
    pub vehicle: VehicleProfileConfig,

    /// 输出路由配置
    pub sinks: Vec<SinkConfig>,
}

impl Default for SimulationBlueprint {
    fn default() -> Self {
        Self {
            version: ConfigVersion::V1,
            route: RouteConfig::default(),
            movement: MovementConfig::default(),
            rate: RateConfig::default(),
            clock: ClockConfig::default(),
            channels: ChannelsConfig::default(),
            transport: TransportConfig::default(),
            vehicle: VehicleProfileConfig::default(),
            sinks: vec![SinkConfig {
                name: "console".to_string(),
                sink_type: SinkType::Log,
                queue_capacity: default_queue_capacity(),
                params: HashMap::new(),
            }],
        }
    }
}

impl SimulationBlueprint {
    /// 变化窗口规划的总时长（秒），即行程时间预算向上取整
    pub fn plan_horizon_sec(&self) -> u32 {
        let budget = self.movement.trip_time_budget_sec;
        if budget.is_finite() && budget > 0.0 {
            budget.ceil().min(f64::from(u32::MAX)) as u32
        } else {
            0
        }
    }
}

/// 路线配置
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RouteConfig {
    /// 车辆标识
    pub vehicle_id: String,

    /// 起点
    pub start: Coordinate,

    /// 终点
    pub destination: Coordinate,

    /// 到达判定距离 (km)
    pub arrival_threshold_km: f64,
}

impl Default for RouteConfig {
    fn default() -> Self {
        Self {
            vehicle_id: "vehicle-arsene-212".to_string(),
            start: SEATTLE,
            destination: UNIVERSITY_CAMPUS,
            arrival_threshold_km: 0.1,
        }
    }
}

/// 速度模式
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MovementMode {
    /// 每个 tick 重新计算“剩余距离 / 剩余时间”
    #[default]
    RequiredSpeed,
    /// 加速 / 匀速 / 减速 三段式速度曲线
    Profiled,
}

/// 运动模型配置
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct MovementConfig {
    /// 速度模式
    pub mode: MovementMode,

    /// 行程时间预算 (秒)
    pub trip_time_budget_sec: f64,

    /// 加速段占行程时间的比例 (仅 profiled)
    pub accel_phase_fraction: f64,

    /// 减速段占行程时间的比例 (仅 profiled)
    pub decel_phase_fraction: f64,

    /// 最高速度上限 (km/h，仅 profiled，可选)
    pub max_speed_kmh: Option<f64>,
}

impl Default for MovementConfig {
    fn default() -> Self {
        Self {
            mode: MovementMode::RequiredSpeed,
            trip_time_budget_sec: 60.0,
            accel_phase_fraction: 0.25,
            decel_phase_fraction: 0.25,
            max_speed_kmh: None,
        }
    }
}

/// 发送速率配置（毫秒 = 两次发送之间的间隔）
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RateConfig {
    /// 预热起始间隔
    pub initial_rate_ms: f64,

    /// 稳定间隔
    pub stable_rate_ms: f64,

    /// 加速下限
    pub min_rate_ms: f64,

    /// 减速上限
    pub max_rate_ms: f64,

    /// 单次过渡时长 (秒)
    pub transition_duration_sec: u32,

    /// 起始稳定期 (秒)，期间不安排变化
    pub initial_stable_period_sec: u32,

    /// 变化窗口大小 (秒)
    pub window_size_sec: u32,

    /// 单次运行最多变化次数
    pub max_changes: u32,
}

impl Default for RateConfig {
    fn default() -> Self {
        Self {
            initial_rate_ms: 1000.0,
            stable_rate_ms: 400.0,
            min_rate_ms: 100.0,
            max_rate_ms: 500.0,
            transition_duration_sec: 6,
            initial_stable_period_sec: 10,
            window_size_sec: 10,
            max_changes: 5,
        }
    }
}

/// 时钟模式
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ClockMode {
    /// 墙钟时间，按当前速率 sleep
    #[default]
    RealTime,
    /// 固定步长，不 sleep（确定性测试）
    FixedStep,
    /// 仿真时间按当前速率推进，不 sleep
    Virtual,
}

/// 时钟配置
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ClockConfig {
    /// 时钟模式
    pub mode: ClockMode,

    /// 固定步长 (秒，仅 fixed_step)
    pub fixed_step_sec: f64,

    /// 随机种子 (None = 每次运行不同)
    pub seed: Option<u64>,
}

impl Default for ClockConfig {
    fn default() -> Self {
        Self {
            mode: ClockMode::RealTime,
            fixed_step_sec: 1.0,
            seed: None,
        }
    }
}

/// 通道名配置
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ChannelsConfig {
    pub vehicle: String,
    pub gps: String,
    pub traffic: String,
    pub weather: String,
    pub emergency: String,
}

impl ChannelsConfig {
    /// 按记录类型取通道名
    pub fn name_for(&self, kind: ChannelKind) -> &str {
        match kind {
            ChannelKind::Vehicle => &self.vehicle,
            ChannelKind::Gps => &self.gps,
            ChannelKind::Traffic => &self.traffic,
            ChannelKind::Weather => &self.weather,
            ChannelKind::Emergency => &self.emergency,
        }
    }
}

impl Default for ChannelsConfig {
    fn default() -> Self {
        Self {
            vehicle: "vehicle_data".to_string(),
            gps: "gps_data".to_string(),
            traffic: "traffic_data".to_string(),
            weather: "weather_data".to_string(),
            emergency: "emergency_data".to_string(),
        }
    }
}

/// 传输端点配置
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TransportConfig {
    /// 消息总线引导地址 (host:port)
    pub bootstrap_servers: String,
}

impl Default for TransportConfig {
    fn default() -> Self {
        Self {
            bootstrap_servers: "localhost:9092".to_string(),
        }
    }
}

/// 车辆静态描述字段（不参与仿真计算）
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct VehicleProfileConfig {
    pub make: String,
    pub model: String,
    pub year: u16,
    pub color: String,
    pub license_plate: String,
    pub vehicle_type: String,
    pub fuel_type: String,
    /// GPS 记录中的车辆类别
    pub gps_vehicle_type: String,
    /// 交通摄像头 ID
    pub camera_id: String,
}

impl Default for VehicleProfileConfig {
    fn default() -> Self {
        Self {
            make: "Toyota".to_string(),
            model: "Corolla".to_string(),
            year: 2015,
            color: "Red".to_string(),
            license_plate: "ABC-123".to_string(),
            vehicle_type: "Sedan".to_string(),
            fuel_type: "Gasoline".to_string(),
            gps_vehicle_type: "private".to_string(),
            camera_id: "Nikkon-cam123".to_string(),
        }
    }
}

/// Sink 输出配置
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SinkConfig {
    /// Sink 名称
    pub name: String,

    /// Sink 类型
    pub sink_type: SinkType,

    /// 队列容量
    #[serde(default = "default_queue_capacity")]
    pub queue_capacity: usize,

    /// 类型特定参数
    #[serde(default)]
    pub params: HashMap<String, String>,
}

fn default_queue_capacity() -> usize {
    256
}

/// Sink 类型
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SinkType {
    /// 日志输出
    Log,
    /// 文件输出 (每个通道一个 JSON Lines 文件)
    File,
    /// 网络输出 (UDP)
    Network,
}
