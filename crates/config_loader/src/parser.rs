//! 配置解析模块
//!
//! 支持 TOML (主要) 和 JSON (可选) 格式。省略的段落使用演示路线默认值。

use std::path::Path;

use contracts::{ContractError, SimulationBlueprint};

/// 配置文件格式
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigFormat {
    /// TOML 格式 (推荐)
    Toml,
    /// JSON 格式
    Json,
}

impl ConfigFormat {
    /// 从文件扩展名推断格式
    pub fn from_extension(ext: &str) -> Option<Self> {
        match ext.to_lowercase().as_str() {
            "toml" => Some(Self::Toml),
            "json" => Some(Self::Json),
            _ => None,
        }
    }

    /// 从路径推断格式；无扩展名或未知扩展名均为错误
    pub fn from_path(path: &Path) -> Result<Self, ContractError> {
        let ext = path.extension().and_then(|e| e.to_str()).ok_or_else(|| {
            ContractError::config_parse(format!("{} has no file extension", path.display()))
        })?;
        Self::from_extension(ext).ok_or_else(|| {
            ContractError::config_parse(format!("unsupported config format: .{ext}"))
        })
    }
}

/// 解析 TOML 格式配置
pub fn parse_toml(content: &str) -> Result<SimulationBlueprint, ContractError> {
    toml::from_str(content).map_err(|e| ContractError::ConfigParse {
        message: format!("TOML parse error: {e}"),
        source: Some(Box::new(e)),
    })
}

/// 解析 JSON 格式配置
pub fn parse_json(content: &str) -> Result<SimulationBlueprint, ContractError> {
    serde_json::from_str(content).map_err(|e| ContractError::ConfigParse {
        message: format!("JSON parse error: {e}"),
        source: Some(Box::new(e)),
    })
}

/// 根据格式解析配置
pub fn parse(content: &str, format: ConfigFormat) -> Result<SimulationBlueprint, ContractError> {
    match format {
        ConfigFormat::Toml => parse_toml(content),
        ConfigFormat::Json => parse_json(content),
    }
}

/// 序列化为指定格式
pub fn render(blueprint: &SimulationBlueprint, format: ConfigFormat) -> Result<String, ContractError> {
    match format {
        ConfigFormat::Toml => toml::to_string_pretty(blueprint)
            .map_err(|e| ContractError::config_parse(format!("TOML serialize error: {e}"))),
        ConfigFormat::Json => serde_json::to_string_pretty(blueprint)
            .map_err(|e| ContractError::config_parse(format!("JSON serialize error: {e}"))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use contracts::{ClockMode, MovementMode, SinkType};

    #[test]
    fn test_parse_toml_sections() {
        let content = r#"
[route]
vehicle_id = "vehicle-7"
start = { latitude = 10.0, longitude = 20.0 }
destination = { latitude = 10.5, longitude = 20.5 }

[movement]
mode = "profiled"
trip_time_budget_sec = 120.0

[clock]
mode = "fixed_step"
fixed_step_sec = 0.5
seed = 7

[[sinks]]
name = "events"
sink_type = "file"
[sinks.params]
base_path = "/tmp/telemetry"
"#;
        let bp = parse_toml(content).unwrap();
        assert_eq!(bp.route.vehicle_id, "vehicle-7");
        assert_eq!(bp.route.start.latitude, 10.0);
        assert_eq!(bp.movement.mode, MovementMode::Profiled);
        assert_eq!(bp.clock.mode, ClockMode::FixedStep);
        assert_eq!(bp.clock.seed, Some(7));
        assert_eq!(bp.sinks.len(), 1);
        assert_eq!(bp.sinks[0].sink_type, SinkType::File);
        assert_eq!(bp.sinks[0].queue_capacity, 256);
        assert_eq!(bp.sinks[0].params["base_path"], "/tmp/telemetry");
        // 未写出的段落取默认值
        assert_eq!(bp.rate.window_size_sec, 10);
        assert_eq!(bp.channels.gps, "gps_data");
    }

    #[test]
    fn test_parse_empty_toml_is_demo_route() {
        let bp = parse_toml("").unwrap();
        assert_eq!(bp.route.start, contracts::SEATTLE);
        assert_eq!(bp.sinks[0].name, "console");
    }

    #[test]
    fn test_parse_json_minimal() {
        let content = r#"{
            "rate": { "min_rate_ms": 50.0, "max_changes": 2 },
            "transport": { "bootstrap_servers": "broker:29092" },
            "sinks": [{ "name": "log", "sink_type": "log" }]
        }"#;
        let bp = parse_json(content).unwrap();
        assert_eq!(bp.rate.min_rate_ms, 50.0);
        assert_eq!(bp.rate.max_changes, 2);
        assert_eq!(bp.transport.bootstrap_servers, "broker:29092");
    }

    #[test]
    fn test_parse_toml_syntax_error() {
        let content = "invalid toml [[[";
        let result = parse_toml(content);
        assert!(result.is_err());
        let err = result.unwrap_err();
        assert!(matches!(err, ContractError::ConfigParse { .. }));
    }

    #[test]
    fn test_parse_unknown_mode_is_error() {
        let result = parse_toml("[movement]\nmode = \"teleport\"\n");
        assert!(matches!(result, Err(ContractError::ConfigParse { .. })));
    }

    #[test]
    fn test_format_from_extension() {
        assert_eq!(
            ConfigFormat::from_extension("toml"),
            Some(ConfigFormat::Toml)
        );
        assert_eq!(
            ConfigFormat::from_extension("TOML"),
            Some(ConfigFormat::Toml)
        );
        assert_eq!(
            ConfigFormat::from_extension("json"),
            Some(ConfigFormat::Json)
        );
        assert_eq!(ConfigFormat::from_extension("yaml"), None);
    }

    #[test]
    fn test_format_from_path() {
        assert_eq!(
            ConfigFormat::from_path(Path::new("conf/route.json")).unwrap(),
            ConfigFormat::Json
        );
        let err = ConfigFormat::from_path(Path::new("Makefile")).unwrap_err();
        assert!(err.to_string().contains("no file extension"), "got: {err}");
    }
}
