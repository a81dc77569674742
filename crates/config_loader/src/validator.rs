//! 配置校验模块
//!
//! 校验规则：
//! - 起终点坐标有限且在经纬度范围内
//! - arrival_threshold_km > 0
//! - trip_time_budget_sec 有限且 > 0
//! - 加减速比例在 [0, 1] 且和 <= 1，max_speed_kmh > 0
//! - 0 < min_rate_ms <= stable_rate_ms <= max_rate_ms，initial_rate_ms > 0
//! - transition_duration_sec <= initial_stable_period_sec，window_size_sec >= 1
//! - fixed_step_sec > 0
//! - 通道名非空
//! - sink 名称非空且唯一

use std::collections::HashSet;

use contracts::{ChannelKind, ContractError, SimulationBlueprint};

/// 校验 SimulationBlueprint 配置
///
/// 返回第一个遇到的错误，或 Ok(())。
pub fn validate(blueprint: &SimulationBlueprint) -> Result<(), ContractError> {
    validate_route(blueprint)?;
    validate_movement(blueprint)?;
    validate_rate(blueprint)?;
    validate_clock(blueprint)?;
    validate_channels(blueprint)?;
    validate_sinks(blueprint)?;
    Ok(())
}

fn positive_finite(field: &str, value: f64) -> Result<(), ContractError> {
    if value.is_finite() && value > 0.0 {
        Ok(())
    } else {
        Err(ContractError::config_validation(
            field,
            format!("must be a finite number > 0, got {value}"),
        ))
    }
}

fn fraction(field: &str, value: f64) -> Result<(), ContractError> {
    if (0.0..=1.0).contains(&value) {
        Ok(())
    } else {
        Err(ContractError::config_validation(
            field,
            format!("must be within [0, 1], got {value}"),
        ))
    }
}

/// 校验路线
fn validate_route(blueprint: &SimulationBlueprint) -> Result<(), ContractError> {
    let route = &blueprint.route;
    if route.vehicle_id.trim().is_empty() {
        return Err(ContractError::config_validation(
            "route.vehicle_id",
            "vehicle_id cannot be empty",
        ));
    }
    route.start.validate("route.start")?;
    route.destination.validate("route.destination")?;
    positive_finite("route.arrival_threshold_km", route.arrival_threshold_km)
}

/// 校验运动模型
fn validate_movement(blueprint: &SimulationBlueprint) -> Result<(), ContractError> {
    let movement = &blueprint.movement;
    positive_finite(
        "movement.trip_time_budget_sec",
        movement.trip_time_budget_sec,
    )?;
    fraction(
        "movement.accel_phase_fraction",
        movement.accel_phase_fraction,
    )?;
    fraction(
        "movement.decel_phase_fraction",
        movement.decel_phase_fraction,
    )?;

    let sum = movement.accel_phase_fraction + movement.decel_phase_fraction;
    if sum > 1.0 {
        return Err(ContractError::config_validation(
            "movement.accel_phase_fraction / movement.decel_phase_fraction",
            format!("phase fractions must sum to <= 1, got {sum}"),
        ));
    }

    if let Some(max_speed) = movement.max_speed_kmh {
        positive_finite("movement.max_speed_kmh", max_speed)?;
    }
    Ok(())
}

/// 校验发送速率
fn validate_rate(blueprint: &SimulationBlueprint) -> Result<(), ContractError> {
    let rate = &blueprint.rate;
    positive_finite("rate.initial_rate_ms", rate.initial_rate_ms)?;
    positive_finite("rate.min_rate_ms", rate.min_rate_ms)?;
    positive_finite("rate.stable_rate_ms", rate.stable_rate_ms)?;
    positive_finite("rate.max_rate_ms", rate.max_rate_ms)?;

    if rate.min_rate_ms > rate.stable_rate_ms || rate.stable_rate_ms > rate.max_rate_ms {
        return Err(ContractError::config_validation(
            "rate.min_rate_ms / rate.stable_rate_ms / rate.max_rate_ms",
            format!(
                "expected min ({}) <= stable ({}) <= max ({})",
                rate.min_rate_ms, rate.stable_rate_ms, rate.max_rate_ms
            ),
        ));
    }

    if rate.transition_duration_sec > rate.initial_stable_period_sec {
        return Err(ContractError::config_validation(
            "rate.transition_duration_sec",
            format!(
                "transition_duration_sec ({}) must be <= initial_stable_period_sec ({})",
                rate.transition_duration_sec, rate.initial_stable_period_sec
            ),
        ));
    }

    if rate.window_size_sec == 0 {
        return Err(ContractError::config_validation(
            "rate.window_size_sec",
            "window_size_sec must be >= 1",
        ));
    }
    Ok(())
}

/// 校验时钟
fn validate_clock(blueprint: &SimulationBlueprint) -> Result<(), ContractError> {
    positive_finite("clock.fixed_step_sec", blueprint.clock.fixed_step_sec)
}

/// 校验通道名
fn validate_channels(blueprint: &SimulationBlueprint) -> Result<(), ContractError> {
    for kind in ChannelKind::ALL {
        if blueprint.channels.name_for(kind).trim().is_empty() {
            return Err(ContractError::config_validation(
                format!("channels.{}", kind.as_str()),
                "channel name cannot be empty",
            ));
        }
    }
    Ok(())
}

/// 校验 sink 配置
fn validate_sinks(blueprint: &SimulationBlueprint) -> Result<(), ContractError> {
    let mut seen = HashSet::new();
    for (idx, sink) in blueprint.sinks.iter().enumerate() {
        if sink.name.is_empty() {
            return Err(ContractError::config_validation(
                format!("sinks[{}].name", idx),
                "sink name cannot be empty",
            ));
        }
        if !seen.insert(sink.name.as_str()) {
            return Err(ContractError::config_validation(
                format!("sinks[name={}]", sink.name),
                "duplicate sink name",
            ));
        }
        if sink.queue_capacity == 0 {
            return Err(ContractError::config_validation(
                format!("sinks[{}].queue_capacity", idx),
                "queue_capacity must be >= 1",
            ));
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use contracts::{Coordinate, SinkConfig, SinkType};

    fn err_of(bp: &SimulationBlueprint) -> String {
        validate(bp).unwrap_err().to_string()
    }

    #[test]
    fn test_default_config_is_valid() {
        let bp = SimulationBlueprint::default();
        assert!(validate(&bp).is_ok());
    }

    #[test]
    fn test_out_of_range_destination() {
        let mut bp = SimulationBlueprint::default();
        bp.route.destination = Coordinate::new(0.0, 200.0);
        let err = err_of(&bp);
        assert!(err.contains("route.destination.longitude"), "got: {err}");
    }

    #[test]
    fn test_non_positive_budget() {
        let mut bp = SimulationBlueprint::default();
        bp.movement.trip_time_budget_sec = 0.0;
        let err = err_of(&bp);
        assert!(err.contains("trip_time_budget_sec"), "got: {err}");

        bp.movement.trip_time_budget_sec = f64::INFINITY;
        assert!(validate(&bp).is_err());
    }

    #[test]
    fn test_phase_fractions_sum() {
        let mut bp = SimulationBlueprint::default();
        bp.movement.accel_phase_fraction = 0.6;
        bp.movement.decel_phase_fraction = 0.6;
        let err = err_of(&bp);
        assert!(err.contains("sum to <= 1"), "got: {err}");
    }

    #[test]
    fn test_rate_ordering() {
        let mut bp = SimulationBlueprint::default();
        bp.rate.stable_rate_ms = 600.0;
        let err = err_of(&bp);
        assert!(err.contains("min (100) <= stable (600) <= max (500)"), "got: {err}");
    }

    #[test]
    fn test_transition_longer_than_initial_period() {
        let mut bp = SimulationBlueprint::default();
        bp.rate.transition_duration_sec = 12;
        let err = err_of(&bp);
        assert!(err.contains("rate.transition_duration_sec"), "got: {err}");
    }

    #[test]
    fn test_zero_window_size() {
        let mut bp = SimulationBlueprint::default();
        bp.rate.window_size_sec = 0;
        let err = err_of(&bp);
        assert!(err.contains("window_size_sec must be >= 1"), "got: {err}");
    }

    #[test]
    fn test_fixed_step_must_be_positive() {
        let mut bp = SimulationBlueprint::default();
        bp.clock.fixed_step_sec = -1.0;
        let err = err_of(&bp);
        assert!(err.contains("clock.fixed_step_sec"), "got: {err}");
    }

    #[test]
    fn test_empty_channel_name() {
        let mut bp = SimulationBlueprint::default();
        bp.channels.weather = " ".into();
        let err = err_of(&bp);
        assert!(err.contains("channels.weather"), "got: {err}");
    }

    #[test]
    fn test_empty_sink_name() {
        let mut bp = SimulationBlueprint::default();
        bp.sinks[0].name = String::new();
        let err = err_of(&bp);
        assert!(err.contains("cannot be empty"), "got: {err}");
    }

    #[test]
    fn test_duplicate_sink_name() {
        let mut bp = SimulationBlueprint::default();
        bp.sinks.push(SinkConfig {
            name: "console".into(),
            sink_type: SinkType::File,
            queue_capacity: 8,
            params: Default::default(),
        });
        let err = err_of(&bp);
        assert!(err.contains("duplicate sink name"), "got: {err}");
    }
}
