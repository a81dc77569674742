//! # Integration Tests
//!
//! 集成测试与端到端测试。
//!
//! 负责：
//! - 配置 -> 仿真循环 -> Dispatcher -> Sink 的完整链路
//! - 速率预热 / 减速保持等跨模块行为
//! - 中断与多 sink 扇出

#[cfg(test)]
mod contract_tests {
    #[test]
    fn test_contracts_compile() {
        // 验证 contracts crate 可编译
        let _ = contracts::ConfigVersion::V1;
    }

    #[test]
    fn test_default_blueprint_passes_validation() {
        let blueprint = config_loader::ConfigLoader::load_or_default(None).unwrap();
        assert_eq!(blueprint.route.start, contracts::SEATTLE);
        assert_eq!(blueprint.route.destination, contracts::UNIVERSITY_CAMPUS);
    }
}

#[cfg(test)]
mod e2e_tests {
    use std::collections::HashMap;
    use std::fs;
    use std::path::Path;
    use std::time::Duration;

    use config_loader::{ConfigFormat, ConfigLoader};
    use contracts::{
        ChangeKind, ChangeWindow, ClockMode, SimulationBlueprint, SinkConfig, SinkType,
        TelemetryRecord, UNIVERSITY_CAMPUS,
    };
    use dispatcher::create_dispatcher;
    use simulation::{RunOutcome, SimulationLoop};
    use tempfile::tempdir;
    use tokio::sync::watch;

    const CHANNELS: [&str; 5] = [
        "vehicle_data",
        "gps_data",
        "traffic_data",
        "weather_data",
        "emergency_data",
    ];

    const ROUTE_TOML: &str = r#"
[route]
vehicle_id = "vehicle-arsene-212"
start = { latitude = 47.608013, longitude = -122.335167 }
destination = { latitude = 46.7252, longitude = -117.1596 }

[movement]
trip_time_budget_sec = 60.0

[clock]
mode = "fixed_step"
fixed_step_sec = 1.0
seed = 2024
"#;

    fn file_sink(name: &str, dir: &Path) -> SinkConfig {
        SinkConfig {
            name: name.to_string(),
            sink_type: SinkType::File,
            queue_capacity: 1024,
            params: HashMap::from([(
                "base_path".to_string(),
                dir.to_string_lossy().to_string(),
            )]),
        }
    }

    fn read_records(dir: &Path, channel: &str) -> Vec<TelemetryRecord> {
        let content = fs::read_to_string(dir.join(format!("{channel}.jsonl"))).unwrap();
        content
            .lines()
            .map(|line| serde_json::from_str(line).unwrap())
            .collect()
    }

    /// End-to-end test: TOML -> SimulationLoop -> Dispatcher -> FileSink
    ///
    /// 验证完整的数据流：
    /// 1. 固定步长下 61 个 tick 到达终点
    /// 2. 每个通道收到同样数量的记录
    /// 3. 最后一条 GPS 记录位于终点
    #[tokio::test]
    async fn test_e2e_route_to_files() {
        let dir = tempdir().unwrap();
        let mut blueprint = ConfigLoader::load_from_str(ROUTE_TOML, ConfigFormat::Toml).unwrap();
        blueprint.sinks = vec![file_sink("jsonl", dir.path())];

        let dispatcher = create_dispatcher(blueprint.sinks.clone(), &blueprint.transport)
            .await
            .unwrap();
        let mut sim = SimulationLoop::new(&blueprint, dispatcher).unwrap();
        let summary = sim.run().await.unwrap();

        assert_eq!(summary.outcome, RunOutcome::Arrived);
        assert_eq!(summary.ticks, 61);
        assert_eq!(summary.final_position, UNIVERSITY_CAMPUS);
        assert_eq!(summary.delivery_failures, 0);

        for channel in CHANNELS {
            let records = read_records(dir.path(), channel);
            assert_eq!(records.len(), 61, "channel {channel}");
            assert!(records.iter().all(|r| r.vehicle_id() == "vehicle-arsene-212"));
        }

        let vehicles = read_records(dir.path(), "vehicle_data");
        let TelemetryRecord::Vehicle(last) = vehicles.last().unwrap() else {
            panic!("unexpected record on vehicle_data");
        };
        assert_eq!(last.location, UNIVERSITY_CAMPUS);

        let metrics = sim.sink().metrics();
        assert_eq!(metrics.len(), 1);
        assert_eq!(metrics[0].1.delivered, 61 * 5);
        assert_eq!(metrics[0].1.dropped, 0);
    }

    /// 两个 sink 收到完全相同的记录序列
    #[tokio::test]
    async fn test_e2e_fanout_to_two_sinks() {
        let left = tempdir().unwrap();
        let right = tempdir().unwrap();

        let mut blueprint = SimulationBlueprint::default();
        blueprint.clock.mode = ClockMode::FixedStep;
        blueprint.clock.seed = Some(77);
        blueprint.sinks = vec![file_sink("left", left.path()), file_sink("right", right.path())];

        let dispatcher = create_dispatcher(blueprint.sinks.clone(), &blueprint.transport)
            .await
            .unwrap();
        assert_eq!(dispatcher.sink_count(), 2);

        let mut sim = SimulationLoop::new(&blueprint, dispatcher)
            .unwrap()
            .stop_when(|p| p.ticks >= 10);
        let summary = sim.run().await.unwrap();
        assert_eq!(summary.outcome, RunOutcome::Stopped);
        assert_eq!(summary.records_published, 50);

        for channel in CHANNELS {
            let a: Vec<_> = read_records(left.path(), channel)
                .iter()
                .map(|r| r.id())
                .collect();
            let b: Vec<_> = read_records(right.path(), channel)
                .iter()
                .map(|r| r.id())
                .collect();
            assert_eq!(a.len(), 10);
            assert_eq!(a, b, "channel {channel}");
        }
    }

    /// 预热阶段：6 秒后速率为 400，且整个预热期不低于 400
    #[tokio::test]
    async fn test_e2e_warming_observed_in_timestamps() {
        let dir = tempdir().unwrap();
        let mut blueprint = SimulationBlueprint::default();
        blueprint.clock.mode = ClockMode::Virtual;
        blueprint.clock.seed = Some(5);
        blueprint.sinks = vec![file_sink("jsonl", dir.path())];

        let dispatcher = create_dispatcher(blueprint.sinks.clone(), &blueprint.transport)
            .await
            .unwrap();
        let mut sim = SimulationLoop::new(&blueprint, dispatcher)
            .unwrap()
            .with_schedule(Vec::new())
            .stop_when(|p| p.simulated_elapsed_sec >= 10.0);
        sim.run().await.unwrap();

        // under the virtual clock, gaps between ticks are the rate in effect
        let stamps: Vec<_> = read_records(dir.path(), "gps_data")
            .iter()
            .map(|r| r.timestamp())
            .collect();
        let run_start = stamps[0];
        for pair in stamps.windows(2) {
            let gap_ms = (pair[1] - pair[0]).num_milliseconds();
            let at_sec = (pair[0] - run_start).num_milliseconds() as f64 / 1000.0;
            assert!(gap_ms >= 399, "gap {gap_ms} ms at t={at_sec}");
            assert!(gap_ms <= 1000, "gap {gap_ms} ms at t={at_sec}");
            if at_sec >= 6.0 {
                assert!((399..=401).contains(&gap_ms), "gap {gap_ms} ms at t={at_sec}");
            }
        }
    }

    /// 中断：real-time 时钟在第一次 sleep 中被取消，sink 仍被关闭并落盘
    #[tokio::test]
    async fn test_e2e_cancellation_closes_sinks() {
        let dir = tempdir().unwrap();
        let mut blueprint = SimulationBlueprint::default();
        blueprint.clock.seed = Some(3);
        blueprint.sinks = vec![file_sink("jsonl", dir.path())];

        let (tx, rx) = watch::channel(false);
        let dispatcher = create_dispatcher(blueprint.sinks.clone(), &blueprint.transport)
            .await
            .unwrap();
        let mut sim = SimulationLoop::new(&blueprint, dispatcher)
            .unwrap()
            .with_cancellation(rx);

        let canceller = tokio::spawn(async move {
            tokio::time::sleep(Duration::from_millis(50)).await;
            tx.send(true).unwrap();
        });
        let summary = tokio::time::timeout(Duration::from_secs(5), sim.run())
            .await
            .expect("cancellation did not interrupt the sleep")
            .unwrap();
        canceller.await.unwrap();

        assert_eq!(summary.outcome, RunOutcome::Cancelled);
        assert_eq!(summary.ticks, 1);
        for channel in CHANNELS {
            assert_eq!(read_records(dir.path(), channel).len(), 1);
        }
    }

    /// 减速后在窗口外保持目标速率，不回落
    #[tokio::test]
    async fn test_e2e_decelerate_hold() {
        let dir = tempdir().unwrap();
        let mut blueprint = SimulationBlueprint::default();
        blueprint.clock.mode = ClockMode::Virtual;
        blueprint.clock.seed = Some(8);
        blueprint.sinks = vec![file_sink("jsonl", dir.path())];

        let window = ChangeWindow {
            window_index: 2,
            kind: ChangeKind::Decelerate,
            start_offset_sec: 2,
            duration_sec: 6,
        };
        let dispatcher = create_dispatcher(blueprint.sinks.clone(), &blueprint.transport)
            .await
            .unwrap();
        let mut sim = SimulationLoop::new(&blueprint, dispatcher)
            .unwrap()
            .with_schedule(vec![window])
            .stop_when(|p| p.simulated_elapsed_sec >= 40.0);
        let summary = sim.run().await.unwrap();
        assert_eq!(summary.outcome, RunOutcome::Stopped);

        let stamps: Vec<_> = read_records(dir.path(), "weather_data")
            .iter()
            .map(|r| r.timestamp())
            .collect();
        let run_start = stamps[0];
        let mut held = Vec::new();
        for pair in stamps.windows(2) {
            let gap_ms = (pair[1] - pair[0]).num_milliseconds();
            let at_sec = (pair[0] - run_start).num_milliseconds() as f64 / 1000.0;
            if (10.0..21.9).contains(&at_sec) {
                assert!((399..=401).contains(&gap_ms), "gap {gap_ms} ms at t={at_sec}");
            } else if at_sec > 28.1 {
                held.push(gap_ms);
            }
        }

        // whatever the last in-interval tick reached is kept until the run ends
        assert!(held.len() > 10);
        assert!((450..=501).contains(&held[0]), "held {}", held[0]);
        assert!(held.iter().all(|g| (g - held[0]).abs() <= 1), "{held:?}");
    }
}

#[cfg(test)]
mod rate_tests {
    use contracts::{ChangeKind, ChangeWindow, RateConfig};
    use rand::SeedableRng;
    use rand::rngs::StdRng;
    use rate_engine::{RatePhase, RateScheduler, WindowPlanner};

    #[test]
    fn test_warming_holds_stable_after_transition() {
        let mut scheduler = RateScheduler::new(RateConfig::default(), Vec::new());
        let mut t = 0.0;
        while t <= 30.0 {
            let rate = scheduler.tick(t);
            assert!(rate >= 400.0 - 1e-9, "t={t}: {rate}");
            if t >= 6.0 {
                assert_eq!(rate, 400.0, "t={t}");
            }
            t += 0.25;
        }
        assert_eq!(scheduler.phase(), RatePhase::Steady);
    }

    #[test]
    fn test_decelerate_holds_outside_interval() {
        let window = ChangeWindow {
            window_index: 2,
            kind: ChangeKind::Decelerate,
            start_offset_sec: 2,
            duration_sec: 6,
        };
        let mut scheduler = RateScheduler::new(RateConfig::default(), vec![window]);

        let mut t = 0.0;
        while t <= 60.0 {
            let rate = scheduler.tick(t);
            if (10.0..22.0).contains(&t) {
                assert_eq!(rate, 400.0, "t={t}");
            } else if (22.0..28.0).contains(&t) {
                assert!((400.0..=500.0).contains(&rate), "t={t}: {rate}");
            } else if t >= 28.0 {
                assert_eq!(rate, 500.0, "t={t}: no drift after the transition");
            }
            t += 0.5;
        }
    }

    #[test]
    fn test_accelerate_then_decelerate_returns_to_stable() {
        let schedule = vec![
            ChangeWindow {
                window_index: 1,
                kind: ChangeKind::Accelerate,
                start_offset_sec: 0,
                duration_sec: 6,
            },
            ChangeWindow {
                window_index: 3,
                kind: ChangeKind::Decelerate,
                start_offset_sec: 0,
                duration_sec: 6,
            },
        ];
        let mut scheduler = RateScheduler::new(RateConfig::default(), schedule);
        for t in 0..=60 {
            scheduler.tick(f64::from(t));
            if t == 16 {
                assert_eq!(scheduler.current_rate_ms(), 100.0);
            }
        }
        // decelerating from below stable heads back to stable, not to max
        assert_eq!(scheduler.current_rate_ms(), 400.0);
    }

    #[test]
    fn test_planned_runs_stay_within_bounds() {
        let config = RateConfig::default();
        let planner = WindowPlanner::from_rate_config(&config);
        for seed in 0..200 {
            let mut rng = StdRng::seed_from_u64(seed);
            let schedule = planner.plan(120, &mut rng);
            for w in &schedule {
                let (start, end) = w.active_interval_sec(
                    config.initial_stable_period_sec,
                    config.window_size_sec,
                );
                let window_start =
                    w.window_start_sec(config.initial_stable_period_sec, config.window_size_sec);
                assert!(start >= window_start);
                assert!(end <= window_start + f64::from(config.window_size_sec));
            }

            let mut scheduler = RateScheduler::new(config.clone(), schedule);
            let mut t = 0.0;
            while t <= 120.0 {
                let rate = scheduler.tick(t);
                assert!(rate.is_finite());
                if t >= f64::from(config.initial_stable_period_sec) {
                    assert!((100.0..=500.0).contains(&rate), "seed {seed} t={t}: {rate}");
                }
                t += 0.5;
            }
        }
    }
}

#[cfg(test)]
mod geo_tests {
    use contracts::{Coordinate, SEATTLE, UNIVERSITY_CAMPUS};
    use geo_motion::{bearing, distance_km, project};

    #[test]
    fn test_demo_route_geometry() {
        let d = distance_km(SEATTLE, UNIVERSITY_CAMPUS);
        assert!((d - 403.3).abs() < 0.5, "got {d}");

        let brg = bearing(SEATTLE, UNIVERSITY_CAMPUS);
        assert!((90.0..135.0).contains(&brg), "got {brg}");
    }

    #[test]
    fn test_stepping_along_bearing_closes_distance() {
        let mut position = SEATTLE;
        let total = distance_km(position, UNIVERSITY_CAMPUS);
        for _ in 0..10 {
            let before = distance_km(position, UNIVERSITY_CAMPUS);
            position = project(position, total / 20.0, bearing(position, UNIVERSITY_CAMPUS));
            let after = distance_km(position, UNIVERSITY_CAMPUS);
            assert!((before - after - total / 20.0).abs() < 1e-6);
        }
        assert!((distance_km(position, UNIVERSITY_CAMPUS) - total / 2.0).abs() < 1e-6);
    }

    #[test]
    fn test_triangle_inequality() {
        let points = [
            SEATTLE,
            UNIVERSITY_CAMPUS,
            Coordinate::new(45.5152, -122.6784),
            Coordinate::new(49.2827, -123.1207),
        ];
        for a in points {
            for b in points {
                for c in points {
                    assert!(distance_km(a, c) <= distance_km(a, b) + distance_km(b, c) + 1e-9);
                }
            }
        }
    }
}
