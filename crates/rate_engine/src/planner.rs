//! Randomized change-window planning.

use contracts::{ChangeKind, ChangeWindow, RateConfig};
use rand::Rng;
use rand::seq::index;
use tracing::debug;

/// Transition room kept free at the end of every window
const MIN_TRANSITION_ROOM_SEC: u32 = 2;

/// Planner parameters
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PlannerConfig {
    /// No windows start before this many seconds
    pub initial_stable_period_sec: u32,
    /// Window length
    pub window_size_sec: u32,
    /// Upper bound for each transition
    pub transition_duration_sec: u32,
    /// Cap on changes per run
    pub max_changes: u32,
}

impl Default for PlannerConfig {
    fn default() -> Self {
        Self::from(&RateConfig::default())
    }
}

impl From<&RateConfig> for PlannerConfig {
    fn from(config: &RateConfig) -> Self {
        Self {
            initial_stable_period_sec: config.initial_stable_period_sec,
            window_size_sec: config.window_size_sec,
            transition_duration_sec: config.transition_duration_sec,
            max_changes: config.max_changes,
        }
    }
}

/// Generates the per-run change schedule
#[derive(Debug, Clone)]
pub struct WindowPlanner {
    config: PlannerConfig,
}

impl WindowPlanner {
    pub fn new(config: PlannerConfig) -> Self {
        Self { config }
    }

    pub fn from_rate_config(config: &RateConfig) -> Self {
        Self::new(PlannerConfig::from(config))
    }

    pub fn config(&self) -> &PlannerConfig {
        &self.config
    }

    /// Number of whole windows that fit after the initial stable period
    pub fn max_windows(&self, total_duration_sec: u32) -> u32 {
        if self.config.window_size_sec == 0 {
            return 0;
        }
        total_duration_sec
            .saturating_sub(self.config.initial_stable_period_sec)
            / self.config.window_size_sec
    }

    /// Plan the change windows for a run lasting `total_duration_sec`.
    ///
    /// Picks between one and `min(max_windows, max_changes)` distinct windows, each with a
    /// random kind and start offset. An empty schedule means no change fits in the run.
    /// The result is sorted by window index.
    pub fn plan<R: Rng + ?Sized>(&self, total_duration_sec: u32, rng: &mut R) -> Vec<ChangeWindow> {
        let max_windows = self.max_windows(total_duration_sec);
        let cap = max_windows.min(self.config.max_changes);
        if cap == 0 {
            debug!(
                total_duration_sec,
                max_windows, "no room for rate changes, empty schedule"
            );
            return Vec::new();
        }

        let num_changes = rng.random_range(1..=cap);
        let max_offset = self
            .config
            .window_size_sec
            .saturating_sub(MIN_TRANSITION_ROOM_SEC);

        let mut windows: Vec<ChangeWindow> =
            index::sample(rng, max_windows as usize, num_changes as usize)
                .into_iter()
                .map(|slot| {
                    let kind = if rng.random_bool(0.5) {
                        ChangeKind::Accelerate
                    } else {
                        ChangeKind::Decelerate
                    };
                    let start_offset_sec = rng.random_range(0..=max_offset);
                    let duration_sec = self
                        .config
                        .transition_duration_sec
                        .min(self.config.window_size_sec - start_offset_sec);

                    ChangeWindow {
                        window_index: slot as u32 + 1,
                        kind,
                        start_offset_sec,
                        duration_sec,
                    }
                })
                .collect();
        windows.sort_by_key(|w| w.window_index);

        for window in &windows {
            debug!(
                window = window.window_index,
                kind = %window.kind,
                start_offset_sec = window.start_offset_sec,
                duration_sec = window.duration_sec,
                "planned rate change"
            );
        }
        windows
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashSet;

    use rand::SeedableRng;
    use rand::rngs::StdRng;

    use super::*;

    #[test]
    fn test_max_windows() {
        let planner = WindowPlanner::new(PlannerConfig::default());
        assert_eq!(planner.max_windows(60), 5);
        assert_eq!(planner.max_windows(69), 5);
        assert_eq!(planner.max_windows(20), 1);
        assert_eq!(planner.max_windows(19), 0);
        assert_eq!(planner.max_windows(5), 0);
    }

    #[test]
    fn test_short_run_has_empty_schedule() {
        let planner = WindowPlanner::new(PlannerConfig::default());
        let mut rng = StdRng::seed_from_u64(1);
        assert!(planner.plan(15, &mut rng).is_empty());
    }

    #[test]
    fn test_plan_constraints_over_many_seeds() {
        let planner = WindowPlanner::new(PlannerConfig::default());
        for seed in 0..500 {
            let mut rng = StdRng::seed_from_u64(seed);
            let plan = planner.plan(60, &mut rng);

            assert!((1..=5).contains(&plan.len()), "seed {seed}: {plan:?}");

            let indices: HashSet<u32> = plan.iter().map(|w| w.window_index).collect();
            assert_eq!(indices.len(), plan.len(), "seed {seed}: duplicate index");
            assert!(plan.windows(2).all(|p| p[0].window_index < p[1].window_index));

            for w in &plan {
                assert!((1..=5).contains(&w.window_index));
                assert!(w.start_offset_sec <= 8);
                assert_eq!(w.duration_sec, 6.min(10 - w.start_offset_sec));
                assert!(w.start_offset_sec + w.duration_sec <= 10);
            }
        }
    }

    #[test]
    fn test_plan_covers_both_kinds_and_counts() {
        let planner = WindowPlanner::new(PlannerConfig::default());
        let mut kinds = HashSet::new();
        let mut counts = HashSet::new();
        for seed in 0..500 {
            let mut rng = StdRng::seed_from_u64(seed);
            let plan = planner.plan(60, &mut rng);
            counts.insert(plan.len());
            kinds.extend(plan.iter().map(|w| w.kind));
        }
        assert_eq!(kinds.len(), 2);
        assert_eq!(counts.len(), 5);
    }

    #[test]
    fn test_same_seed_same_plan() {
        let planner = WindowPlanner::new(PlannerConfig::default());
        let a = planner.plan(120, &mut StdRng::seed_from_u64(42));
        let b = planner.plan(120, &mut StdRng::seed_from_u64(42));
        assert_eq!(a, b);
    }

    #[test]
    fn test_max_changes_caps_count() {
        let planner = WindowPlanner::new(PlannerConfig {
            max_changes: 2,
            ..PlannerConfig::default()
        });
        for seed in 0..100 {
            let plan = planner.plan(600, &mut StdRng::seed_from_u64(seed));
            assert!((1..=2).contains(&plan.len()));
            assert!(plan.iter().all(|w| w.window_index <= 59));
        }
    }

    #[test]
    fn test_tiny_window_uses_zero_offset() {
        let planner = WindowPlanner::new(PlannerConfig {
            initial_stable_period_sec: 0,
            window_size_sec: 1,
            transition_duration_sec: 0,
            max_changes: 3,
        });
        let plan = planner.plan(10, &mut StdRng::seed_from_u64(3));
        assert!(!plan.is_empty());
        assert!(plan.iter().all(|w| w.start_offset_sec == 0 && w.duration_sec == 0));
    }
}
