//! Run summary

use contracts::Coordinate;
use observability::RunStatsSummary;
use serde::Serialize;

/// Why a run ended without error
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RunOutcome {
    /// Within the arrival threshold of the destination
    Arrived,
    /// External interrupt observed
    Cancelled,
    /// A stop predicate fired
    Stopped,
}

impl RunOutcome {
    pub fn as_str(&self) -> &'static str {
        match self {
            RunOutcome::Arrived => "arrived",
            RunOutcome::Cancelled => "cancelled",
            RunOutcome::Stopped => "stopped",
        }
    }
}

impl std::fmt::Display for RunOutcome {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Totals for one finished run
#[derive(Debug, Clone, Serialize)]
pub struct RunSummary {
    pub outcome: RunOutcome,
    pub ticks: u64,
    pub records_published: u64,
    pub delivery_failures: u64,
    pub final_position: Coordinate,
    pub remaining_km: f64,
    pub simulated_elapsed_sec: f64,
    #[serde(skip)]
    pub stats: RunStatsSummary,
}

impl std::fmt::Display for RunSummary {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "Outcome: {}", self.outcome)?;
        writeln!(
            f,
            "Final position: ({:.6}, {:.6}), {:.3} km from destination",
            self.final_position.latitude, self.final_position.longitude, self.remaining_km
        )?;
        writeln!(f, "Simulated time: {:.1} s", self.simulated_elapsed_sec)?;
        write!(f, "{}", self.stats)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_summary_display_and_json() {
        let summary = RunSummary {
            outcome: RunOutcome::Arrived,
            ticks: 61,
            records_published: 305,
            delivery_failures: 0,
            final_position: Coordinate::new(46.7252, -117.1596),
            remaining_km: 0.0,
            simulated_elapsed_sec: 60.0,
            stats: RunStatsSummary::default(),
        };

        let text = summary.to_string();
        assert!(text.contains("Outcome: arrived"));
        assert!(text.contains("0.000 km from destination"));

        let value = serde_json::to_value(&summary).unwrap();
        assert_eq!(value["outcome"], "arrived");
        assert_eq!(value["ticks"], 61);
        assert!(value.get("stats").is_none());
    }
}
