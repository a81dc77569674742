//! Pipeline statistics.

use std::time::Duration;

use dispatcher::MetricsSnapshot;
use simulation::RunSummary;

/// Statistics from a pipeline run
#[derive(Debug, Clone)]
pub struct PipelineStats {
    /// Simulation totals
    pub summary: RunSummary,

    /// Wall-clock duration of the run
    pub duration: Duration,

    /// Number of sinks that received data
    pub active_sinks: usize,

    /// Final counters per sink
    pub sink_metrics: Vec<(String, MetricsSnapshot)>,
}

impl PipelineStats {
    /// Ticks per wall-clock second
    pub fn ticks_per_sec(&self) -> f64 {
        if self.duration.as_secs_f64() > 0.0 {
            self.summary.ticks as f64 / self.duration.as_secs_f64()
        } else {
            0.0
        }
    }

    /// Print detailed summary
    pub fn print_summary(&self) {
        println!("\n╔══════════════════════════════════════════════════════════════╗");
        println!("║                      Run Statistics                          ║");
        println!("╚══════════════════════════════════════════════════════════════╝\n");

        let summary = &self.summary;
        println!("📊 Overview");
        println!("   ├─ Outcome: {}", summary.outcome);
        println!("   ├─ Duration: {:.2}s", self.duration.as_secs_f64());
        println!("   ├─ Simulated time: {:.1}s", summary.simulated_elapsed_sec);
        println!("   ├─ Ticks: {}", summary.ticks);
        println!(
            "   ├─ Final position: ({:.6}, {:.6})",
            summary.final_position.latitude, summary.final_position.longitude
        );
        println!("   └─ Remaining distance: {:.3} km", summary.remaining_km);

        println!("\n📈 Emission");
        println!("   ├─ Records published: {}", summary.records_published);
        println!(
            "   ├─ Delivery failures: {} ({:.2}%)",
            summary.delivery_failures, summary.stats.failure_rate
        );
        println!("   ├─ Rate (ms): {}", summary.stats.rate_ms);
        println!("   └─ Speed (km/h): {}", summary.stats.speed_kmh);

        if !self.sink_metrics.is_empty() {
            println!("\n📤 Sinks ({})", self.active_sinks);
            for (i, (name, snapshot)) in self.sink_metrics.iter().enumerate() {
                let prefix = if i == self.sink_metrics.len() - 1 {
                    "└─"
                } else {
                    "├─"
                };
                println!("   {} {}: {}", prefix, name, snapshot);
            }
        }

        println!();
    }
}
