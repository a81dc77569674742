//! SimulationLoop - drives one vehicle from start to destination
//!
//! Each tick: advance the rate, advance the vehicle, publish the five records, suspend.

use std::time::Duration;

use chrono::{DateTime, Utc};
use contracts::{
    ChangeWindow, ChannelKind, ChannelsConfig, SimulationBlueprint, TelemetrySink, VehicleState,
};
use geo_motion::MovementModel;
use observability::{RunStatsAggregator, TickSample};
use rand::SeedableRng;
use rand::rngs::StdRng;
use rate_engine::{RateScheduler, WindowPlanner};
use telemetry::{RecordFactory, TickContext, record_timestamp};
use tokio::sync::watch;
use tracing::{debug, info, instrument, warn};

use crate::clock::{Clock, SimulationClock};
use crate::error::SimulationError;
use crate::summary::{RunOutcome, RunSummary};

/// Consecutive ticks without progress before the run is declared unreachable
pub const STALL_TICK_LIMIT: u32 = 50;

const PROGRESS_EPSILON_KM: f64 = 1e-9;

/// What stop predicates see at the top of every tick
#[derive(Debug, Clone, Copy)]
pub struct LoopProgress {
    /// Ticks completed so far
    pub ticks: u64,
    pub simulated_elapsed_sec: f64,
    pub wall_elapsed: Duration,
    pub remaining_km: f64,
}

type StopPredicate = Box<dyn Fn(&LoopProgress) -> bool + Send>;

/// One simulation run
pub struct SimulationLoop<S> {
    vehicle: VehicleState,
    movement: MovementModel,
    scheduler: RateScheduler,
    factory: RecordFactory<StdRng>,
    channels: ChannelsConfig,
    arrival_threshold_km: f64,
    clock: Clock,
    sink: S,
    stop_predicates: Vec<StopPredicate>,
    cancel: Option<watch::Receiver<bool>>,
}

impl<S: TelemetrySink> SimulationLoop<S> {
    /// Build a run from a validated blueprint
    ///
    /// The configured seed (or OS entropy) drives both the change schedule and record contents.
    pub fn new(blueprint: &SimulationBlueprint, sink: S) -> Result<Self, SimulationError> {
        let mut rng = match blueprint.clock.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_os_rng(),
        };

        let planner = WindowPlanner::from_rate_config(&blueprint.rate);
        let schedule = planner.plan(blueprint.plan_horizon_sec(), &mut rng);

        let route = &blueprint.route;
        let movement =
            MovementModel::from_config(route.start, route.destination, &blueprint.movement)?;

        Ok(Self {
            vehicle: VehicleState::new(
                route.vehicle_id.clone(),
                route.start,
                route.destination,
                Utc::now(),
            ),
            movement,
            scheduler: RateScheduler::new(blueprint.rate.clone(), schedule),
            factory: RecordFactory::new(blueprint.vehicle.clone(), rng),
            channels: blueprint.channels.clone(),
            arrival_threshold_km: route.arrival_threshold_km,
            clock: Clock::from_config(&blueprint.clock),
            sink,
            stop_predicates: Vec::new(),
            cancel: None,
        })
    }

    /// Replace the planned change schedule
    pub fn with_schedule(mut self, schedule: Vec<ChangeWindow>) -> Self {
        self.scheduler = RateScheduler::new(self.scheduler.config().clone(), schedule);
        self
    }

    pub fn with_clock(mut self, clock: Clock) -> Self {
        self.clock = clock;
        self
    }

    /// Wall-clock instant record timestamps are measured from
    pub fn with_run_start(mut self, run_start: DateTime<Utc>) -> Self {
        self.vehicle.start_time = run_start;
        self
    }

    /// Observe `true` on this channel as an interrupt
    pub fn with_cancellation(mut self, cancel: watch::Receiver<bool>) -> Self {
        self.cancel = Some(cancel);
        self
    }

    /// Add an extra exit condition, checked at the top of every tick
    pub fn stop_when<F>(mut self, predicate: F) -> Self
    where
        F: Fn(&LoopProgress) -> bool + Send + 'static,
    {
        self.stop_predicates.push(Box::new(predicate));
        self
    }

    pub fn schedule(&self) -> &[ChangeWindow] {
        self.scheduler.schedule()
    }

    pub fn vehicle(&self) -> &VehicleState {
        &self.vehicle
    }

    pub fn sink(&self) -> &S {
        &self.sink
    }

    /// Run to completion, then flush and close the sink
    ///
    /// # Errors
    /// A fixed clock step that cannot advance time, non-finite numbers or a stalled vehicle.
    /// The sink is closed on error too.
    #[instrument(
        name = "simulation_run",
        skip(self),
        fields(vehicle_id = %self.vehicle.id, clock = self.clock.as_str())
    )]
    pub async fn run(&mut self) -> Result<RunSummary, SimulationError> {
        info!(
            start_lat = self.vehicle.position.latitude,
            start_lon = self.vehicle.position.longitude,
            dest_lat = self.vehicle.destination.latitude,
            dest_lon = self.vehicle.destination.longitude,
            distance_km = self.movement.remaining_km(),
            planned_changes = self.scheduler.schedule().len(),
            "Simulation starting"
        );
        for window in self.scheduler.schedule() {
            debug!(
                window = window.window_index,
                kind = %window.kind,
                start_offset_sec = window.start_offset_sec,
                duration_sec = window.duration_sec,
                "Change event planned"
            );
        }

        let mut clock = SimulationClock::start(self.clock);
        let mut stats = RunStatsAggregator::new();
        let result = self.run_ticks(&mut clock, &mut stats).await;

        self.release_sink().await;

        let outcome = result?;
        observability::record_run_outcome(outcome.as_str());
        match outcome {
            RunOutcome::Arrived => info!("Vehicle has reached the destination"),
            RunOutcome::Cancelled => info!("Simulation interrupted"),
            RunOutcome::Stopped => info!("Simulation stopped before arrival"),
        }

        let summary = stats.summary();
        Ok(RunSummary {
            outcome,
            ticks: summary.total_ticks,
            records_published: summary.records_published,
            delivery_failures: summary.delivery_failures,
            final_position: self.movement.position(),
            remaining_km: self.movement.remaining_km(),
            simulated_elapsed_sec: self.scheduler.state().elapsed_sec,
            stats: summary,
        })
    }

    async fn run_ticks(
        &mut self,
        clock: &mut SimulationClock,
        stats: &mut RunStatsAggregator,
    ) -> Result<RunOutcome, SimulationError> {
        self.clock.check()?;

        let mut ticks: u64 = 0;
        let mut last_now = 0.0_f64;
        let mut stalled_ticks: u32 = 0;

        loop {
            if self.is_cancelled() {
                return Ok(RunOutcome::Cancelled);
            }
            let progress = LoopProgress {
                ticks,
                simulated_elapsed_sec: last_now,
                wall_elapsed: clock.wall_elapsed(),
                remaining_km: self.movement.remaining_km(),
            };
            if self.stop_predicates.iter().any(|stop| stop(&progress)) {
                return Ok(RunOutcome::Stopped);
            }

            let now = clock.now_sec();
            let rate_ms = self.scheduler.tick(now);
            if !rate_ms.is_finite() {
                return Err(SimulationError::NonFiniteRate { rate_ms });
            }

            let dt = now - last_now;
            let before_km = self.movement.remaining_km();
            let progressed = if dt > 0.0 {
                self.movement.tick(dt)?;
                self.movement.remaining_km() < before_km - PROGRESS_EPSILON_KM
            } else {
                // only the first tick may leave time where it was
                ticks == 0
            };
            if progressed {
                stalled_ticks = 0;
            } else {
                stalled_ticks += 1;
                if stalled_ticks >= STALL_TICK_LIMIT {
                    return Err(SimulationError::Unreachable {
                        remaining_km: self.movement.remaining_km(),
                        stalled_ticks,
                    });
                }
            }
            last_now = now;
            ticks += 1;

            self.vehicle.position = self.movement.position();
            self.vehicle.speed_kmh = self.movement.speed_kmh();
            let remaining_km = self.movement.remaining_km();

            self.publish_tick(now, stats).await;

            let sample = TickSample {
                tick: ticks,
                rate_ms,
                speed_kmh: self.vehicle.speed_kmh,
                remaining_km,
            };
            observability::record_tick_metrics(&sample);
            stats.update(&sample);

            let state = self.scheduler.state();
            info!(
                tick = ticks,
                lat = self.vehicle.position.latitude,
                lon = self.vehicle.position.longitude,
                remaining_km = format!("{remaining_km:.3}"),
                rate_ms = format!("{rate_ms:.1}"),
                phase = %state.phase,
                window = state.current_window_index,
                "Vehicle position update"
            );

            if remaining_km <= self.arrival_threshold_km {
                return Ok(RunOutcome::Arrived);
            }

            if self.suspend(clock, rate_ms).await {
                return Ok(RunOutcome::Cancelled);
            }
        }
    }

    /// Build this tick's records and hand each to the sink
    async fn publish_tick(&mut self, now_sec: f64, stats: &mut RunStatsAggregator) {
        let ctx = TickContext {
            vehicle_id: &self.vehicle.id,
            timestamp: record_timestamp(self.vehicle.start_time, now_sec),
            position: self.vehicle.position,
            bearing_deg: self.movement.bearing_deg(),
        };
        let bundle = self.factory.build(&ctx);

        for record in bundle.into_records() {
            let channel = self.channels.name_for(record.channel_kind());
            match self.sink.publish(channel, &record).await {
                Ok(()) => {
                    observability::record_published(channel, true);
                    stats.record_delivery(true);
                }
                Err(e) => {
                    warn!(
                        channel,
                        record_id = %record.id(),
                        error = %e,
                        "Delivery failed, continuing"
                    );
                    observability::record_published(channel, false);
                    stats.record_delivery(false);
                }
            }
        }
    }

    /// Suspend for one tick; returns true when interrupted meanwhile
    async fn suspend(&mut self, clock: &mut SimulationClock, rate_ms: f64) -> bool {
        let Some(cancel) = self.cancel.as_mut() else {
            clock.suspend(rate_ms).await;
            return false;
        };

        let interrupted = tokio::select! {
            biased;
            _ = clock.suspend(rate_ms) => Some(false),
            changed = cancel.wait_for(|stop| *stop) => changed.ok().map(|_| true),
        };

        match interrupted {
            Some(interrupted) => interrupted,
            None => {
                // sender dropped: nobody can interrupt this run anymore
                self.cancel = None;
                clock.suspend(rate_ms).await;
                false
            }
        }
    }

    fn is_cancelled(&self) -> bool {
        self.cancel.as_ref().is_some_and(|rx| *rx.borrow())
    }

    async fn release_sink(&mut self) {
        if let Err(e) = self.sink.flush().await {
            warn!(sink = self.sink.name(), error = %e, "Flush failed");
        }
        if let Err(e) = self.sink.close().await {
            warn!(sink = self.sink.name(), error = %e, "Close failed");
        }
    }
}

/// Channel names in publishing order
pub fn channel_names(channels: &ChannelsConfig) -> Vec<&str> {
    ChannelKind::ALL
        .iter()
        .map(|kind| channels.name_for(*kind))
        .collect()
}
