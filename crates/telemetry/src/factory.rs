//! RecordFactory - per-tick record assembly.

use chrono::{DateTime, TimeDelta, Utc};
use contracts::{
    CompassPoint, Coordinate, EmergencyIncidentRecord, EmergencyType, GpsRecord, Severity,
    TelemetryRecord, TrafficCameraRecord, VehicleProfileConfig, VehicleRecord, WeatherCondition,
    WeatherRecord,
};
use rand::Rng;
use rand::seq::IndexedRandom;
use uuid::Uuid;

const SNAPSHOT_PLACEHOLDER: &str = "base64EncodedStringImage";
const ACTIVE: &str = "Active";

/// Timestamp of a record emitted `elapsed_sec` simulated seconds after `run_start`
pub fn record_timestamp(run_start: DateTime<Utc>, elapsed_sec: f64) -> DateTime<Utc> {
    let micros = (elapsed_sec.max(0.0) * 1_000_000.0).round() as i64;
    run_start + TimeDelta::microseconds(micros)
}

/// Everything a tick contributes to its records
#[derive(Debug, Clone, Copy)]
pub struct TickContext<'a> {
    pub vehicle_id: &'a str,
    pub timestamp: DateTime<Utc>,
    pub position: Coordinate,
    /// Bearing toward the destination, degrees
    pub bearing_deg: f64,
}

/// The five records of one tick, sharing timestamp and position
#[derive(Debug, Clone, PartialEq)]
pub struct RecordBundle {
    pub vehicle: VehicleRecord,
    pub gps: GpsRecord,
    pub traffic: TrafficCameraRecord,
    pub weather: WeatherRecord,
    pub emergency: EmergencyIncidentRecord,
}

impl RecordBundle {
    /// Records in publishing order (vehicle, gps, traffic, weather, emergency)
    pub fn into_records(self) -> [TelemetryRecord; 5] {
        [
            TelemetryRecord::Vehicle(self.vehicle),
            TelemetryRecord::Gps(self.gps),
            TelemetryRecord::TrafficCamera(self.traffic),
            TelemetryRecord::Weather(self.weather),
            TelemetryRecord::EmergencyIncident(self.emergency),
        ]
    }
}

/// Builds record bundles from tick context, vehicle profile and an RNG
#[derive(Debug)]
pub struct RecordFactory<R> {
    profile: VehicleProfileConfig,
    rng: R,
}

impl<R: Rng> RecordFactory<R> {
    pub fn new(profile: VehicleProfileConfig, rng: R) -> Self {
        Self { profile, rng }
    }

    pub fn profile(&self) -> &VehicleProfileConfig {
        &self.profile
    }

    /// Build all five records for one tick
    pub fn build(&mut self, ctx: &TickContext<'_>) -> RecordBundle {
        let direction = CompassPoint::from_bearing(ctx.bearing_deg);
        RecordBundle {
            vehicle: self.vehicle(ctx, direction),
            gps: self.gps(ctx, direction),
            traffic: self.traffic_camera(ctx),
            weather: self.weather(ctx),
            emergency: self.emergency_incident(ctx),
        }
    }

    fn next_id(&mut self) -> Uuid {
        uuid::Builder::from_random_bytes(self.rng.random()).into_uuid()
    }

    fn vehicle(&mut self, ctx: &TickContext<'_>, direction: CompassPoint) -> VehicleRecord {
        VehicleRecord {
            id: self.next_id(),
            vehicle_id: ctx.vehicle_id.to_string(),
            location: ctx.position,
            timestamp: ctx.timestamp,
            speed: self.rng.random_range(10..=40),
            direction,
            make: self.profile.make.clone(),
            model: self.profile.model.clone(),
            year: self.profile.year,
            color: self.profile.color.clone(),
            license_plate: self.profile.license_plate.clone(),
            vehicle_type: self.profile.vehicle_type.clone(),
            status: ACTIVE.to_string(),
            fuel_type: self.profile.fuel_type.clone(),
            fuel_level: self.rng.random_range(10..=100),
        }
    }

    fn gps(&mut self, ctx: &TickContext<'_>, direction: CompassPoint) -> GpsRecord {
        GpsRecord {
            id: self.next_id(),
            vehicle_id: ctx.vehicle_id.to_string(),
            timestamp: ctx.timestamp,
            speed: self.rng.random_range(0..=40),
            direction,
            vehicle_type: self.profile.gps_vehicle_type.clone(),
        }
    }

    fn traffic_camera(&mut self, ctx: &TickContext<'_>) -> TrafficCameraRecord {
        TrafficCameraRecord {
            id: self.next_id(),
            vehicle_id: ctx.vehicle_id.to_string(),
            timestamp: ctx.timestamp,
            camera_id: self.profile.camera_id.clone(),
            location: ctx.position,
            snapshot: SNAPSHOT_PLACEHOLDER.to_string(),
        }
    }

    fn weather(&mut self, ctx: &TickContext<'_>) -> WeatherRecord {
        WeatherRecord {
            id: self.next_id(),
            vehicle_id: ctx.vehicle_id.to_string(),
            timestamp: ctx.timestamp,
            location: ctx.position,
            temperature: self.rng.random_range(-10..=44),
            humidity: self.rng.random_range(0..=100),
            wind_speed: self.rng.random_range(0..=40),
            wind_direction: *CompassPoint::ALL
                .choose(&mut self.rng)
                .unwrap_or(&CompassPoint::North),
            weather: *WeatherCondition::ALL
                .choose(&mut self.rng)
                .unwrap_or(&WeatherCondition::Sunny),
            precipitation: self.rng.random_range(0..=100),
            visibility: self.rng.random_range(0..=20),
            pressure: self.rng.random_range(1000..=1030),
            cloud_cover: self.rng.random_range(0..=100),
            air_quality_index: self.rng.random_range(0..=500),
        }
    }

    fn emergency_incident(&mut self, ctx: &TickContext<'_>) -> EmergencyIncidentRecord {
        let emergency_type = *EmergencyType::ALL
            .choose(&mut self.rng)
            .unwrap_or(&EmergencyType::None);
        EmergencyIncidentRecord {
            id: self.next_id(),
            incident_id: self.next_id(),
            timestamp: ctx.timestamp,
            vehicle_id: ctx.vehicle_id.to_string(),
            location: ctx.position,
            emergency_type,
            description: describe(emergency_type).to_string(),
            severity: *Severity::ALL
                .choose(&mut self.rng)
                .unwrap_or(&Severity::Low),
            status: ACTIVE.to_string(),
        }
    }
}

fn describe(kind: EmergencyType) -> &'static str {
    match kind {
        EmergencyType::Accident => "Vehicle involved in an accident",
        EmergencyType::Fire => "Vehicle fire reported",
        EmergencyType::Theft => "Vehicle theft reported",
        EmergencyType::Medical => "Medical emergency on board",
        EmergencyType::Other => "Incident reported near vehicle",
        EmergencyType::None => "No incident",
    }
}
