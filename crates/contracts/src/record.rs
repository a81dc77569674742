//! TelemetryRecord - telemetry output
//!
//! One record per channel per tick. Field names follow the downstream analytics schema.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::Coordinate;

/// Logical channel a record is published on
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChannelKind {
    Vehicle,
    Gps,
    Traffic,
    Weather,
    Emergency,
}

impl ChannelKind {
    /// Publishing order within one tick
    pub const ALL: [ChannelKind; 5] = [
        ChannelKind::Vehicle,
        ChannelKind::Gps,
        ChannelKind::Traffic,
        ChannelKind::Weather,
        ChannelKind::Emergency,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Vehicle => "vehicle",
            Self::Gps => "gps",
            Self::Traffic => "traffic",
            Self::Weather => "weather",
            Self::Emergency => "emergency",
        }
    }
}

/// 8-point compass direction
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CompassPoint {
    North,
    #[serde(rename = "North-East")]
    NorthEast,
    East,
    #[serde(rename = "South-East")]
    SouthEast,
    South,
    #[serde(rename = "South-West")]
    SouthWest,
    West,
    #[serde(rename = "North-West")]
    NorthWest,
}

impl CompassPoint {
    /// Clockwise from North
    pub const ALL: [CompassPoint; 8] = [
        CompassPoint::North,
        CompassPoint::NorthEast,
        CompassPoint::East,
        CompassPoint::SouthEast,
        CompassPoint::South,
        CompassPoint::SouthWest,
        CompassPoint::West,
        CompassPoint::NorthWest,
    ];

    /// Nearest compass point for a bearing in degrees (any finite value)
    pub fn from_bearing(bearing_deg: f64) -> Self {
        let normalized = bearing_deg.rem_euclid(360.0);
        let sector = ((normalized + 22.5) / 45.0).floor() as usize % 8;
        Self::ALL[sector]
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::North => "North",
            Self::NorthEast => "North-East",
            Self::East => "East",
            Self::SouthEast => "South-East",
            Self::South => "South",
            Self::SouthWest => "South-West",
            Self::West => "West",
            Self::NorthWest => "North-West",
        }
    }
}

impl std::fmt::Display for CompassPoint {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Weather descriptor
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum WeatherCondition {
    Sunny,
    Rainy,
    Snowy,
    Cloudy,
}

impl WeatherCondition {
    pub const ALL: [WeatherCondition; 4] = [
        WeatherCondition::Sunny,
        WeatherCondition::Rainy,
        WeatherCondition::Snowy,
        WeatherCondition::Cloudy,
    ];
}

/// Emergency incident category
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum EmergencyType {
    Accident,
    Fire,
    Theft,
    Medical,
    Other,
    /// No incident
    None,
}

impl EmergencyType {
    pub const ALL: [EmergencyType; 6] = [
        EmergencyType::Accident,
        EmergencyType::Fire,
        EmergencyType::Theft,
        EmergencyType::Medical,
        EmergencyType::Other,
        EmergencyType::None,
    ];
}

/// Incident severity
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Severity {
    Low,
    Medium,
    High,
}

impl Severity {
    pub const ALL: [Severity; 3] = [Severity::Low, Severity::Medium, Severity::High];
}

/// Vehicle record: position plus static descriptive fields
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VehicleRecord {
    pub id: Uuid,
    pub vehicle_id: String,
    pub location: Coordinate,
    pub timestamp: DateTime<Utc>,
    /// km/h, 10-40
    pub speed: u32,
    pub direction: CompassPoint,
    pub make: String,
    pub model: String,
    pub year: u16,
    pub color: String,
    pub license_plate: String,
    pub vehicle_type: String,
    pub status: String,
    pub fuel_type: String,
    /// Percent, 10-100
    pub fuel_level: u8,
}

/// GPS record
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GpsRecord {
    pub id: Uuid,
    pub vehicle_id: String,
    pub timestamp: DateTime<Utc>,
    /// km/h, 0-40
    pub speed: u32,
    pub direction: CompassPoint,
    pub vehicle_type: String,
}

/// Traffic camera record
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrafficCameraRecord {
    pub id: Uuid,
    pub vehicle_id: String,
    pub timestamp: DateTime<Utc>,
    pub camera_id: String,
    pub location: Coordinate,
    /// Placeholder for an encoded image
    pub snapshot: String,
}

/// Weather record
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeatherRecord {
    pub id: Uuid,
    pub vehicle_id: String,
    pub timestamp: DateTime<Utc>,
    pub location: Coordinate,
    /// Celsius, -10..=44
    pub temperature: i32,
    /// Percent
    pub humidity: u8,
    /// km/h, 0-40
    pub wind_speed: u32,
    pub wind_direction: CompassPoint,
    pub weather: WeatherCondition,
    /// Percent
    pub precipitation: u8,
    /// km, 0-20
    pub visibility: u32,
    /// hPa, 1000-1030
    pub pressure: u32,
    /// Percent
    pub cloud_cover: u8,
    /// 0-500, above 300 is hazardous
    pub air_quality_index: u32,
}

/// Emergency incident record
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EmergencyIncidentRecord {
    pub id: Uuid,
    pub incident_id: Uuid,
    pub timestamp: DateTime<Utc>,
    pub vehicle_id: String,
    pub location: Coordinate,
    pub emergency_type: EmergencyType,
    pub description: String,
    pub severity: Severity,
    pub status: String,
}

/// Telemetry record (tagged union of the five payload kinds)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "record_type", rename_all = "snake_case")]
pub enum TelemetryRecord {
    Vehicle(VehicleRecord),
    Gps(GpsRecord),
    TrafficCamera(TrafficCameraRecord),
    Weather(WeatherRecord),
    EmergencyIncident(EmergencyIncidentRecord),
}

impl TelemetryRecord {
    /// Unique record id, also used as the delivery key
    pub fn id(&self) -> Uuid {
        match self {
            Self::Vehicle(r) => r.id,
            Self::Gps(r) => r.id,
            Self::TrafficCamera(r) => r.id,
            Self::Weather(r) => r.id,
            Self::EmergencyIncident(r) => r.id,
        }
    }

    pub fn vehicle_id(&self) -> &str {
        match self {
            Self::Vehicle(r) => &r.vehicle_id,
            Self::Gps(r) => &r.vehicle_id,
            Self::TrafficCamera(r) => &r.vehicle_id,
            Self::Weather(r) => &r.vehicle_id,
            Self::EmergencyIncident(r) => &r.vehicle_id,
        }
    }

    pub fn timestamp(&self) -> DateTime<Utc> {
        match self {
            Self::Vehicle(r) => r.timestamp,
            Self::Gps(r) => r.timestamp,
            Self::TrafficCamera(r) => r.timestamp,
            Self::Weather(r) => r.timestamp,
            Self::EmergencyIncident(r) => r.timestamp,
        }
    }

    /// Channel this record belongs on
    pub fn channel_kind(&self) -> ChannelKind {
        match self {
            Self::Vehicle(_) => ChannelKind::Vehicle,
            Self::Gps(_) => ChannelKind::Gps,
            Self::TrafficCamera(_) => ChannelKind::Traffic,
            Self::Weather(_) => ChannelKind::Weather,
            Self::EmergencyIncident(_) => ChannelKind::Emergency,
        }
    }
}
