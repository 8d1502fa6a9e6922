//! Vehicle entity produced by the transformer.
//!
//! Modeled after the FIWARE Vehicle data model:
//! <https://github.com/FIWARE/data-models/blob/master/specs/Transportation/Vehicle/Vehicle/doc/spec.md>

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// NGSI-LD entity type for every synchronized vehicle.
pub const ENTITY_TYPE: &str = "Vehicle";

/// Vehicle subtype reported to the broker. Gate sensors only detect cars.
pub const VEHICLE_TYPE_CAR: &str = "Car";

/// URN namespace prefixed to the presence event identifier.
pub const ENTITY_ID_PREFIX: &str = "urn:ngsi-ld:vehicle:";

/// A GeoJSON point in broker axis order.
///
/// The `coordinates` array is `[longitude, latitude]`, which is what the
/// context broker expects. The site table stores positions the other way
/// around; the transformer performs that swap exactly once when it builds
/// the point. Nothing downstream reorders the axes again.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GeoPoint {
    /// GeoJSON geometry type, always `"Point"`.
    #[serde(rename = "type")]
    pub point_type: String,

    /// Position as `[longitude, latitude]`.
    pub coordinates: [f64; 2],
}

impl GeoPoint {
    /// Builds a point from broker-order axes.
    pub fn lon_lat(longitude: f64, latitude: f64) -> Self {
        Self {
            point_type: "Point".to_string(),
            coordinates: [longitude, latitude],
        }
    }

    /// Longitude component of the point.
    pub fn longitude(&self) -> f64 {
        self.coordinates[0]
    }

    /// Latitude component of the point.
    pub fn latitude(&self) -> f64 {
        self.coordinates[1]
    }
}

/// A value observed at a specific instant.
#[derive(Debug, Clone, PartialEq)]
pub struct Measurement<T> {
    /// The observed value.
    pub value: T,

    /// When the value was observed.
    pub observed_at: DateTime<Utc>,
}

impl<T> Measurement<T> {
    /// Pairs a value with its observation instant.
    pub fn new(value: T, observed_at: DateTime<Utc>) -> Self {
        Self { value, observed_at }
    }
}

/// The synchronization target handed to the persistor.
///
/// Created once per presence event and immutable afterwards. Owned by the
/// batch accumulator until the flush hands it to the broker client.
#[derive(Debug, Clone, PartialEq)]
pub struct VehicleEntity {
    /// Entity identifier, the event id under [`ENTITY_ID_PREFIX`].
    pub id: String,

    /// NGSI-LD entity type, always [`ENTITY_TYPE`].
    pub entity_type: String,

    /// Vehicle subtype, always [`VEHICLE_TYPE_CAR`].
    pub vehicle_type: String,

    /// Speed in km/h. Gate sensors do not measure speed, so this carries the
    /// configured default.
    pub speed: Measurement<u32>,

    /// Detection position in broker axis order.
    pub location: Measurement<GeoPoint>,

    /// Human-readable site and gate summary.
    pub description: String,

    /// Heading in degrees. Placeholder required by the broker schema, not a
    /// measured value.
    pub heading: Measurement<u32>,
}
