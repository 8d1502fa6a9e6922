//! NGSI-LD wire representation of a vehicle entity.
//!
//! The broker expects each entity as a JSON-LD document: plain attributes
//! become `Property` objects, the position becomes a `GeoProperty` holding a
//! GeoJSON point, and every entity carries the `@context` that maps the
//! attribute names onto the smart-data-models Vehicle schema.

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::entities::{GeoPoint, VehicleEntity};

/// Smart-data-models attribute context.
pub const SMART_DATA_MODELS_CONTEXT: &str =
    "https://raw.githubusercontent.com/smart-data-models/data-models/master/context.jsonld";

/// NGSI-LD core context.
pub const NGSI_LD_CORE_CONTEXT: &str =
    "https://uri.etsi.org/ngsi-ld/v1/ngsi-ld-core-context.jsonld";

/// NGSI-LD `Property` attribute.
#[derive(Debug, Clone, Serialize)]
pub struct Property<T: Serialize> {
    /// Attribute type, always `"Property"`.
    #[serde(rename = "type")]
    pub attribute_type: &'static str,

    /// Attribute value.
    pub value: T,

    /// Observation instant, when the value is a measurement.
    #[serde(rename = "observedAt", skip_serializing_if = "Option::is_none")]
    pub observed_at: Option<DateTime<Utc>>,
}

impl<T: Serialize> Property<T> {
    /// Static attribute without an observation instant.
    pub fn new(value: T) -> Self {
        Self {
            attribute_type: "Property",
            value,
            observed_at: None,
        }
    }

    /// Observed attribute.
    pub fn observed(value: T, observed_at: DateTime<Utc>) -> Self {
        Self {
            attribute_type: "Property",
            value,
            observed_at: Some(observed_at),
        }
    }
}

/// NGSI-LD `GeoProperty` attribute.
#[derive(Debug, Clone, Serialize)]
pub struct GeoProperty {
    /// Attribute type, always `"GeoProperty"`.
    #[serde(rename = "type")]
    pub attribute_type: &'static str,

    /// GeoJSON point in `[longitude, latitude]` order, carried over from the
    /// entity verbatim. The axis swap already happened in the transformer.
    pub value: GeoPoint,

    /// Observation instant.
    #[serde(rename = "observedAt")]
    pub observed_at: DateTime<Utc>,
}

/// One vehicle entity as submitted to the batch upsert endpoint.
#[derive(Debug, Clone, Serialize)]
pub struct BrokerVehicle {
    /// JSON-LD context.
    #[serde(rename = "@context")]
    pub context: Vec<&'static str>,

    /// Entity identifier (URN).
    pub id: String,

    /// Entity type.
    #[serde(rename = "type")]
    pub entity_type: String,

    /// Speed measurement.
    pub speed: Property<u32>,

    /// Vehicle subtype.
    #[serde(rename = "vehicleType")]
    pub vehicle_type: Property<String>,

    /// Site and gate summary.
    pub description: Property<String>,

    /// Heading placeholder.
    pub heading: Property<u32>,

    /// Detection position.
    pub location: GeoProperty,
}

impl From<&VehicleEntity> for BrokerVehicle {
    fn from(vehicle: &VehicleEntity) -> Self {
        Self {
            context: vec![SMART_DATA_MODELS_CONTEXT, NGSI_LD_CORE_CONTEXT],
            id: vehicle.id.clone(),
            entity_type: vehicle.entity_type.clone(),
            speed: Property::observed(vehicle.speed.value, vehicle.speed.observed_at),
            vehicle_type: Property::new(vehicle.vehicle_type.clone()),
            description: Property::new(vehicle.description.clone()),
            heading: Property::observed(vehicle.heading.value, vehicle.heading.observed_at),
            location: GeoProperty {
                attribute_type: "GeoProperty",
                value: vehicle.location.value.clone(),
                observed_at: vehicle.location.observed_at,
            },
        }
    }
}
