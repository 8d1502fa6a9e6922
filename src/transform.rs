//! Presence event to vehicle entity transformation.
//!
//! A pure mapping: the same event and configuration always produce the same
//! entity. The only failure mode is a site identifier that is missing from
//! the location table.

use thiserror::Error;
use tracing::error;

use crate::entities::vehicle::{ENTITY_ID_PREFIX, ENTITY_TYPE, VEHICLE_TYPE_CAR};
use crate::entities::{GeoPoint, Measurement, PresenceEvent, VehicleEntity};
use crate::sites::SiteLocationTable;

/// Heading reported for every vehicle. The broker schema requires the
/// attribute but gate sensors cannot measure it.
pub const PLACEHOLDER_HEADING: u32 = 180;

/// Errors that can occur while transforming a presence event.
#[derive(Error, Debug)]
pub enum TransformError {
    /// The event references a site the location table does not know.
    #[error("parking ID not found in site location table: {parking_id}")]
    SiteNotFound {
        /// The offending site identifier.
        parking_id: String,
    },
}

/// Converts presence events into vehicle entities.
///
/// Holds the site location table and the configured default speed; both are
/// fixed for the lifetime of a run.
#[derive(Debug, Clone)]
pub struct VehicleTransformer {
    sites: SiteLocationTable,
    default_speed: u32,
}

impl VehicleTransformer {
    /// Creates a transformer over the given site table.
    pub fn new(sites: SiteLocationTable, default_speed: u32) -> Self {
        Self {
            sites,
            default_speed,
        }
    }

    /// Maps a presence event to a vehicle entity.
    ///
    /// All observation timestamps are taken from the event's `detected_at`,
    /// never from `received_at`. The broker-facing location point is built in
    /// `[longitude, latitude]` order from the table's `(latitude, longitude)`
    /// pair; this is the single place the axes are swapped.
    ///
    /// # Errors
    ///
    /// Returns [`TransformError::SiteNotFound`] when the event's parking
    /// identifier is absent from the table. The offending identifier is
    /// logged here so skipped events remain visible in the run output.
    pub fn transform(&self, event: &PresenceEvent) -> Result<VehicleEntity, TransformError> {
        let position = self.sites.lookup(&event.parking_id).ok_or_else(|| {
            error!(parking_id = %event.parking_id, "parking ID not found");
            TransformError::SiteNotFound {
                parking_id: event.parking_id.clone(),
            }
        })?;

        let location = GeoPoint::lon_lat(position.longitude, position.latitude);
        let observed_at = event.detected_at;

        Ok(VehicleEntity {
            id: format!("{}{}", ENTITY_ID_PREFIX, event.id),
            entity_type: ENTITY_TYPE.to_string(),
            vehicle_type: VEHICLE_TYPE_CAR.to_string(),
            speed: Measurement::new(self.default_speed, observed_at),
            location: Measurement::new(location, observed_at),
            description: format!("Parking: {}, Gate: {}", event.parking_id, event.gate_id),
            heading: Measurement::new(PLACEHOLDER_HEADING, observed_at),
        })
    }
}
