//! Batch accumulator for vehicle entities.

use crate::entities::VehicleEntity;

/// Ordered, append-only collection of vehicle entities for one run.
///
/// Only ever touched from the single consumption loop, so it carries no
/// synchronization. `drain` is called exactly once, at flush time.
#[derive(Debug, Default)]
pub struct VehicleBatch {
    entities: Vec<VehicleEntity>,
}

impl VehicleBatch {
    /// Creates an empty batch.
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends an entity, preserving arrival order.
    pub fn append(&mut self, entity: VehicleEntity) {
        self.entities.push(entity);
    }

    /// Returns the full contents and leaves the batch empty.
    pub fn drain(&mut self) -> Vec<VehicleEntity> {
        std::mem::take(&mut self.entities)
    }

    /// Number of accumulated entities.
    pub fn len(&self) -> usize {
        self.entities.len()
    }

    /// Whether the batch holds no entities.
    pub fn is_empty(&self) -> bool {
        self.entities.is_empty()
    }
}
