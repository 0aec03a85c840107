//! Vehicle model.
//!
//! A vehicle is a driver+van unit eligible for route assignment. Each
//! vehicle has a class, an operational status, and a DSP (delivery
//! service partner) tag that scopes which routes it may serve.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// A vehicle that can be bound to a route.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Vehicle {
    /// Unique vehicle identifier.
    pub id: String,
    /// Vehicle classification (must equal the route's required class).
    pub class: VehicleClass,
    /// Operational status for this cycle.
    pub status: OperationalStatus,
    /// Delivery service partner tag.
    pub dsp: String,
    /// Domain-specific metadata.
    pub attributes: HashMap<String, String>,
}

/// Vehicle class classification.
///
/// Compatibility is equality: a route requiring `StepVan` is only
/// served by a `StepVan` vehicle.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum VehicleClass {
    /// Standard cargo van.
    CargoVan,
    /// Walk-in step van.
    StepVan,
    /// Battery-electric van.
    ElectricVan,
    /// Domain-specific class.
    Custom(String),
}

/// Operational status of a vehicle for one cycle.
///
/// Only `Active` vehicles enter the allocation pool.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum OperationalStatus {
    /// Available for assignment.
    Active,
    /// In the shop; excluded from allocation.
    Maintenance,
    /// Out of service; excluded from allocation.
    OutOfService,
}

impl Vehicle {
    /// Creates a new vehicle with the given ID and class.
    ///
    /// Defaults to `Active` status and an empty DSP tag.
    pub fn new(id: impl Into<String>, class: VehicleClass) -> Self {
        Self {
            id: id.into(),
            class,
            status: OperationalStatus::Active,
            dsp: String::new(),
            attributes: HashMap::new(),
        }
    }

    /// Creates an active vehicle.
    pub fn active(id: impl Into<String>, class: VehicleClass) -> Self {
        Self::new(id, class)
    }

    /// Sets the operational status.
    pub fn with_status(mut self, status: OperationalStatus) -> Self {
        self.status = status;
        self
    }

    /// Sets the DSP tag.
    pub fn with_dsp(mut self, dsp: impl Into<String>) -> Self {
        self.dsp = dsp.into();
        self
    }

    /// Adds a domain-specific attribute.
    pub fn with_attribute(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.attributes.insert(key.into(), value.into());
        self
    }

    /// Whether this vehicle is available for assignment.
    #[inline]
    pub fn is_active(&self) -> bool {
        self.status == OperationalStatus::Active
    }
}
