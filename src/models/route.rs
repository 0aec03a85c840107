//! Route model.
//!
//! A route is one delivery/service task requiring exactly one vehicle
//! for a given operational cycle. Routes are created fresh per run and
//! discarded afterwards.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use super::VehicleClass;

/// A delivery route to be filled by one vehicle.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Route {
    /// Unique route identifier.
    pub id: String,
    /// Service type (e.g. "standard_parcel", "oversize").
    pub service_type: String,
    /// Vehicle class this route requires.
    pub required_class: VehicleClass,
    /// Delivery service partner tag.
    pub dsp: String,
    /// Allocation priority (lower = allocated earlier).
    pub priority: i32,
    /// Domain-specific metadata.
    pub attributes: HashMap<String, String>,
}

impl Route {
    /// Creates a new route with the given ID.
    ///
    /// Defaults to an empty service type, `CargoVan` class, empty DSP
    /// tag, and priority 0.
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            service_type: String::new(),
            required_class: VehicleClass::CargoVan,
            dsp: String::new(),
            priority: 0,
            attributes: HashMap::new(),
        }
    }

    /// Sets the service type.
    pub fn with_service_type(mut self, service_type: impl Into<String>) -> Self {
        self.service_type = service_type.into();
        self
    }

    /// Sets the required vehicle class.
    pub fn with_required_class(mut self, class: VehicleClass) -> Self {
        self.required_class = class;
        self
    }

    /// Sets the DSP tag.
    pub fn with_dsp(mut self, dsp: impl Into<String>) -> Self {
        self.dsp = dsp.into();
        self
    }

    /// Sets the allocation priority (lower allocates earlier).
    pub fn with_priority(mut self, priority: i32) -> Self {
        self.priority = priority;
        self
    }

    /// Adds a domain-specific attribute.
    pub fn with_attribute(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.attributes.insert(key.into(), value.into());
        self
    }
}
