//! Duplicate-binding conflict detection.
//!
//! A conflict is a vehicle bound to more than one route within a
//! single run. The engine itself never produces one (bound vehicles
//! leave the pool), so a conflict always signals an upstream defect in
//! the assignment data handed to downstream consumers.

use std::collections::HashMap;

use crate::models::{AllocationResult, Conflict};

/// Detects vehicles bound to more than one route.
///
/// Pure and non-mutating: the inspected result is never altered or
/// rolled back. The caller decides remediation.
#[derive(Debug, Clone, Default)]
pub struct DuplicateConflictValidator;

impl DuplicateConflictValidator {
    /// Creates a new validator.
    pub fn new() -> Self {
        Self
    }

    /// Returns one [`Conflict`] per multiply-bound vehicle.
    ///
    /// Assignments are grouped by vehicle ID; any group of size
    /// greater than one becomes a conflict with its route IDs in
    /// first-occurrence order. Conflicts are ordered by the first
    /// occurrence of their vehicle ID. Each conflict carries the
    /// run's timestamp, so validating the same result twice yields
    /// identical sequences.
    pub fn validate(&self, result: &AllocationResult) -> Vec<Conflict> {
        let mut order: Vec<&str> = Vec::new();
        let mut groups: HashMap<&str, Vec<&str>> = HashMap::new();

        for assignment in &result.assignments {
            let routes = groups
                .entry(assignment.vehicle_id.as_str())
                .or_insert_with(|| {
                    order.push(assignment.vehicle_id.as_str());
                    Vec::new()
                });
            routes.push(assignment.route_id.as_str());
        }

        order
            .into_iter()
            .filter(|vehicle_id| groups[vehicle_id].len() > 1)
            .map(|vehicle_id| {
                Conflict::new(
                    vehicle_id,
                    groups[vehicle_id].iter().map(|r| r.to_string()).collect(),
                    result.timestamp,
                )
            })
            .collect()
    }
}
