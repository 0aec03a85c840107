//! Independent unassigned-set cross-check.
//!
//! Recomputes the unassigned route/vehicle sets from the assignment
//! list alone and compares them against what the engine reported. The
//! two computations share no code path, so agreement is evidence the
//! engine's bookkeeping is sound.

use std::collections::HashSet;

use crate::error::IntegrityError;
use crate::models::{AllocationResult, Route, Vehicle};

/// Cross-checks an allocation result's unassigned sets.
///
/// Any mismatch is an [`IntegrityError`]: always fatal, a defect
/// signal, never silently corrected.
#[derive(Debug, Clone, Default)]
pub struct UnassignedTracker;

impl UnassignedTracker {
    /// Creates a new tracker.
    pub fn new() -> Self {
        Self
    }

    /// Recomputes the unassigned sets and compares them, order
    /// included, against the result's reported sets.
    pub fn verify(
        &self,
        routes: &[Route],
        vehicles: &[Vehicle],
        result: &AllocationResult,
    ) -> Result<(), IntegrityError> {
        let assigned_routes: HashSet<&str> =
            result.assignments.iter().map(|a| a.route_id.as_str()).collect();
        let assigned_vehicles: HashSet<&str> =
            result.assignments.iter().map(|a| a.vehicle_id.as_str()).collect();

        let recomputed_routes: Vec<String> = routes
            .iter()
            .filter(|r| !assigned_routes.contains(r.id.as_str()))
            .map(|r| r.id.clone())
            .collect();
        if recomputed_routes != result.unassigned_routes {
            return Err(IntegrityError::mismatch(
                "unassigned_routes",
                &result.unassigned_routes,
                &recomputed_routes,
            ));
        }

        let recomputed_vehicles: Vec<String> = vehicles
            .iter()
            .filter(|v| !assigned_vehicles.contains(v.id.as_str()))
            .map(|v| v.id.clone())
            .collect();
        if recomputed_vehicles != result.unassigned_vehicles {
            return Err(IntegrityError::mismatch(
                "unassigned_vehicles",
                &result.unassigned_vehicles,
                &recomputed_vehicles,
            ));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::AllocationEngine;
    use crate::models::VehicleClass;

    fn make_route(id: &str) -> Route {
        Route::new(id)
            .with_service_type("standard_parcel")
            .with_required_class(VehicleClass::CargoVan)
    }

    fn make_vehicle(id: &str) -> Vehicle {
        Vehicle::active(id, VehicleClass::CargoVan)
    }

    #[test]
    fn test_engine_output_passes() {
        let routes: Vec<Route> = (1..=5).map(|i| make_route(&format!("R{i}"))).collect();
        let vehicles: Vec<Vehicle> = (1..=3).map(|i| make_vehicle(&format!("V{i}"))).collect();

        let result = AllocationEngine::new().allocate(&routes, &vehicles);
        assert!(UnassignedTracker::new().verify(&routes, &vehicles, &result).is_ok());
    }

    #[test]
    fn test_failed_run_passes() {
        let routes = vec![Route::new("R1")]; // missing service_type
        let vehicles = vec![make_vehicle("V1")];

        let result = AllocationEngine::new().allocate(&routes, &vehicles);
        assert!(UnassignedTracker::new().verify(&routes, &vehicles, &result).is_ok());
    }

    #[test]
    fn test_dropped_unassigned_route_is_fatal() {
        let routes = vec![make_route("R1"), make_route("R2")];
        let vehicles = vec![make_vehicle("V1")];

        let mut result = AllocationEngine::new().allocate(&routes, &vehicles);
        result.unassigned_routes.clear();

        let err = UnassignedTracker::new()
            .verify(&routes, &vehicles, &result)
            .unwrap_err();
        assert_eq!(err.set, "unassigned_routes");
        assert!(err.to_string().contains("IntegrityError"));
    }

    #[test]
    fn test_wrong_order_is_fatal() {
        let routes = vec![make_route("R1"), make_route("R2"), make_route("R3")];
        let vehicles: Vec<Vehicle> = vec![];

        let mut result = AllocationEngine::new().allocate(&routes, &vehicles);
        result.unassigned_routes.swap(0, 2);

        assert!(UnassignedTracker::new().verify(&routes, &vehicles, &result).is_err());
    }

    #[test]
    fn test_phantom_unassigned_vehicle_is_fatal() {
        let routes = vec![make_route("R1")];
        let vehicles = vec![make_vehicle("V1")];

        let mut result = AllocationEngine::new().allocate(&routes, &vehicles);
        result.unassigned_vehicles.push("V99".into());

        let err = UnassignedTracker::new()
            .verify(&routes, &vehicles, &result)
            .unwrap_err();
        assert_eq!(err.set, "unassigned_vehicles");
    }
}
