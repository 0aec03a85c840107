//! Greedy priority-driven allocation engine.
//!
//! # Algorithm
//!
//! 1. Validate input rows (strict mode aborts, lenient mode skips).
//! 2. Process routes in ascending priority, ties broken by input order.
//! 3. Bind each route to the lowest-id eligible vehicle (active,
//!    matching class, matching DSP tag).
//! 4. Bound vehicles leave the pool; no reuse within a run.
//!
//! # Complexity
//! O(r * v) where r=routes, v=vehicles.

use std::collections::{BTreeMap, HashSet};

use chrono::{DateTime, Utc};
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::engine::{DuplicateConflictValidator, UnassignedTracker};
use crate::error::{DataValidationError, IntegrityError};
use crate::models::{AllocationResult, AllocationStatus, Assignment, Conflict, Route, Vehicle};
use crate::validation::{self, RowIssue};

/// How row-validation findings are handled.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ValidationMode {
    /// Any malformed required field aborts the whole run (status
    /// `FAILED`, error set).
    #[default]
    Strict,
    /// Offending rows are skipped and recorded in the result metadata;
    /// the run continues.
    Lenient,
}

/// Input container for one allocation run.
///
/// Owns the row sets plus optional pinned identity. With both
/// `request_id` and `requested_at` pinned, identical ordered inputs
/// produce byte-identical results.
#[derive(Debug, Clone)]
pub struct AllocationRequest {
    /// Routes to fill.
    pub routes: Vec<Route>,
    /// Vehicles available this cycle.
    pub vehicles: Vec<Vehicle>,
    /// Run identifier. `None` = a fresh UUID v4 per run.
    pub request_id: Option<String>,
    /// Run timestamp. `None` = wall clock at run time.
    pub requested_at: Option<DateTime<Utc>>,
}

impl AllocationRequest {
    /// Creates a new allocation request.
    pub fn new(routes: Vec<Route>, vehicles: Vec<Vehicle>) -> Self {
        Self {
            routes,
            vehicles,
            request_id: None,
            requested_at: None,
        }
    }

    /// Pins the run identifier.
    pub fn with_request_id(mut self, request_id: impl Into<String>) -> Self {
        self.request_id = Some(request_id.into());
        self
    }

    /// Pins the run timestamp.
    pub fn with_requested_at(mut self, requested_at: DateTime<Utc>) -> Self {
        self.requested_at = Some(requested_at);
        self
    }
}

/// Greedy vehicle-to-route allocation engine.
///
/// Synchronous and stateless across calls: independent invocations may
/// run concurrently on separate threads without coordination.
///
/// # Example
///
/// ```
/// use fleet_alloc::engine::AllocationEngine;
/// use fleet_alloc::models::{Route, Vehicle, VehicleClass};
///
/// let routes = vec![Route::new("R1")
///     .with_service_type("standard_parcel")
///     .with_required_class(VehicleClass::CargoVan)];
/// let vehicles = vec![Vehicle::active("V1", VehicleClass::CargoVan)];
///
/// let engine = AllocationEngine::new();
/// let result = engine.allocate(&routes, &vehicles);
/// assert_eq!(result.assignment_count(), 1);
/// ```
#[derive(Debug, Clone)]
pub struct AllocationEngine {
    name: String,
    mode: ValidationMode,
}

impl AllocationEngine {
    /// Creates a strict-mode engine named "greedy".
    pub fn new() -> Self {
        Self {
            name: "greedy".to_string(),
            mode: ValidationMode::Strict,
        }
    }

    /// Sets the reporting name.
    ///
    /// The name is a history-reporting field only; it never changes
    /// allocation behavior.
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    /// Sets the validation mode.
    pub fn with_mode(mut self, mode: ValidationMode) -> Self {
        self.mode = mode;
        self
    }

    /// The engine's reporting name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Allocates vehicles to routes for one cycle.
    ///
    /// Routes are processed in ascending `priority`, ties broken by
    /// original input order. Each route binds the lowest-id eligible
    /// vehicle: active, class equal to the route's required class, DSP
    /// tag equal to the route's. Bound vehicles leave the pool.
    ///
    /// Unmatched routes and unbound vehicles (inactive ones included)
    /// accumulate into the unassigned sets in input order. Empty
    /// inputs yield an empty `COMPLETED` result. Strict-mode
    /// validation failures yield a `FAILED` result with a readable
    /// error string; this method never panics on caller input.
    pub fn allocate(&self, routes: &[Route], vehicles: &[Vehicle]) -> AllocationResult {
        self.run(routes, vehicles, Uuid::new_v4().to_string(), Utc::now())
    }

    /// Allocates from a request, honoring pinned identity fields.
    pub fn allocate_request(&self, request: &AllocationRequest) -> AllocationResult {
        let request_id = request
            .request_id
            .clone()
            .unwrap_or_else(|| Uuid::new_v4().to_string());
        let timestamp = request.requested_at.unwrap_or_else(Utc::now);
        self.run(&request.routes, &request.vehicles, request_id, timestamp)
    }

    /// Allocates, validates for duplicate bindings, and cross-checks
    /// the unassigned sets.
    ///
    /// Returns the conflict-adjusted result together with any
    /// detected conflicts. An [`IntegrityError`] means the engine's
    /// own bookkeeping disagreed with the recomputation and is always
    /// fatal.
    pub fn allocate_checked(
        &self,
        routes: &[Route],
        vehicles: &[Vehicle],
    ) -> Result<(AllocationResult, Vec<Conflict>), IntegrityError> {
        let result = self.allocate(routes, vehicles);
        let conflicts = DuplicateConflictValidator::new().validate(&result);
        let result = result.with_conflicts(&conflicts);
        UnassignedTracker::new().verify(routes, vehicles, &result)?;
        Ok((result, conflicts))
    }

    fn run(
        &self,
        routes: &[Route],
        vehicles: &[Vehicle],
        request_id: String,
        timestamp: DateTime<Utc>,
    ) -> AllocationResult {
        debug!(
            engine = %self.name,
            routes = routes.len(),
            vehicles = vehicles.len(),
            mode = ?self.mode,
            "starting allocation run"
        );

        let route_issues = validation::check_routes(routes);
        let vehicle_issues = validation::check_vehicles(vehicles);

        if self.mode == ValidationMode::Strict
            && !(route_issues.is_empty() && vehicle_issues.is_empty())
        {
            return self.fail_run(routes, vehicles, request_id, timestamp, &route_issues, &vehicle_issues);
        }

        let mut metadata = BTreeMap::new();
        let skipped_route_rows: HashSet<usize> = route_issues.iter().map(|i| i.row).collect();
        let skipped_vehicle_rows: HashSet<usize> = vehicle_issues.iter().map(|i| i.row).collect();
        if !route_issues.is_empty() {
            warn!(skipped = route_issues.len(), "skipping malformed route rows");
            metadata.insert("skipped_routes".to_string(), join_issues(&route_issues));
        }
        if !vehicle_issues.is_empty() {
            warn!(skipped = vehicle_issues.len(), "skipping malformed vehicle rows");
            metadata.insert("skipped_vehicles".to_string(), join_issues(&vehicle_issues));
        }

        // Ascending priority; sort_by_key is stable, so ties keep
        // input order.
        let mut order: Vec<usize> = (0..routes.len())
            .filter(|i| !skipped_route_rows.contains(i))
            .collect();
        order.sort_by_key(|&i| routes[i].priority);

        let mut bound: HashSet<usize> = HashSet::new();
        let mut assignments = Vec::new();

        for &route_idx in &order {
            let route = &routes[route_idx];
            // Lowest-id eligible vehicle, by explicit comparison;
            // never incidental iteration order.
            let candidate = vehicles
                .iter()
                .enumerate()
                .filter(|(idx, _)| !skipped_vehicle_rows.contains(idx) && !bound.contains(idx))
                .filter(|(_, v)| {
                    v.is_active() && v.class == route.required_class && v.dsp == route.dsp
                })
                .min_by(|(_, a), (_, b)| a.id.cmp(&b.id));

            if let Some((vehicle_idx, vehicle)) = candidate {
                bound.insert(vehicle_idx);
                assignments.push(Assignment::new(
                    route.id.clone(),
                    vehicle.id.clone(),
                    timestamp,
                ));
            }
        }

        let assigned_routes: HashSet<&str> =
            assignments.iter().map(|a| a.route_id.as_str()).collect();
        let assigned_vehicles: HashSet<&str> =
            assignments.iter().map(|a| a.vehicle_id.as_str()).collect();

        let unassigned_routes: Vec<String> = routes
            .iter()
            .filter(|r| !assigned_routes.contains(r.id.as_str()))
            .map(|r| r.id.clone())
            .collect();
        let unassigned_vehicles: Vec<String> = vehicles
            .iter()
            .filter(|v| !assigned_vehicles.contains(v.id.as_str()))
            .map(|v| v.id.clone())
            .collect();

        info!(
            request_id = %request_id,
            assigned = assignments.len(),
            unassigned_routes = unassigned_routes.len(),
            "allocation run complete"
        );

        AllocationResult {
            request_id,
            timestamp,
            assignments,
            unassigned_routes,
            unassigned_vehicles,
            status: AllocationStatus::Completed,
            metadata,
            error: None,
        }
    }

    fn fail_run(
        &self,
        routes: &[Route],
        vehicles: &[Vehicle],
        request_id: String,
        timestamp: DateTime<Utc>,
        route_issues: &[RowIssue],
        vehicle_issues: &[RowIssue],
    ) -> AllocationResult {
        let message: Vec<String> = route_issues
            .iter()
            .chain(vehicle_issues)
            .map(|i| i.message.clone())
            .collect();
        let error = DataValidationError::new(message.join("; "));
        warn!(request_id = %request_id, %error, "allocation run aborted");

        // Nothing was allocated: every input row is reported
        // unassigned, keeping conservation on failed runs.
        AllocationResult {
            request_id,
            timestamp,
            assignments: Vec::new(),
            unassigned_routes: routes.iter().map(|r| r.id.clone()).collect(),
            unassigned_vehicles: vehicles.iter().map(|v| v.id.clone()).collect(),
            status: AllocationStatus::Failed,
            metadata: BTreeMap::new(),
            error: Some(error.to_string()),
        }
    }
}

impl Default for AllocationEngine {
    fn default() -> Self {
        Self::new()
    }
}

fn join_issues(issues: &[RowIssue]) -> String {
    issues
        .iter()
        .map(|i| i.message.as_str())
        .collect::<Vec<_>>()
        .join("; ")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{OperationalStatus, VehicleClass};

    fn make_route(id: &str, priority: i32) -> Route {
        Route::new(id)
            .with_service_type("standard_parcel")
            .with_required_class(VehicleClass::CargoVan)
            .with_dsp("DSP-A")
            .with_priority(priority)
    }

    fn make_vehicle(id: &str) -> Vehicle {
        Vehicle::active(id, VehicleClass::CargoVan).with_dsp("DSP-A")
    }

    fn fixed_time() -> DateTime<Utc> {
        "2026-03-01T06:00:00Z".parse().unwrap()
    }

    #[test]
    fn test_more_routes_than_vehicles() {
        let routes: Vec<Route> = (1..=5).map(|i| make_route(&format!("R{i}"), 0)).collect();
        let vehicles: Vec<Vehicle> = (1..=3).map(|i| make_vehicle(&format!("V{i}"))).collect();

        let result = AllocationEngine::new().allocate(&routes, &vehicles);
        assert_eq!(result.assignment_count(), 3);
        assert_eq!(result.unassigned_routes, vec!["R4", "R5"]);
        assert_eq!(result.status, AllocationStatus::Completed);
    }

    #[test]
    fn test_no_vehicles() {
        let routes: Vec<Route> = (1..=10).map(|i| make_route(&format!("R{i}"), 0)).collect();

        let result = AllocationEngine::new().allocate(&routes, &[]);
        assert_eq!(result.assignment_count(), 0);
        assert_eq!(result.unassigned_routes.len(), 10);
        assert_eq!(result.status, AllocationStatus::Completed);
    }

    #[test]
    fn test_empty_inputs() {
        let result = AllocationEngine::new().allocate(&[], &[]);
        assert!(result.assignments.is_empty());
        assert!(result.unassigned_routes.is_empty());
        assert_eq!(result.status, AllocationStatus::Completed);
    }

    #[test]
    fn test_priority_order() {
        // R2 has lower priority value, so it is filled first and takes
        // the only vehicle.
        let routes = vec![make_route("R1", 5), make_route("R2", 1)];
        let vehicles = vec![make_vehicle("V1")];

        let result = AllocationEngine::new().allocate(&routes, &vehicles);
        assert_eq!(result.assignments[0].route_id, "R2");
        assert_eq!(result.unassigned_routes, vec!["R1"]);
    }

    #[test]
    fn test_priority_tie_keeps_input_order() {
        let routes = vec![make_route("R1", 3), make_route("R2", 3)];
        let vehicles = vec![make_vehicle("V1")];

        let result = AllocationEngine::new().allocate(&routes, &vehicles);
        assert_eq!(result.assignments[0].route_id, "R1");
    }

    #[test]
    fn test_lowest_id_vehicle_wins() {
        let routes = vec![make_route("R1", 0)];
        // Input order deliberately not id order.
        let vehicles = vec![make_vehicle("V9"), make_vehicle("V2"), make_vehicle("V5")];

        let result = AllocationEngine::new().allocate(&routes, &vehicles);
        assert_eq!(result.assignments[0].vehicle_id, "V2");
        assert_eq!(result.unassigned_vehicles, vec!["V9", "V5"]);
    }

    #[test]
    fn test_no_vehicle_reuse() {
        let routes = vec![make_route("R1", 0), make_route("R2", 0)];
        let vehicles = vec![make_vehicle("V1")];

        let result = AllocationEngine::new().allocate(&routes, &vehicles);
        assert_eq!(result.assignment_count(), 1);
        assert_eq!(result.unassigned_routes, vec!["R2"]);
    }

    #[test]
    fn test_inactive_vehicles_excluded() {
        let routes = vec![make_route("R1", 0)];
        let vehicles = vec![
            make_vehicle("V1").with_status(OperationalStatus::Maintenance),
            make_vehicle("V2").with_status(OperationalStatus::OutOfService),
        ];

        let result = AllocationEngine::new().allocate(&routes, &vehicles);
        assert_eq!(result.assignment_count(), 0);
        // Unbound inactive vehicles still show up as unassigned.
        assert_eq!(result.unassigned_vehicles, vec!["V1", "V2"]);
    }

    #[test]
    fn test_class_mismatch_excluded() {
        let routes = vec![make_route("R1", 0).with_required_class(VehicleClass::StepVan)];
        let vehicles = vec![make_vehicle("V1")];

        let result = AllocationEngine::new().allocate(&routes, &vehicles);
        assert_eq!(result.assignment_count(), 0);
    }

    #[test]
    fn test_dsp_mismatch_excluded() {
        let routes = vec![make_route("R1", 0)];
        let vehicles = vec![make_vehicle("V1").with_dsp("DSP-B")];

        let result = AllocationEngine::new().allocate(&routes, &vehicles);
        assert_eq!(result.assignment_count(), 0);
        assert_eq!(result.unassigned_routes, vec!["R1"]);
    }

    #[test]
    fn test_strict_mode_aborts_on_missing_field() {
        let routes = vec![
            make_route("R1", 0),
            Route::new("R2").with_dsp("DSP-A"), // no service_type
        ];
        let vehicles = vec![make_vehicle("V1")];

        let result = AllocationEngine::new().allocate(&routes, &vehicles);
        assert_eq!(result.status, AllocationStatus::Failed);
        assert!(result.error.as_deref().unwrap().contains("DataValidationError"));
        assert!(result.assignments.is_empty());
        // Conservation holds on failed runs too.
        assert_eq!(result.unassigned_routes.len(), 2);
        assert_eq!(result.unassigned_vehicles, vec!["V1"]);
    }

    #[test]
    fn test_lenient_mode_skips_and_records() {
        let routes = vec![
            make_route("R1", 0),
            Route::new("R2").with_dsp("DSP-A"), // no service_type
        ];
        let vehicles = vec![make_vehicle("V1"), make_vehicle("V2")];

        let engine = AllocationEngine::new().with_mode(ValidationMode::Lenient);
        let result = engine.allocate(&routes, &vehicles);
        assert_eq!(result.status, AllocationStatus::Completed);
        assert_eq!(result.assignment_count(), 1);
        assert_eq!(result.assignments[0].route_id, "R1");
        assert!(result.metadata["skipped_routes"].contains("R2"));
        // The skipped route is still an unfilled input row.
        assert_eq!(result.unassigned_routes, vec!["R2"]);
    }

    #[test]
    fn test_deterministic_with_pinned_request() {
        let routes: Vec<Route> = (1..=4).map(|i| make_route(&format!("R{i}"), i)).collect();
        let vehicles: Vec<Vehicle> = (1..=3).map(|i| make_vehicle(&format!("V{i}"))).collect();
        let request = AllocationRequest::new(routes, vehicles)
            .with_request_id("req-fixed")
            .with_requested_at(fixed_time());

        let engine = AllocationEngine::new();
        let first = engine.allocate_request(&request);
        let second = engine.allocate_request(&request);
        assert_eq!(first, second);
        let first_json = serde_json::to_string(&first).unwrap();
        let second_json = serde_json::to_string(&second).unwrap();
        assert_eq!(first_json, second_json);
    }

    #[test]
    fn test_conservation() {
        let routes: Vec<Route> = (1..=7).map(|i| make_route(&format!("R{i}"), 7 - i)).collect();
        let vehicles: Vec<Vehicle> = (1..=4).map(|i| make_vehicle(&format!("V{i}"))).collect();

        let result = AllocationEngine::new().allocate(&routes, &vehicles);
        assert_eq!(
            result.assignment_count() + result.unassigned_routes.len(),
            routes.len()
        );
    }

    #[test]
    fn test_no_duplicate_vehicle_bindings() {
        let routes: Vec<Route> = (1..=6).map(|i| make_route(&format!("R{i}"), 0)).collect();
        let vehicles: Vec<Vehicle> = (1..=6).map(|i| make_vehicle(&format!("V{i}"))).collect();

        let result = AllocationEngine::new().allocate(&routes, &vehicles);
        let mut seen = HashSet::new();
        for a in &result.assignments {
            assert!(seen.insert(a.vehicle_id.clone()), "vehicle bound twice");
        }
    }

    #[test]
    fn test_allocate_checked_clean_run() {
        let routes = vec![make_route("R1", 0), make_route("R2", 1)];
        let vehicles = vec![make_vehicle("V1"), make_vehicle("V2")];

        let (result, conflicts) = AllocationEngine::new()
            .allocate_checked(&routes, &vehicles)
            .unwrap();
        assert!(conflicts.is_empty());
        assert_eq!(result.status, AllocationStatus::Completed);
        assert_eq!(result.assignment_count(), 2);
    }

    #[test]
    fn test_engine_name_is_reporting_only() {
        let engine = AllocationEngine::new().with_name("greedy-v2");
        assert_eq!(engine.name(), "greedy-v2");

        let routes = vec![make_route("R1", 0)];
        let vehicles = vec![make_vehicle("V1")];
        let named = engine.allocate_request(
            &AllocationRequest::new(routes.clone(), vehicles.clone())
                .with_request_id("r")
                .with_requested_at(fixed_time()),
        );
        let unnamed = AllocationEngine::new().allocate_request(
            &AllocationRequest::new(routes, vehicles)
                .with_request_id("r")
                .with_requested_at(fixed_time()),
        );
        assert_eq!(named, unnamed);
    }
}
