//! Allocation result model.
//!
//! An allocation result is the complete outcome of one engine run:
//! route-vehicle assignments, the unassigned sets, a terminal status,
//! and any conflicts detected afterwards. Results are created once per
//! run and read-only thereafter; the only permitted change is the
//! consuming [`AllocationResult::with_conflicts`] status upgrade.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// A route-vehicle binding.
///
/// Absent conflicts, a vehicle ID appears in at most one assignment
/// per result.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Assignment {
    /// Assigned route ID.
    pub route_id: String,
    /// Bound vehicle ID.
    pub vehicle_id: String,
    /// When the binding was made.
    pub assigned_at: DateTime<Utc>,
}

impl Assignment {
    /// Creates a new assignment.
    pub fn new(
        route_id: impl Into<String>,
        vehicle_id: impl Into<String>,
        assigned_at: DateTime<Utc>,
    ) -> Self {
        Self {
            route_id: route_id.into(),
            vehicle_id: vehicle_id.into(),
            assigned_at,
        }
    }
}

/// A vehicle bound to more than one route within a single run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Conflict {
    /// The multiply-bound vehicle.
    pub vehicle_id: String,
    /// Implicated routes, in first-occurrence order.
    pub route_ids: Vec<String>,
    /// When the conflict was detected.
    pub detected_at: DateTime<Utc>,
}

impl Conflict {
    /// Creates a new conflict.
    pub fn new(
        vehicle_id: impl Into<String>,
        route_ids: Vec<String>,
        detected_at: DateTime<Utc>,
    ) -> Self {
        Self {
            vehicle_id: vehicle_id.into(),
            route_ids,
            detected_at,
        }
    }
}

/// Terminal status of an allocation run.
///
/// Fixed at construction time; never a raw string. The implicit
/// RUNNING state has no representation because a result only exists
/// once a run has finished.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AllocationStatus {
    /// Run finished with no conflicts.
    Completed,
    /// Run finished, but validation found at least one conflict.
    CompletedWithConflicts,
    /// Run aborted (strict-mode validation failure).
    #[default]
    Failed,
}

impl AllocationStatus {
    /// Whether this status counts as a successful run.
    ///
    /// Conflicted runs still produced a usable allocation, so both
    /// completed variants count.
    #[inline]
    pub fn is_success(&self) -> bool {
        matches!(self, Self::Completed | Self::CompletedWithConflicts)
    }
}

/// The complete outcome of one allocation run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AllocationResult {
    /// Unique identifier for this run.
    pub request_id: String,
    /// When the run was performed.
    pub timestamp: DateTime<Utc>,
    /// Route-vehicle bindings, in allocation order.
    pub assignments: Vec<Assignment>,
    /// Routes left unfilled, in input order.
    pub unassigned_routes: Vec<String>,
    /// Vehicles left unbound, in input order.
    pub unassigned_vehicles: Vec<String>,
    /// Terminal run status.
    pub status: AllocationStatus,
    /// Run metadata (skip records, mode). Ordered so serialization
    /// is byte-stable.
    pub metadata: BTreeMap<String, String>,
    /// Readable failure description for FAILED runs.
    pub error: Option<String>,
}

impl AllocationResult {
    /// Number of assignments made.
    #[inline]
    pub fn assignment_count(&self) -> usize {
        self.assignments.len()
    }

    /// Total routes seen by the run (assigned plus unassigned).
    #[inline]
    pub fn total_routes(&self) -> usize {
        self.assignments.len() + self.unassigned_routes.len()
    }

    /// Share of routes filled, as a percentage (0-100).
    ///
    /// A run with no routes allocated everything it was asked to, so
    /// the rate is 100.
    pub fn allocation_rate(&self) -> f64 {
        let total = self.total_routes();
        if total == 0 {
            100.0
        } else {
            self.assignments.len() as f64 / total as f64 * 100.0
        }
    }

    /// The assignment for a route, if any.
    pub fn assignment_for_route(&self, route_id: &str) -> Option<&Assignment> {
        self.assignments.iter().find(|a| a.route_id == route_id)
    }

    /// Whether this run counts as successful.
    #[inline]
    pub fn is_success(&self) -> bool {
        self.status.is_success()
    }

    /// Applies conflict-validation findings to the status.
    ///
    /// A `Completed` run with at least one conflict becomes
    /// `CompletedWithConflicts`. `Failed` stays `Failed`, and an empty
    /// conflict list changes nothing.
    pub fn with_conflicts(mut self, conflicts: &[Conflict]) -> Self {
        if !conflicts.is_empty() && self.status == AllocationStatus::Completed {
            self.status = AllocationStatus::CompletedWithConflicts;
        }
        self
    }
}
