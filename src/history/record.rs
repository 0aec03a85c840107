//! Persisted run record.
//!
//! One self-describing record per allocation run. Reads are
//! schema-tolerant: missing fields take defaults and unknown fields
//! are ignored, so records written by older or newer builds of the
//! store still load.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::models::{AllocationResult, AllocationStatus, Conflict};

/// One allocation run as stored on disk.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HistoryEntry {
    /// When the run was performed (ISO-8601 on the wire).
    #[serde(default = "unix_epoch")]
    pub timestamp: DateTime<Utc>,
    /// Reporting name of the engine that produced the run.
    #[serde(default)]
    pub engine: String,
    /// Run identifier.
    #[serde(default)]
    pub request_id: String,
    /// Terminal run status. A record missing its status reads as
    /// `FAILED`.
    #[serde(default)]
    pub status: AllocationStatus,
    /// Total routes seen by the run.
    #[serde(default)]
    pub total_routes: usize,
    /// Routes filled.
    #[serde(default)]
    pub allocated_count: usize,
    /// Routes left unfilled.
    #[serde(default)]
    pub unallocated_count: usize,
    /// Share of routes filled, 0-100.
    #[serde(default)]
    pub allocation_rate: f64,
    /// Input file identifiers, keyed by role (e.g. "routes",
    /// "vehicle_status", "roster").
    #[serde(default)]
    pub files: BTreeMap<String, String>,
    /// Conflicts found by validation, if any.
    #[serde(default)]
    pub duplicate_conflicts: Vec<Conflict>,
    /// Failure description for FAILED runs.
    #[serde(default)]
    pub error: Option<String>,
}

fn unix_epoch() -> DateTime<Utc> {
    DateTime::<Utc>::UNIX_EPOCH
}

impl HistoryEntry {
    /// Builds the record for one completed run.
    pub fn from_result(
        result: &AllocationResult,
        files: BTreeMap<String, String>,
        conflicts: &[Conflict],
        engine: &str,
    ) -> Self {
        Self {
            timestamp: result.timestamp,
            engine: engine.to_string(),
            request_id: result.request_id.clone(),
            status: result.status,
            total_routes: result.total_routes(),
            allocated_count: result.assignment_count(),
            unallocated_count: result.unassigned_routes.len(),
            allocation_rate: result.allocation_rate(),
            files,
            duplicate_conflicts: conflicts.to_vec(),
            error: result.error.clone(),
        }
    }
}
