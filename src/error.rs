//! Error types for allocation, integrity checking, and persistence.
//!
//! Conflicts are deliberately not represented here: a vehicle bound to
//! more than one route is reported as data (status plus a
//! [`Conflict`](crate::models::Conflict) list) and remediation is the
//! caller's decision.

use thiserror::Error;

/// Input rows failed validation.
///
/// Fatal in strict mode: the run aborts with status `FAILED` and this
/// error's display string. In lenient mode offending rows are skipped
/// and recorded in the result metadata instead.
#[derive(Debug, Clone, Error)]
#[error("DataValidationError: {message}")]
pub struct DataValidationError {
    /// Description of every rejected row.
    pub message: String,
}

impl DataValidationError {
    /// Creates a validation error from a message.
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

/// The engine's reported unassigned sets disagree with the sets
/// recomputed from the assignment list.
///
/// Always fatal: a mismatch signals an engine defect and is never
/// silently corrected.
#[derive(Debug, Clone, Error)]
#[error("IntegrityError: {set} mismatch: engine reported [{reported}], recomputed [{recomputed}]")]
pub struct IntegrityError {
    /// Which set disagreed ("unassigned_routes" or "unassigned_vehicles").
    pub set: &'static str,
    /// The set the engine reported, comma-joined.
    pub reported: String,
    /// The independently recomputed set, comma-joined.
    pub recomputed: String,
}

impl IntegrityError {
    /// Creates an integrity error for a mismatched set.
    pub fn mismatch(set: &'static str, reported: &[String], recomputed: &[String]) -> Self {
        Self {
            set,
            reported: reported.join(","),
            recomputed: recomputed.join(","),
        }
    }
}

/// The history store could not be read or written.
///
/// Non-fatal by design: the store catches these internally, logs a
/// warning, and degrades to best-available data. Persistence failure
/// never invalidates an already-computed allocation.
#[derive(Debug, Error)]
pub enum PersistenceError {
    /// Underlying filesystem failure.
    #[error("history store I/O failure: {0}")]
    Io(#[from] std::io::Error),
    /// Record (de)serialization failure.
    #[error("history store serialization failure: {0}")]
    Serialization(#[from] serde_json::Error),
}
