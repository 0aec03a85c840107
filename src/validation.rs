//! Row-level input validation.
//!
//! Checks structural integrity of route and vehicle rows before
//! allocation. Detects:
//! - Missing required fields (route id, route service type, vehicle id)
//! - Duplicate IDs within a row set
//!
//! The engine decides what a finding means: strict mode aborts the
//! run, lenient mode skips the offending row.

use crate::models::{Route, Vehicle};
use std::collections::HashSet;

/// A problem with one input row.
#[derive(Debug, Clone, PartialEq)]
pub struct RowIssue {
    /// Zero-based index of the offending row in its input set.
    pub row: usize,
    /// Issue category.
    pub kind: RowIssueKind,
    /// Human-readable description.
    pub message: String,
}

/// Categories of row issues.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RowIssueKind {
    /// A required field is empty or absent.
    MissingField,
    /// Two rows in the same set share an ID.
    DuplicateId,
}

impl RowIssue {
    fn new(row: usize, kind: RowIssueKind, message: impl Into<String>) -> Self {
        Self {
            row,
            kind,
            message: message.into(),
        }
    }
}

/// Validates route rows.
///
/// Checks:
/// 1. Every route has a non-empty ID
/// 2. Every route has a non-empty service type
/// 3. No two routes share an ID (the later occurrence is flagged)
///
/// Returns every detected issue; an empty vector means the set is clean.
pub fn check_routes(routes: &[Route]) -> Vec<RowIssue> {
    let mut issues = Vec::new();
    let mut seen = HashSet::new();

    for (row, route) in routes.iter().enumerate() {
        if route.id.is_empty() {
            issues.push(RowIssue::new(
                row,
                RowIssueKind::MissingField,
                format!("route row {row} is missing an id"),
            ));
            continue;
        }
        if !seen.insert(route.id.as_str()) {
            issues.push(RowIssue::new(
                row,
                RowIssueKind::DuplicateId,
                format!("duplicate route id: {}", route.id),
            ));
            continue;
        }
        if route.service_type.is_empty() {
            issues.push(RowIssue::new(
                row,
                RowIssueKind::MissingField,
                format!("route '{}' is missing a service_type", route.id),
            ));
        }
    }

    issues
}

/// Validates vehicle rows.
///
/// Checks:
/// 1. Every vehicle has a non-empty ID
/// 2. No two vehicles share an ID (the later occurrence is flagged)
///
/// Class and status are typed enums, so malformed values cannot reach
/// this layer; the DSP tag may legitimately be empty.
pub fn check_vehicles(vehicles: &[Vehicle]) -> Vec<RowIssue> {
    let mut issues = Vec::new();
    let mut seen = HashSet::new();

    for (row, vehicle) in vehicles.iter().enumerate() {
        if vehicle.id.is_empty() {
            issues.push(RowIssue::new(
                row,
                RowIssueKind::MissingField,
                format!("vehicle row {row} is missing an id"),
            ));
            continue;
        }
        if !seen.insert(vehicle.id.as_str()) {
            issues.push(RowIssue::new(
                row,
                RowIssueKind::DuplicateId,
                format!("duplicate vehicle id: {}", vehicle.id),
            ));
        }
    }

    issues
}
