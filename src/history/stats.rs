//! Aggregate statistics over the stored run history.
//!
//! # Metrics
//!
//! | Metric | Definition |
//! |--------|-----------|
//! | Total Allocations | Number of stored runs |
//! | Success Rate | Percent of runs that completed (conflicted or not) |
//! | Routes Allocated | Sum of per-run allocated counts |
//! | Vehicles Allocated | Sum of per-run bound-vehicle counts |

use super::HistoryEntry;

/// Aggregate figures over a set of history entries.
#[derive(Debug, Clone, PartialEq)]
pub struct HistoryStatistics {
    /// Number of stored runs.
    pub total_allocations: usize,
    /// Percent of runs with a successful status (0-100). `COMPLETED`
    /// and `COMPLETED_WITH_CONFLICTS` both count as success.
    pub success_rate: f64,
    /// Routes filled across all stored runs.
    pub total_routes_allocated: usize,
    /// Vehicles bound across all stored runs.
    pub total_vehicles_allocated: usize,
}

impl HistoryStatistics {
    /// Computes statistics over the given entries.
    ///
    /// An empty history reports a success rate of 100: no run has
    /// failed.
    pub fn calculate(entries: &[HistoryEntry]) -> Self {
        let total = entries.len();
        let successes = entries.iter().filter(|e| e.status.is_success()).count();
        let success_rate = if total == 0 {
            100.0
        } else {
            successes as f64 / total as f64 * 100.0
        };

        // Each assignment binds exactly one vehicle, so the route and
        // vehicle totals are both sums of allocated_count.
        let total_routes_allocated = entries.iter().map(|e| e.allocated_count).sum();
        let total_vehicles_allocated = total_routes_allocated;

        Self {
            total_allocations: total,
            success_rate,
            total_routes_allocated,
            total_vehicles_allocated,
        }
    }
}
