//! Allocation engine, conflict validation, and integrity tracking.
//!
//! # Flow
//!
//! [`AllocationEngine::allocate`] produces an
//! [`AllocationResult`](crate::models::AllocationResult); the
//! [`DuplicateConflictValidator`] inspects it for multiply-bound
//! vehicles; the [`UnassignedTracker`] independently recomputes the
//! unassigned sets as an integrity check.
//! [`AllocationEngine::allocate_checked`] runs all three in order.
//!
//! The engine is a greedy, priority-driven, lowest-eligible-vehicle
//! heuristic. It is deterministic by construction: identical ordered
//! inputs (with pinned request identity) produce identical results.

mod allocator;
mod conflicts;
mod tracker;

pub use allocator::{AllocationEngine, AllocationRequest, ValidationMode};
pub use conflicts::DuplicateConflictValidator;
pub use tracker::UnassignedTracker;
