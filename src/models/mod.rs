//! Allocation domain models.
//!
//! Core data types for one allocation cycle: the immutable input rows
//! ([`Route`], [`Vehicle`]) and the run outcome
//! ([`AllocationResult`], [`Assignment`], [`Conflict`]).
//!
//! Routes and vehicles are created fresh per run from the upstream
//! tabular feeds and discarded afterwards; results are read-only once
//! constructed.

mod allocation;
mod route;
mod vehicle;

pub use allocation::{AllocationResult, AllocationStatus, Assignment, Conflict};
pub use route::Route;
pub use vehicle::{OperationalStatus, Vehicle, VehicleClass};
