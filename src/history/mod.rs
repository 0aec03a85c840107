//! Persistent, rotating run history.
//!
//! Every allocation run is saved as one self-describing record;
//! rotation bounds the store by entry count and age. The store is an
//! injected dependency (one per engine at the composition root), never
//! a process-wide singleton.
//!
//! # Durability
//!
//! Saves replace the backing JSON file via temporary write plus atomic
//! rename. Failures degrade to warnings: history is an audit trail,
//! not a precondition for the allocation that produced it.

mod record;
mod stats;
mod store;

pub use record::HistoryEntry;
pub use stats::HistoryStatistics;
pub use store::{
    AllocationHistoryStore, HistoryQuery, SaveReceipt, DEFAULT_MAX_ENTRIES, DEFAULT_RETENTION_DAYS,
};
