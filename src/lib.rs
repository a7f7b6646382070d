//! `pos-import-recon` — bulk-import reconciliation engine for point-of-sale
//! data.
//!
//! Pure classification engine: takes a raw import payload plus a read-only
//! view of the persisted store, and reports which incoming records are new,
//! which collide with existing ones, and which are structurally invalid or
//! reference missing entities. Nothing is ever written; resolving or
//! merging conflicts belongs to the caller's review UI.

pub mod detect;
pub mod engine;
pub mod error;
pub mod fields;
pub mod model;
pub mod payload;
pub mod rules;
pub mod store;

pub use engine::detect_all_conflicts;
pub use error::ReconError;
pub use model::{
    Conflict, ConflictRecord, ConflictStats, ConflictSummary, DataType, MatchedBy,
    ValidationResult,
};
pub use payload::validate_data_type_availability;
pub use store::{ExistingStore, MemoryStore};
