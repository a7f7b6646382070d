use std::collections::{BTreeMap, BTreeSet};

use serde::Serialize;
use serde_json::Value;

// ---------------------------------------------------------------------------
// Data-type universe
// ---------------------------------------------------------------------------

/// One of the seven record categories in the import domain.
///
/// The set is closed: both output structures always carry exactly these
/// seven keys, even for types that contributed nothing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub enum DataType {
    #[serde(rename = "products")]
    Products,
    #[serde(rename = "customers")]
    Customers,
    #[serde(rename = "categories")]
    Categories,
    #[serde(rename = "sales")]
    Sales,
    #[serde(rename = "expenses")]
    Expenses,
    #[serde(rename = "stockMovements")]
    StockMovements,
    #[serde(rename = "bulkPricing")]
    BulkPricing,
}

impl DataType {
    /// The full universe, in the order sections are reconciled and reported.
    pub const ALL: [DataType; 7] = [
        Self::Products,
        Self::Customers,
        Self::Categories,
        Self::Sales,
        Self::Expenses,
        Self::StockMovements,
        Self::BulkPricing,
    ];

    /// Canonical payload key for this type.
    pub fn key(&self) -> &'static str {
        match self {
            Self::Products => "products",
            Self::Customers => "customers",
            Self::Categories => "categories",
            Self::Sales => "sales",
            Self::Expenses => "expenses",
            Self::StockMovements => "stockMovements",
            Self::BulkPricing => "bulkPricing",
        }
    }
}

impl std::fmt::Display for DataType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.key())
    }
}

// ---------------------------------------------------------------------------
// Classification
// ---------------------------------------------------------------------------

/// Identity strategy that produced a duplicate classification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum MatchedBy {
    Uuid,
    Name,
}

/// Classification outcome for one incoming record.
///
/// `matched_by` lives inside `Duplicate`, so a record can never carry a
/// match strategy without being a duplicate.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "conflict_type", rename_all = "snake_case")]
pub enum Conflict {
    Duplicate {
        matched_by: MatchedBy,
        #[serde(skip_serializing_if = "Option::is_none")]
        existing_match_id: Option<String>,
    },
    ValidationFailed,
    ReferenceMissing,
}

/// One incoming record paired with its classification.
///
/// Created only by the detector; `record` is the incoming payload object,
/// verbatim.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ConflictRecord {
    pub data_type: DataType,
    pub record: Value,
    #[serde(flatten)]
    pub conflict: Conflict,
}

// ---------------------------------------------------------------------------
// Payload inspection output
// ---------------------------------------------------------------------------

/// Which sections of a raw import payload are usable.
///
/// A type appears in at most one of `available_types` / `corrupted_sections`;
/// keys entirely absent from the payload appear in neither.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ValidationResult {
    pub is_valid: bool,
    pub available_types: BTreeSet<DataType>,
    pub detailed_counts: BTreeMap<DataType, usize>,
    pub corrupted_sections: BTreeSet<DataType>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

// ---------------------------------------------------------------------------
// Summary output
// ---------------------------------------------------------------------------

/// Per-type conflict counts. `total` is the sum of the three kinds.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct ConflictStats {
    pub total: usize,
    pub duplicate: usize,
    pub validation_failed: usize,
    pub reference_missing: usize,
}

/// Aggregated result of a full reconciliation pass.
///
/// Both maps always contain all seven [`DataType`] keys;
/// `total_conflicts` equals the summed lengths of `conflicts_by_type`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ConflictSummary {
    pub has_conflicts: bool,
    pub total_conflicts: usize,
    pub conflicts_by_type: BTreeMap<DataType, Vec<ConflictRecord>>,
    pub conflict_statistics: BTreeMap<DataType, ConflictStats>,
}
