//! Conflict aggregation: full-payload reconciliation.

use std::collections::{BTreeMap, BTreeSet};

use serde_json::Value;
use tracing::{debug, warn};

use crate::detect::{detect_conflicts, ReferenceIndex};
use crate::error::ReconError;
use crate::fields::ref_value;
use crate::model::{Conflict, ConflictStats, ConflictSummary, DataType};
use crate::payload::validate_data_type_availability;
use crate::rules::{rules_for, RefPath};
use crate::store::{fetch_all, ExistingStore};

/// Reconcile a full import payload against the store.
///
/// Expects the canonical payload shape documented on
/// [`validate_data_type_availability`]: data-type arrays as top-level keys.
/// Corrupted sections contribute zero conflicts and never block their
/// siblings. Both output maps always carry all seven data types.
///
/// Reads the store snapshot fresh on every call and writes nothing;
/// repeated calls against an unchanged snapshot and payload yield
/// structurally identical output. Loader failures propagate as
/// [`ReconError`] so the caller can tell "no conflicts" apart from
/// "could not determine conflicts".
pub async fn detect_all_conflicts(
    store: &dyn ExistingStore,
    payload: &Value,
) -> Result<ConflictSummary, ReconError> {
    let availability = validate_data_type_availability(payload);
    for data_type in &availability.corrupted_sections {
        warn!(%data_type, "corrupted payload section contributes no conflicts");
    }

    // Incoming sections, keyed in universe order.
    let mut batch: BTreeMap<DataType, Vec<Value>> = BTreeMap::new();
    for data_type in DataType::ALL {
        if !availability.available_types.contains(&data_type) {
            continue;
        }
        if let Some(records) = payload.get(data_type.key()).and_then(Value::as_array) {
            batch.insert(data_type, records.clone());
        }
    }

    // Snapshots needed: every imported type plus every type its references
    // point at (stock movements need products even when no products section
    // is being imported).
    let mut needed: BTreeSet<DataType> = batch.keys().copied().collect();
    for data_type in batch.keys() {
        for rule in rules_for(*data_type).references {
            needed.insert(rule.target);
        }
    }

    let mut existing: BTreeMap<DataType, Vec<Value>> = BTreeMap::new();
    for &data_type in &needed {
        let records = if data_type == DataType::BulkPricing {
            fetch_tiers_for_batch(store, batch.get(&DataType::BulkPricing)).await?
        } else {
            fetch_all(store, data_type).await?
        };
        debug!(%data_type, existing = records.len(), "loaded store snapshot");
        existing.insert(data_type, records);
    }

    let refs = ReferenceIndex::build(&existing, &batch);

    // Both maps carry all seven keys so empty payloads still report the
    // full universe.
    let mut conflicts_by_type = BTreeMap::new();
    for data_type in DataType::ALL {
        let found = match batch.get(&data_type) {
            Some(incoming) => {
                let snapshot = existing
                    .get(&data_type)
                    .map(Vec::as_slice)
                    .unwrap_or(&[]);
                let found = detect_conflicts(data_type, incoming, snapshot, &refs);
                debug!(
                    %data_type,
                    incoming = incoming.len(),
                    conflicts = found.len(),
                    "section reconciled"
                );
                found
            }
            None => Vec::new(),
        };
        conflicts_by_type.insert(data_type, found);
    }

    let mut conflict_statistics = BTreeMap::new();
    let mut total_conflicts = 0;
    for data_type in DataType::ALL {
        let records = &conflicts_by_type[&data_type];
        let mut stats = ConflictStats::default();
        for record in records {
            match record.conflict {
                Conflict::Duplicate { .. } => stats.duplicate += 1,
                Conflict::ValidationFailed => stats.validation_failed += 1,
                Conflict::ReferenceMissing => stats.reference_missing += 1,
            }
        }
        stats.total = records.len();
        total_conflicts += stats.total;
        conflict_statistics.insert(data_type, stats);
    }

    Ok(ConflictSummary {
        has_conflicts: total_conflicts > 0,
        total_conflicts,
        conflicts_by_type,
        conflict_statistics,
    })
}

/// Assemble the existing bulk-pricing snapshot from the per-product tier
/// lookup, covering every product the incoming tiers reference.
async fn fetch_tiers_for_batch(
    store: &dyn ExistingStore,
    incoming: Option<&Vec<Value>>,
) -> Result<Vec<Value>, ReconError> {
    let Some(incoming) = incoming else {
        return Ok(Vec::new());
    };

    let mut product_ids = BTreeSet::new();
    for rule in rules_for(DataType::BulkPricing).references {
        if let RefPath::Field(field) = rule.path {
            for record in incoming {
                if let Some(id) = record.get(field).and_then(ref_value) {
                    product_ids.insert(id);
                }
            }
        }
    }

    let mut tiers = Vec::new();
    for product_id in product_ids {
        tiers.extend(store.pricing_tiers_for_product(&product_id).await?);
    }
    Ok(tiers)
}
