//! Type-specific conflict detection.
//!
//! Each incoming record runs through a strict priority pipeline; the first
//! rule that fires wins and a record never receives more than one
//! classification:
//!
//! 1. required fields → `ValidationFailed`
//! 2. identifier equals an existing id → `Duplicate { Uuid }`
//! 3. case-insensitive exact name match → `Duplicate { Name }`
//! 4. unresolved entity reference → `ReferenceMissing`
//! 5. clean, no output

use std::collections::{BTreeMap, BTreeSet};

use serde_json::Value;

use crate::fields::{has_field, id_of, name_key, ref_value};
use crate::model::{Conflict, ConflictRecord, DataType, MatchedBy};
use crate::rules::{rules_for, RefPath, TypeRules};

// ---------------------------------------------------------------------------
// Reference index
// ---------------------------------------------------------------------------

/// Known entity ids per data type, spanning the store snapshot and the
/// import batch. A reference resolves when its target id appears in either.
#[derive(Debug, Default)]
pub struct ReferenceIndex {
    ids: BTreeMap<DataType, BTreeSet<String>>,
}

impl ReferenceIndex {
    /// Collect ids from existing records and same-batch records for every
    /// data type present in either map.
    pub fn build(
        existing: &BTreeMap<DataType, Vec<Value>>,
        batch: &BTreeMap<DataType, Vec<Value>>,
    ) -> Self {
        let mut index = Self::default();
        for source in [existing, batch] {
            for (&data_type, records) in source {
                index.extend(data_type, records);
            }
        }
        index
    }

    fn extend(&mut self, data_type: DataType, records: &[Value]) {
        let Some(id_field) = rules_for(data_type).id_field else {
            return;
        };
        let ids = self.ids.entry(data_type).or_default();
        for record in records {
            if let Some(id) = id_of(record, id_field) {
                ids.insert(id);
            }
        }
    }

    pub fn contains(&self, data_type: DataType, id: &str) -> bool {
        self.ids
            .get(&data_type)
            .map(|ids| ids.contains(id))
            .unwrap_or(false)
    }
}

// ---------------------------------------------------------------------------
// Detection
// ---------------------------------------------------------------------------

/// Classify `incoming` records of one type against the `existing` snapshot.
///
/// Records are evaluated independently, in input order; clean records
/// produce no output. Bad incoming data never errors — malformed records
/// come back as `ValidationFailed` (a non-object entry cannot carry its
/// required fields).
pub fn detect_conflicts(
    data_type: DataType,
    incoming: &[Value],
    existing: &[Value],
    refs: &ReferenceIndex,
) -> Vec<ConflictRecord> {
    let rules = rules_for(data_type);

    // Identity indexes over the existing snapshot. Name keys map to the
    // matched record's id when it carries one; first occurrence wins.
    let mut existing_ids: BTreeSet<String> = BTreeSet::new();
    let mut existing_names: BTreeMap<String, Option<String>> = BTreeMap::new();
    if let Some(id_field) = rules.id_field {
        for record in existing {
            if let Some(id) = id_of(record, id_field) {
                existing_ids.insert(id);
            }
        }
    }
    if let Some(name_field) = rules.name_field {
        for record in existing {
            if let Some(key) = name_key(record, name_field) {
                existing_names
                    .entry(key)
                    .or_insert_with(|| rules.id_field.and_then(|f| id_of(record, f)));
            }
        }
    }

    let mut conflicts = Vec::new();
    for record in incoming {
        if let Some(conflict) = classify(record, rules, &existing_ids, &existing_names, refs) {
            conflicts.push(ConflictRecord {
                data_type,
                record: record.clone(),
                conflict,
            });
        }
    }
    conflicts
}

fn classify(
    record: &Value,
    rules: &TypeRules,
    existing_ids: &BTreeSet<String>,
    existing_names: &BTreeMap<String, Option<String>>,
    refs: &ReferenceIndex,
) -> Option<Conflict> {
    // 1. Structural validation first: an incomplete record cannot be
    //    meaningfully matched, so no further checks run.
    if rules.required.iter().any(|field| !has_field(record, field)) {
        return Some(Conflict::ValidationFailed);
    }

    // 2. Identity by identifier.
    if let Some(id_field) = rules.id_field {
        if let Some(id) = id_of(record, id_field) {
            if existing_ids.contains(&id) {
                return Some(Conflict::Duplicate {
                    matched_by: MatchedBy::Uuid,
                    existing_match_id: Some(id),
                });
            }
        }
    }

    // 3. Identity by name, case-insensitive exact.
    if let Some(name_field) = rules.name_field {
        if let Some(key) = name_key(record, name_field) {
            if let Some(existing_id) = existing_names.get(&key) {
                return Some(Conflict::Duplicate {
                    matched_by: MatchedBy::Name,
                    existing_match_id: existing_id.clone(),
                });
            }
        }
    }

    // 4. Referential integrity. Rules fire only for reference values the
    //    record actually carries.
    for rule in rules.references {
        for id in referenced_ids(record, rule.path) {
            if !refs.contains(rule.target, &id) {
                return Some(Conflict::ReferenceMissing);
            }
        }
    }

    None
}

fn referenced_ids(record: &Value, path: RefPath) -> Vec<String> {
    match path {
        RefPath::Field(field) => record.get(field).and_then(ref_value).into_iter().collect(),
        RefPath::ListField(list, field) => record
            .get(list)
            .and_then(Value::as_array)
            .map(|items| {
                items
                    .iter()
                    .filter_map(|item| item.get(field).and_then(ref_value))
                    .collect()
            })
            .unwrap_or_default(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn no_refs() -> ReferenceIndex {
        ReferenceIndex::default()
    }

    fn refs_with(data_type: DataType, records: Vec<Value>) -> ReferenceIndex {
        ReferenceIndex::build(
            &BTreeMap::from([(data_type, records)]),
            &BTreeMap::new(),
        )
    }

    #[test]
    fn uuid_match_wins_even_when_name_differs() {
        let incoming = vec![json!({"id": "prod-1", "name": "Product 1 Updated", "price": 15})];
        let existing = vec![json!({"id": "prod-1", "name": "Product 1", "price": 10})];
        let out = detect_conflicts(DataType::Products, &incoming, &existing, &no_refs());
        assert_eq!(out.len(), 1);
        assert_eq!(
            out[0].conflict,
            Conflict::Duplicate {
                matched_by: MatchedBy::Uuid,
                existing_match_id: Some("prod-1".into()),
            }
        );
    }

    #[test]
    fn name_match_when_id_matches_nothing() {
        let incoming = vec![
            json!({"name": "Product 2", "price": 25}),
            json!({"id": "prod-99", "name": "PRODUCT 2", "price": 25}),
        ];
        let existing = vec![json!({"id": "prod-2", "name": "Product 2", "price": 20})];
        let out = detect_conflicts(DataType::Products, &incoming, &existing, &no_refs());
        assert_eq!(out.len(), 2);
        for conflict in &out {
            assert_eq!(
                conflict.conflict,
                Conflict::Duplicate {
                    matched_by: MatchedBy::Name,
                    existing_match_id: Some("prod-2".into()),
                }
            );
        }
    }

    #[test]
    fn validation_takes_priority_over_identity() {
        // Would match by both id and name if it were structurally complete.
        let incoming = vec![json!({"id": "prod-1", "name": "Product 1"})]; // no price
        let existing = vec![json!({"id": "prod-1", "name": "Product 1", "price": 10})];
        let out = detect_conflicts(DataType::Products, &incoming, &existing, &no_refs());
        assert_eq!(out.len(), 1);
        assert_eq!(out[0].conflict, Conflict::ValidationFailed);
    }

    #[test]
    fn clean_record_produces_nothing() {
        let incoming = vec![json!({"name": "New Product", "price": 30})];
        let existing = vec![json!({"id": "prod-1", "name": "Product 1", "price": 10})];
        let out = detect_conflicts(DataType::Products, &incoming, &existing, &no_refs());
        assert!(out.is_empty());
    }

    #[test]
    fn stock_movement_with_unknown_product_is_reference_missing() {
        let incoming = vec![json!({
            "product_id": "non-existent",
            "movement_type": "in",
            "quantity": 10,
        })];
        let out = detect_conflicts(DataType::StockMovements, &incoming, &[], &no_refs());
        assert_eq!(out.len(), 1);
        assert_eq!(out[0].conflict, Conflict::ReferenceMissing);
    }

    #[test]
    fn reference_resolves_against_store_or_batch() {
        let movement = json!({"product_id": "p1", "movement_type": "out", "quantity": 3});

        let store_refs = refs_with(DataType::Products, vec![json!({"id": "p1", "name": "A"})]);
        assert!(detect_conflicts(DataType::StockMovements, &[movement.clone()], &[], &store_refs)
            .is_empty());

        let batch_refs = ReferenceIndex::build(
            &BTreeMap::new(),
            &BTreeMap::from([(
                DataType::Products,
                vec![json!({"id": "p1", "name": "A", "price": 5})],
            )]),
        );
        assert!(detect_conflicts(DataType::StockMovements, &[movement], &[], &batch_refs)
            .is_empty());
    }

    #[test]
    fn sale_line_items_are_checked_per_item() {
        let sale = json!({
            "id": "sale-1",
            "items": [
                {"product_id": "p1", "quantity": 1},
                {"product_id": "ghost", "quantity": 2},
            ],
        });
        let refs = refs_with(DataType::Products, vec![json!({"id": "p1"})]);
        let out = detect_conflicts(DataType::Sales, &[sale], &[], &refs);
        assert_eq!(out.len(), 1);
        assert_eq!(out[0].conflict, Conflict::ReferenceMissing);
    }

    #[test]
    fn product_category_reference_is_optional() {
        let without = json!({"name": "Loose", "price": 1});
        let with_bad = json!({"name": "Tied", "price": 1, "category_id": "missing"});
        let out = detect_conflicts(
            DataType::Products,
            &[without, with_bad],
            &[],
            &no_refs(),
        );
        assert_eq!(out.len(), 1);
        assert_eq!(out[0].conflict, Conflict::ReferenceMissing);
        assert_eq!(out[0].record["name"], "Tied");
    }

    #[test]
    fn non_object_entries_fail_validation() {
        let incoming = vec![json!("garbage"), json!(42), json!(null)];
        let out = detect_conflicts(DataType::Customers, &incoming, &[], &no_refs());
        assert_eq!(out.len(), 3);
        assert!(out
            .iter()
            .all(|c| c.conflict == Conflict::ValidationFailed));
    }

    #[test]
    fn output_preserves_input_order_and_original_records() {
        let incoming = vec![
            json!({"name": "", "price": 1}),
            json!({"name": "Fine", "price": 2}),
            json!({"name": "Also Bad"}),
        ];
        let out = detect_conflicts(DataType::Products, &incoming, &[], &no_refs());
        assert_eq!(out.len(), 2);
        assert_eq!(out[0].record, incoming[0]);
        assert_eq!(out[1].record, incoming[2]);
    }
}
