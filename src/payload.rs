//! Payload inspection: which data-type sections of a raw import are usable.

use std::collections::{BTreeMap, BTreeSet};

use serde_json::Value;
use tracing::warn;

use crate::model::{DataType, ValidationResult};

/// Inspect a raw import payload and report which of the seven known
/// data-type sections are usable.
///
/// The canonical payload shape, shared with
/// [`detect_all_conflicts`](crate::engine::detect_all_conflicts), is a
/// single JSON object with the data-type arrays as top-level keys:
/// `{"products": [...], "stockMovements": [...]}`. There is no container
/// key.
///
/// Per key: a list is available (with its length recorded), a present
/// non-list value is corrupted, an absent key is simply not reported.
/// A corrupted section never blocks the others. Pure function; no store
/// access.
pub fn validate_data_type_availability(payload: &Value) -> ValidationResult {
    let mut available_types = BTreeSet::new();
    let mut detailed_counts = BTreeMap::new();
    let mut corrupted_sections = BTreeSet::new();

    if let Some(sections) = payload.as_object() {
        for data_type in DataType::ALL {
            let Some(section) = sections.get(data_type.key()) else {
                continue;
            };
            match section.as_array() {
                Some(records) => {
                    available_types.insert(data_type);
                    detailed_counts.insert(data_type, records.len());
                }
                None => {
                    warn!(%data_type, "payload section is not a list, reporting as corrupted");
                    corrupted_sections.insert(data_type);
                }
            }
        }
    }

    let is_valid = !available_types.is_empty();
    let message = if is_valid {
        None
    } else {
        Some("Import payload does not contain any valid data".to_string())
    };

    ValidationResult {
        is_valid,
        available_types,
        detailed_counts,
        corrupted_sections,
        message,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn lists_are_available_with_counts() {
        let payload = json!({
            "products": [{"name": "A"}, {"name": "B"}],
            "customers": [],
        });
        let result = validate_data_type_availability(&payload);
        assert!(result.is_valid);
        assert!(result.available_types.contains(&DataType::Products));
        assert!(result.available_types.contains(&DataType::Customers));
        assert_eq!(result.detailed_counts[&DataType::Products], 2);
        assert_eq!(result.detailed_counts[&DataType::Customers], 0);
        assert!(result.corrupted_sections.is_empty());
        assert!(result.message.is_none());
    }

    #[test]
    fn non_list_section_is_corrupted_but_does_not_block_siblings() {
        let payload = json!({
            "products": "oops",
            "sales": [{"id": "s1", "items": [{"product_id": "p1"}]}],
            "expenses": null,
        });
        let result = validate_data_type_availability(&payload);
        assert!(result.is_valid);
        assert_eq!(
            result.available_types.iter().collect::<Vec<_>>(),
            vec![&DataType::Sales]
        );
        assert!(result.corrupted_sections.contains(&DataType::Products));
        assert!(result.corrupted_sections.contains(&DataType::Expenses));
        // Never both available and corrupted.
        for t in &result.corrupted_sections {
            assert!(!result.available_types.contains(t));
        }
    }

    #[test]
    fn absent_keys_are_not_reported() {
        let result = validate_data_type_availability(&json!({"products": []}));
        assert!(!result.detailed_counts.contains_key(&DataType::Sales));
        assert!(!result.corrupted_sections.contains(&DataType::Sales));
    }

    #[test]
    fn empty_payload_is_invalid_with_message() {
        let result = validate_data_type_availability(&json!({}));
        assert!(!result.is_valid);
        assert!(result.available_types.is_empty());
        assert!(result
            .message
            .as_deref()
            .unwrap()
            .contains("does not contain any valid data"));
    }

    #[test]
    fn non_object_payload_is_invalid() {
        let result = validate_data_type_availability(&json!([1, 2, 3]));
        assert!(!result.is_valid);
        assert!(result.available_types.is_empty());
        assert!(result.corrupted_sections.is_empty());
    }
}
