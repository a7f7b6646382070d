//! Existing-state loader boundary.
//!
//! The engine never talks to a database directly; it reads persisted
//! records through [`ExistingStore`] and treats the result as an immutable
//! snapshot for the duration of one pass. A store mutation concurrent with
//! a pass may yield a stale comparison; that is an accepted limitation.

use std::collections::BTreeMap;

use async_trait::async_trait;
use serde_json::Value;

use crate::error::ReconError;
use crate::fields::ref_value;
use crate::model::DataType;

/// Page size used by [`fetch_all`] when draining a section.
pub const PAGE_SIZE: usize = 500;

/// Read-only access to the persisted records an import is reconciled
/// against.
#[async_trait]
pub trait ExistingStore: Send + Sync {
    /// One page of persisted records of `data_type`, starting at `offset`.
    ///
    /// Returning fewer than `limit` records marks the final page.
    async fn fetch_page(
        &self,
        data_type: DataType,
        offset: usize,
        limit: usize,
    ) -> Result<Vec<Value>, ReconError>;

    /// Existing bulk-pricing tiers for one product.
    async fn pricing_tiers_for_product(&self, product_id: &str)
        -> Result<Vec<Value>, ReconError>;
}

/// Drain every page of `data_type` from the store.
///
/// High-volume sections (sales, expenses, stock movements) may come back
/// paginated; callers see one flat snapshot either way.
pub async fn fetch_all(
    store: &dyn ExistingStore,
    data_type: DataType,
) -> Result<Vec<Value>, ReconError> {
    let mut records = Vec::new();
    let mut offset = 0;
    loop {
        let page = store.fetch_page(data_type, offset, PAGE_SIZE).await?;
        let page_len = page.len();
        records.extend(page);
        if page_len < PAGE_SIZE {
            break;
        }
        offset += page_len;
    }
    Ok(records)
}

// ---------------------------------------------------------------------------
// In-memory store
// ---------------------------------------------------------------------------

/// In-memory [`ExistingStore`], used by the integration tests and by
/// embedders for dry runs against a captured snapshot.
#[derive(Debug, Default)]
pub struct MemoryStore {
    records: BTreeMap<DataType, Vec<Value>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the snapshot for one data type.
    pub fn insert(&mut self, data_type: DataType, records: Vec<Value>) {
        self.records.insert(data_type, records);
    }

    fn section(&self, data_type: DataType) -> &[Value] {
        self.records
            .get(&data_type)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }
}

#[async_trait]
impl ExistingStore for MemoryStore {
    async fn fetch_page(
        &self,
        data_type: DataType,
        offset: usize,
        limit: usize,
    ) -> Result<Vec<Value>, ReconError> {
        Ok(self
            .section(data_type)
            .iter()
            .skip(offset)
            .take(limit)
            .cloned()
            .collect())
    }

    async fn pricing_tiers_for_product(
        &self,
        product_id: &str,
    ) -> Result<Vec<Value>, ReconError> {
        Ok(self
            .section(DataType::BulkPricing)
            .iter()
            .filter(|tier| {
                tier.get("product_id")
                    .and_then(ref_value)
                    .is_some_and(|id| id == product_id)
            })
            .cloned()
            .collect())
    }
}
