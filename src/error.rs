use crate::model::DataType;

/// Infrastructure failures surfaced by a reconciliation pass.
///
/// Data-quality findings (duplicates, validation failures, missing
/// references) are never errors; they come back as classified output.
/// These variants exist so a caller can tell "no conflicts found" apart
/// from "could not determine conflicts".
#[derive(Debug, thiserror::Error)]
pub enum ReconError {
    /// The existing-state store failed to read a section snapshot.
    #[error("store read failed for {data_type}: {message}")]
    Store { data_type: DataType, message: String },

    /// The pricing-tier lookup failed for one product.
    #[error("pricing tier lookup failed for product '{product_id}': {message}")]
    PricingLookup { product_id: String, message: String },
}
