//! Declarative per-type classification rules.
//!
//! Required fields, identity fields and reference rules differ per data
//! type, but the detector pipeline is uniform; everything type-specific is
//! a row in this table.

use crate::model::DataType;

/// Where a reference id lives on a record.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RefPath {
    /// A top-level field holding the referenced id.
    Field(&'static str),
    /// A field on each element of a top-level list (sale line items).
    ListField(&'static str, &'static str),
}

/// Ids found at `path` must exist among `target` records, either in the
/// store snapshot or in the same import batch.
#[derive(Debug, Clone, Copy)]
pub struct RefRule {
    pub path: RefPath,
    pub target: DataType,
}

/// Validation, identity and reference configuration for one data type.
#[derive(Debug, Clone, Copy)]
pub struct TypeRules {
    pub required: &'static [&'static str],
    pub id_field: Option<&'static str>,
    pub name_field: Option<&'static str>,
    pub references: &'static [RefRule],
}

static PRODUCTS: TypeRules = TypeRules {
    required: &["name", "price"],
    id_field: Some("id"),
    name_field: Some("name"),
    // Checked only when the record carries a category_id.
    references: &[RefRule {
        path: RefPath::Field("category_id"),
        target: DataType::Categories,
    }],
};

static CUSTOMERS: TypeRules = TypeRules {
    required: &["name"],
    id_field: Some("id"),
    name_field: Some("name"),
    references: &[],
};

static CATEGORIES: TypeRules = TypeRules {
    required: &["name"],
    id_field: Some("id"),
    name_field: Some("name"),
    references: &[],
};

static SALES: TypeRules = TypeRules {
    required: &["items"],
    id_field: Some("id"),
    name_field: None,
    references: &[RefRule {
        path: RefPath::ListField("items", "product_id"),
        target: DataType::Products,
    }],
};

static EXPENSES: TypeRules = TypeRules {
    required: &["description", "amount"],
    id_field: Some("id"),
    name_field: None,
    references: &[],
};

static STOCK_MOVEMENTS: TypeRules = TypeRules {
    required: &["product_id", "movement_type", "quantity"],
    id_field: Some("id"),
    name_field: None,
    references: &[RefRule {
        path: RefPath::Field("product_id"),
        target: DataType::Products,
    }],
};

static BULK_PRICING: TypeRules = TypeRules {
    required: &["product_id", "min_quantity", "price"],
    id_field: Some("id"),
    name_field: None,
    references: &[RefRule {
        path: RefPath::Field("product_id"),
        target: DataType::Products,
    }],
};

/// The rule row for one data type.
pub fn rules_for(data_type: DataType) -> &'static TypeRules {
    match data_type {
        DataType::Products => &PRODUCTS,
        DataType::Customers => &CUSTOMERS,
        DataType::Categories => &CATEGORIES,
        DataType::Sales => &SALES,
        DataType::Expenses => &EXPENSES,
        DataType::StockMovements => &STOCK_MOVEMENTS,
        DataType::BulkPricing => &BULK_PRICING,
    }
}
