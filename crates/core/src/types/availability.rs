//! Value types produced by the dynamic product data engine.
//!
//! These are the per-product aggregates the engine computes for a batch:
//! effective price, available stock split across warehouses, and the
//! predicted delivery date. All of them are derived, read-only values
//! recomputed on demand; they are never persisted beyond the cache TTL.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::id::WarehouseId;

/// A resolved price for one product.
///
/// `effective` equals `base` unless a buyer-organization override was found,
/// in which case `effective` carries the override and `has_override` is set.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PriceRecord {
    /// Catalog base price.
    pub base: Decimal,
    /// Price the buyer actually pays.
    pub effective: Decimal,
    /// Whether `effective` comes from an organization-specific override.
    pub has_override: bool,
}

impl PriceRecord {
    /// A plain catalog price with no override applied.
    #[must_use]
    pub const fn base_only(base: Decimal) -> Self {
        Self {
            base,
            effective: base,
            has_override: false,
        }
    }

    /// A price superseded by an organization override.
    #[must_use]
    pub const fn with_override(base: Decimal, override_price: Decimal) -> Self {
        Self {
            base,
            effective: override_price,
            has_override: true,
        }
    }
}

/// A single warehouse's contribution to a product's available stock.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WarehouseAllocation {
    pub warehouse_id: WarehouseId,
    pub warehouse_name: String,
    /// On-hand minus reserved; always positive (zero rows are excluded).
    pub available: i64,
}

/// Available stock for one product across the warehouses of a city.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct StockRecord {
    /// Sum of all allocation quantities.
    pub total_available: i64,
    pub allocations: Vec<WarehouseAllocation>,
}

impl StockRecord {
    /// Whether any warehouse in the city can supply this product.
    #[must_use]
    pub const fn in_stock(&self) -> bool {
        self.total_available > 0
    }
}

/// A predicted delivery date with its display text.
///
/// `date` is `None` when no schedule resolved within the lookahead horizon;
/// `text` is always populated with a human-readable fallback.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeliveryRecord {
    pub date: Option<NaiveDate>,
    pub text: String,
}

impl DeliveryRecord {
    /// Fallback when no schedule could be resolved.
    #[must_use]
    pub fn inquire() -> Self {
        Self {
            date: None,
            text: "inquire".to_owned(),
        }
    }

    /// Fallback for out-of-stock products before a concrete date is found.
    #[must_use]
    pub fn on_order() -> Self {
        Self {
            date: None,
            text: "on order".to_owned(),
        }
    }
}

impl Default for DeliveryRecord {
    fn default() -> Self {
        Self::inquire()
    }
}

/// The complete dynamic data aggregate for one product.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AggregatedProductEntry {
    pub price: Option<PriceRecord>,
    pub stock: StockRecord,
    pub delivery: DeliveryRecord,
    /// Always `stock.total_available > 0`.
    pub available: bool,
}

impl AggregatedProductEntry {
    /// Assemble an entry, deriving `available` from the stock record.
    #[must_use]
    pub fn new(price: Option<PriceRecord>, stock: StockRecord, delivery: DeliveryRecord) -> Self {
        let available = stock.in_stock();
        Self {
            price,
            stock,
            delivery,
            available,
        }
    }
}
