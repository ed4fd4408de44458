//! Price resolution: base prices with buyer-organization overrides.
//!
//! Anonymous callers get currently-valid base prices only. Authenticated
//! buyers additionally pull their organization's override prices; the
//! override wins whenever one exists. Products with no base price row are
//! omitted, which callers treat as "price unavailable".

use std::collections::HashMap;

use rust_decimal::Decimal;

use basalt_core::{BuyerId, PriceRecord, ProductId};

use crate::models::catalog::{BasePriceRow, OverridePriceRow};

use super::source::{DataSourceError, ProductDataSource};

/// Resolve effective prices for the batch.
///
/// # Errors
///
/// Returns `DataSourceError` if the pricing store cannot be queried.
pub async fn resolve_prices<S: ProductDataSource>(
    source: &S,
    product_ids: &[ProductId],
    buyer_id: Option<BuyerId>,
) -> Result<HashMap<ProductId, PriceRecord>, DataSourceError> {
    let base_rows = source.base_prices(product_ids).await?;

    let override_rows = match buyer_id {
        Some(buyer) => source.override_prices(product_ids, buyer).await?,
        None => Vec::new(),
    };

    Ok(merge_price_rows(base_rows, &override_rows))
}

/// Fold price rows into one record per product.
///
/// Rows arrive ordered most-recent `valid_from` first, so the first row seen
/// per product wins. An override without a base price leaves the product
/// absent from the result.
fn merge_price_rows(
    base_rows: Vec<BasePriceRow>,
    override_rows: &[OverridePriceRow],
) -> HashMap<ProductId, PriceRecord> {
    let mut override_by_product: HashMap<ProductId, Decimal> = HashMap::new();
    for row in override_rows {
        override_by_product.entry(row.product_id).or_insert(row.price);
    }

    let mut prices = HashMap::new();
    for row in base_rows {
        prices.entry(row.product_id).or_insert_with(|| {
            match override_by_product.get(&row.product_id) {
                Some(&override_price) => PriceRecord::with_override(row.price, override_price),
                None => PriceRecord::base_only(row.price),
            }
        });
    }

    prices
}
