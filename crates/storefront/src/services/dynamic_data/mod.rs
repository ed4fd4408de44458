//! Dynamic product data engine.
//!
//! For a batch of product ids, a city, and an optional authenticated buyer,
//! computes per product the effective price, the available stock split
//! across the city's warehouses, and a predicted delivery date, then caches
//! the composite result under a fingerprint of the normalized request.
//!
//! Product listing pages hit this with hundreds of SKUs at once, so each
//! resolver issues one batched query per data source and the batch size is
//! hard-capped.

pub mod cache;
pub mod delivery;
pub mod price;
pub mod source;
pub mod stock;

use std::collections::{BTreeSet, HashMap};
use std::sync::Arc;

use thiserror::Error;

use basalt_core::{AggregatedProductEntry, BuyerId, CityId, ProductId};

pub use cache::{AggregatedBatch, AggregationCache, MokaAggregationCache, fingerprint};
pub use source::{DataSourceError, ProductDataSource};

/// Hard cap on distinct product ids per batch.
pub const MAX_BATCH_SIZE: usize = 1000;

/// Errors surfaced by the engine.
#[derive(Debug, Error)]
pub enum DynamicDataError {
    /// The request failed validation before any store was touched.
    #[error("invalid batch: {0}")]
    InvalidBatch(String),

    /// An underlying store was unreachable or a query failed. The batch is
    /// not cached.
    #[error(transparent)]
    Source(#[from] DataSourceError),
}

/// Orchestrates the three resolvers over a shared data source and cache.
///
/// Price and stock resolution run concurrently; the delivery scheduler
/// consumes the stock map, so it runs after. Concurrent calls with the same
/// fingerprint may both miss and both recompute; recomputation is idempotent
/// over read-only queries, so the last writer simply overwrites an
/// equivalent value.
pub struct DynamicDataService<S, C> {
    source: S,
    cache: C,
}

impl<S: ProductDataSource, C: AggregationCache> DynamicDataService<S, C> {
    /// Create an engine over the given data source and cache.
    pub const fn new(source: S, cache: C) -> Self {
        Self { source, cache }
    }

    /// Compute (or fetch from cache) the dynamic data for a batch.
    ///
    /// Input ids are filtered to positive values and deduplicated. Every
    /// surviving id gets an entry in the result, defaulting to zero stock,
    /// no price, and "inquire" delivery when a resolver has no row for it.
    ///
    /// # Errors
    ///
    /// Returns `DynamicDataError::InvalidBatch` when the filtered set
    /// exceeds [`MAX_BATCH_SIZE`], and `DynamicDataError::Source` when any
    /// resolver fails; a failed batch is never cached.
    pub async fn get_batch(
        &self,
        product_ids: &[i32],
        city_id: CityId,
        buyer_id: Option<BuyerId>,
    ) -> Result<AggregatedBatch, DynamicDataError> {
        let ids = normalize_batch(product_ids)?;
        if ids.is_empty() {
            return Ok(Arc::new(HashMap::new()));
        }

        let key = fingerprint(&ids, city_id, buyer_id);
        if let Some(batch) = self.cache.get(&key).await {
            tracing::debug!(batch_size = ids.len(), "cache hit for product batch");
            return Ok(batch);
        }

        let (mut prices, mut stocks) = tokio::try_join!(
            price::resolve_prices(&self.source, &ids, buyer_id),
            stock::resolve_stock(&self.source, &ids, city_id),
        )?;

        // The scheduler consumes the stock map, so it cannot run concurrently
        // with stock resolution.
        let mut deliveries =
            delivery::resolve_delivery(&self.source, &ids, city_id, &stocks).await?;

        let mut entries = HashMap::with_capacity(ids.len());
        for id in ids {
            entries.insert(
                id,
                AggregatedProductEntry::new(
                    prices.remove(&id),
                    stocks.remove(&id).unwrap_or_default(),
                    deliveries.remove(&id).unwrap_or_default(),
                ),
            );
        }

        let batch = Arc::new(entries);
        self.cache.insert(key, Arc::clone(&batch)).await;

        Ok(batch)
    }
}

/// Filter to positive ids, deduplicate, and enforce the batch cap.
///
/// The returned ids are sorted, which the fingerprint relies on.
fn normalize_batch(product_ids: &[i32]) -> Result<Vec<ProductId>, DynamicDataError> {
    let unique: BTreeSet<ProductId> = product_ids
        .iter()
        .filter(|&&id| id > 0)
        .map(|&id| ProductId::new(id))
        .collect();

    if unique.len() > MAX_BATCH_SIZE {
        return Err(DynamicDataError::InvalidBatch(format!(
            "too many products in request ({} > {MAX_BATCH_SIZE})",
            unique.len()
        )));
    }

    Ok(unique.into_iter().collect())
}
