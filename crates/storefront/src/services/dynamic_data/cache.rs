//! Short-TTL cache for assembled batches.
//!
//! Batches are keyed by a fingerprint of the normalized request, so identical
//! product sets in different input order share a cache line. There is no
//! invalidation hook for underlying price/stock/schedule changes; staleness
//! is bounded by the TTL and the surrounding UI re-polls.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use moka::future::Cache;
use sha2::{Digest, Sha256};

use basalt_core::{AggregatedProductEntry, BuyerId, CityId, ProductId};

/// An assembled batch result, shared between the cache and callers.
pub type AggregatedBatch = Arc<HashMap<ProductId, AggregatedProductEntry>>;

/// How long a cached batch stays valid.
const CACHE_TTL: Duration = Duration::from_secs(300);

/// Upper bound on cached batches; oldest entries are trimmed beyond this.
const CACHE_CAPACITY: u64 = 1024;

/// Cache seam for the orchestrator, so it is testable without a live backend.
#[allow(async_fn_in_trait)]
pub trait AggregationCache {
    async fn get(&self, fingerprint: &str) -> Option<AggregatedBatch>;
    async fn insert(&self, fingerprint: String, batch: AggregatedBatch);
}

/// Deterministic cache key for a batch request.
///
/// Product ids are sorted before hashing, so the fingerprint is independent
/// of input order. Anonymous requests hash a buyer id of 0.
#[must_use]
pub fn fingerprint(
    product_ids: &[ProductId],
    city_id: CityId,
    buyer_id: Option<BuyerId>,
) -> String {
    let mut sorted = product_ids.to_vec();
    sorted.sort_unstable();

    let mut hasher = Sha256::new();
    for id in &sorted {
        hasher.update(id.as_i32().to_le_bytes());
    }
    hasher.update(city_id.as_i32().to_le_bytes());
    hasher.update(buyer_id.map_or(0i32, |buyer| buyer.as_i32()).to_le_bytes());

    format!("batch:{:x}", hasher.finalize())
}

/// Production cache backed by `moka` (5-minute TTL, capacity-bounded).
#[derive(Clone)]
pub struct MokaAggregationCache {
    cache: Cache<String, AggregatedBatch>,
}

impl MokaAggregationCache {
    /// Create a cache with the default TTL.
    #[must_use]
    pub fn new() -> Self {
        Self::with_ttl(CACHE_TTL)
    }

    /// Create a cache with a custom TTL.
    #[must_use]
    pub fn with_ttl(ttl: Duration) -> Self {
        let cache = Cache::builder()
            .max_capacity(CACHE_CAPACITY)
            .time_to_live(ttl)
            .build();

        Self { cache }
    }
}

impl Default for MokaAggregationCache {
    fn default() -> Self {
        Self::new()
    }
}

impl AggregationCache for MokaAggregationCache {
    async fn get(&self, fingerprint: &str) -> Option<AggregatedBatch> {
        self.cache.get(fingerprint).await
    }

    async fn insert(&self, fingerprint: String, batch: AggregatedBatch) {
        self.cache.insert(fingerprint, batch).await;
    }
}
