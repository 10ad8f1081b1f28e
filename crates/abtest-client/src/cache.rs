//! Baseline cache using moka
//!
//! Baselines change rarely and are looked up every time a control is
//! designated, so lookups are memoised per (persona, stage, test type).
//! "No baseline" is cached too.

use crate::api::{BaselineKey, ContentItem, CreatedTest, ExperimentApi};
use crate::config::ClientConfig;
use crate::error::ApiError;
use abtest_core::Availability;
use abtest_model::{ActiveTest, TestConfiguration, TestType, VariantConfiguration};
use async_trait::async_trait;
use moka::future::Cache;
use std::future::Future;
use std::time::Duration;
use tracing::trace;

/// Memoised baseline lookups
#[derive(Debug, Clone)]
pub struct BaselineCache {
    inner: Cache<BaselineKey, Option<VariantConfiguration>>,
}

impl BaselineCache {
    /// Cache without expiry
    #[inline]
    #[must_use]
    pub fn new(max_capacity: u64) -> Self {
        Self {
            inner: Cache::new(max_capacity),
        }
    }

    /// Cache with time-based expiration
    #[inline]
    #[must_use]
    pub fn with_ttl(max_capacity: u64, ttl: Duration) -> Self {
        Self {
            inner: Cache::builder()
                .max_capacity(max_capacity)
                .time_to_live(ttl)
                .build(),
        }
    }

    /// Cache sized from client configuration
    #[must_use]
    pub fn from_config(config: &ClientConfig) -> Self {
        Self::with_ttl(config.baseline_cache_capacity, config.baseline_ttl())
    }

    /// Cached lookup, if present
    #[inline]
    pub async fn get(&self, key: &BaselineKey) -> Option<Option<VariantConfiguration>> {
        self.inner.get(key).await
    }

    /// Return the cached value or fetch and store it
    ///
    /// Failed fetches are not cached.
    pub async fn try_get_or_fetch<F, Fut>(
        &self,
        key: BaselineKey,
        fetch: F,
    ) -> Result<Option<VariantConfiguration>, ApiError>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<Option<VariantConfiguration>, ApiError>>,
    {
        if let Some(cached) = self.inner.get(&key).await {
            trace!(?key, "baseline cache hit");
            return Ok(cached);
        }

        let value = fetch().await?;
        self.inner.insert(key, value.clone()).await;
        Ok(value)
    }

    /// Drop one entry
    #[inline]
    pub async fn invalidate(&self, key: &BaselineKey) {
        self.inner.invalidate(key).await;
    }
}

/// [`ExperimentApi`] decorator that caches baselines
#[derive(Debug, Clone)]
pub struct CachedApi<A> {
    inner: A,
    baselines: BaselineCache,
}

impl<A: ExperimentApi> CachedApi<A> {
    /// Wrap an API with a baseline cache
    #[inline]
    #[must_use]
    pub fn new(inner: A, baselines: BaselineCache) -> Self {
        Self { inner, baselines }
    }

    /// Underlying cache
    #[inline]
    #[must_use]
    pub fn baselines(&self) -> &BaselineCache {
        &self.baselines
    }
}

#[async_trait]
impl<A: ExperimentApi> ExperimentApi for CachedApi<A> {
    async fn content_items(&self, test_type: TestType) -> Result<Vec<ContentItem>, ApiError> {
        self.inner.content_items(test_type).await
    }

    async fn available_combinations(&self) -> Result<Availability, ApiError> {
        self.inner.available_combinations().await
    }

    async fn baseline(&self, key: BaselineKey) -> Result<Option<VariantConfiguration>, ApiError> {
        self.baselines
            .try_get_or_fetch(key, || self.inner.baseline(key))
            .await
    }

    async fn active_tests(&self) -> Result<Vec<ActiveTest>, ApiError> {
        self.inner.active_tests().await
    }

    async fn create_test(&self, config: &TestConfiguration) -> Result<CreatedTest, ApiError> {
        self.inner.create_test(config).await
    }
}
