//! Admin API collaborator contract
//!
//! The backend owns content, availability, baselines and durable test
//! storage. [`ExperimentApi`] is the seam the rest of the workspace talks
//! through; [`crate::HttpExperimentApi`] is the production implementation.

use crate::error::ApiError;
use abtest_core::Availability;
use abtest_model::{
    ActiveTest, ContentItemId, FunnelStage, Persona, TestConfiguration, TestId, TestType,
    VariantConfiguration,
};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// Content that a variant can point at
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContentItem {
    pub id: ContentItemId,
    pub title: String,
    #[serde(rename = "type")]
    pub content_type: String,
    #[serde(default)]
    pub persona: Option<Persona>,
    #[serde(default)]
    pub funnel_stage: Option<FunnelStage>,
    #[serde(default)]
    pub is_active: bool,
}

/// Backend acknowledgement of a created test
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreatedTest {
    pub id: TestId,
    #[serde(default)]
    pub status: String,
}

/// Baseline lookup key
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct BaselineKey {
    pub persona: Persona,
    pub stage: FunnelStage,
    pub test_type: TestType,
}

impl BaselineKey {
    /// Create a key
    #[inline]
    #[must_use]
    pub fn new(persona: Persona, stage: FunnelStage, test_type: TestType) -> Self {
        Self {
            persona,
            stage,
            test_type,
        }
    }
}

/// Backend operations used by the admin tools
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ExperimentApi: Send + Sync {
    /// Content items of one type
    async fn content_items(&self, test_type: TestType) -> Result<Vec<ContentItem>, ApiError>;

    /// Persona × stage combinations that have content
    async fn available_combinations(&self) -> Result<Availability, ApiError>;

    /// Live configuration for a combination, if any
    async fn baseline(&self, key: BaselineKey) -> Result<Option<VariantConfiguration>, ApiError>;

    /// Tests currently serving traffic
    async fn active_tests(&self) -> Result<Vec<ActiveTest>, ApiError>;

    /// Create a test from a validated configuration
    async fn create_test(&self, config: &TestConfiguration) -> Result<CreatedTest, ApiError>;
}

#[async_trait]
impl<A: ExperimentApi + ?Sized> ExperimentApi for std::sync::Arc<A> {
    async fn content_items(&self, test_type: TestType) -> Result<Vec<ContentItem>, ApiError> {
        (**self).content_items(test_type).await
    }

    async fn available_combinations(&self) -> Result<Availability, ApiError> {
        (**self).available_combinations().await
    }

    async fn baseline(&self, key: BaselineKey) -> Result<Option<VariantConfiguration>, ApiError> {
        (**self).baseline(key).await
    }

    async fn active_tests(&self) -> Result<Vec<ActiveTest>, ApiError> {
        (**self).active_tests().await
    }

    async fn create_test(&self, config: &TestConfiguration) -> Result<CreatedTest, ApiError> {
        (**self).create_test(config).await
    }
}
