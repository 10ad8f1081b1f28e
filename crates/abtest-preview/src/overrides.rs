//! Preview override values

use abtest_model::{FunnelStage, Persona, TestId, VariantId};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// What an admin previews the site as
///
/// `None` persona or stage means the visitor's own. Forced variants pin a
/// running test to one of its variants.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct PreviewOverrides {
    pub persona: Option<Persona>,
    pub stage: Option<FunnelStage>,
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub forced_variants: BTreeMap<TestId, VariantId>,
    pub applied_at: Option<DateTime<Utc>>,
}

impl PreviewOverrides {
    /// No override of any kind
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.persona.is_none() && self.stage.is_none() && self.forced_variants.is_empty()
    }

    /// Same overrides, ignoring when they were applied
    #[must_use]
    pub fn same_selection(&self, other: &Self) -> bool {
        self.persona == other.persona
            && self.stage == other.stage
            && self.forced_variants == other.forced_variants
    }
}
