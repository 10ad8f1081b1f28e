//! The test configuration document submitted on launch

use crate::configuration::TestType;
use crate::error::ModelError;
use crate::segment::{FunnelStage, Persona, SegmentKey};
use crate::variant::{TrafficAllocation, Variant, VariantWire};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// A complete A/B test definition
///
/// Either a single `target_persona`/`target_funnel_stage` pair (`None` means
/// all) or, in multi-target mode, a non-empty `target_segments` list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", try_from = "TestConfigurationWire")]
pub struct TestConfiguration {
    pub name: String,
    pub description: String,
    #[serde(rename = "type")]
    pub test_type: TestType,
    pub target_persona: Option<Persona>,
    pub target_funnel_stage: Option<FunnelStage>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub target_segments: Vec<SegmentKey>,
    pub traffic_allocation: TrafficAllocation,
    pub variants: Vec<Variant>,
}

impl TestConfiguration {
    /// Parse from JSON text
    ///
    /// # Errors
    /// Returns [`ModelError::Json`] for malformed input, a variant
    /// configuration that does not match the test type, or repeated or blank
    /// variant ids
    pub fn from_json(json: &str) -> Result<Self, ModelError> {
        Ok(serde_json::from_str(json)?)
    }

    /// Render as pretty JSON
    ///
    /// # Errors
    /// Returns [`ModelError::Json`] if serialization fails
    pub fn to_json_pretty(&self) -> Result<String, ModelError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// True when targeting is expressed as a set of segment pairs
    #[inline]
    #[must_use]
    pub fn is_multi_target(&self) -> bool {
        !self.target_segments.is_empty()
    }
}

/// Wire shape, before variant configurations are typed
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct TestConfigurationWire {
    name: String,
    #[serde(default)]
    description: String,
    #[serde(rename = "type")]
    test_type: TestType,
    #[serde(default)]
    target_persona: Option<Persona>,
    #[serde(default)]
    target_funnel_stage: Option<FunnelStage>,
    #[serde(default)]
    target_segments: Vec<SegmentKey>,
    #[serde(default)]
    traffic_allocation: TrafficAllocation,
    #[serde(default)]
    variants: Vec<VariantWire>,
}

impl TryFrom<TestConfigurationWire> for TestConfiguration {
    type Error = ModelError;

    fn try_from(wire: TestConfigurationWire) -> Result<Self, Self::Error> {
        let test_type = wire.test_type;
        let variants = wire
            .variants
            .into_iter()
            .map(|v| Variant::from_wire(test_type, v))
            .collect::<Result<Vec<_>, _>>()?;

        let mut seen = BTreeSet::new();
        if let Some(dup) = variants.iter().find(|v| !seen.insert(&v.id)) {
            return Err(ModelError::DuplicateVariantId(dup.id.clone()));
        }

        Ok(Self {
            name: wire.name,
            description: wire.description,
            test_type,
            target_persona: wire.target_persona,
            target_funnel_stage: wire.target_funnel_stage,
            target_segments: wire.target_segments,
            traffic_allocation: wire.traffic_allocation,
            variants,
        })
    }
}
