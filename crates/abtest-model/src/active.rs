//! Running tests as reported by the backend

use crate::configuration::TestType;
use crate::ids::{TestId, VariantId};
use crate::segment::{FunnelStage, Persona, SegmentKey};
use serde::{Deserialize, Serialize};

/// Variant of a running test
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ActiveVariant {
    pub id: VariantId,
    pub name: String,
    #[serde(default)]
    pub is_control: bool,
}

/// A test currently serving traffic
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ActiveTest {
    pub id: TestId,
    pub name: String,
    #[serde(rename = "type")]
    pub test_type: TestType,
    #[serde(default)]
    pub target_persona: Option<Persona>,
    #[serde(default)]
    pub target_funnel_stage: Option<FunnelStage>,
    #[serde(default)]
    pub target_segments: Vec<SegmentKey>,
    #[serde(default)]
    pub variants: Vec<ActiveVariant>,
}

impl ActiveTest {
    /// Look up one of the test's variants
    #[must_use]
    pub fn variant(&self, id: &VariantId) -> Option<&ActiveVariant> {
        self.variants.iter().find(|v| v.id == *id)
    }

    /// True if visitors of `segment` can enter the test
    #[must_use]
    pub fn targets(&self, segment: SegmentKey) -> bool {
        if !self.target_segments.is_empty() {
            return self.target_segments.contains(&segment);
        }
        self.target_persona.map_or(true, |p| p == segment.persona)
            && self.target_funnel_stage.map_or(true, |s| s == segment.stage)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn sample() -> ActiveTest {
        serde_json::from_value(json!({
            "id": "test-9",
            "name": "Volunteer CTA",
            "type": "cta",
            "targetPersona": "volunteer",
            "targetFunnelStage": null,
            "variants": [
                {"id": "c", "name": "Control (Original)", "isControl": true},
                {"id": "b", "name": "Variant B"}
            ]
        }))
        .unwrap()
    }

    #[test]
    fn parses_backend_shape() {
        let test = sample();
        assert_eq!(test.test_type, TestType::Cta);
        assert!(test.variants[0].is_control);
        assert!(!test.variants[1].is_control);
    }

    #[test]
    fn targets_follow_persona_filter() {
        let test = sample();
        assert!(test.targets(SegmentKey::new(Persona::Volunteer, FunnelStage::Awareness)));
        assert!(!test.targets(SegmentKey::new(Persona::Donor, FunnelStage::Awareness)));
    }

    #[test]
    fn variant_lookup() {
        let test = sample();
        assert!(test.variant(&VariantId::new("b").unwrap()).is_some());
        assert!(test.variant(&VariantId::new("z").unwrap()).is_none());
    }
}
