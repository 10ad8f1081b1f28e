//! Testing utilities for the A/B test workspace
//!
//! Shared fixtures: variants, sample configurations, wire JSON.

#![allow(missing_docs)]
#![allow(clippy::missing_panics_doc)]

use abtest_core::{Wizard, WizardStep};
use abtest_model::{
    ActiveTest, ActiveVariant, FunnelStage, HeroOverrides, Persona, SegmentKey, TestConfiguration,
    TestId, TestType, TrafficAllocation, TrafficWeight, Variant, VariantConfiguration, VariantId,
};
use serde_json::{json, Value};

pub fn variant_id(raw: &str) -> VariantId {
    VariantId::new(raw).unwrap()
}

pub fn test_id(raw: &str) -> TestId {
    TestId::new(raw).unwrap()
}

/// Variant with a fixed id and weight, empty configuration
pub fn variant(id: &str, weight: u8, is_control: bool) -> Variant {
    Variant::new(
        variant_id(id),
        id.to_uppercase(),
        TestType::Hero,
        TrafficWeight::new(weight).unwrap(),
        is_control,
    )
}

pub fn hero(headline: &str) -> VariantConfiguration {
    VariantConfiguration::Hero(HeroOverrides {
        headline: Some(headline.to_string()),
        ..HeroOverrides::default()
    })
}

/// Launchable hero test targeting parents at the decision stage
pub fn sample_config() -> TestConfiguration {
    TestConfiguration {
        name: "Spring hero".to_string(),
        description: "Headline copy for parents".to_string(),
        test_type: TestType::Hero,
        target_persona: Some(Persona::Parent),
        target_funnel_stage: Some(FunnelStage::Decision),
        target_segments: Vec::new(),
        traffic_allocation: TrafficAllocation::new(80).unwrap(),
        variants: vec![
            variant("control", 50, true).with_configuration(hero("Find your school")),
            variant("b", 50, false).with_configuration(hero("Your child's next step")),
        ],
    }
}

/// Same test, multi-targeted
pub fn sample_multi_config(segments: &[SegmentKey]) -> TestConfiguration {
    TestConfiguration {
        target_persona: None,
        target_funnel_stage: None,
        target_segments: segments.to_vec(),
        ..sample_config()
    }
}

/// Wire form of [`sample_config`]
pub fn sample_config_json() -> Value {
    json!({
        "name": "Spring hero",
        "description": "Headline copy for parents",
        "type": "hero",
        "targetPersona": "parent",
        "targetFunnelStage": "decision",
        "trafficAllocation": 80,
        "variants": [
            {
                "id": "control",
                "name": "CONTROL",
                "description": "",
                "trafficWeight": 50,
                "isControl": true,
                "configuration": { "headline": "Find your school" }
            },
            {
                "id": "b",
                "name": "B",
                "description": "",
                "trafficWeight": 50,
                "isControl": false,
                "configuration": { "headline": "Your child's next step" }
            }
        ]
    })
}

/// Running test with a control and one challenger
pub fn active_test(id: &str) -> ActiveTest {
    ActiveTest {
        id: test_id(id),
        name: format!("Test {id}"),
        test_type: TestType::Hero,
        target_persona: None,
        target_funnel_stage: None,
        target_segments: Vec::new(),
        variants: vec![
            ActiveVariant {
                id: variant_id(&format!("{id}-control")),
                name: "Control (Original)".to_string(),
                is_control: true,
            },
            ActiveVariant {
                id: variant_id(&format!("{id}-b")),
                name: "Variant B".to_string(),
                is_control: false,
            },
        ],
    }
}

/// Named wizard advanced to review with default variants
pub fn wizard_at_review(name: &str) -> Wizard {
    let mut wizard = Wizard::new();
    wizard.set_name(name);
    while wizard.step() != WizardStep::Review {
        wizard.next().unwrap();
    }
    wizard
}
