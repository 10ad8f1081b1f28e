//! Test types and their variant configuration payloads
//!
//! Each test type has its own override shape. On the wire a configuration is
//! just the JSON object of its payload; the enclosing test's `type` field
//! decides how it is read back.

use crate::error::ModelError;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;
use std::fmt;
use std::str::FromStr;

/// What a test varies
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "snake_case")]
pub enum TestType {
    #[default]
    Hero,
    Cta,
    CardOrder,
    Messaging,
    Layout,
}

impl TestType {
    /// All test types
    pub const ALL: [TestType; 5] = [
        TestType::Hero,
        TestType::Cta,
        TestType::CardOrder,
        TestType::Messaging,
        TestType::Layout,
    ];

    /// Wire representation
    #[inline]
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Hero => "hero",
            Self::Cta => "cta",
            Self::CardOrder => "card_order",
            Self::Messaging => "messaging",
            Self::Layout => "layout",
        }
    }
}

impl fmt::Display for TestType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TestType {
    type Err = ModelError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_ascii_lowercase().replace('-', "_");
        Self::ALL
            .into_iter()
            .find(|t| t.as_str() == normalized)
            .ok_or_else(|| ModelError::UnknownTestType(s.to_string()))
    }
}

/// Hero section overrides
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct HeroOverrides {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub headline: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub subheadline: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub body: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cta_text: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cta_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,
}

/// Call-to-action overrides
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct CtaOverrides {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub style: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub placement: Option<String>,
}

/// Card ordering, by card identifier
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct CardOrder {
    #[serde(default)]
    pub cards: Vec<String>,
}

/// Messaging copy keyed by slot, insertion-ordered
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct MessagingOverrides {
    #[serde(default)]
    pub messages: IndexMap<String, String>,
}

/// Page layout overrides
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct LayoutOverrides {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub template: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub columns: Option<u8>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub sections: Vec<String>,
}

/// Variant configuration, discriminated by test type
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum VariantConfiguration {
    Hero(HeroOverrides),
    Cta(CtaOverrides),
    CardOrder(CardOrder),
    Messaging(MessagingOverrides),
    Layout(LayoutOverrides),
}

impl VariantConfiguration {
    /// Empty overrides for a test type
    #[must_use]
    pub fn empty(test_type: TestType) -> Self {
        match test_type {
            TestType::Hero => Self::Hero(HeroOverrides::default()),
            TestType::Cta => Self::Cta(CtaOverrides::default()),
            TestType::CardOrder => Self::CardOrder(CardOrder::default()),
            TestType::Messaging => Self::Messaging(MessagingOverrides::default()),
            TestType::Layout => Self::Layout(LayoutOverrides::default()),
        }
    }

    /// Discriminant
    #[inline]
    #[must_use]
    pub fn test_type(&self) -> TestType {
        match self {
            Self::Hero(_) => TestType::Hero,
            Self::Cta(_) => TestType::Cta,
            Self::CardOrder(_) => TestType::CardOrder,
            Self::Messaging(_) => TestType::Messaging,
            Self::Layout(_) => TestType::Layout,
        }
    }

    /// Resolve an untyped payload against a known test type
    ///
    /// `null` resolves to the empty configuration.
    ///
    /// # Errors
    /// Returns [`ModelError::ConfigurationShape`] if the payload has fields
    /// or types the test type does not allow
    pub fn from_value(test_type: TestType, value: JsonValue) -> Result<Self, ModelError> {
        if value.is_null() {
            return Ok(Self::empty(test_type));
        }

        let shape = |e: serde_json::Error| ModelError::ConfigurationShape {
            expected: test_type,
            reason: e.to_string(),
        };

        Ok(match test_type {
            TestType::Hero => Self::Hero(serde_json::from_value(value).map_err(shape)?),
            TestType::Cta => Self::Cta(serde_json::from_value(value).map_err(shape)?),
            TestType::CardOrder => Self::CardOrder(serde_json::from_value(value).map_err(shape)?),
            TestType::Messaging => Self::Messaging(serde_json::from_value(value).map_err(shape)?),
            TestType::Layout => Self::Layout(serde_json::from_value(value).map_err(shape)?),
        })
    }

    /// Check the configuration belongs to `expected`
    ///
    /// # Errors
    /// Returns [`ModelError::ConfigurationMismatch`] otherwise
    pub fn ensure_type(&self, expected: TestType) -> Result<(), ModelError> {
        let found = self.test_type();
        if found == expected {
            Ok(())
        } else {
            Err(ModelError::ConfigurationMismatch { expected, found })
        }
    }

    /// True if no override is set
    #[must_use]
    pub fn is_empty(&self) -> bool {
        *self == Self::empty(self.test_type())
    }
}
