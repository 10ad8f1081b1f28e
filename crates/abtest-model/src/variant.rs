//! Variants and traffic percentages

use crate::configuration::{TestType, VariantConfiguration};
use crate::error::ModelError;
use crate::ids::{ContentItemId, VariantId};
use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;
use std::fmt;

/// Share of test-eligible visitors routed to a variant (0..=100)
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize)]
#[serde(try_from = "i64", into = "u8")]
pub struct TrafficWeight(u8);

impl TrafficWeight {
    /// Upper bound
    pub const MAX: u8 = 100;

    /// Create a weight
    ///
    /// # Errors
    /// Returns [`ModelError::WeightOutOfRange`] above 100
    pub fn new(value: u8) -> Result<Self, ModelError> {
        if value > Self::MAX {
            return Err(ModelError::WeightOutOfRange(i64::from(value)));
        }
        Ok(Self(value))
    }

    /// Saturate any input into 0..=100
    #[inline]
    #[must_use]
    pub fn clamped(value: i64) -> Self {
        // clamp keeps the value inside u8 range
        Self(value.clamp(0, i64::from(Self::MAX)) as u8)
    }

    /// Percentage value
    #[inline]
    #[must_use]
    pub fn get(self) -> u8 {
        self.0
    }
}

impl TryFrom<i64> for TrafficWeight {
    type Error = ModelError;

    fn try_from(value: i64) -> Result<Self, Self::Error> {
        u8::try_from(value)
            .map_err(|_| ModelError::WeightOutOfRange(value))
            .and_then(Self::new)
    }
}

impl From<TrafficWeight> for u8 {
    fn from(weight: TrafficWeight) -> Self {
        weight.0
    }
}

impl fmt::Display for TrafficWeight {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}%", self.0)
    }
}

/// Share of matching visitors enrolled in the test (10..=100)
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "i64", into = "u8")]
pub struct TrafficAllocation(u8);

impl TrafficAllocation {
    /// Lower bound
    pub const MIN: u8 = 10;
    /// Upper bound
    pub const MAX: u8 = 100;

    /// Create an allocation
    ///
    /// # Errors
    /// Returns [`ModelError::AllocationOutOfRange`] outside 10..=100
    pub fn new(value: u8) -> Result<Self, ModelError> {
        if !(Self::MIN..=Self::MAX).contains(&value) {
            return Err(ModelError::AllocationOutOfRange(i64::from(value)));
        }
        Ok(Self(value))
    }

    /// Saturate any input into 10..=100
    #[inline]
    #[must_use]
    pub fn clamped(value: i64) -> Self {
        Self(value.clamp(i64::from(Self::MIN), i64::from(Self::MAX)) as u8)
    }

    /// Percentage value
    #[inline]
    #[must_use]
    pub fn get(self) -> u8 {
        self.0
    }

    /// As a fraction in 0.1..=1.0
    #[inline]
    #[must_use]
    pub fn fraction(self) -> f64 {
        f64::from(self.0) / 100.0
    }
}

impl Default for TrafficAllocation {
    fn default() -> Self {
        Self(Self::MAX)
    }
}

impl TryFrom<i64> for TrafficAllocation {
    type Error = ModelError;

    fn try_from(value: i64) -> Result<Self, Self::Error> {
        u8::try_from(value)
            .map_err(|_| ModelError::AllocationOutOfRange(value))
            .and_then(Self::new)
    }
}

impl From<TrafficAllocation> for u8 {
    fn from(allocation: TrafficAllocation) -> Self {
        allocation.0
    }
}

/// One version of content or layout under test
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Variant {
    pub id: VariantId,
    pub name: String,
    pub description: String,
    pub traffic_weight: TrafficWeight,
    pub is_control: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub content_item_id: Option<ContentItemId>,
    pub configuration: VariantConfiguration,
}

impl Variant {
    /// Create a variant with empty overrides for `test_type`
    #[must_use]
    pub fn new(
        id: VariantId,
        name: impl Into<String>,
        test_type: TestType,
        traffic_weight: TrafficWeight,
        is_control: bool,
    ) -> Self {
        Self {
            id,
            name: name.into(),
            description: String::new(),
            traffic_weight,
            is_control,
            content_item_id: None,
            configuration: VariantConfiguration::empty(test_type),
        }
    }

    /// With description
    #[inline]
    #[must_use]
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    /// With content item reference
    #[inline]
    #[must_use]
    pub fn with_content_item(mut self, content_item_id: ContentItemId) -> Self {
        self.content_item_id = Some(content_item_id);
        self
    }

    /// With configuration
    #[inline]
    #[must_use]
    pub fn with_configuration(mut self, configuration: VariantConfiguration) -> Self {
        self.configuration = configuration;
        self
    }

    /// Resolve a wire variant against its test's type
    ///
    /// # Errors
    /// Returns [`ModelError::ConfigurationShape`] for a foreign payload
    pub fn from_wire(test_type: TestType, wire: VariantWire) -> Result<Self, ModelError> {
        Ok(Self {
            id: wire.id,
            name: wire.name,
            description: wire.description,
            traffic_weight: wire.traffic_weight,
            is_control: wire.is_control,
            content_item_id: wire.content_item_id,
            configuration: VariantConfiguration::from_value(test_type, wire.configuration)?,
        })
    }
}

/// Variant as read from JSON, before its configuration is typed
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VariantWire {
    pub id: VariantId,
    pub name: String,
    #[serde(default)]
    pub description: String,
    pub traffic_weight: TrafficWeight,
    #[serde(default)]
    pub is_control: bool,
    #[serde(default)]
    pub content_item_id: Option<ContentItemId>,
    #[serde(default)]
    pub configuration: JsonValue,
}
