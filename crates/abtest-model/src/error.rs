//! Error types for the A/B test model

use crate::configuration::TestType;
use crate::ids::VariantId;

/// Model parsing and validation errors
#[derive(Debug, thiserror::Error)]
pub enum ModelError {
    /// Persona tag not recognised
    #[error("unknown persona: {0}")]
    UnknownPersona(String),

    /// Funnel stage tag not recognised
    #[error("unknown funnel stage: {0}")]
    UnknownFunnelStage(String),

    /// Test type not recognised
    #[error("unknown test type: {0}")]
    UnknownTestType(String),

    /// Segment key is not `persona:stage`
    #[error("invalid segment key: {0}")]
    InvalidSegmentKey(String),

    /// Empty identifier
    #[error("identifier must not be empty")]
    EmptyId,

    /// Two variants of one test share an id
    #[error("duplicate variant id: {0}")]
    DuplicateVariantId(VariantId),

    /// Traffic weight outside 0..=100
    #[error("traffic weight {0} outside 0..=100")]
    WeightOutOfRange(i64),

    /// Traffic allocation outside 10..=100
    #[error("traffic allocation {0} outside 10..=100")]
    AllocationOutOfRange(i64),

    /// Payload does not have the shape required by its test type
    #[error("configuration does not match {expected} shape: {reason}")]
    ConfigurationShape { expected: TestType, reason: String },

    /// Configuration belongs to a different test type
    #[error("configuration type mismatch: expected {expected}, found {found}")]
    ConfigurationMismatch { expected: TestType, found: TestType },

    /// JSON encoding/decoding failure
    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),
}
