//! Visitor segment tags
//!
//! A segment is one persona × funnel-stage pair. Five personas and four
//! stages give twenty combinations.

use crate::error::ModelError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Visitor persona
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Persona {
    Student,
    Provider,
    Parent,
    Volunteer,
    Donor,
}

impl Persona {
    /// Every persona in display order
    pub const ALL: [Persona; 5] = [
        Persona::Student,
        Persona::Provider,
        Persona::Parent,
        Persona::Volunteer,
        Persona::Donor,
    ];

    /// Wire/tag representation
    #[inline]
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Student => "student",
            Self::Provider => "provider",
            Self::Parent => "parent",
            Self::Volunteer => "volunteer",
            Self::Donor => "donor",
        }
    }
}

impl fmt::Display for Persona {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Persona {
    type Err = ModelError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|p| p.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| ModelError::UnknownPersona(s.to_string()))
    }
}

/// Journey stage
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FunnelStage {
    Awareness,
    Consideration,
    Decision,
    Retention,
}

impl FunnelStage {
    /// Every stage in funnel order
    pub const ALL: [FunnelStage; 4] = [
        FunnelStage::Awareness,
        FunnelStage::Consideration,
        FunnelStage::Decision,
        FunnelStage::Retention,
    ];

    /// Wire/tag representation
    #[inline]
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Awareness => "awareness",
            Self::Consideration => "consideration",
            Self::Decision => "decision",
            Self::Retention => "retention",
        }
    }
}

impl fmt::Display for FunnelStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for FunnelStage {
    type Err = ModelError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|st| st.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| ModelError::UnknownFunnelStage(s.to_string()))
    }
}

/// One persona × funnel-stage combination
///
/// Serialized as the text key `persona:stage`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct SegmentKey {
    pub persona: Persona,
    pub stage: FunnelStage,
}

impl SegmentKey {
    /// Number of distinct combinations
    pub const TOTAL: usize = Persona::ALL.len() * FunnelStage::ALL.len();

    /// Create a key
    #[inline]
    #[must_use]
    pub const fn new(persona: Persona, stage: FunnelStage) -> Self {
        Self { persona, stage }
    }

    /// All combinations, persona-major
    pub fn all() -> impl Iterator<Item = SegmentKey> {
        Persona::ALL.into_iter().flat_map(|persona| {
            FunnelStage::ALL
                .into_iter()
                .map(move |stage| SegmentKey::new(persona, stage))
        })
    }
}

impl fmt::Display for SegmentKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.persona, self.stage)
    }
}

impl FromStr for SegmentKey {
    type Err = ModelError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (persona, stage) = s
            .split_once(':')
            .ok_or_else(|| ModelError::InvalidSegmentKey(s.to_string()))?;
        Ok(Self::new(persona.parse()?, stage.parse()?))
    }
}

impl TryFrom<String> for SegmentKey {
    type Error = ModelError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<SegmentKey> for String {
    fn from(key: SegmentKey) -> Self {
        key.to_string()
    }
}
