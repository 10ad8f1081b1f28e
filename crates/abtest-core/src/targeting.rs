//! Targeting Selector
//!
//! A test either targets one optional persona and one optional funnel stage
//! (`None` meaning all), or an explicit set of persona × stage pairs. In the
//! multi-select form only combinations with existing content can be chosen;
//! the others are still listed, disabled.

use crate::error::TargetingError;
use abtest_model::{FunnelStage, Persona, SegmentKey, TrafficAllocation};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;
use tracing::debug;

/// Reach multiplier when a specific persona is chosen
const PERSONA_SHARE: f64 = 0.20;

/// Reach multiplier when a specific stage is chosen
const STAGE_SHARE: f64 = 0.25;

/// Which form the selection takes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TargetingMode {
    Single,
    Multi,
}

/// Who a test applies to
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "mode", rename_all = "snake_case")]
pub enum Targeting {
    /// One optional persona and stage; `None` is "all"
    Single {
        persona: Option<Persona>,
        stage: Option<FunnelStage>,
    },
    /// Explicit combinations
    Multi { segments: BTreeSet<SegmentKey> },
}

impl Targeting {
    /// Everyone
    #[inline]
    #[must_use]
    pub fn everyone() -> Self {
        Self::Single {
            persona: None,
            stage: None,
        }
    }

    /// Current mode
    #[inline]
    #[must_use]
    pub fn mode(&self) -> TargetingMode {
        match self {
            Self::Single { .. } => TargetingMode::Single,
            Self::Multi { .. } => TargetingMode::Multi,
        }
    }

    /// True if visitors of `segment` fall inside the selection
    #[must_use]
    pub fn applies_to(&self, segment: SegmentKey) -> bool {
        match self {
            Self::Single { persona, stage } => {
                persona.map_or(true, |p| p == segment.persona)
                    && stage.map_or(true, |s| s == segment.stage)
            }
            Self::Multi { segments } => segments.contains(&segment),
        }
    }
}

impl Default for Targeting {
    fn default() -> Self {
        Self::everyone()
    }
}

/// Combinations reported as having content
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Availability(BTreeSet<SegmentKey>);

impl Availability {
    /// Every combination available
    #[must_use]
    pub fn all() -> Self {
        SegmentKey::all().collect()
    }

    /// True if the combination has content
    #[inline]
    #[must_use]
    pub fn contains(&self, key: SegmentKey) -> bool {
        self.0.contains(&key)
    }

    /// Available combinations in order
    pub fn iter(&self) -> impl Iterator<Item = SegmentKey> + '_ {
        self.0.iter().copied()
    }

    /// Number of available combinations
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// True if nothing is available
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl FromIterator<SegmentKey> for Availability {
    fn from_iter<I: IntoIterator<Item = SegmentKey>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

/// One row of the multi-select grid
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct SegmentOption {
    pub key: SegmentKey,
    pub enabled: bool,
    pub selected: bool,
}

/// Display-only reach hint, in percent of site visitors
///
/// This is a UX heuristic, not a statistical guarantee. It has no bearing
/// on how the serving system actually splits traffic.
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Serialize)]
#[serde(transparent)]
pub struct ReachEstimate(f64);

impl ReachEstimate {
    /// Percentage value in 0.0..=100.0
    #[inline]
    #[must_use]
    pub fn percent(self) -> f64 {
        self.0
    }
}

impl fmt::Display for ReachEstimate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "~{:.1}% of visitors (estimate)", self.0)
    }
}

/// Editable targeting state for one draft
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TargetingSelector {
    targeting: Targeting,
    allocation: TrafficAllocation,
    availability: Availability,
}

impl TargetingSelector {
    /// Everyone, full allocation, nothing known to be available
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Rebuild from stored fields
    ///
    /// Stored multi-target selections are trusted as-is; availability is
    /// only enforced on later edits.
    #[must_use]
    pub fn from_parts(targeting: Targeting, allocation: TrafficAllocation) -> Self {
        Self {
            targeting,
            allocation,
            availability: Availability::default(),
        }
    }

    /// Switch mode
    ///
    /// A fully specified single pair carries over into multi mode when it is
    /// available; everything else starts empty.
    pub fn set_mode(&mut self, mode: TargetingMode) {
        if mode == self.targeting.mode() {
            return;
        }
        self.targeting = match (&self.targeting, mode) {
            (
                Targeting::Single {
                    persona: Some(persona),
                    stage: Some(stage),
                },
                TargetingMode::Multi,
            ) => {
                let key = SegmentKey::new(*persona, *stage);
                let segments = if self.availability.contains(key) {
                    BTreeSet::from([key])
                } else {
                    BTreeSet::new()
                };
                Targeting::Multi { segments }
            }
            (_, TargetingMode::Multi) => Targeting::Multi {
                segments: BTreeSet::new(),
            },
            (_, TargetingMode::Single) => Targeting::everyone(),
        };
        debug!(?mode, "targeting mode changed");
    }

    /// Choose a persona (single mode)
    ///
    /// # Errors
    /// Returns [`TargetingError::WrongMode`] in multi mode
    pub fn set_persona(&mut self, value: Option<Persona>) -> Result<(), TargetingError> {
        match &mut self.targeting {
            Targeting::Single { persona, .. } => {
                *persona = value;
                Ok(())
            }
            Targeting::Multi { .. } => Err(TargetingError::WrongMode {
                expected: TargetingMode::Single,
            }),
        }
    }

    /// Choose a funnel stage (single mode)
    ///
    /// # Errors
    /// Returns [`TargetingError::WrongMode`] in multi mode
    pub fn set_stage(&mut self, value: Option<FunnelStage>) -> Result<(), TargetingError> {
        match &mut self.targeting {
            Targeting::Single { stage, .. } => {
                *stage = value;
                Ok(())
            }
            Targeting::Multi { .. } => Err(TargetingError::WrongMode {
                expected: TargetingMode::Single,
            }),
        }
    }

    /// Select or deselect a combination (multi mode)
    ///
    /// Returns whether the key is selected afterwards. Deselecting is always
    /// allowed; selecting requires availability.
    ///
    /// # Errors
    /// - [`TargetingError::WrongMode`] in single mode
    /// - [`TargetingError::Unavailable`] when selecting a combination without content
    pub fn toggle(&mut self, key: SegmentKey) -> Result<bool, TargetingError> {
        let Targeting::Multi { segments } = &mut self.targeting else {
            return Err(TargetingError::WrongMode {
                expected: TargetingMode::Multi,
            });
        };

        if segments.remove(&key) {
            return Ok(false);
        }
        if !self.availability.contains(key) {
            return Err(TargetingError::Unavailable(key));
        }
        segments.insert(key);
        Ok(true)
    }

    /// Select every available combination (multi mode)
    ///
    /// # Errors
    /// Returns [`TargetingError::WrongMode`] in single mode
    pub fn select_all_available(&mut self) -> Result<(), TargetingError> {
        match &mut self.targeting {
            Targeting::Multi { segments } => {
                segments.extend(self.availability.iter());
                Ok(())
            }
            Targeting::Single { .. } => Err(TargetingError::WrongMode {
                expected: TargetingMode::Multi,
            }),
        }
    }

    /// Deselect everything (multi mode); no-op in single mode
    pub fn clear_segments(&mut self) {
        if let Targeting::Multi { segments } = &mut self.targeting {
            segments.clear();
        }
    }

    /// Replace availability, dropping selections that lost their content
    ///
    /// Returns the dropped combinations.
    pub fn set_availability(&mut self, availability: Availability) -> Vec<SegmentKey> {
        let mut dropped = Vec::new();
        if let Targeting::Multi { segments } = &mut self.targeting {
            segments.retain(|key| {
                let keep = availability.contains(*key);
                if !keep {
                    dropped.push(*key);
                }
                keep
            });
        }
        if !dropped.is_empty() {
            debug!(count = dropped.len(), "dropped unavailable segments");
        }
        self.availability = availability;
        dropped
    }

    /// Every combination with enabled/selected flags
    #[must_use]
    pub fn options(&self) -> Vec<SegmentOption> {
        SegmentKey::all()
            .map(|key| SegmentOption {
                key,
                enabled: self.availability.contains(key),
                selected: match &self.targeting {
                    Targeting::Multi { segments } => segments.contains(&key),
                    Targeting::Single { .. } => false,
                },
            })
            .collect()
    }

    /// Set the enrolled share of matching visitors
    ///
    /// # Errors
    /// Returns [`TargetingError::Allocation`] outside 10..=100
    pub fn set_allocation(&mut self, percent: u8) -> Result<(), TargetingError> {
        self.allocation = TrafficAllocation::new(percent)?;
        Ok(())
    }

    /// Display-only reach heuristic
    ///
    /// Single mode: `100 × 0.20 (persona chosen) × 0.25 (stage chosen) ×
    /// allocation`. Multi mode: `selected / 20 × 100 × allocation`. Not a
    /// statistical guarantee.
    #[must_use]
    pub fn estimate_reach(&self) -> ReachEstimate {
        let base = match &self.targeting {
            Targeting::Single { persona, stage } => {
                let mut reach = 100.0;
                if persona.is_some() {
                    reach *= PERSONA_SHARE;
                }
                if stage.is_some() {
                    reach *= STAGE_SHARE;
                }
                reach
            }
            Targeting::Multi { segments } => {
                segments.len() as f64 / SegmentKey::TOTAL as f64 * 100.0
            }
        };
        ReachEstimate(base * self.allocation.fraction())
    }

    /// Current selection
    #[inline]
    #[must_use]
    pub fn targeting(&self) -> &Targeting {
        &self.targeting
    }

    /// Enrolled share
    #[inline]
    #[must_use]
    pub fn allocation(&self) -> TrafficAllocation {
        self.allocation
    }

    /// Known availability
    #[inline]
    #[must_use]
    pub fn availability(&self) -> &Availability {
        &self.availability
    }

    /// Number of selected combinations (multi mode)
    #[must_use]
    pub fn selected_count(&self) -> usize {
        match &self.targeting {
            Targeting::Multi { segments } => segments.len(),
            Targeting::Single { .. } => 0,
        }
    }
}
