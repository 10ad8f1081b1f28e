//! Error types for the A/B test core
//!
//! Launch-gate errors (see [`WizardError::is_launch_gate`]) block submission;
//! everything else rejects a single edit and leaves the draft unchanged.

use crate::readiness::ReadinessIssue;
use crate::targeting::TargetingMode;
use crate::wizard::WizardStep;
use abtest_model::{ModelError, SegmentKey, TestType, VariantId};

/// Variant set editing errors
#[derive(Debug, thiserror::Error)]
pub enum VariantSetError {
    /// No variant with this id
    #[error("unknown variant: {0}")]
    UnknownVariant(VariantId),

    /// Two variants share an id
    #[error("duplicate variant id: {0}")]
    DuplicateId(VariantId),

    /// Removing the only control while other variants remain
    #[error("cannot remove {0}: it is the only control variant")]
    SoleControl(VariantId),

    /// Configuration of another test type
    #[error("configuration type mismatch: expected {expected}, found {found}")]
    ConfigurationMismatch { expected: TestType, found: TestType },
}

/// Targeting selection errors
#[derive(Debug, thiserror::Error)]
pub enum TargetingError {
    /// Combination has no content
    #[error("segment {0} has no content and cannot be targeted")]
    Unavailable(SegmentKey),

    /// Operation belongs to the other targeting mode
    #[error("operation requires {expected:?} targeting mode")]
    WrongMode { expected: TargetingMode },

    /// Allocation outside 10..=100
    #[error("invalid traffic allocation: {0}")]
    Allocation(#[from] ModelError),
}

/// Wizard navigation and launch errors
#[derive(Debug, thiserror::Error)]
pub enum WizardError {
    /// Step change not in the linear flow
    #[error("illegal wizard transition: {from:?} -> {to:?}")]
    IllegalTransition { from: WizardStep, to: WizardStep },

    /// Submission attempted before the review step
    #[error("submission is only possible from review (currently at {0:?})")]
    NotAtReview(WizardStep),

    /// Test has no name
    #[error("test name is required")]
    MissingName,

    /// Multi-target mode with nothing selected
    #[error("select at least one persona and stage combination")]
    NoSegments,

    /// Readiness evaluator refused the configuration
    #[error("launch blocked: {}", join_reasons(.reasons))]
    LaunchBlocked { reasons: Vec<ReadinessIssue> },

    /// Variant edit failed
    #[error("variant error: {0}")]
    Variants(#[from] VariantSetError),

    /// Targeting edit failed
    #[error("targeting error: {0}")]
    Targeting(#[from] TargetingError),
}

impl WizardError {
    /// True for errors raised by the launch gate
    #[inline]
    #[must_use]
    pub fn is_launch_gate(&self) -> bool {
        matches!(
            self,
            Self::LaunchBlocked { .. } | Self::MissingName | Self::NoSegments
        )
    }
}

fn join_reasons(reasons: &[ReadinessIssue]) -> String {
    reasons
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}
