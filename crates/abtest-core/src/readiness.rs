//! Launch Readiness Evaluator
//!
//! [`is_ready`] is the single gate in front of activation. It is pure: the
//! same variants always produce the same verdict and reasons.

use crate::targeting::Targeting;
use abtest_model::Variant;
use serde::Serialize;
use std::fmt;

/// Why a configuration cannot launch
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ReadinessIssue {
    /// Fewer than two variants
    TooFewVariants { count: usize },
    /// Not exactly one control
    ControlCount { found: usize },
    /// Weights do not total 100
    WeightSum { total: u32 },
}

impl fmt::Display for ReadinessIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::TooFewVariants { count } => write!(f, "need ≥2 variants (have {count})"),
            Self::ControlCount { found } => {
                write!(f, "need exactly one control (found {found})")
            }
            Self::WeightSum { total } => {
                write!(f, "weights must sum to 100 (currently {total})")
            }
        }
    }
}

/// Verdict of the launch gate
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Readiness {
    pub ready: bool,
    pub reasons: Vec<ReadinessIssue>,
}

impl Readiness {
    /// Reasons as the messages shown to the user
    #[must_use]
    pub fn reason_messages(&self) -> Vec<String> {
        self.reasons.iter().map(ToString::to_string).collect()
    }
}

/// Decide whether a configuration may be activated
///
/// Targeting is accepted for completeness of the gate's inputs but carries
/// no readiness rule of its own; an empty multi-target selection is refused
/// by the wizard's submission step instead.
#[must_use]
pub fn is_ready(variants: &[Variant], _targeting: &Targeting) -> Readiness {
    let mut reasons = Vec::new();

    if variants.len() < 2 {
        reasons.push(ReadinessIssue::TooFewVariants {
            count: variants.len(),
        });
    }

    let controls = variants.iter().filter(|v| v.is_control).count();
    if controls != 1 {
        reasons.push(ReadinessIssue::ControlCount { found: controls });
    }

    let total: u32 = variants
        .iter()
        .map(|v| u32::from(v.traffic_weight.get()))
        .sum();
    if total != 100 {
        reasons.push(ReadinessIssue::WeightSum { total });
    }

    Readiness {
        ready: reasons.is_empty(),
        reasons,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use abtest_model::{TestType, TrafficWeight, VariantId};

    fn variant(weight: i64, control: bool) -> Variant {
        Variant::new(
            VariantId::generate(),
            "v",
            TestType::Hero,
            TrafficWeight::clamped(weight),
            control,
        )
    }

    #[test]
    fn sixty_forty_with_control_is_ready() {
        let readiness = is_ready(&[variant(60, true), variant(40, false)], &Targeting::everyone());
        assert!(readiness.ready);
        assert!(readiness.reasons.is_empty());
    }

    #[test]
    fn missing_control_blocks() {
        let readiness = is_ready(&[variant(50, false), variant(40, false)], &Targeting::everyone());
        assert!(!readiness.ready);
        assert!(readiness
            .reason_messages()
            .iter()
            .any(|r| r.contains("control")));
        assert!(readiness.reasons.contains(&ReadinessIssue::WeightSum { total: 90 }));
    }

    #[test]
    fn single_variant_blocks() {
        let readiness = is_ready(&[variant(70, true)], &Targeting::everyone());
        assert!(!readiness.ready);
        assert!(readiness
            .reason_messages()
            .iter()
            .any(|r| r.contains("≥2 variants")));
    }

    #[test]
    fn two_controls_block() {
        let readiness = is_ready(&[variant(50, true), variant(50, true)], &Targeting::everyone());
        assert_eq!(
            readiness.reasons,
            vec![ReadinessIssue::ControlCount { found: 2 }]
        );
    }

    #[test]
    fn empty_set_reports_every_reason() {
        let readiness = is_ready(&[], &Targeting::everyone());
        assert_eq!(readiness.reasons.len(), 3);
    }
}
