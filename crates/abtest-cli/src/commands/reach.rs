//! `abtest reach`

use super::Outcome;
use abtest_core::{Availability, ReachEstimate, TargetingMode, TargetingSelector};
use abtest_model::{FunnelStage, Persona, SegmentKey};
use std::collections::BTreeSet;
use std::io::Write;

/// Targeting to estimate
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReachRequest {
    pub persona: Option<Persona>,
    pub stage: Option<FunnelStage>,
    /// Non-empty selects multi-target mode
    pub segments: Vec<SegmentKey>,
    pub allocation: u8,
}

/// Build the selector and estimate its reach
///
/// Every combination is treated as available; content availability is a
/// backend concern that `launch` checks.
///
/// # Errors
/// Fails for an allocation outside 10..=100
pub fn estimate(request: &ReachRequest) -> anyhow::Result<(TargetingSelector, ReachEstimate)> {
    let mut selector = TargetingSelector::new();
    selector.set_availability(Availability::all());

    if request.segments.is_empty() {
        selector.set_persona(request.persona)?;
        selector.set_stage(request.stage)?;
    } else {
        selector.set_mode(TargetingMode::Multi);
        let unique: BTreeSet<SegmentKey> = request.segments.iter().copied().collect();
        for key in unique {
            selector.toggle(key)?;
        }
    }

    selector.set_allocation(request.allocation)?;
    let reach = selector.estimate_reach();
    Ok((selector, reach))
}

/// Run the command
///
/// # Errors
/// Fails for an invalid allocation or a write failure
pub fn run(request: &ReachRequest, out: &mut impl Write) -> anyhow::Result<Outcome> {
    let (selector, reach) = estimate(request)?;

    match selector.targeting().mode() {
        TargetingMode::Single => writeln!(
            out,
            "persona: {}, stage: {}",
            request.persona.map_or("all", Persona::as_str),
            request.stage.map_or("all", FunnelStage::as_str),
        )?,
        TargetingMode::Multi => writeln!(out, "{} segments selected", selector.selected_count())?,
    }
    writeln!(out, "{reach}")?;
    Ok(Outcome::Success)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn close(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-9
    }

    #[test]
    fn single_persona_and_stage() {
        let request = ReachRequest {
            persona: Some(Persona::Donor),
            stage: Some(FunnelStage::Decision),
            allocation: 100,
            ..ReachRequest::default()
        };
        let (_, reach) = estimate(&request).unwrap();
        assert!(close(reach.percent(), 5.0));
    }

    #[test]
    fn everyone_at_half_allocation() {
        let request = ReachRequest {
            allocation: 50,
            ..ReachRequest::default()
        };
        let (_, reach) = estimate(&request).unwrap();
        assert!(close(reach.percent(), 50.0));
    }

    #[test]
    fn duplicate_segments_count_once() {
        let key = SegmentKey::new(Persona::Student, FunnelStage::Awareness);
        let request = ReachRequest {
            segments: vec![key, key],
            allocation: 100,
            ..ReachRequest::default()
        };
        let (selector, reach) = estimate(&request).unwrap();
        assert_eq!(selector.selected_count(), 1);
        assert!(close(reach.percent(), 5.0));
    }

    #[test]
    fn low_allocation_is_rejected() {
        let request = ReachRequest {
            allocation: 5,
            ..ReachRequest::default()
        };
        assert!(estimate(&request).is_err());
    }
}
