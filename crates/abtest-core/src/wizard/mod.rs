//! A/B test creation wizard
//!
//! Four screens, strictly linear: `Discover → Configure → Target → Review`.
//! The draft is carried forward in memory between screens. Cancelling at any
//! point resets both the step and the draft to their defaults; so does a
//! successful launch.

mod state_machine;

pub use state_machine::{allowed_transitions, validate_transition, WizardStep};

use crate::error::WizardError;
use crate::readiness::{is_ready, Readiness};
use crate::targeting::{ReachEstimate, Targeting, TargetingSelector};
use crate::variant_set::{VariantSet, VariantWarning};
use abtest_model::{TestConfiguration, TestType, TrafficAllocation};
use serde::Serialize;
use tracing::{debug, info};

/// In-memory test being edited
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TestDraft {
    pub name: String,
    pub description: String,
    pub variants: VariantSet,
    pub targeting: TargetingSelector,
}

impl TestDraft {
    /// Test type of the draft
    #[inline]
    #[must_use]
    pub fn test_type(&self) -> TestType {
        self.variants.test_type()
    }
}

impl Default for TestDraft {
    fn default() -> Self {
        Self {
            name: String::new(),
            description: String::new(),
            variants: VariantSet::with_defaults(TestType::default()),
            targeting: TargetingSelector::new(),
        }
    }
}

/// What the review screen shows
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ReviewSummary {
    pub name: String,
    pub test_type: TestType,
    pub variant_count: usize,
    pub readiness: Readiness,
    pub warnings: Vec<VariantWarning>,
    pub targeting: Targeting,
    pub allocation: TrafficAllocation,
    pub reach: ReachEstimate,
}

/// Wizard state: current step plus the draft
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Wizard {
    step: WizardStep,
    draft: TestDraft,
}

impl Wizard {
    /// Fresh wizard at `Discover`
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Load an existing configuration straight into review
    ///
    /// # Errors
    /// Returns [`WizardError::Variants`] if a variant configuration does not
    /// match the test type
    pub fn resume(config: TestConfiguration) -> Result<Self, WizardError> {
        let multi = config.is_multi_target();
        let targeting = if multi {
            Targeting::Multi {
                segments: config.target_segments.into_iter().collect(),
            }
        } else {
            Targeting::Single {
                persona: config.target_persona,
                stage: config.target_funnel_stage,
            }
        };

        let draft = TestDraft {
            name: config.name,
            description: config.description,
            variants: VariantSet::from_variants(config.test_type, config.variants)?,
            targeting: TargetingSelector::from_parts(targeting, config.traffic_allocation),
        };

        Ok(Self {
            step: WizardStep::Review,
            draft,
        })
    }

    /// Current step
    #[inline]
    #[must_use]
    pub fn step(&self) -> WizardStep {
        self.step
    }

    /// Draft being edited
    #[inline]
    #[must_use]
    pub fn draft(&self) -> &TestDraft {
        &self.draft
    }

    /// Mutable draft for variant and targeting edits
    #[inline]
    pub fn draft_mut(&mut self) -> &mut TestDraft {
        &mut self.draft
    }

    /// Set the test name
    pub fn set_name(&mut self, name: impl Into<String>) {
        self.draft.name = name.into();
    }

    /// Set the test description
    pub fn set_description(&mut self, description: impl Into<String>) {
        self.draft.description = description.into();
    }

    /// Change test type; every variant configuration is reset
    pub fn set_test_type(&mut self, test_type: TestType) {
        self.draft.variants.set_test_type(test_type);
    }

    /// Advance one step
    ///
    /// # Errors
    /// Returns [`WizardError::IllegalTransition`] at `Review`
    pub fn next(&mut self) -> Result<WizardStep, WizardError> {
        let to = self.step.next().ok_or(WizardError::IllegalTransition {
            from: self.step,
            to: self.step,
        })?;
        self.go_to(to)
    }

    /// Go back one step
    ///
    /// # Errors
    /// Returns [`WizardError::IllegalTransition`] at `Discover`
    pub fn back(&mut self) -> Result<WizardStep, WizardError> {
        let to = self.step.previous().ok_or(WizardError::IllegalTransition {
            from: self.step,
            to: self.step,
        })?;
        self.go_to(to)
    }

    fn go_to(&mut self, to: WizardStep) -> Result<WizardStep, WizardError> {
        validate_transition(self.step, to)?;
        debug!(from = ?self.step, ?to, "wizard step");
        self.step = to;
        Ok(to)
    }

    /// Discard the draft and return to `Discover`
    pub fn cancel(&mut self) {
        debug!(step = ?self.step, "wizard cancelled");
        *self = Self::new();
    }

    /// Launch-readiness verdict for the current draft
    #[must_use]
    pub fn readiness(&self) -> Readiness {
        is_ready(self.draft.variants.as_slice(), self.draft.targeting.targeting())
    }

    /// Review screen contents
    #[must_use]
    pub fn review(&self) -> ReviewSummary {
        ReviewSummary {
            name: self.draft.name.clone(),
            test_type: self.draft.test_type(),
            variant_count: self.draft.variants.len(),
            readiness: self.readiness(),
            warnings: self.draft.variants.warnings(),
            targeting: self.draft.targeting.targeting().clone(),
            allocation: self.draft.targeting.allocation(),
            reach: self.draft.targeting.estimate_reach(),
        }
    }

    /// Build the document to submit, passing the launch gate
    ///
    /// # Errors
    /// - [`WizardError::NotAtReview`] before the review step
    /// - [`WizardError::MissingName`] for a blank name
    /// - [`WizardError::NoSegments`] for an empty multi-target selection
    /// - [`WizardError::LaunchBlocked`] with the evaluator's reasons
    pub fn submission(&self) -> Result<TestConfiguration, WizardError> {
        if self.step != WizardStep::Review {
            return Err(WizardError::NotAtReview(self.step));
        }
        if self.draft.name.trim().is_empty() {
            return Err(WizardError::MissingName);
        }

        let targeting = self.draft.targeting.targeting();
        if matches!(targeting, Targeting::Multi { segments } if segments.is_empty()) {
            return Err(WizardError::NoSegments);
        }

        let readiness = self.readiness();
        if !readiness.ready {
            return Err(WizardError::LaunchBlocked {
                reasons: readiness.reasons,
            });
        }

        let (target_persona, target_funnel_stage, target_segments) = match targeting {
            Targeting::Single { persona, stage } => (*persona, *stage, Vec::new()),
            Targeting::Multi { segments } => (None, None, segments.iter().copied().collect()),
        };

        Ok(TestConfiguration {
            name: self.draft.name.trim().to_string(),
            description: self.draft.description.clone(),
            test_type: self.draft.test_type(),
            target_persona,
            target_funnel_stage,
            target_segments,
            traffic_allocation: self.draft.targeting.allocation(),
            variants: self.draft.variants.as_slice().to_vec(),
        })
    }

    /// Reset after the backend accepted the submission
    pub fn finish_launch(&mut self) {
        info!(name = %self.draft.name, "test launched; wizard reset");
        *self = Self::new();
    }
}
