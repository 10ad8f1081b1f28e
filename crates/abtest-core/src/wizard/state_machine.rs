//! Wizard step transition table

use crate::error::WizardError;
use serde::{Deserialize, Serialize};

/// Wizard screens, in order
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WizardStep {
    #[default]
    Discover,
    Configure,
    Target,
    Review,
}

impl WizardStep {
    /// Following step, if any
    #[must_use]
    pub fn next(self) -> Option<Self> {
        match self {
            Self::Discover => Some(Self::Configure),
            Self::Configure => Some(Self::Target),
            Self::Target => Some(Self::Review),
            Self::Review => None,
        }
    }

    /// Preceding step, if any
    #[must_use]
    pub fn previous(self) -> Option<Self> {
        match self {
            Self::Discover => None,
            Self::Configure => Some(Self::Discover),
            Self::Target => Some(Self::Configure),
            Self::Review => Some(Self::Target),
        }
    }
}

/// Validates a step change.
///
/// The flow is strictly linear: one step forward or one step back.
///
/// # Errors
/// Returns [`WizardError::IllegalTransition`] for any other change
pub fn validate_transition(from: WizardStep, to: WizardStep) -> Result<(), WizardError> {
    if allowed_transitions(from).contains(&to) {
        Ok(())
    } else {
        Err(WizardError::IllegalTransition { from, to })
    }
}

/// Steps reachable from `from`, previous first
#[must_use]
pub fn allowed_transitions(from: WizardStep) -> Vec<WizardStep> {
    from.previous().into_iter().chain(from.next()).collect()
}
