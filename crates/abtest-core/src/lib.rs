//! A/B Test Core
//!
//! Client-side state for configuring an A/B test:
//! - [`VariantSet`]: ordered variants with traffic weights and a control flag
//! - [`TargetingSelector`]: persona/stage targeting, single or multi-select
//! - [`is_ready`]: the pure launch-readiness gate
//! - [`Wizard`]: the `Discover → Configure → Target → Review` flow
//!
//! Weight and control problems are advisory while editing and only block at
//! the launch gate.
//!
//! # Example
//!
//! ```rust,ignore
//! use abtest_core::Wizard;
//!
//! let mut wizard = Wizard::new();
//! wizard.set_name("Spring hero");
//! wizard.next()?; // Configure
//! wizard.next()?; // Target
//! wizard.next()?; // Review
//!
//! let config = wizard.submission()?;
//! ```

#![warn(unreachable_pub)]
#![allow(missing_docs)]

pub mod error;
pub mod readiness;
pub mod targeting;
pub mod variant_set;
pub mod wizard;

pub use error::{TargetingError, VariantSetError, WizardError};
pub use readiness::{is_ready, Readiness, ReadinessIssue};
pub use targeting::{
    Availability, ReachEstimate, SegmentOption, Targeting, TargetingMode, TargetingSelector,
};
pub use variant_set::{ControlChange, VariantSet, VariantWarning};
pub use wizard::{ReviewSummary, TestDraft, Wizard, WizardStep};

/// Prelude module for common imports
pub mod prelude {
    //! Common imports for working with the A/B test core
    pub use crate::{
        is_ready, Availability, Readiness, TargetingSelector, VariantSet, Wizard, WizardStep,
    };
    pub use abtest_model::{FunnelStage, Persona, SegmentKey, TestType, VariantId};
}

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
