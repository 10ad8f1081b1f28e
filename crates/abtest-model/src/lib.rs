//! A/B Test Model
//!
//! Typed data model for A/B test configurations submitted by the admin tools.
//!
//! # Core Concepts
//!
//! - [`Persona`] / [`FunnelStage`]: visitor segment tags
//! - [`SegmentKey`]: one persona × funnel-stage combination
//! - [`TestType`]: what a test varies (hero, CTA, card order, ...)
//! - [`VariantConfiguration`]: per-variant overrides, discriminated by [`TestType`]
//! - [`Variant`]: one version under test with its traffic weight and control flag
//! - [`TestConfiguration`]: the JSON document handed to the backend on launch
//! - [`ActiveTest`]: a running test, as listed by the backend
//!
//! # Example
//!
//! ```rust,ignore
//! use abtest_model::TestConfiguration;
//!
//! let config = TestConfiguration::from_json(&std::fs::read_to_string("test.json")?)?;
//! println!("{} variants", config.variants.len());
//! ```

#![warn(unreachable_pub)]
#![allow(missing_docs)]

mod active;
mod configuration;
mod error;
mod ids;
mod segment;
mod test_config;
mod variant;

pub use active::{ActiveTest, ActiveVariant};
pub use configuration::{
    CardOrder, CtaOverrides, HeroOverrides, LayoutOverrides, MessagingOverrides, TestType,
    VariantConfiguration,
};
pub use error::ModelError;
pub use ids::{ContentItemId, TestId, VariantId};
pub use segment::{FunnelStage, Persona, SegmentKey};
pub use test_config::TestConfiguration;
pub use variant::{TrafficAllocation, TrafficWeight, Variant, VariantWire};

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
