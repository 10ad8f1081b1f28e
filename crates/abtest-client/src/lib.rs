//! A/B Test Admin Client
//!
//! Talks to the admin backend and drives the configuration wizard against it.
//!
//! - [`ExperimentApi`]: the backend seam (content, availability, baselines,
//!   active tests, test creation)
//! - [`HttpExperimentApi`]: reqwest implementation
//! - [`CachedApi`] / [`BaselineCache`]: moka-backed baseline memoisation
//! - [`LaunchService`]: availability refresh, control designation, launch
//!
//! # Example
//!
//! ```rust,ignore
//! use abtest_client::{BaselineCache, CachedApi, ClientConfig, HttpExperimentApi, LaunchService};
//! use abtest_core::Wizard;
//!
//! let config = ClientConfig::new().with_base_url("https://admin.example.org");
//! let api = CachedApi::new(HttpExperimentApi::new(&config)?, BaselineCache::from_config(&config));
//! let service = LaunchService::new(api);
//!
//! let mut wizard = Wizard::new();
//! service.refresh_availability(&mut wizard).await?;
//! ```

#![warn(unreachable_pub)]
#![allow(missing_docs)]

pub mod api;
pub mod cache;
pub mod config;
pub mod error;
pub mod http;
pub mod launch;

pub use api::{BaselineKey, ContentItem, CreatedTest, ExperimentApi};
pub use cache::{BaselineCache, CachedApi};
pub use config::ClientConfig;
pub use error::{ApiError, LaunchError};
pub use http::HttpExperimentApi;
pub use launch::LaunchService;

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
