//! A/B Test Admin CLI
//!
//! The `abtest` binary: validate configurations against the launch gate,
//! estimate reach, launch through the admin API, list running tests, and
//! manage admin preview overrides.
//!
//! # Example
//!
//! ```bash
//! abtest validate spring-hero.json
//! abtest reach --segment donor:decision --segment parent:decision --allocation 50
//! ABTEST_API_URL=https://admin.example.org abtest launch spring-hero.json
//! abtest preview set --persona donor --stage all
//! ```

#![warn(unreachable_pub)]
#![allow(missing_docs)]

pub mod app;
pub mod cli;
pub mod commands;
pub mod config;
pub mod logging;

pub use app::run;
pub use cli::build_cli;
pub use commands::Outcome;
pub use config::{AdminConfig, ConfigError};

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
