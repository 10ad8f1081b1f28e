//! Logging setup
//!
//! `RUST_LOG` wins when set; otherwise the configured level applies with
//! HTTP internals held at `warn`. Logs go to stderr so command output on
//! stdout stays pipeable.

use crate::config::{ConfigError, LogConfig};
use tracing_subscriber::filter::EnvFilter;
use tracing_subscriber::fmt;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

const QUIET_TARGETS: [&str; 3] = ["hyper=warn", "hyper_util=warn", "reqwest=warn"];

/// Filter for the given configuration
///
/// # Errors
/// Returns [`ConfigError::LogFilter`] if the configured level does not parse
pub fn build_filter(config: &LogConfig) -> Result<EnvFilter, ConfigError> {
    if let Ok(filter) = EnvFilter::try_from_default_env() {
        return Ok(filter);
    }

    let mut filter = EnvFilter::try_new(&config.level)
        .map_err(|_| ConfigError::LogFilter(config.level.clone()))?;
    for directive in QUIET_TARGETS {
        let directive = directive
            .parse()
            .map_err(|_| ConfigError::LogFilter(directive.to_string()))?;
        filter = filter.add_directive(directive);
    }
    Ok(filter)
}

/// Install the global subscriber
///
/// A subscriber installed earlier (tests, embedding) is left in place.
///
/// # Errors
/// Returns [`ConfigError::LogFilter`] for an unparsable level
pub fn init_logging(config: &LogConfig) -> Result<(), ConfigError> {
    let filter = build_filter(config)?;
    let registry = tracing_subscriber::registry().with(filter);

    let installed = if config.json {
        registry
            .with(fmt::layer().json().with_writer(std::io::stderr))
            .try_init()
    } else {
        registry
            .with(fmt::layer().compact().with_writer(std::io::stderr))
            .try_init()
    };

    if installed.is_err() {
        tracing::debug!("global subscriber already set");
    }
    Ok(())
}
