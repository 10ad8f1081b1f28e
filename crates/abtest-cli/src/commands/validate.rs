//! `abtest validate`

use super::Outcome;
use abtest_client::LaunchError;
use abtest_core::{ReviewSummary, Wizard};
use abtest_model::TestConfiguration;
use anyhow::Context;
use serde::Serialize;
use std::fs;
use std::io::Write;
use std::path::Path;

/// Launch gate verdict for a stored configuration
#[derive(Debug, Clone, Serialize)]
pub struct Validation {
    pub summary: ReviewSummary,
    /// Everything that would refuse the launch, as shown to the user
    pub blocking: Vec<String>,
}

impl Validation {
    #[inline]
    #[must_use]
    pub fn is_launchable(&self) -> bool {
        self.blocking.is_empty()
    }
}

/// Check a configuration document
///
/// # Errors
/// Fails if the JSON does not describe a configuration at all; launch-gate
/// problems are reported in the result instead
pub fn validate_document(json: &str) -> anyhow::Result<Validation> {
    let config = TestConfiguration::from_json(json).context("not a valid test configuration")?;
    let wizard = Wizard::resume(config).context("variants do not form a valid set")?;

    let blocking = match wizard.submission() {
        Ok(_) => Vec::new(),
        Err(err) => LaunchError::from(err).blocking_reasons(),
    };

    Ok(Validation {
        summary: wizard.review(),
        blocking,
    })
}

/// Human-readable report
///
/// # Errors
/// Propagates write failures
pub fn render(validation: &Validation, out: &mut impl Write) -> std::io::Result<()> {
    let summary = &validation.summary;
    writeln!(out, "{} ({}, {} variants)", summary.name, summary.test_type, summary.variant_count)?;
    writeln!(out, "reach: {} at {}% allocation", summary.reach, summary.allocation.get())?;

    for warning in &summary.warnings {
        writeln!(out, "warning: {warning}")?;
    }

    if validation.is_launchable() {
        writeln!(out, "ready to launch")?;
    } else {
        writeln!(out, "not ready:")?;
        for reason in &validation.blocking {
            writeln!(out, "  - {reason}")?;
        }
    }
    Ok(())
}

/// Run the command
///
/// # Errors
/// Fails on unreadable or malformed input
pub fn run(path: &Path, json: bool, out: &mut impl Write) -> anyhow::Result<Outcome> {
    let text = fs::read_to_string(path).with_context(|| format!("reading {}", path.display()))?;
    let validation = validate_document(&text)?;

    if json {
        serde_json::to_writer_pretty(&mut *out, &validation)?;
        writeln!(out)?;
    } else {
        render(&validation, out)?;
    }

    Ok(if validation.is_launchable() {
        Outcome::Success
    } else {
        Outcome::Refused
    })
}
