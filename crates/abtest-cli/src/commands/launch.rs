//! `abtest launch`

use super::Outcome;
use abtest_client::{ExperimentApi, LaunchService};
use abtest_core::Wizard;
use abtest_model::TestConfiguration;
use anyhow::Context;
use std::fs;
use std::io::Write;
use std::path::Path;
use tracing::info;

/// Check content availability, pass the launch gate, submit
///
/// Segments that lost their content, and launch-gate refusals, are reported
/// and end in [`Outcome::Refused`] without submitting.
///
/// # Errors
/// Fails on unreadable input or when the backend call fails
pub async fn run<A: ExperimentApi>(
    service: &LaunchService<A>,
    path: &Path,
    out: &mut impl Write,
) -> anyhow::Result<Outcome> {
    let text = fs::read_to_string(path).with_context(|| format!("reading {}", path.display()))?;
    let config = TestConfiguration::from_json(&text).context("not a valid test configuration")?;
    let mut wizard = Wizard::resume(config).context("variants do not form a valid set")?;

    let dropped = service
        .refresh_availability(&mut wizard)
        .await
        .context("loading segment availability")?;
    if !dropped.is_empty() {
        writeln!(out, "not launched; targeted segments without content:")?;
        for key in dropped {
            writeln!(out, "  - {key}")?;
        }
        return Ok(Outcome::Refused);
    }

    match service.launch(&mut wizard).await {
        Ok(created) => {
            info!(test = %created.id, "launched from {}", path.display());
            writeln!(out, "created test {} ({})", created.id, created.status)?;
            Ok(Outcome::Success)
        }
        Err(err) => {
            let reasons = err.blocking_reasons();
            if reasons.is_empty() {
                return Err(err).context("submitting test");
            }
            writeln!(out, "not launched:")?;
            for reason in reasons {
                writeln!(out, "  - {reason}")?;
            }
            Ok(Outcome::Refused)
        }
    }
}
