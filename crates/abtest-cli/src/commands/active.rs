//! `abtest active`

use super::Outcome;
use abtest_client::ExperimentApi;
use abtest_model::ActiveTest;
use anyhow::Context;
use std::io::Write;

fn targets(test: &ActiveTest) -> String {
    if !test.target_segments.is_empty() {
        return test
            .target_segments
            .iter()
            .map(ToString::to_string)
            .collect::<Vec<_>>()
            .join(", ");
    }
    format!(
        "{}/{}",
        test.target_persona.map_or("all", |p| p.as_str()),
        test.target_funnel_stage.map_or("all", |s| s.as_str()),
    )
}

/// Print one block per running test
///
/// # Errors
/// Propagates write failures
pub fn render(tests: &[ActiveTest], out: &mut impl Write) -> std::io::Result<()> {
    if tests.is_empty() {
        return writeln!(out, "no active tests");
    }
    for test in tests {
        writeln!(out, "{}  {} [{}] -> {}", test.id, test.name, test.test_type, targets(test))?;
        for variant in &test.variants {
            let marker = if variant.is_control { " (control)" } else { "" };
            writeln!(out, "    {}  {}{marker}", variant.id, variant.name)?;
        }
    }
    Ok(())
}

/// Run the command
///
/// # Errors
/// Fails when the backend call fails
pub async fn run<A: ExperimentApi>(
    api: &A,
    json: bool,
    out: &mut impl Write,
) -> anyhow::Result<Outcome> {
    let tests = api.active_tests().await.context("listing active tests")?;
    if json {
        serde_json::to_writer_pretty(&mut *out, &tests)?;
        writeln!(out)?;
    } else {
        render(&tests, out)?;
    }
    Ok(Outcome::Success)
}
