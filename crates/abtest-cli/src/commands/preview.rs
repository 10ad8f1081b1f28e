//! `abtest preview`

use super::Outcome;
use abtest_client::ExperimentApi;
use abtest_model::{FunnelStage, Persona, TestId, VariantId};
use abtest_preview::{PreviewOverrides, PreviewSession, SessionStore};
use anyhow::{bail, Context};
use std::io::Write;

/// Preview subcommand
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PreviewCommand {
    Show,
    /// Outer `None` leaves the value alone; inner `None` clears it
    Set {
        persona: Option<Option<Persona>>,
        stage: Option<Option<FunnelStage>>,
    },
    Force { test: TestId, variant: VariantId },
    Unforce { test: TestId },
    Reset,
}

/// Human-readable overrides
///
/// # Errors
/// Propagates write failures
pub fn render(overrides: &PreviewOverrides, out: &mut impl Write) -> std::io::Result<()> {
    writeln!(out, "persona: {}", overrides.persona.map_or("visitor's own", Persona::as_str))?;
    writeln!(out, "stage:   {}", overrides.stage.map_or("visitor's own", FunnelStage::as_str))?;
    for (test, variant) in &overrides.forced_variants {
        writeln!(out, "forced:  {test} -> {variant}")?;
    }
    match overrides.applied_at {
        Some(at) => writeln!(out, "applied: {}", at.to_rfc3339()),
        None => writeln!(out, "applied: never"),
    }
}

/// Load the session, perform the edit, apply
///
/// # Errors
/// Fails on store errors, unknown tests or variants, and backend failures
pub async fn run<S, A>(
    command: PreviewCommand,
    session: &mut PreviewSession<S>,
    api: &A,
    out: &mut impl Write,
) -> anyhow::Result<Outcome>
where
    S: SessionStore,
    A: ExperimentApi,
{
    session.load().context("loading preview session")?;

    match command {
        PreviewCommand::Show => {
            render(session.applied(), out)?;
            return Ok(Outcome::Success);
        }
        PreviewCommand::Reset => {
            session.reset().context("clearing preview session")?;
            writeln!(out, "preview overrides cleared")?;
            return Ok(Outcome::Success);
        }
        PreviewCommand::Set { persona, stage } => {
            if let Some(persona) = persona {
                session.set_persona(persona);
            }
            if let Some(stage) = stage {
                session.set_stage(stage);
            }
        }
        PreviewCommand::Force { test, variant } => {
            let active = api.active_tests().await.context("listing active tests")?;
            let Some(running) = active.iter().find(|t| t.id == test) else {
                bail!("test {test} is not active");
            };
            session.force_variant(running, variant)?;
            for stale in session.retain_active(&active) {
                writeln!(out, "dropped override for finished test {stale}")?;
            }
        }
        PreviewCommand::Unforce { test } => {
            if session.unforce(&test).is_none() {
                writeln!(out, "test {test} was not forced")?;
                return Ok(Outcome::Success);
            }
        }
    }

    if session.is_dirty() {
        session.apply().context("saving preview session")?;
    }
    render(session.applied(), out)?;
    Ok(Outcome::Success)
}
