//! Subcommand implementations
//!
//! Each command writes its report to the supplied writer and returns an
//! [`Outcome`]; transport and I/O failures come back as errors.

pub mod active;
pub mod launch;
pub mod preview;
pub mod reach;
pub mod validate;

use std::process::ExitCode;

/// How a command finished
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    /// Did what was asked
    Success,
    /// Ran, but the result is a refusal (not ready, blocked)
    Refused,
}

impl From<Outcome> for ExitCode {
    fn from(outcome: Outcome) -> Self {
        match outcome {
            Outcome::Success => ExitCode::SUCCESS,
            Outcome::Refused => ExitCode::from(1),
        }
    }
}
