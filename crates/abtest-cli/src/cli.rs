//! Command-line surface

use abtest_model::{FunnelStage, ModelError, Persona, SegmentKey, TestId, VariantId};
use clap::{value_parser, Arg, ArgAction, Command};
use std::path::PathBuf;

/// Persona argument; `all` clears the override
///
/// # Errors
/// Returns [`ModelError::UnknownPersona`] for anything else unrecognised
pub fn parse_persona_choice(value: &str) -> Result<Option<Persona>, ModelError> {
    if value.eq_ignore_ascii_case("all") {
        Ok(None)
    } else {
        value.parse().map(Some)
    }
}

/// Stage argument; `all` clears the override
///
/// # Errors
/// Returns [`ModelError::UnknownFunnelStage`] for anything else unrecognised
pub fn parse_stage_choice(value: &str) -> Result<Option<FunnelStage>, ModelError> {
    if value.eq_ignore_ascii_case("all") {
        Ok(None)
    } else {
        value.parse().map(Some)
    }
}

fn file_arg(help: &'static str) -> Arg {
    Arg::new("file")
        .required(true)
        .value_parser(value_parser!(PathBuf))
        .help(help)
}

fn json_flag() -> Arg {
    Arg::new("json")
        .long("json")
        .action(ArgAction::SetTrue)
        .help("Output as JSON")
}

/// Full command tree
#[must_use]
pub fn build_cli() -> Command {
    Command::new("abtest")
        .version(env!("CARGO_PKG_VERSION"))
        .about("Validate, estimate and launch A/B test configurations")
        .subcommand_required(true)
        .arg_required_else_help(true)
        .arg(
            Arg::new("config")
                .long("config")
                .short('c')
                .global(true)
                .value_parser(value_parser!(PathBuf))
                .help("TOML configuration file"),
        )
        .arg(
            Arg::new("api-url")
                .long("api-url")
                .global(true)
                .help("Admin API base URL (overrides config and ABTEST_API_URL)"),
        )
        .arg(
            Arg::new("log-level")
                .long("log-level")
                .global(true)
                .help("Log filter when RUST_LOG is unset"),
        )
        .arg(
            Arg::new("json-logs")
                .long("json-logs")
                .global(true)
                .action(ArgAction::SetTrue)
                .help("Emit logs as JSON lines"),
        )
        .subcommand(
            Command::new("validate")
                .about("Check a test configuration against the launch gate")
                .arg(file_arg("TestConfiguration JSON file"))
                .arg(json_flag()),
        )
        .subcommand(
            Command::new("reach")
                .about("Estimate the share of visitors a targeting choice reaches")
                .arg(
                    Arg::new("persona")
                        .long("persona")
                        .value_parser(parse_persona_choice)
                        .conflicts_with("segment")
                        .help("Persona, or 'all'"),
                )
                .arg(
                    Arg::new("stage")
                        .long("stage")
                        .value_parser(parse_stage_choice)
                        .conflicts_with("segment")
                        .help("Funnel stage, or 'all'"),
                )
                .arg(
                    Arg::new("segment")
                        .long("segment")
                        .action(ArgAction::Append)
                        .value_parser(|s: &str| s.parse::<SegmentKey>())
                        .help("persona:stage pair (repeatable, selects multi-target mode)"),
                )
                .arg(
                    Arg::new("allocation")
                        .long("allocation")
                        .default_value("100")
                        .value_parser(value_parser!(u8).range(10..=100))
                        .help("Traffic allocation percent (10-100)"),
                ),
        )
        .subcommand(
            Command::new("launch")
                .about("Validate and submit a test configuration")
                .arg(file_arg("TestConfiguration JSON file")),
        )
        .subcommand(
            Command::new("active")
                .about("List tests currently serving traffic")
                .arg(json_flag()),
        )
        .subcommand(
            Command::new("preview")
                .about("Manage admin preview overrides")
                .subcommand_required(true)
                .subcommand(Command::new("show").about("Print applied overrides"))
                .subcommand(
                    Command::new("set")
                        .about("Preview as a persona and/or stage")
                        .arg(
                            Arg::new("persona")
                                .long("persona")
                                .value_parser(parse_persona_choice)
                                .help("Persona, or 'all'"),
                        )
                        .arg(
                            Arg::new("stage")
                                .long("stage")
                                .value_parser(parse_stage_choice)
                                .help("Funnel stage, or 'all'"),
                        ),
                )
                .subcommand(
                    Command::new("force")
                        .about("Pin a running test to one of its variants")
                        .arg(
                            Arg::new("test")
                                .required(true)
                                .value_parser(|s: &str| s.parse::<TestId>()),
                        )
                        .arg(
                            Arg::new("variant")
                                .required(true)
                                .value_parser(|s: &str| s.parse::<VariantId>()),
                        ),
                )
                .subcommand(
                    Command::new("unforce")
                        .about("Stop pinning a test")
                        .arg(
                            Arg::new("test")
                                .required(true)
                                .value_parser(|s: &str| s.parse::<TestId>()),
                        ),
                )
                .subcommand(Command::new("reset").about("Clear all preview overrides")),
        )
}
