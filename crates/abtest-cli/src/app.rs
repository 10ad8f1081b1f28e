//! Argument resolution and dispatch

use crate::commands::preview::PreviewCommand;
use crate::commands::reach::ReachRequest;
use crate::commands::{active, launch, preview, reach, validate, Outcome};
use crate::config::AdminConfig;
use crate::logging::init_logging;
use abtest_client::{BaselineCache, CachedApi, HttpExperimentApi, LaunchService};
use abtest_model::{FunnelStage, Persona, SegmentKey, TestId, VariantId};
use abtest_preview::{FileStore, PreviewSession};
use anyhow::{anyhow, Context};
use clap::ArgMatches;
use std::io::Write;
use std::path::PathBuf;
use tracing::debug;

/// Configuration from file, environment, then global flags
///
/// # Errors
/// Fails when the configuration file cannot be read or parsed
pub fn resolve_config(matches: &ArgMatches) -> anyhow::Result<AdminConfig> {
    let path = matches.get_one::<PathBuf>("config");
    let mut config = AdminConfig::load(path.map(PathBuf::as_path))?;

    if let Some(url) = matches.get_one::<String>("api-url") {
        config = config.with_api_url(url.clone());
    }
    if let Some(level) = matches.get_one::<String>("log-level") {
        config = config.with_log_level(level.clone());
    }
    if matches.get_flag("json-logs") {
        config = config.with_json_logs(true);
    }
    Ok(config)
}

fn api(config: &AdminConfig) -> anyhow::Result<CachedApi<HttpExperimentApi>> {
    let http = HttpExperimentApi::new(&config.api).context("configuring admin API client")?;
    Ok(CachedApi::new(http, BaselineCache::from_config(&config.api)))
}

fn file(matches: &ArgMatches) -> anyhow::Result<&PathBuf> {
    matches
        .get_one::<PathBuf>("file")
        .ok_or_else(|| anyhow!("missing file argument"))
}

fn preview_command(matches: &ArgMatches) -> anyhow::Result<PreviewCommand> {
    Ok(match matches.subcommand() {
        Some(("show", _)) => PreviewCommand::Show,
        Some(("reset", _)) => PreviewCommand::Reset,
        Some(("set", args)) => PreviewCommand::Set {
            persona: args.get_one::<Option<Persona>>("persona").copied(),
            stage: args.get_one::<Option<FunnelStage>>("stage").copied(),
        },
        Some(("force", args)) => PreviewCommand::Force {
            test: args
                .get_one::<TestId>("test")
                .cloned()
                .ok_or_else(|| anyhow!("missing test id"))?,
            variant: args
                .get_one::<VariantId>("variant")
                .cloned()
                .ok_or_else(|| anyhow!("missing variant id"))?,
        },
        Some(("unforce", args)) => PreviewCommand::Unforce {
            test: args
                .get_one::<TestId>("test")
                .cloned()
                .ok_or_else(|| anyhow!("missing test id"))?,
        },
        _ => return Err(anyhow!("unknown preview command")),
    })
}

/// Run a parsed invocation with an already resolved configuration
///
/// # Errors
/// Propagates command failures
pub async fn dispatch(
    matches: &ArgMatches,
    config: &AdminConfig,
    out: &mut impl Write,
) -> anyhow::Result<Outcome> {
    match matches.subcommand() {
        Some(("validate", args)) => validate::run(file(args)?, args.get_flag("json"), out),
        Some(("reach", args)) => {
            let request = ReachRequest {
                persona: args.get_one::<Option<Persona>>("persona").copied().flatten(),
                stage: args.get_one::<Option<FunnelStage>>("stage").copied().flatten(),
                segments: args
                    .get_many::<SegmentKey>("segment")
                    .map(|keys| keys.copied().collect())
                    .unwrap_or_default(),
                allocation: args.get_one::<u8>("allocation").copied().unwrap_or(100),
            };
            reach::run(&request, out)
        }
        Some(("launch", args)) => {
            let service = LaunchService::new(api(config)?);
            launch::run(&service, file(args)?, out).await
        }
        Some(("active", args)) => active::run(&api(config)?, args.get_flag("json"), out).await,
        Some(("preview", args)) => {
            let command = preview_command(args)?;
            let store = FileStore::new(&config.preview.session_file);
            debug!(path = %store.path().display(), "preview session store");
            let mut session = PreviewSession::new(store);
            preview::run(command, &mut session, &api(config)?, out).await
        }
        _ => Err(anyhow!("unknown command")),
    }
}

/// Resolve configuration, install logging, run the command
///
/// # Errors
/// Propagates configuration and command failures
pub async fn run(matches: &ArgMatches, out: &mut impl Write) -> anyhow::Result<Outcome> {
    let config = resolve_config(matches)?;
    init_logging(&config.log)?;
    debug!(api = %config.api.base_url, "configuration resolved");
    dispatch(matches, &config, out).await
}
