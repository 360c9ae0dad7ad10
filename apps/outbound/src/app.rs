//! Wires configuration, hosts and the build environment into a publish run.

use std::sync::Arc;

use anyhow::Context;
use chrono::{DateTime, NaiveDateTime, Utc};
use outbound_config::constants::{ENV_BUILD_NUMBER, ENV_JOB_NAME};
use outbound_publish::{HostTable, PublishOutcome};
use outbound_transfer::{BuildContext, ConsoleSink, EnvVars, StdoutConsole};

use crate::args::Args;
use crate::config::AppConfig;
use crate::local::LocalFactory;

const CONSOLE_PREFIX: &str = "OUTBOUND: ";

/// Runs one publish as described by `args`, printing to stdout.
pub async fn run(args: Args) -> anyhow::Result<PublishOutcome> {
    let env: EnvVars = std::env::vars().collect();
    publish(args, env, Arc::new(StdoutConsole)).await
}

/// Runs one publish with an explicit environment and console.
pub async fn publish(
    args: Args,
    env: EnvVars,
    console: Arc<dyn ConsoleSink>,
) -> anyhow::Result<PublishOutcome> {
    let mut config = AppConfig::load(&args.config)
        .with_context(|| format!("loading {}", args.config.display()))?;
    if args.verbose {
        for publisher in &mut config.publish.publishers {
            publisher.verbose = true;
        }
    }

    let mut hosts = HostTable::new();
    for local in config.hosts {
        tracing::debug!(host = %local.host.name, root = %local.root.display(), "host registered");
        hosts.register(Arc::new(LocalFactory::new(local.host, local.root)))?;
    }

    let build_time = match args.build_time.as_deref() {
        Some(value) => parse_build_time(value)?,
        None => Utc::now().naive_utc(),
    };
    let base_dir = std::path::absolute(&args.base_dir)
        .with_context(|| format!("resolving {}", args.base_dir.display()))?;

    tracing::info!(
        job = env.get(ENV_JOB_NAME).map(String::as_str).unwrap_or("-"),
        build = env.get(ENV_BUILD_NUMBER).map(String::as_str).unwrap_or("-"),
        base_dir = %base_dir.display(),
        %build_time,
        hosts = hosts.len(),
        "publishing"
    );

    let mut ctx = BuildContext::new(env, base_dir, build_time, console);
    ctx.console_prefix = CONSOLE_PREFIX.to_string();

    Ok(outbound_publish::run(&config.publish, &hosts, &ctx).await)
}

/// Accepts RFC 3339 (converted to UTC) or a naive `YYYY-MM-DDTHH:MM:SS`
/// timestamp, with `T` or a space between date and time.
pub fn parse_build_time(value: &str) -> anyhow::Result<NaiveDateTime> {
    let value = value.trim();
    if let Ok(time) = DateTime::parse_from_rfc3339(value) {
        return Ok(time.naive_utc());
    }
    ["%Y-%m-%dT%H:%M:%S", "%Y-%m-%d %H:%M:%S"]
        .iter()
        .find_map(|format| NaiveDateTime::parse_from_str(value, format).ok())
        .with_context(|| format!("invalid build time '{value}'"))
}
