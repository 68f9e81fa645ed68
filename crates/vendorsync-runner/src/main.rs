/*
[INPUT]:  CLI arguments, YAML configuration file, OS shutdown signals
[OUTPUT]: One verification run (or status watch) against the bridge
[POS]:    Binary entry point
[UPDATE]: When changing CLI flags, startup flow, or shutdown handling
*/

use anyhow::{Context, Result, anyhow, bail};
use clap::Parser;
use serde_json::Value;
use std::collections::BTreeMap;
use std::path::PathBuf;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use vendorsync_gateway::BridgeClient;
use vendorsync_runner::{PollSnapshot, RunPhase, RunnerConfig, StatusPoller, StepStatus, TaskRunner};

#[derive(Parser, Debug)]
#[command(name = "vendorsync-runner", version, about = "Marketplace bridge verification runner")]
struct Cli {
    #[arg(long = "config", value_name = "PATH")]
    config_path: PathBuf,
    #[arg(long = "base-url", value_name = "URL")]
    base_url: Option<String>,
    #[arg(long = "log-level", value_name = "LEVEL", default_value = "info")]
    log_level: String,
    #[arg(long = "dry-run")]
    dry_run: bool,
    /// Watch the long-running sync job instead of running the sequence
    #[arg(long = "watch")]
    watch: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Cli::parse();
    init_tracing(&args.log_level)?;

    info!(
        config_path = %args.config_path.display(),
        dry_run = args.dry_run,
        "starting vendorsync-runner"
    );

    let config = load_config(&args.config_path)?;
    info!(step_count = config.sequence.len(), "configuration loaded");

    if args.dry_run {
        info!("dry-run requested; configuration validated");
        return Ok(());
    }

    let base_url = args
        .base_url
        .or_else(|| config.bridge_url.clone())
        .context("no bridge URL; pass --base-url or set bridge_url in the config")?;
    let client = BridgeClient::new(&base_url).context("create bridge client")?;

    let shutdown = CancellationToken::new();
    setup_signal_handlers(shutdown.clone());

    if args.watch {
        return watch_job(client, &config, shutdown).await;
    }

    run_sequence(client, &config, shutdown).await
}

async fn run_sequence(
    client: BridgeClient,
    config: &RunnerConfig,
    shutdown: CancellationToken,
) -> Result<()> {
    let runner = TaskRunner::new(client, config.interval())
        .with_fixed_params(config.fixed_params.clone());

    let mut snapshots = runner.subscribe();
    let observer = tokio::spawn(async move {
        while snapshots.changed().await.is_ok() {
            let snapshot = snapshots.borrow_and_update().clone();
            for step in &snapshot.steps {
                if step.status == StepStatus::Running {
                    info!(action = %step.task.action, message = %step.task.message, "in progress");
                }
            }
        }
    });

    let phase = runner.start(&config.tasks(), shutdown).await;
    observer.abort();

    match phase {
        RunPhase::Succeeded => {
            info!("all steps succeeded");
            Ok(())
        }
        RunPhase::Cancelled => bail!("run cancelled"),
        _ => bail!("run failed; see step log above"),
    }
}

async fn watch_job(
    client: BridgeClient,
    config: &RunnerConfig,
    shutdown: CancellationToken,
) -> Result<()> {
    let params = status_params(&config.fixed_params);
    let status = client
        .fetch_status(&params)
        .await
        .context("initial status fetch")?;
    if !status.running {
        info!("no sync job is running");
        return Ok(());
    }

    let poller = StatusPoller::new(client, config.poll_interval()).with_params(params);
    let handle = poller.spawn(PollSnapshot::activated(status.status));

    let mut snapshots = handle.subscribe();
    loop {
        tokio::select! {
            _ = shutdown.cancelled() => {
                info!("shutdown requested; stopping watch");
                handle.stop().await;
                return Ok(());
            }
            changed = snapshots.changed() => {
                if changed.is_err() {
                    // Poller exited; the job went inactive.
                    info!("sync job finished");
                    return Ok(());
                }
                let snapshot = snapshots.borrow_and_update().clone();
                for entry in &snapshot.entries {
                    info!(
                        action = %entry.action,
                        current = entry.current,
                        total = entry.total,
                        "sync progress"
                    );
                }
                if !snapshot.active {
                    info!("sync job finished");
                    return Ok(());
                }
            }
        }
    }
}

fn status_params(fixed_params: &BTreeMap<String, Value>) -> Vec<(String, String)> {
    fixed_params
        .iter()
        .map(|(key, value)| {
            let rendered = match value {
                Value::String(text) => text.clone(),
                other => other.to_string(),
            };
            (key.clone(), rendered)
        })
        .collect()
}

fn init_tracing(log_level: &str) -> Result<()> {
    let filter = EnvFilter::try_new(log_level).context("invalid log level")?;
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .try_init()
        .map_err(|err| anyhow!(err))
        .context("initialize tracing subscriber")?;
    Ok(())
}

fn load_config(path: &PathBuf) -> Result<RunnerConfig> {
    let path_str = path.to_str().context("config path must be valid utf-8")?;
    RunnerConfig::from_file(path_str).context("load config")
}

fn setup_signal_handlers(shutdown: CancellationToken) {
    let shutdown_clone = shutdown.clone();
    tokio::spawn(async move {
        if let Err(err) = tokio::signal::ctrl_c().await {
            warn!(error = %err, "failed to install SIGINT handler");
            return;
        }
        info!("received SIGINT");
        shutdown_clone.cancel();
    });

    #[cfg(unix)]
    {
        use tokio::signal::unix::{SignalKind, signal};

        tokio::spawn(async move {
            match signal(SignalKind::terminate()) {
                Ok(mut stream) => {
                    stream.recv().await;
                    info!("received SIGTERM");
                    shutdown.cancel();
                }
                Err(err) => {
                    warn!(error = %err, "failed to install SIGTERM handler");
                }
            }
        });
    }
}
