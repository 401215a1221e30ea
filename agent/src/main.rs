//! tasksync-agent - keeps a Todoist task list in sync from the desktop
//!
//! Hosts the sans-IO sync engine: the scheduler decides when to talk to the
//! API, this binary does the actual HTTP with ureq and prints what is due.

use anyhow::{Context, Result};
use chrono::Local;
use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};
use tasksync_core::{Outbound, SyncConfig, SyncScheduler, Uptime};
use tracing::{info, warn};

mod render;
mod transport;

#[derive(Parser)]
#[command(name = "tasksync-agent")]
#[command(about = "Keep a Todoist task snapshot in sync")]
#[command(version)]
struct Cli {
    /// Config file path (default: <config dir>/tasksync/config.toml)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// API token (overrides config)
    #[arg(long, env = "TODOIST_API_KEY", hide_env_values = true, global = true)]
    api_key: Option<String>,

    /// API base URL (overrides config)
    #[arg(long, global = true)]
    base_url: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Poll the API on the configured interval and log what is due
    Run {
        /// Polling interval in seconds (overrides config)
        #[arg(short, long)]
        interval: Option<u64>,
    },

    /// Fetch once and print overdue, today and tomorrow
    List,

    /// Mark a task as completed
    Complete {
        /// Task id as shown by `list`
        id: String,
    },
}

/// Monotonic seconds since start, wrapping like a device uptime counter.
struct Clock(Instant);

impl Clock {
    fn now(&self) -> Uptime {
        Uptime(self.0.elapsed().as_secs() as u32)
    }
}

fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join("tasksync").join("config.toml"))
}

fn load_config(path: Option<&Path>) -> Result<SyncConfig> {
    if let Some(path) = path {
        return SyncConfig::load_from(path)
            .with_context(|| format!("loading config from {}", path.display()));
    }
    match default_config_path() {
        Some(path) if path.exists() => SyncConfig::load_from(&path)
            .with_context(|| format!("loading config from {}", path.display())),
        _ => Ok(SyncConfig::default()),
    }
}

/// Execute `next` and every follow-up request it leads to.
async fn drive(scheduler: &mut SyncScheduler, clock: &Clock, mut next: Option<Outbound>) {
    while let Some(out) = next.take() {
        let outcome = transport::execute(out.request).await;
        next = scheduler.handle_response(out.id, outcome, clock.now());
    }
}

fn report_notices(scheduler: &mut SyncScheduler) -> usize {
    let notices = scheduler.take_notices();
    for notice in &notices {
        warn!(task_id = %notice.task_id, message = %notice.message, "completion failed");
    }
    notices.len()
}

async fn run(cfg: SyncConfig) -> Result<()> {
    let clock = Clock(Instant::now());
    let mut scheduler = SyncScheduler::new(cfg.client(), cfg.scheduler_config());
    let mut ticker = tokio::time::interval(Duration::from_secs(1));
    let mut last_shown = None;

    info!(
        base_url = %cfg.base_url,
        interval_secs = cfg.update_interval_secs,
        "agent started"
    );

    loop {
        tokio::select! {
            _ = ticker.tick() => {}
            _ = tokio::signal::ctrl_c() => {
                info!("shutting down");
                return Ok(());
            }
        }

        let out = scheduler.tick(clock.now());
        drive(&mut scheduler, &clock, out).await;
        report_notices(&mut scheduler);

        let snapshot = scheduler.snapshot();
        let key = (snapshot.fetched_at, snapshot.status.clone());
        if last_shown.as_ref() != Some(&key) {
            let buckets = snapshot.buckets(Local::now().naive_local(), cfg.bucket_cap);
            info!("\n{}", render::render(&snapshot, &buckets));
            last_shown = Some(key);
        }
    }
}

async fn list(cfg: SyncConfig) -> Result<()> {
    let clock = Clock(Instant::now());
    let mut scheduler = SyncScheduler::new(cfg.client(), cfg.scheduler_config());

    let out = scheduler.trigger_refresh(clock.now());
    drive(&mut scheduler, &clock, out).await;

    let snapshot = scheduler.snapshot();
    let buckets = snapshot.buckets(Local::now().naive_local(), cfg.bucket_cap);
    print!("{}", render::render(&snapshot, &buckets));
    Ok(())
}

async fn complete(cfg: SyncConfig, id: &str) -> Result<()> {
    let clock = Clock(Instant::now());
    let mut scheduler = SyncScheduler::new(cfg.client(), cfg.scheduler_config());

    let out = scheduler.complete(id);
    drive(&mut scheduler, &clock, out).await;

    if let Some(notice) = scheduler.take_notices().into_iter().next() {
        anyhow::bail!("failed to complete {}: {}", notice.task_id, notice.message);
    }
    println!("Completed {id}");
    println!("{}", render::status_line(&scheduler.snapshot()));
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                tracing_subscriber::EnvFilter::new("tasksync_agent=info,tasksync_core=info")
            }),
        )
        .init();

    let cli = Cli::parse();

    let mut cfg = load_config(cli.config.as_deref())?;
    if let Some(key) = cli.api_key {
        cfg.api_key = Some(key);
    }
    if let Some(url) = cli.base_url {
        cfg.base_url = url;
    }
    if cfg.api_key.as_deref().unwrap_or("").is_empty() {
        warn!("no API key configured; set TODOIST_API_KEY or api_key in the config file");
    }

    match cli.command {
        Commands::Run { interval } => {
            if let Some(secs) = interval {
                cfg.update_interval_secs = secs;
            }
            run(cfg).await
        }
        Commands::List => list(cfg).await,
        Commands::Complete { id } => complete(cfg, &id).await,
    }
}
