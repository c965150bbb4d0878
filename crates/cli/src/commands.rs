//! Command implementations.
//!
//! Filesystem work runs on blocking tasks; the async side only handles
//! scheduling and shutdown.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{bail, Context, Result};
use chrono::{DateTime, Local, TimeDelta};
use tokio::task;
use tokio::time::{interval, MissedTickBehavior};
use tracing::{error, info, warn};

use strmsync_core::{LinkSynchronizer, SyncReport, SyncStatus, MAX_WATCH_INTERVAL_SECS};

use crate::manifest::{active_remote_urls, load_manifest};
use crate::shutdown_signal;

/// Runs `f` against the synchronizer on a blocking task.
async fn blocking<T, F>(sync: &Arc<LinkSynchronizer>, f: F) -> Result<T>
where
    T: Send + 'static,
    F: FnOnce(&LinkSynchronizer) -> T + Send + 'static,
{
    let sync = Arc::clone(sync);
    task::spawn_blocking(move || f(&sync))
        .await
        .context("Blocking task failed")
}

async fn sync_once(
    sync: &Arc<LinkSynchronizer>,
    manifest: PathBuf,
    dry_run: bool,
) -> Result<SyncReport> {
    let requests = load_manifest(&manifest)?;
    info!("Syncing {} items from {:?}", requests.len(), manifest);
    blocking(sync, move |s| s.sync_all(&requests, dry_run)).await
}

fn print_report(report: &SyncReport) {
    for result in &report.results {
        if let SyncStatus::Error { reason } = &result.status {
            println!("error   {}: {}", result.content_id, reason);
        }
    }
    println!(
        "{} items: {} created, {} updated, {} skipped, {} dry-run, {} errors ({} ms)",
        report.total(),
        report.created,
        report.updated,
        report.skipped,
        report.dry_run,
        report.errors,
        report.duration_ms
    );
}

pub async fn sync(sync: Arc<LinkSynchronizer>, manifest: PathBuf, dry_run: bool) -> Result<()> {
    let report = sync_once(&sync, manifest, dry_run).await?;
    print_report(&report);
    if report.has_errors() {
        bail!("{} of {} items failed", report.errors, report.total());
    }
    Ok(())
}

/// When the cycle after one started at `started` is due, if representable.
fn next_cycle(started: DateTime<Local>, interval_secs: u64) -> Option<DateTime<Local>> {
    let delta = TimeDelta::try_seconds(i64::try_from(interval_secs).ok()?)?;
    started.checked_add_signed(delta)
}

pub async fn watch(
    sync: Arc<LinkSynchronizer>,
    manifest: PathBuf,
    interval_secs: u64,
    dry_run: bool,
) -> Result<()> {
    if interval_secs == 0 {
        bail!("Watch interval must be greater than 0");
    }
    if interval_secs > MAX_WATCH_INTERVAL_SECS {
        bail!(
            "Watch interval of {}s exceeds the maximum of {}s",
            interval_secs,
            MAX_WATCH_INTERVAL_SECS
        );
    }
    let period = Duration::from_secs(interval_secs);
    let mut ticker = interval(period);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

    info!("Watching {:?} every {}s", manifest, interval_secs);
    let shutdown = shutdown_signal();
    tokio::pin!(shutdown);

    loop {
        tokio::select! {
            _ = &mut shutdown => {
                info!("Shutdown requested, stopping watch");
                return Ok(());
            }
            _ = ticker.tick() => {}
        }

        let started = Local::now();
        // A bad cycle (unreadable manifest, failed items) does not stop watching.
        match sync_once(&sync, manifest.clone(), dry_run).await {
            Ok(report) if report.has_errors() => {
                warn!("Cycle finished with {} errors", report.errors)
            }
            Ok(_) => {}
            Err(e) => error!("Sync cycle failed: {:#}", e),
        }

        let next = next_cycle(started, interval_secs)
            .map(|next| next.format("%Y-%m-%d %H:%M:%S").to_string())
            .unwrap_or_else(|| "unknown".to_string());
        info!(
            "Cycle started {} finished; next cycle at {}",
            started.format("%Y-%m-%d %H:%M:%S"),
            next
        );
    }
}

pub async fn scan(sync: Arc<LinkSynchronizer>, json: bool) -> Result<()> {
    let found = blocking(&sync, |s| s.scan()).await?;

    if json {
        let out = serde_json::to_string_pretty(&found).context("Failed to serialize scan")?;
        println!("{}", out);
        return Ok(());
    }

    for descriptor in &found {
        println!(
            "{}\t{}",
            descriptor.relative_path.display(),
            descriptor.remote_url().unwrap_or(descriptor.url.as_str())
        );
    }
    println!("{} link files", found.len());
    Ok(())
}

pub async fn delete(sync: Arc<LinkSynchronizer>, path: PathBuf) -> Result<()> {
    let target = path.clone();
    let result = blocking(&sync, move |s| s.delete(&target))
        .await?
        .with_context(|| format!("Failed to delete {:?}", path))?;

    println!("deleted {}", result.path.display());
    if let Some(parent) = result.removed_parent {
        println!("removed empty folder {}", parent.display());
    }
    Ok(())
}

pub async fn prune(sync: Arc<LinkSynchronizer>, manifest: PathBuf, dry_run: bool) -> Result<()> {
    let requests = load_manifest(&manifest)?;
    let active = active_remote_urls(&requests);
    let report = blocking(&sync, move |s| s.prune(&active, dry_run)).await?;

    let verb = if dry_run { "would delete" } else { "deleted" };
    for path in &report.removed {
        println!("{} {}", verb, path.display());
    }
    for (path, reason) in &report.failed {
        println!("failed  {}: {}", path.display(), reason);
    }
    println!("{} stale link files", report.removed.len() + report.failed.len());

    if !report.failed.is_empty() {
        bail!("{} stale link files could not be deleted", report.failed.len());
    }
    Ok(())
}
