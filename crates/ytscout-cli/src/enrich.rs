//! `enrich` command: fill the ViewStats analytics columns row by row.
//!
//! Rows are processed one at a time with a random pause between them. The
//! table is checkpointed every `save_every` rows and saved once more when the
//! run ends, whether it finished, was interrupted with Ctrl-C, or failed.

use std::future::Future;
use std::time::Duration;

use anyhow::Context;
use rand::Rng;
use ytscout_core::AppConfig;
use ytscout_store::ChannelTable;
use ytscout_viewstats::ViewStatsClient;

#[derive(Debug, Clone, Copy)]
pub(crate) struct EnrichSettings {
    pub delay_min_ms: u64,
    pub delay_max_ms: u64,
    pub save_every: usize,
}

impl EnrichSettings {
    fn from_config(config: &AppConfig) -> Self {
        Self {
            delay_min_ms: config.enrich_delay_min_ms,
            delay_max_ms: config.enrich_delay_max_ms,
            save_every: config.enrich_save_every.max(1),
        }
    }

    fn next_delay(&self) -> Duration {
        let (lo, hi) = if self.delay_min_ms <= self.delay_max_ms {
            (self.delay_min_ms, self.delay_max_ms)
        } else {
            (self.delay_max_ms, self.delay_min_ms)
        };
        Duration::from_millis(rand::rng().random_range(lo..=hi))
    }
}

#[derive(Debug, Default, PartialEq, Eq)]
pub(crate) struct EnrichStats {
    pub processed: usize,
    pub successful: usize,
    pub failed: usize,
    pub interrupted: bool,
}

/// Handle the `enrich` command end to end.
///
/// # Errors
///
/// Returns an error if the table does not exist or cannot be read, the
/// client cannot be built, or a save fails. Per-channel failures are
/// recorded in the row and do not abort the run.
pub(crate) async fn run_enrich(
    config: &AppConfig,
    limit: Option<usize>,
    yes: bool,
) -> anyhow::Result<()> {
    let mut table = ChannelTable::load(&config.database_csv).with_context(|| {
        format!(
            "cannot enrich: run `ytscout discover` first to create {}",
            config.database_csv.display()
        )
    })?;

    let mut pending = table.pending_enrichment();
    let total_pending = pending.len();
    if let Some(limit) = limit {
        pending.truncate(limit);
    }
    if pending.is_empty() {
        println!("All {} channels already have ViewStats data.", table.len());
        return Ok(());
    }

    println!(
        "{total_pending} of {} channels need ViewStats data; processing {}",
        table.len(),
        pending.len()
    );
    if !yes && !crate::confirm("Continue?")? {
        println!("Operation cancelled.");
        return Ok(());
    }

    let mut client = ViewStatsClient::new(&config.viewstats_base_url, config.request_timeout_secs)
        .map_err(|e| anyhow::anyhow!("failed to build ViewStats client: {e}"))?
        .with_retry_policy(config.max_retries, config.retry_backoff_base_ms);
    if let Some(url) = config.browserless_url.as_deref() {
        client = client.with_renderer(url, config.browserless_token.as_deref());
    } else {
        tracing::warn!(
            "VIEWSTATS_BROWSERLESS_URL is not set; fetching pages directly, client-rendered figures may be missing"
        );
    }

    let shutdown = async {
        if tokio::signal::ctrl_c().await.is_err() {
            std::future::pending::<()>().await;
        }
    };
    let stats = enrich_rows(
        &client,
        &mut table,
        &pending,
        EnrichSettings::from_config(config),
        shutdown,
    )
    .await?;

    println!();
    if stats.interrupted {
        println!("Interrupted; progress saved.");
    }
    println!("Enrichment summary");
    println!("  Processed:        {}", stats.processed);
    println!("  Successful:       {}", stats.successful);
    println!("  Failed/no page:   {}", stats.failed);
    println!("  Saved to:         {}", table.path().display());
    Ok(())
}

/// Enrich the rows at `indices`, stopping early when `shutdown` resolves.
///
/// # Errors
///
/// Returns an error if a checkpoint or the final save fails. The final save
/// is attempted even when the loop itself failed.
pub(crate) async fn enrich_rows<S>(
    client: &ViewStatsClient,
    table: &mut ChannelTable,
    indices: &[usize],
    settings: EnrichSettings,
    shutdown: S,
) -> anyhow::Result<EnrichStats>
where
    S: Future<Output = ()>,
{
    let mut stats = EnrichStats::default();
    let total = indices.len();
    tokio::pin!(shutdown);

    let result: anyhow::Result<()> = async {
        for (n, &index) in indices.iter().enumerate() {
            let Some(row) = table.get(index) else {
                tracing::warn!(index, "row vanished from table, skipping");
                continue;
            };
            let username = row.username.clone();
            let channel_url = row.channel_url.clone();
            tracing::info!(n = n + 1, total, %username, "enriching channel");

            let outcome = tokio::select! {
                biased;
                () = &mut shutdown => {
                    stats.interrupted = true;
                    break;
                }
                outcome = client.scrape_channel(&username, &channel_url) => outcome,
            };

            if outcome.is_success() {
                stats.successful += 1;
            } else {
                stats.failed += 1;
            }
            table.apply_analytics(index, outcome.analytics)?;
            stats.processed += 1;

            if stats.processed % settings.save_every.max(1) == 0 {
                table.save()?;
                tracing::info!(processed = stats.processed, "checkpoint saved");
            }

            if n + 1 < total {
                let delay = settings.next_delay();
                tokio::select! {
                    biased;
                    () = &mut shutdown => {
                        stats.interrupted = true;
                        break;
                    }
                    () = tokio::time::sleep(delay) => {}
                }
            }
        }
        Ok(())
    }
    .await;

    if stats.interrupted {
        tracing::warn!(processed = stats.processed, "interrupted, saving progress");
    }
    let saved = table.save();
    result?;
    saved?;
    tracing::info!(
        processed = stats.processed,
        successful = stats.successful,
        failed = stats.failed,
        "enrichment finished"
    );
    Ok(stats)
}

#[cfg(test)]
#[path = "enrich_test.rs"]
mod tests;
