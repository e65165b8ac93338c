//! `discover` command: keyword search, dedupe against the table, filter,
//! append.
//!
//! The page loop lives in [`run_discovery`], which works on an in-memory
//! [`ChannelTable`] so it can be driven against a mock API in tests.
//! [`run_discover`] wraps it with validation, the quota estimate prompt,
//! the save, and the printed summary.

use std::collections::BTreeMap;
use std::fmt;

use anyhow::Context;

use ytscout_core::{AppConfig, ChannelRecord};
use ytscout_store::ChannelTable;
use ytscout_youtube::{
    estimate_discovery_quota, normalize_channel, QuotaUsage, YoutubeClient, YoutubeError,
};

#[derive(Debug, Clone)]
pub(crate) struct DiscoverArgs {
    pub niche: String,
    pub min_subs: u64,
    pub max_subs: u64,
    pub country: Option<String>,
    pub target: u32,
    pub max_pages: u32,
    pub yes: bool,
    pub dry_run: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub(crate) enum SkipReason {
    ProcessingError,
    SubscribersOutOfRange,
    CountryMismatch,
}

impl fmt::Display for SkipReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            SkipReason::ProcessingError => "Processing Error",
            SkipReason::SubscribersOutOfRange => "Subscribers outside range",
            SkipReason::CountryMismatch => "Country mismatch",
        })
    }
}

/// Counters for one discovery run.
#[derive(Debug, Default)]
pub(crate) struct DiscoveryStats {
    pub pages_searched: u32,
    pub channels_found: usize,
    pub channels_processed: usize,
    /// Usernames of rows added this run, in insertion order.
    pub new_channels: Vec<String>,
    pub channels_updated: usize,
    pub skip_reasons: BTreeMap<SkipReason, usize>,
    /// Set when the run ended on an API error rather than running out of work.
    pub halted_by: Option<String>,
    pub usage: QuotaUsage,
}

impl DiscoveryStats {
    pub fn channels_skipped(&self) -> usize {
        self.skip_reasons.values().sum()
    }

    /// Whether the table differs from what was loaded.
    pub fn changed(&self) -> bool {
        !self.new_channels.is_empty() || self.channels_updated > 0
    }

    fn skip(&mut self, reason: SkipReason) {
        *self.skip_reasons.entry(reason).or_default() += 1;
    }

    /// New channels per quota unit spent, if anything was spent.
    #[allow(clippy::cast_precision_loss)]
    pub fn quota_efficiency(&self) -> Option<f64> {
        (self.usage.units_used > 0 && !self.new_channels.is_empty())
            .then(|| self.new_channels.len() as f64 / f64::from(self.usage.units_used))
    }
}

/// Run parameters for [`run_discovery`].
#[derive(Debug, Clone)]
pub(crate) struct DiscoveryParams<'a> {
    pub niche: &'a str,
    pub min_subs: u64,
    pub max_subs: u64,
    pub country: Option<&'a str>,
    pub target: usize,
    pub max_pages: u32,
}

/// Handle the `discover` command end to end.
///
/// # Errors
///
/// Returns an error for invalid arguments, a missing API key, an unreadable
/// table, or a failed save. API failures during the search end the run
/// early and are reported in the summary instead.
pub(crate) async fn run_discover(config: &AppConfig, args: &DiscoverArgs) -> anyhow::Result<()> {
    let niche = args.niche.trim();
    validate_args(niche, args)?;
    let country = args
        .country
        .as_deref()
        .map(str::trim)
        .filter(|c| !c.is_empty());

    let estimate = estimate_discovery_quota(args.target);
    println!("Niche: {niche}");
    println!(
        "Target: {} NEW channels with {} - {} subscribers",
        args.target, args.min_subs, args.max_subs
    );
    if let Some(country) = country {
        println!("Country filter: {}", country.to_ascii_uppercase());
    }
    println!("Estimated quota usage: ~{estimate} units (budget {})", config.quota_budget);
    println!("Database file: {}", config.database_csv.display());
    println!("Existing channels get the niche merged in, not duplicated");

    if args.dry_run {
        println!("dry-run: no API calls made");
        return Ok(());
    }

    let api_key = config
        .require_youtube_api_key()
        .context("cannot run discover")?;

    if !args.yes && !crate::confirm("Continue?")? {
        println!("Operation cancelled.");
        return Ok(());
    }

    let mut table = ChannelTable::load_or_create(&config.database_csv)?;
    let client = YoutubeClient::with_base_url(
        api_key,
        config.request_timeout_secs,
        Some(config.quota_budget),
        &config.youtube_base_url,
    )
    .map_err(|e| anyhow::anyhow!("failed to build YouTube client: {e}"))?
    .with_retry_policy(config.max_retries, config.retry_backoff_base_ms)
    .with_user_agent(&config.user_agent);

    let params = DiscoveryParams {
        niche,
        min_subs: args.min_subs,
        max_subs: args.max_subs,
        country,
        target: usize::try_from(args.target)?,
        max_pages: args.max_pages,
    };
    let stats = run_discovery(&client, &mut table, &params).await?;

    if stats.changed() {
        table.save()?;
        tracing::info!(
            path = %table.path().display(),
            rows = table.len(),
            "channel table saved"
        );
    }

    print_summary(&stats);
    Ok(())
}

fn validate_args(niche: &str, args: &DiscoverArgs) -> anyhow::Result<()> {
    if niche.is_empty() {
        anyhow::bail!("--niche must not be empty");
    }
    if args.min_subs > args.max_subs {
        anyhow::bail!(
            "--min-subs ({}) must not exceed --max-subs ({})",
            args.min_subs,
            args.max_subs
        );
    }
    if args.target == 0 {
        anyhow::bail!("--target must be at least 1");
    }
    if args.max_pages == 0 {
        anyhow::bail!("--max-pages must be at least 1");
    }
    if let Some(country) = args.country.as_deref().map(str::trim) {
        if !country.is_empty()
            && (country.len() != 2 || !country.chars().all(|c| c.is_ascii_alphabetic()))
        {
            anyhow::bail!("--country must be a two-letter code, got {country:?}");
        }
    }
    Ok(())
}

/// Page through search results until the target number of new channels is
/// reached or the results run out.
///
/// New rows are inserted into `table` as they are found, so a channel that
/// appears twice in one run is merged rather than added twice. The table is
/// not saved here.
///
/// # Errors
///
/// Returns an error only if the table rejects a niche merge. Search and
/// channel-detail failures stop the loop and are recorded in
/// [`DiscoveryStats::halted_by`].
pub(crate) async fn run_discovery(
    client: &YoutubeClient,
    table: &mut ChannelTable,
    params: &DiscoveryParams<'_>,
) -> anyhow::Result<DiscoveryStats> {
    let mut stats = DiscoveryStats::default();
    let mut page_token: Option<String> = None;

    tracing::info!(
        niche = params.niche,
        target_new = params.target,
        min_subs = params.min_subs,
        max_subs = params.max_subs,
        country = params.country.unwrap_or("any"),
        "starting discovery"
    );

    'pages: while stats.new_channels.len() < params.target
        && stats.pages_searched < params.max_pages
    {
        tracing::info!(
            page = stats.pages_searched + 1,
            quota_used = client.usage().units_used,
            "searching"
        );
        let page = match client
            .search_channels(params.niche, page_token.as_deref())
            .await
        {
            Ok(page) => page,
            Err(e) => {
                halt(&mut stats, &e, "search failed");
                break;
            }
        };
        stats.pages_searched += 1;

        if page.items.is_empty() {
            tracing::info!("no more channels found");
            break;
        }

        let ids = page.channel_ids();
        stats.channels_found += ids.len();

        if ids.is_empty() {
            tracing::warn!("no channel ids on this page");
        } else {
            let items = match client.get_channels(&ids).await {
                Ok(items) => items,
                Err(e) => {
                    halt(&mut stats, &e, "channel detail fetch failed");
                    break;
                }
            };

            for item in &items {
                stats.channels_processed += 1;
                process_item(table, params, item, &mut stats)?;
                if stats.new_channels.len() >= params.target {
                    tracing::info!(target_new = params.target, "target reached");
                    break 'pages;
                }
            }
        }

        match page.next_page_token {
            Some(token) => page_token = Some(token),
            None => {
                tracing::info!("no more pages available");
                break;
            }
        }
    }

    if stats.pages_searched >= params.max_pages && stats.new_channels.len() < params.target {
        tracing::info!(max_pages = params.max_pages, "page limit reached");
    }

    stats.usage = client.usage();
    Ok(stats)
}

fn process_item(
    table: &mut ChannelTable,
    params: &DiscoveryParams<'_>,
    item: &ytscout_youtube::ChannelItem,
    stats: &mut DiscoveryStats,
) -> anyhow::Result<()> {
    let details = match normalize_channel(item) {
        Ok(details) => details,
        Err(e) => {
            tracing::warn!(channel_id = %item.id, error = %e, "skipping channel");
            stats.skip(SkipReason::ProcessingError);
            return Ok(());
        }
    };

    if let Some(index) = table.find_existing(&details.username, &details.channel_url) {
        if table.merge_niche(index, params.niche)? {
            stats.channels_updated += 1;
            tracing::info!(
                username = %details.username,
                niche = params.niche,
                "existing channel: niche added"
            );
        } else {
            tracing::debug!(username = %details.username, "existing channel: niche already present");
        }
        return Ok(());
    }

    if !(params.min_subs..=params.max_subs).contains(&details.subscribers) {
        stats.skip(SkipReason::SubscribersOutOfRange);
        return Ok(());
    }

    if let Some(country) = params.country {
        if !details.country.eq_ignore_ascii_case(country) {
            stats.skip(SkipReason::CountryMismatch);
            return Ok(());
        }
    }

    tracing::info!(
        username = %details.username,
        subscribers = details.subscribers,
        "new channel"
    );
    table.insert(ChannelRecord::from_discovery(&details, params.niche));
    stats.new_channels.push(details.username);
    Ok(())
}

fn halt(stats: &mut DiscoveryStats, err: &YoutubeError, what: &str) {
    match err {
        YoutubeError::BudgetExceeded { used, limit } => {
            tracing::warn!(used, limit, "quota budget reached, stopping discovery");
        }
        YoutubeError::QuotaExceeded(msg) => {
            tracing::error!(%msg, "YouTube quota exhausted, stopping discovery");
        }
        e => tracing::error!(error = %e, "{what}, stopping discovery"),
    }
    stats.halted_by = Some(err.to_string());
}

fn print_summary(stats: &DiscoveryStats) {
    println!();
    println!("Discovery summary");
    println!("  Pages searched:     {}", stats.pages_searched);
    println!("  Channels found:     {}", stats.channels_found);
    println!("  Channels processed: {}", stats.channels_processed);
    println!("  New channels:       {}", stats.new_channels.len());
    println!("  Updated channels:   {}", stats.channels_updated);
    println!("  Skipped channels:   {}", stats.channels_skipped());
    for (reason, count) in &stats.skip_reasons {
        println!("    {reason}: {count}");
    }
    println!(
        "  API calls:          {} ({} search + {} batch)",
        stats.usage.total_calls(),
        stats.usage.search_calls,
        stats.usage.batch_calls
    );
    println!("  Quota used:         {} units", stats.usage.units_used);
    if let Some(efficiency) = stats.quota_efficiency() {
        println!(
            "  Quota efficiency:   {}/{} new channels per unit ({efficiency:.4})",
            stats.new_channels.len(),
            stats.usage.units_used
        );
    }
    if let Some(reason) = &stats.halted_by {
        println!("  Stopped early:      {reason}");
    }
    if !stats.changed() {
        println!("No new matching channels and no existing channels updated.");
        println!("Try different search terms or criteria.");
    }
}

#[cfg(test)]
#[path = "discover_test.rs"]
mod tests;
