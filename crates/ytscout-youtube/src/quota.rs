//! Quota accounting for the YouTube Data API.
//!
//! Every endpoint has a fixed unit cost. The ledger records what a run has
//! spent and refuses a call up front when it would push the run past its
//! budget, so a discovery run can never blow through the daily allowance.

use std::sync::atomic::{AtomicU32, Ordering};

use crate::error::YoutubeError;

/// Units charged for one `search.list` call.
pub const SEARCH_COST: u32 = 100;

/// Units charged for one `channels.list` call (up to 50 ids).
pub const CHANNELS_LIST_COST: u32 = 1;

/// Default daily allowance for a YouTube Data API project.
pub const DEFAULT_DAILY_QUOTA: u32 = 10_000;

/// Rough cost of a discovery run that wants `target_creators` new channels.
///
/// A fixed allowance for the first few search pages plus a per-creator margin
/// for the extra pages and detail batches needed when most results are
/// filtered out.
#[must_use]
pub fn estimate_discovery_quota(target_creators: u32) -> u32 {
    target_creators.saturating_mul(8).saturating_add(500)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CallKind {
    Search,
    ChannelsList,
}

impl CallKind {
    #[must_use]
    pub fn cost(self) -> u32 {
        match self {
            CallKind::Search => SEARCH_COST,
            CallKind::ChannelsList => CHANNELS_LIST_COST,
        }
    }
}

/// Point-in-time copy of the ledger counters.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct QuotaUsage {
    pub search_calls: u32,
    pub batch_calls: u32,
    pub units_used: u32,
}

impl QuotaUsage {
    #[must_use]
    pub fn total_calls(&self) -> u32 {
        self.search_calls.saturating_add(self.batch_calls)
    }
}

#[derive(Debug)]
pub struct QuotaLedger {
    budget: Option<u32>,
    search_calls: AtomicU32,
    batch_calls: AtomicU32,
    units_used: AtomicU32,
}

impl QuotaLedger {
    /// A ledger that refuses calls once `budget` units would be exceeded.
    /// `None` disables the cap and only counts.
    #[must_use]
    pub fn new(budget: Option<u32>) -> Self {
        Self {
            budget,
            search_calls: AtomicU32::new(0),
            batch_calls: AtomicU32::new(0),
            units_used: AtomicU32::new(0),
        }
    }

    #[must_use]
    pub fn budget(&self) -> Option<u32> {
        self.budget
    }

    /// Charge one call of `kind` against the budget.
    ///
    /// # Errors
    ///
    /// Returns [`YoutubeError::BudgetExceeded`] without charging anything if
    /// the call would take usage past the budget.
    pub fn reserve(&self, kind: CallKind) -> Result<(), YoutubeError> {
        let cost = kind.cost();
        let budget = self.budget;
        self.units_used
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |used| {
                let next = used.saturating_add(cost);
                match budget {
                    Some(limit) if next > limit => None,
                    _ => Some(next),
                }
            })
            .map_err(|used| YoutubeError::BudgetExceeded {
                used,
                limit: budget.unwrap_or(u32::MAX),
            })?;

        match kind {
            CallKind::Search => self.search_calls.fetch_add(1, Ordering::SeqCst),
            CallKind::ChannelsList => self.batch_calls.fetch_add(1, Ordering::SeqCst),
        };
        Ok(())
    }

    #[must_use]
    pub fn usage(&self) -> QuotaUsage {
        QuotaUsage {
            search_calls: self.search_calls.load(Ordering::SeqCst),
            batch_calls: self.batch_calls.load(Ordering::SeqCst),
            units_used: self.units_used.load(Ordering::SeqCst),
        }
    }
}
