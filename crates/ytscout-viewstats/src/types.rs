use ytscout_core::ChannelAnalytics;

/// Figures read off a tracked channel's page. Fields the page does not show
/// are left empty.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ScrapedStats {
    pub views_last_28_days: String,
    pub subs_last_28_days: String,
    pub estimated_rev_last_28_days: String,
    pub long_views: String,
    pub short_views: String,
}

/// What a fetched page turned out to be.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PageOutcome {
    /// The site does not track the channel, or served an error page.
    NotTracked { reason: String },
    /// The page loaded but the headline views card is missing.
    NoData,
    Stats(ScrapedStats),
}

/// Classification of one enrichment attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutcomeStatus {
    Success,
    NoUsername,
    NotTracked,
    NoData,
    FetchError,
    Error,
}

impl OutcomeStatus {
    /// The value stored in the profile URL column for a failed attempt.
    #[must_use]
    pub fn marker(self) -> Option<&'static str> {
        match self {
            OutcomeStatus::Success => None,
            OutcomeStatus::NoUsername => Some("no username available"),
            OutcomeStatus::NotTracked => Some("no viewstats page available"),
            OutcomeStatus::NoData => Some("no viewstats data available"),
            OutcomeStatus::FetchError => Some("fetch error"),
            OutcomeStatus::Error => Some("error occurred"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EnrichmentOutcome {
    pub status: OutcomeStatus,
    pub analytics: ChannelAnalytics,
}

impl EnrichmentOutcome {
    /// A failed attempt: only the marker is recorded.
    #[must_use]
    pub fn failed(status: OutcomeStatus) -> Self {
        let marker = status.marker().unwrap_or_default();
        Self {
            status,
            analytics: ChannelAnalytics::marker(marker),
        }
    }

    #[must_use]
    pub fn succeeded(profile_url: String, stats: ScrapedStats) -> Self {
        Self {
            status: OutcomeStatus::Success,
            analytics: ChannelAnalytics {
                profile_url,
                views_last_28_days: stats.views_last_28_days,
                subs_last_28_days: stats.subs_last_28_days,
                estimated_rev_last_28_days: stats.estimated_rev_last_28_days,
                long_views: stats.long_views,
                short_views: stats.short_views,
            },
        }
    }

    #[must_use]
    pub fn is_success(&self) -> bool {
        self.status == OutcomeStatus::Success
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn failed_outcome_carries_marker_only() {
        let outcome = EnrichmentOutcome::failed(OutcomeStatus::NotTracked);
        assert!(!outcome.is_success());
        assert_eq!(outcome.analytics.profile_url, "no viewstats page available");
        assert!(outcome.analytics.views_last_28_days.is_empty());
    }

    #[test]
    fn every_failure_has_a_distinct_marker() {
        let markers: std::collections::HashSet<_> = [
            OutcomeStatus::NoUsername,
            OutcomeStatus::NotTracked,
            OutcomeStatus::NoData,
            OutcomeStatus::FetchError,
            OutcomeStatus::Error,
        ]
        .into_iter()
        .map(|s| s.marker().expect("failures have markers"))
        .collect();
        assert_eq!(markers.len(), 5);
        assert!(OutcomeStatus::Success.marker().is_none());
    }
}
