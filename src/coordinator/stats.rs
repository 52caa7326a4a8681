use crate::domain::StatsSnapshot;

/// The two statistic snapshots shown on the dashboard.
///
/// `overall` covers every requirement and is refreshed on demand. `filtered`
/// covers the requirements matching the current query and always comes from
/// the same response as the displayed page. The two are updated
/// independently; resetting one never touches the other.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StatsAggregator {
    overall: StatsSnapshot,
    filtered: StatsSnapshot,
}

impl StatsAggregator {
    /// Statistics over every requirement.
    #[must_use]
    pub const fn overall(&self) -> StatsSnapshot {
        self.overall
    }

    /// Statistics over the requirements matching the current query.
    #[must_use]
    pub const fn filtered(&self) -> StatsSnapshot {
        self.filtered
    }

    pub(crate) const fn record_overall(&mut self, stats: StatsSnapshot) {
        self.overall = stats;
    }

    pub(crate) const fn record_filtered(&mut self, stats: StatsSnapshot) {
        self.filtered = stats;
    }

    pub(crate) const fn reset_overall(&mut self) {
        self.overall = StatsSnapshot::ZERO;
    }

    pub(crate) const fn reset_filtered(&mut self) {
        self.filtered = StatsSnapshot::ZERO;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SOME: StatsSnapshot = StatsSnapshot {
        total: 10,
        approved: 4,
        in_review: 3,
        disapproved: 1,
    };

    #[test]
    fn snapshots_reset_independently() {
        let mut stats = StatsAggregator::default();
        stats.record_overall(SOME);
        stats.record_filtered(SOME);

        stats.reset_filtered();
        assert_eq!(stats.overall(), SOME);
        assert_eq!(stats.filtered(), StatsSnapshot::ZERO);

        stats.record_filtered(SOME);
        stats.reset_overall();
        assert_eq!(stats.overall(), StatsSnapshot::ZERO);
        assert_eq!(stats.filtered(), SOME);
    }
}
