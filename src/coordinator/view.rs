use super::stats::StatsAggregator;
use crate::{
    client::{ApiError, RequirementPage},
    domain::{
        PaginationController, PaginationInfo, QueryState, QueryUpdate, Requirement, StatsSnapshot,
    },
};

/// Shown when a page fetch fails without an explanation from the service.
pub const FETCH_FAILED: &str = "Failed to fetch requirements";

/// Shown when the overall statistics cannot be loaded.
pub const OVERALL_STATS_FAILED: &str = "Failed to load overall statistics";

/// What became of a page response.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PageOutcome {
    /// The response is now displayed.
    Applied,
    /// A newer request was made since; nothing changed.
    Superseded,
    /// The response was for a page past the end. The query now points at the
    /// last page, which must be fetched under `sequence`.
    Moved { sequence: u64, query: QueryState },
}

/// An immutable snapshot of everything the dashboard displays.
///
/// Snapshots are published by the
/// [`QueryCoordinator`](super::QueryCoordinator); the record list, the
/// filtered statistics and the pagination in one snapshot always come from
/// the same response.
#[derive(Debug, Clone, Default)]
pub struct DashboardView {
    query: QueryState,
    loaded: QueryState,
    requirements: Vec<Requirement>,
    pagination: PaginationInfo,
    stats: StatsAggregator,
    error: Option<String>,
    overall_error: Option<String>,
    requested: u64,
    applied: u64,
    overall_requested: u64,
    overall_applied: u64,
}

impl DashboardView {
    /// The query the dashboard currently wants to show.
    ///
    /// This reflects user edits immediately, before any response arrives.
    #[must_use]
    pub const fn query(&self) -> &QueryState {
        &self.query
    }

    /// The loaded page of requirements.
    #[must_use]
    pub fn requirements(&self) -> &[Requirement] {
        &self.requirements
    }

    /// Position of the loaded page.
    #[must_use]
    pub const fn pagination(&self) -> &PaginationInfo {
        &self.pagination
    }

    /// Statistics over every requirement.
    #[must_use]
    pub const fn overall_stats(&self) -> StatsSnapshot {
        self.stats.overall()
    }

    /// Statistics over the requirements matching the query.
    #[must_use]
    pub const fn filtered_stats(&self) -> StatsSnapshot {
        self.stats.filtered()
    }

    /// The error to show, if the last page or statistics fetch failed.
    ///
    /// A page failure takes precedence. Each error stays until the fetch it
    /// came from next succeeds or the errors are cleared explicitly.
    #[must_use]
    pub fn error(&self) -> Option<&str> {
        self.error.as_deref().or(self.overall_error.as_deref())
    }

    /// Whether a newer page is on its way.
    #[must_use]
    pub const fn is_loading(&self) -> bool {
        self.applied < self.requested
    }

    /// Whether the latest requested page and overall statistics have both
    /// been applied.
    #[must_use]
    pub const fn is_settled(&self) -> bool {
        self.applied == self.requested && self.overall_applied == self.overall_requested
    }

    /// Page navigation for the current query.
    ///
    /// `None` while the displayed pagination belongs to a different search
    /// or filter selection, since the page count of the current one is not
    /// known until its response arrives.
    #[must_use]
    pub fn navigation(&self) -> Option<PaginationController> {
        self.query
            .same_results(&self.loaded)
            .then(|| PaginationController::new(self.query.page(), &self.pagination))
    }

    /// Make `query` the current query and claim the sequence number its
    /// response must carry.
    pub(crate) fn begin_request(&mut self, query: QueryState) -> u64 {
        self.requested += 1;
        self.query = query;
        self.requested
    }

    pub(crate) const fn begin_overall(&mut self, sequence: u64) {
        self.overall_requested = sequence;
    }

    pub(crate) fn clear_errors(&mut self) {
        self.error = None;
        self.overall_error = None;
    }

    /// Apply a page response if it answers the latest request.
    ///
    /// A page past the end is not displayed. The current query moves to the
    /// last page instead, under a new sequence number, and the caller is
    /// expected to fetch it.
    pub(crate) fn apply_page(
        &mut self,
        sequence: u64,
        result: Result<RequirementPage, ApiError>,
    ) -> PageOutcome {
        if sequence != self.requested || sequence <= self.applied {
            return PageOutcome::Superseded;
        }

        match result {
            Ok(page) if page.pagination.is_past_end() => {
                let query = self
                    .query
                    .apply(QueryUpdate::Page(page.pagination.total_pages()));
                let sequence = self.begin_request(query.clone());
                return PageOutcome::Moved { sequence, query };
            }
            Ok(page) => {
                self.requirements = page.requirements;
                self.stats.record_filtered(page.stats);
                self.pagination = page.pagination;
                self.loaded = self.query.clone();
                self.error = None;
            }
            Err(error) => {
                self.requirements.clear();
                self.stats.reset_filtered();
                self.error = Some(error.user_message(FETCH_FAILED));
            }
        }
        self.applied = sequence;
        PageOutcome::Applied
    }

    /// Apply an overall-statistics response if it answers the latest
    /// request.
    pub(crate) fn apply_overall(
        &mut self,
        sequence: u64,
        result: Result<StatsSnapshot, ApiError>,
    ) -> bool {
        if sequence != self.overall_requested || sequence <= self.overall_applied {
            return false;
        }
        self.overall_applied = sequence;

        match result {
            Ok(stats) => {
                self.stats.record_overall(stats);
                self.overall_error = None;
            }
            Err(_) => {
                self.stats.reset_overall();
                self.overall_error = Some(OVERALL_STATS_FAILED.to_string());
            }
        }
        true
    }
}
