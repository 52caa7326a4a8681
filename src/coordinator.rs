//! Keeps the dashboard consistent with the service.
//!
//! The [`QueryCoordinator`] drives every change to the current
//! [`QueryState`] through [`QueryCoordinator::update`], which decides whether
//! to fetch at once (page navigation) or after a quiet period (search and
//! filter edits). Results are published as [`DashboardView`] snapshots on a
//! watch channel, and the current query lives in the published view.
//!
//! Each fetch is tagged with a sequence number when it is requested. A
//! response is only applied if it answers the most recent request, so a slow
//! response can never overwrite a newer one.

use std::{sync::Arc, time::Duration};

use tokio::sync::watch;
use tracing::{debug, instrument, warn};

use crate::{
    client::RequirementsApi,
    domain::{Config, Facet, PaginationController, QueryState, QueryUpdate},
};

mod debounce;
pub use debounce::Debouncer;

mod stats;
pub use stats::StatsAggregator;

mod view;
use view::PageOutcome;
pub use view::{DashboardView, FETCH_FAILED, OVERALL_STATS_FAILED};

/// Drives fetching for the dashboard.
///
/// Must be used from within a tokio runtime.
pub struct QueryCoordinator {
    api: Arc<dyn RequirementsApi>,
    debouncer: Debouncer,
    view: Arc<watch::Sender<DashboardView>>,
    overall_sequence: u64,
}

impl std::fmt::Debug for QueryCoordinator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("QueryCoordinator")
            .field("query", &self.query())
            .field("debouncer", &self.debouncer)
            .field("overall_sequence", &self.overall_sequence)
            .finish_non_exhaustive()
    }
}

impl QueryCoordinator {
    /// A coordinator that waits `debounce` after the last edit before
    /// fetching.
    ///
    /// Nothing is fetched until [`start`](Self::start) or a change is made.
    #[must_use]
    pub fn new(api: Arc<dyn RequirementsApi>, debounce: Duration) -> Self {
        let (view, _) = watch::channel(DashboardView::default());
        Self {
            api,
            debouncer: Debouncer::new(debounce),
            view: Arc::new(view),
            overall_sequence: 0,
        }
    }

    /// A coordinator using the quiet period from `config`.
    #[must_use]
    pub fn from_config(api: Arc<dyn RequirementsApi>, config: &Config) -> Self {
        Self::new(api, config.debounce())
    }

    /// The service the coordinator fetches from.
    ///
    /// Changes made through it are not reflected until
    /// [`invalidate`](Self::invalidate) is called.
    #[must_use]
    pub const fn api(&self) -> &Arc<dyn RequirementsApi> {
        &self.api
    }

    /// The current query, including edits that have not been fetched yet.
    #[must_use]
    pub fn query(&self) -> QueryState {
        self.view.borrow().query().clone()
    }

    /// The latest published view.
    #[must_use]
    pub fn snapshot(&self) -> DashboardView {
        self.view.borrow().clone()
    }

    /// A receiver notified every time the view changes.
    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<DashboardView> {
        self.view.subscribe()
    }

    /// Wait until the latest requested page and overall statistics have
    /// been applied, and return the resulting view.
    pub async fn settled(&self) -> DashboardView {
        let mut receiver = self.view.subscribe();
        let settled = receiver
            .wait_for(DashboardView::is_settled)
            .await
            .map(|view| view.clone());
        // the sender is owned by `self`, so the channel cannot close here
        settled.unwrap_or_else(|_| self.snapshot())
    }

    /// Load the overall statistics and the first page.
    pub fn start(&mut self) {
        self.refresh_overall();
        self.refresh();
    }

    /// Apply a change to the query.
    ///
    /// Search and filter changes are fetched once no further change has
    /// arrived for the quiet period. Page changes are validated against the
    /// pagination of the current search and filters and fetched immediately,
    /// replacing any pending fetch. A page change is ignored if it is out of
    /// range, or if the results of an edited search or filter selection have
    /// not arrived yet.
    ///
    /// Returns `false` if the change was ignored.
    pub fn update(&mut self, update: QueryUpdate) -> bool {
        if let QueryUpdate::Page(page) = update {
            let Some(controller) = self.controller() else {
                debug!(page, "ignoring page change until the edited query is loaded");
                return false;
            };
            let Some(page) = controller.go_to(page) else {
                debug!(page, "ignoring out-of-range page");
                return false;
            };
            self.debouncer.cancel();
            tokio::spawn(self.fetch_page(Some(QueryUpdate::Page(page))).run());
        } else {
            let fetch = self.fetch_page(Some(update));
            self.debouncer.schedule(fetch.run());
        }
        true
    }

    /// Replace the search text.
    pub fn set_search_text(&mut self, text: impl Into<String>) {
        self.update(QueryUpdate::SearchText(text.into()));
    }

    /// Select the facet if it is not selected, otherwise deselect it.
    pub fn toggle_filter(&mut self, facet: Facet) {
        self.update(QueryUpdate::ToggleFilter(facet));
    }

    /// Deselect every filter.
    pub fn clear_filters(&mut self) {
        self.update(QueryUpdate::ClearFilters);
    }

    /// Go to `page`. Returns `false`, doing nothing, if it is out of range
    /// or the current results are still loading after an edit.
    #[instrument(level = "debug", skip(self))]
    pub fn request_page(&mut self, page: u32) -> bool {
        self.update(QueryUpdate::Page(page))
    }

    /// Go to the next page, if there is one.
    pub fn next_page(&mut self) -> bool {
        self.controller()
            .and_then(|controller| controller.next())
            .is_some_and(|page| self.request_page(page))
    }

    /// Go to the previous page, if there is one.
    pub fn previous_page(&mut self) -> bool {
        self.controller()
            .and_then(|controller| controller.previous())
            .is_some_and(|page| self.request_page(page))
    }

    /// Fetch the current query now, replacing any pending edit.
    pub fn refresh(&mut self) {
        self.debouncer.cancel();
        tokio::spawn(self.fetch_page(None).run());
    }

    /// Fetch the overall statistics now.
    pub fn refresh_overall(&mut self) {
        self.overall_sequence += 1;
        let sequence = self.overall_sequence;
        self.view.send_modify(|view| view.begin_overall(sequence));

        let api = Arc::clone(&self.api);
        let view = Arc::clone(&self.view);
        tokio::spawn(async move {
            let result = api.fetch_overall_stats().await;
            if let Err(error) = &result {
                warn!(sequence, %error, "failed to load overall statistics");
            }
            if !view.send_if_modified(|view| view.apply_overall(sequence, result)) {
                debug!(sequence, "discarding superseded overall statistics");
            }
        });
    }

    /// Clear the displayed error and fetch everything again.
    pub fn retry(&mut self) {
        self.view.send_modify(DashboardView::clear_errors);
        self.invalidate();
    }

    /// Fetch everything again, after the data has been changed elsewhere.
    pub fn invalidate(&mut self) {
        self.refresh_overall();
        self.refresh();
    }

    fn controller(&self) -> Option<PaginationController> {
        self.view.borrow().navigation()
    }

    /// Apply `update` to the current query and claim the next sequence
    /// number for the result.
    fn fetch_page(&self, update: Option<QueryUpdate>) -> PageFetch {
        let mut request = (0, QueryState::default());
        self.view.send_modify(|view| {
            let query = match update {
                Some(update) => view.query().apply(update),
                None => view.query().clone(),
            };
            request = (view.begin_request(query.clone()), query);
        });
        let (sequence, query) = request;

        PageFetch {
            api: Arc::clone(&self.api),
            view: Arc::clone(&self.view),
            sequence,
            query,
        }
    }
}

/// A requested page fetch, not yet sent.
struct PageFetch {
    api: Arc<dyn RequirementsApi>,
    view: Arc<watch::Sender<DashboardView>>,
    sequence: u64,
    query: QueryState,
}

impl PageFetch {
    async fn run(self) {
        let Self {
            api,
            view,
            mut sequence,
            mut query,
        } = self;

        loop {
            debug!(sequence, page = query.page(), "fetching requirements");
            let result = api.fetch_page(&query).await;
            if let Err(error) = &result {
                warn!(sequence, %error, "failed to fetch requirements");
            }

            let mut outcome = PageOutcome::Superseded;
            view.send_if_modified(|view| {
                outcome = view.apply_page(sequence, result);
                outcome != PageOutcome::Superseded
            });

            match outcome {
                PageOutcome::Applied => return,
                PageOutcome::Superseded => {
                    debug!(sequence, "discarding superseded response");
                    return;
                }
                PageOutcome::Moved {
                    sequence: next,
                    query: last,
                } => {
                    debug!(
                        sequence,
                        page = last.page(),
                        "page is past the end, fetching the last page"
                    );
                    sequence = next;
                    query = last;
                }
            }
        }
    }
}
