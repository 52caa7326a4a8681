use super::filter::{Facet, FilterSelection};

/// What the dashboard currently wants to see.
///
/// A `QueryState` is an immutable value. Changes are expressed as a
/// [`QueryUpdate`] and applied with [`QueryState::apply`], which returns the
/// next state. Changing the search text or the filters always resets the
/// page to 1.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QueryState {
    search_text: String,
    filters: FilterSelection,
    page: u32,
}

impl Default for QueryState {
    fn default() -> Self {
        Self {
            search_text: String::new(),
            filters: FilterSelection::default(),
            page: 1,
        }
    }
}

/// A single change to a [`QueryState`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum QueryUpdate {
    /// Replace the free-text search.
    SearchText(String),
    /// Toggle one filter value.
    ToggleFilter(Facet),
    /// Deselect every filter.
    ClearFilters,
    /// Move to a page. Values below 1 are treated as 1.
    Page(u32),
}

impl QueryState {
    /// Construct a state directly.
    #[must_use]
    pub fn new(search_text: impl Into<String>, filters: FilterSelection, page: u32) -> Self {
        Self {
            search_text: search_text.into(),
            filters,
            page: page.max(1),
        }
    }

    /// Return the state that results from applying `update`.
    #[must_use]
    pub fn apply(&self, update: QueryUpdate) -> Self {
        let mut next = self.clone();
        match update {
            QueryUpdate::SearchText(text) => {
                next.search_text = text;
                next.page = 1;
            }
            QueryUpdate::ToggleFilter(facet) => {
                next.filters.toggle(facet);
                next.page = 1;
            }
            QueryUpdate::ClearFilters => {
                next.filters.clear();
                next.page = 1;
            }
            QueryUpdate::Page(page) => {
                next.page = page.max(1);
            }
        }
        next
    }

    /// The free-text search.
    #[must_use]
    pub fn search_text(&self) -> &str {
        &self.search_text
    }

    /// The selected filters.
    #[must_use]
    pub const fn filters(&self) -> &FilterSelection {
        &self.filters
    }

    /// The requested page (1-based).
    #[must_use]
    pub const fn page(&self) -> u32 {
        self.page
    }

    /// Whether `other` selects the same records, whatever page each is on.
    #[must_use]
    pub fn same_results(&self, other: &Self) -> bool {
        self.search_text == other.search_text && self.filters == other.filters
    }

    /// Encode the state as query parameters for the requirements endpoint.
    ///
    /// `search` and `page` are always present; `per_page` only when given.
    /// Filter values are repeated parameters and `stats=true` asks the
    /// service for the statistics of the filtered set.
    #[must_use]
    pub fn query_pairs(&self, per_page: Option<u32>) -> Vec<(&'static str, String)> {
        let mut pairs = vec![("search", self.search_text.clone())];
        pairs.extend(
            self.filters
                .query_pairs()
                .into_iter()
                .map(|(name, value)| (name, value.to_string())),
        );
        pairs.push(("page", self.page.to_string()));
        if let Some(per_page) = per_page {
            pairs.push(("per_page", per_page.to_string()));
        }
        pairs.push(("stats", "true".to_string()));
        pairs
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::requirement::{Category, Priority, Status};

    fn on_page(page: u32) -> QueryState {
        QueryState::new("login", FilterSelection::default(), page)
    }

    #[test]
    fn search_and_filter_changes_reset_page() {
        let updates = [
            QueryUpdate::SearchText("logout".to_string()),
            QueryUpdate::SearchText("login".to_string()),
            QueryUpdate::ToggleFilter(Facet::Status(Status::Approved)),
            QueryUpdate::ToggleFilter(Facet::Type(Category::Ui)),
            QueryUpdate::ClearFilters,
        ];

        for update in updates {
            assert_eq!(on_page(4).apply(update).page(), 1);
        }
    }

    #[test]
    fn page_change_keeps_search_and_filters() {
        let state = QueryState::default()
            .apply(QueryUpdate::SearchText("auth".to_string()))
            .apply(QueryUpdate::ToggleFilter(Facet::Priority(Priority::High)))
            .apply(QueryUpdate::Page(3));

        assert_eq!(state.page(), 3);
        assert_eq!(state.search_text(), "auth");
        assert!(state.filters().contains(Facet::Priority(Priority::High)));
    }

    #[test]
    fn only_search_and_filters_change_the_results() {
        let state = on_page(1);

        assert!(state.same_results(&state.apply(QueryUpdate::Page(3))));
        assert!(!state.same_results(&state.apply(QueryUpdate::SearchText("logout".to_string()))));
        assert!(!state.same_results(
            &state.apply(QueryUpdate::ToggleFilter(Facet::Status(Status::Draft)))
        ));
    }

    #[test]
    fn apply_does_not_touch_the_original() {
        let state = on_page(2);
        let _ = state.apply(QueryUpdate::Page(5));
        assert_eq!(state.page(), 2);
    }

    #[test]
    fn page_zero_is_clamped() {
        assert_eq!(on_page(3).apply(QueryUpdate::Page(0)).page(), 1);
        assert_eq!(QueryState::new("", FilterSelection::default(), 0).page(), 1);
    }

    #[test]
    fn query_pairs_always_send_search() {
        let state = QueryState::default()
            .apply(QueryUpdate::ToggleFilter(Facet::Status(Status::Approved)))
            .apply(QueryUpdate::ToggleFilter(Facet::Status(Status::Review)));

        assert_eq!(
            state.query_pairs(None),
            vec![
                ("search", String::new()),
                ("status", "Review".to_string()),
                ("status", "Approved".to_string()),
                ("page", "1".to_string()),
                ("stats", "true".to_string()),
            ]
        );
    }

    #[test]
    fn per_page_is_optional() {
        let pairs = QueryState::default().query_pairs(Some(10));
        assert!(pairs.contains(&("per_page", "10".to_string())));
    }
}
