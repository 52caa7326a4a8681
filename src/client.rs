//! Access to the requirements service.
//!
//! [`RequirementsApi`] is the seam between the dashboard and the network.
//! [`HttpClient`] implements it over HTTP; tests substitute an in-memory
//! implementation.

use async_trait::async_trait;
use serde::Deserialize;

use crate::domain::{
    PaginationInfo, QueryState, Requirement, RequirementDraft, RequirementId, StatsSnapshot,
    Status,
};

mod http;
pub use http::HttpClient;

mod upload;
pub use upload::{MAX_UPLOAD_BYTES, UploadError, UploadFile, UploadKind};

#[cfg(test)]
pub(crate) mod fake;

/// Errors from calls to the service.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    /// The request could not be sent or the response could not be read.
    #[error("request failed: {0}")]
    Network(#[from] reqwest::Error),

    /// The service answered with a non-success status.
    #[error("service returned {status}{}", .message.as_deref().map(|m| format!(": {m}")).unwrap_or_default())]
    Status {
        /// HTTP status code.
        status: u16,
        /// The `error` field of the response body, if there was one.
        message: Option<String>,
    },

    /// The response body was not in the expected shape.
    #[error("unexpected response: {0}")]
    Decode(#[from] serde_json::Error),
}

impl ApiError {
    /// The message the service gave for the failure, if any.
    #[must_use]
    pub fn server_message(&self) -> Option<&str> {
        match self {
            Self::Status { message, .. } => message.as_deref(),
            Self::Network(_) | Self::Decode(_) => None,
        }
    }

    /// Whether the service reported that the record does not exist.
    #[must_use]
    pub const fn is_not_found(&self) -> bool {
        matches!(self, Self::Status { status: 404, .. })
    }

    /// A message suitable for showing to a user, falling back to `fallback`
    /// when the service did not explain the failure.
    #[must_use]
    pub fn user_message(&self, fallback: &str) -> String {
        self.server_message().unwrap_or(fallback).to_string()
    }
}

/// One page of requirements together with the statistics of the whole
/// filtered set.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(from = "WirePage")]
pub struct RequirementPage {
    /// The records on this page, in service order.
    pub requirements: Vec<Requirement>,
    /// Statistics over every record matching the query, not just this page.
    pub stats: StatsSnapshot,
    /// Position of this page.
    pub pagination: PaginationInfo,
}

#[derive(Deserialize)]
struct WirePage {
    #[serde(default)]
    requirements: Option<Vec<Requirement>>,
    #[serde(default)]
    stats: Option<StatsSnapshot>,
    #[serde(default)]
    page: Option<u32>,
    #[serde(default)]
    pages: Option<u32>,
    #[serde(default)]
    total: Option<u64>,
}

impl From<WirePage> for RequirementPage {
    fn from(wire: WirePage) -> Self {
        Self {
            requirements: wire.requirements.unwrap_or_default(),
            stats: wire.stats.unwrap_or_default(),
            pagination: PaginationInfo::new(
                wire.page.unwrap_or(1),
                wire.pages.unwrap_or(1),
                wire.total.unwrap_or(0),
            ),
        }
    }
}

/// The operations the requirements service offers.
#[async_trait]
pub trait RequirementsApi: Send + Sync {
    /// Fetch the page of requirements matching `query`, with statistics for
    /// the full filtered set.
    async fn fetch_page(&self, query: &QueryState) -> Result<RequirementPage, ApiError>;

    /// Fetch a single requirement, or `None` if there is no such record.
    async fn fetch_requirement(&self, id: &RequirementId) -> Result<Option<Requirement>, ApiError>;

    /// Fetch statistics over every requirement, ignoring any query.
    async fn fetch_overall_stats(&self) -> Result<StatsSnapshot, ApiError>;

    /// Create a requirement.
    async fn create(&self, draft: &RequirementDraft) -> Result<(), ApiError>;

    /// Replace the content of a requirement.
    async fn update(&self, id: &RequirementId, draft: &RequirementDraft) -> Result<(), ApiError>;

    /// Change only the status of a requirement.
    async fn update_status(&self, id: &RequirementId, status: Status) -> Result<(), ApiError>;

    /// Delete a requirement.
    async fn delete(&self, id: &RequirementId) -> Result<(), ApiError>;

    /// Upload a document for requirement extraction.
    async fn analyze(&self, file: UploadFile) -> Result<(), ApiError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn page_decodes_with_missing_fields() {
        let page: RequirementPage = serde_json::from_str(r#"{"requirements": []}"#).unwrap();

        assert!(page.requirements.is_empty());
        assert_eq!(page.stats, StatsSnapshot::ZERO);
        assert_eq!(page.pagination, PaginationInfo::default());
    }

    #[test]
    fn page_decodes_service_response() {
        let json = r#"{
            "requirements": [
                {"id": 1, "requirement": "a", "date": "2024-01-01T00:00:00Z", "status": "Approved"}
            ],
            "stats": {"total": 11, "approved": 4, "inReview": 3, "disapproved": 1},
            "page": 2,
            "pages": 3,
            "total": 11
        }"#;

        let page: RequirementPage = serde_json::from_str(json).unwrap();

        assert_eq!(page.requirements.len(), 1);
        assert_eq!(page.stats.in_review, 3);
        assert_eq!(page.pagination, PaginationInfo::new(2, 3, 11));
    }

    #[test]
    fn user_message_prefers_service_explanation() {
        let explained = ApiError::Status {
            status: 400,
            message: Some("Invalid filter".to_string()),
        };
        let unexplained = ApiError::Status {
            status: 502,
            message: None,
        };

        assert_eq!(explained.user_message("fallback"), "Invalid filter");
        assert_eq!(unexplained.user_message("fallback"), "fallback");
        assert_eq!(explained.to_string(), "service returned 400: Invalid filter");
        assert_eq!(unexplained.to_string(), "service returned 502");
    }

    #[test]
    fn only_404_means_not_found() {
        let missing = ApiError::Status {
            status: 404,
            message: Some("Requirement not found".to_string()),
        };
        let rejected = ApiError::Status {
            status: 400,
            message: None,
        };

        assert!(missing.is_not_found());
        assert!(!rejected.is_not_found());
    }
}
