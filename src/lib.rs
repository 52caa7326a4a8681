//! Requirements dashboard
//!
//! A client for a requirements-management service. The dashboard searches,
//! filters and pages through requirements, keeps statistics for both the
//! whole set and the filtered view, and exports the loaded page as CSV.
//!
//! The [`QueryCoordinator`] owns the query and decides when to fetch; the
//! [`RequirementsApi`] trait is the boundary to the service.

pub mod domain;
pub use domain::{
    Category, Complexity, Config, Facet, FilterCategory, FilterSelection, PaginationInfo,
    Priority, QueryState, QueryUpdate, Requirement, RequirementDraft, RequirementId,
    StatsSnapshot, Status,
};

pub mod client;
pub use client::{ApiError, HttpClient, RequirementPage, RequirementsApi, UploadFile};

pub mod coordinator;
pub use coordinator::{DashboardView, QueryCoordinator};

pub mod export;
