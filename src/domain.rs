//! Domain models for the requirements dashboard.
//!
//! This module contains the record types received from the service, the
//! query and filter model the dashboard edits, pagination, statistics, and
//! client configuration.

/// Requirement records and their closed option sets.
pub mod requirement;
pub use requirement::{
    Category, Complexity, InvalidRequirement, Priority, Requirement, RequirementId, Status,
    UnknownValue,
};

mod config;
pub use config::{Config, ConfigError};

mod draft;
pub use draft::{DEFAULT_ESTIMATED_HOURS, RequirementDraft, ValidationError};

pub mod filter;
pub use filter::{Facet, FilterCategory, FilterSelection};

mod pagination;
pub use pagination::{PaginationController, PaginationInfo};

mod query;
pub use query::{QueryState, QueryUpdate};

mod stats;
pub use stats::StatsSnapshot;
