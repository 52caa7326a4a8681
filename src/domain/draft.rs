use chrono::{DateTime, Utc};
use serde::Serialize;

use super::requirement::{self, Category, Complexity, Priority, Requirement, Status};

/// Default effort estimate for a new requirement, in hours.
pub const DEFAULT_ESTIMATED_HOURS: f64 = 4.0;

/// The content of a requirement being created or edited.
///
/// Drafts are validated on construction, before any request is sent.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RequirementDraft {
    #[serde(rename = "requirement")]
    text: String,
    author: String,
    priority: Priority,
    complexity: Complexity,
    estimated_time: f64,
    #[serde(serialize_with = "requirement::timestamp::serialize")]
    date: DateTime<Utc>,
    #[serde(serialize_with = "requirement::categories::serialize")]
    categories: Vec<Category>,
    #[serde(skip_serializing_if = "Option::is_none")]
    status: Option<Status>,
}

/// A draft that cannot be submitted.
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum ValidationError {
    /// The requirement text was empty or whitespace.
    #[error("Requirement text is required")]
    EmptyText,

    /// The estimate was negative or not a number.
    #[error("Estimated time must be a non-negative number of hours")]
    InvalidEstimate,
}

impl RequirementDraft {
    /// Start a draft with the default priority, complexity and estimate,
    /// dated now.
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError::EmptyText`] if `text` is blank.
    pub fn new(text: impl Into<String>) -> Result<Self, ValidationError> {
        let text = text.into();
        if text.trim().is_empty() {
            return Err(ValidationError::EmptyText);
        }

        Ok(Self {
            text,
            author: String::new(),
            priority: Priority::default(),
            complexity: Complexity::default(),
            estimated_time: DEFAULT_ESTIMATED_HOURS,
            date: Utc::now(),
            categories: Vec::new(),
            status: None,
        })
    }

    /// Replace the text.
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError::EmptyText`] if `text` is blank.
    pub fn set_text(&mut self, text: impl Into<String>) -> Result<(), ValidationError> {
        let text = text.into();
        if text.trim().is_empty() {
            return Err(ValidationError::EmptyText);
        }
        self.text = text;
        Ok(())
    }

    /// Set the estimate in hours.
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError::InvalidEstimate`] for negative or
    /// non-finite values.
    pub fn set_estimated_time(&mut self, hours: f64) -> Result<(), ValidationError> {
        if !hours.is_finite() || hours < 0.0 {
            return Err(ValidationError::InvalidEstimate);
        }
        self.estimated_time = hours;
        Ok(())
    }

    /// Set the author.
    pub fn set_author(&mut self, author: impl Into<String>) {
        self.author = author.into();
    }

    /// Set the priority.
    pub const fn set_priority(&mut self, priority: Priority) {
        self.priority = priority;
    }

    /// Set the complexity.
    pub const fn set_complexity(&mut self, complexity: Complexity) {
        self.complexity = complexity;
    }

    /// Replace the categories.
    pub fn set_categories(&mut self, categories: Vec<Category>) {
        self.categories = categories;
    }

    /// Set the status sent with a full edit.
    pub const fn set_status(&mut self, status: Status) {
        self.status = Some(status);
    }

    /// The requirement text.
    #[must_use]
    pub fn text(&self) -> &str {
        &self.text
    }
}

/// A full edit starts from the requirement as the service last reported it.
impl From<&Requirement> for RequirementDraft {
    fn from(requirement: &Requirement) -> Self {
        Self {
            text: requirement.text().to_string(),
            author: requirement.author().to_string(),
            priority: requirement.priority(),
            complexity: requirement.complexity(),
            estimated_time: requirement.estimated_time(),
            date: requirement.date(),
            categories: requirement.categories().to_vec(),
            status: Some(requirement.status()),
        }
    }
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone;
    use non_empty_string::NonEmptyString;

    use super::*;

    #[test]
    fn blank_text_is_rejected() {
        assert_eq!(RequirementDraft::new("   ").unwrap_err(), ValidationError::EmptyText);
        assert_eq!(
            RequirementDraft::new("").unwrap_err().to_string(),
            "Requirement text is required"
        );
    }

    #[test]
    fn new_draft_uses_form_defaults() {
        let draft = RequirementDraft::new("The system shall export CSV").unwrap();
        let value = serde_json::to_value(&draft).unwrap();

        assert_eq!(value["requirement"], "The system shall export CSV");
        assert_eq!(value["priority"], "Medium");
        assert_eq!(value["complexity"], "Moderate");
        assert_eq!(value["estimated_time"], 4.0);
        assert_eq!(value["categories"], "");
        assert!(value.get("status").is_none());
    }

    #[test]
    fn negative_estimate_is_rejected() {
        let mut draft = RequirementDraft::new("text").unwrap();
        assert_eq!(
            draft.set_estimated_time(-0.5),
            Err(ValidationError::InvalidEstimate)
        );
        assert_eq!(draft.set_estimated_time(0.0), Ok(()));
    }

    #[test]
    fn edit_draft_carries_existing_values() {
        let requirement = Requirement::new(
            9_u64,
            NonEmptyString::new("Old text".to_string()).unwrap(),
            Utc.with_ymd_and_hms(2024, 6, 1, 0, 0, 0).unwrap(),
        )
        .with_status(Status::Review)
        .with_categories([Category::Security, Category::Performance]);

        let mut draft = RequirementDraft::from(&requirement);
        draft.set_text("New text").unwrap();
        let value = serde_json::to_value(&draft).unwrap();

        assert_eq!(value["requirement"], "New text");
        assert_eq!(value["status"], "Review");
        assert_eq!(value["categories"], "Security, Performance");
        assert_eq!(value["date"], "2024-06-01T00:00:00.000Z");
    }
}
