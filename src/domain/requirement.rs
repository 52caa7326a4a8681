use std::{fmt, str::FromStr};

use chrono::{DateTime, NaiveDate, NaiveDateTime, SecondsFormat, Utc};
use non_empty_string::NonEmptyString;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// Declares a closed set of string-valued options.
///
/// Each generated enum round-trips through the exact label the service uses
/// on the wire, and parses case-insensitively (ignoring `-`, `_` and spaces)
/// so that command-line input such as `non-functional` is accepted.
macro_rules! closed_enum {
    (
        $(#[$meta:meta])*
        $name:ident, $kind:literal {
            $( $(#[$vmeta:meta])* $variant:ident => $label:literal ),+ $(,)?
        }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
        pub enum $name {
            $( $(#[$vmeta])* $variant ),+
        }

        impl $name {
            /// Every value, in display order.
            pub const ALL: &'static [Self] = &[$(Self::$variant),+];

            /// The label used by the service.
            #[must_use]
            pub const fn as_str(self) -> &'static str {
                match self {
                    $(Self::$variant => $label),+
                }
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.as_str())
            }
        }

        impl FromStr for $name {
            type Err = UnknownValue;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                let wanted = normalise_label(s);
                Self::ALL
                    .iter()
                    .copied()
                    .find(|value| normalise_label(value.as_str()) == wanted)
                    .ok_or_else(|| UnknownValue {
                        kind: $kind,
                        value: s.to_string(),
                    })
            }
        }

        impl Serialize for $name {
            fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
                serializer.serialize_str(self.as_str())
            }
        }

        impl<'de> Deserialize<'de> for $name {
            fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
                let raw = String::deserialize(deserializer)?;
                raw.parse().map_err(serde::de::Error::custom)
            }
        }
    };
}

fn normalise_label(label: &str) -> String {
    label
        .chars()
        .filter(|c| !matches!(c, '-' | '_' | ' '))
        .map(|c| c.to_ascii_lowercase())
        .collect()
}

/// Error returned when a label does not name a known option.
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
#[error("unknown {kind} '{value}'")]
pub struct UnknownValue {
    /// Which option set was being parsed (e.g. `status`).
    pub kind: &'static str,
    /// The rejected input.
    pub value: String,
}

closed_enum! {
    /// Review state of a requirement.
    Status, "status" {
        /// Newly extracted or created, not yet reviewed.
        Draft => "Draft",
        /// Under review.
        Review => "Review",
        /// Accepted.
        Approved => "Approved",
        /// Rejected.
        Disapproved => "Disapproved",
    }
}

closed_enum! {
    /// How urgently a requirement should be addressed.
    Priority, "priority" {
        /// Low priority.
        Low => "Low",
        /// Medium priority.
        Medium => "Medium",
        /// High priority.
        High => "High",
    }
}

closed_enum! {
    /// Estimated implementation difficulty.
    Complexity, "complexity" {
        /// Low complexity.
        Low => "Low",
        /// Moderate complexity.
        Moderate => "Moderate",
        /// High complexity.
        High => "High",
    }
}

closed_enum! {
    /// Classification tag; a requirement may carry several.
    Category, "category" {
        /// Behaviour the system must exhibit.
        Functional => "Functional",
        /// Quality attributes and constraints.
        NonFunctional => "Non-Functional",
        /// User-interface concerns.
        Ui => "UI",
        /// Security concerns.
        Security => "Security",
        /// Performance concerns.
        Performance => "Performance",
    }
}

impl Default for Status {
    fn default() -> Self {
        Self::Draft
    }
}

impl Default for Priority {
    fn default() -> Self {
        Self::Medium
    }
}

impl Default for Complexity {
    fn default() -> Self {
        Self::Moderate
    }
}

/// Identifier assigned to a requirement by the service.
///
/// The service may encode identifiers as JSON numbers or strings; both are
/// accepted and normalised to their textual form.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(from = "WireId")]
pub struct RequirementId(String);

#[derive(Deserialize)]
#[serde(untagged)]
enum WireId {
    Number(u64),
    Text(String),
}

impl From<WireId> for RequirementId {
    fn from(id: WireId) -> Self {
        match id {
            WireId::Number(n) => Self(n.to_string()),
            WireId::Text(s) => Self(s),
        }
    }
}

impl RequirementId {
    /// Returns the identifier as it appears in URLs and exports.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for RequirementId {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

impl FromStr for RequirementId {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self::from(s.trim()))
    }
}

impl From<u64> for RequirementId {
    fn from(value: u64) -> Self {
        Self(value.to_string())
    }
}

impl fmt::Display for RequirementId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A single requirement as confirmed by the service.
///
/// Values of this type are read-only snapshots: changes go through the
/// service and come back as fresh values.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "WireRequirement", into = "WireRequirement")]
pub struct Requirement {
    id: RequirementId,
    text: NonEmptyString,
    status: Status,
    priority: Priority,
    complexity: Complexity,
    categories: Vec<Category>,
    author: String,
    date: DateTime<Utc>,
    estimated_time: f64,
}

/// Reasons a record received from the service is rejected.
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum InvalidRequirement {
    /// The requirement text was empty.
    #[error("requirement {0} has empty text")]
    EmptyText(RequirementId),

    /// The estimate was negative or not a number.
    #[error("requirement {0} has an invalid estimated time")]
    InvalidEstimate(RequirementId),
}

impl Requirement {
    /// Construct a requirement with default status, priority and complexity.
    ///
    /// Records normally arrive from the service; this constructor exists for
    /// in-process collaborators and tests.
    #[must_use]
    pub fn new(id: impl Into<RequirementId>, text: NonEmptyString, date: DateTime<Utc>) -> Self {
        Self {
            id: id.into(),
            text,
            status: Status::default(),
            priority: Priority::default(),
            complexity: Complexity::default(),
            categories: Vec::new(),
            author: String::new(),
            date,
            estimated_time: 0.0,
        }
    }

    /// Set the status.
    #[must_use]
    pub const fn with_status(mut self, status: Status) -> Self {
        self.status = status;
        self
    }

    /// Set the priority.
    #[must_use]
    pub const fn with_priority(mut self, priority: Priority) -> Self {
        self.priority = priority;
        self
    }

    /// Set the complexity.
    #[must_use]
    pub const fn with_complexity(mut self, complexity: Complexity) -> Self {
        self.complexity = complexity;
        self
    }

    /// Set the categories, replacing any existing ones.
    #[must_use]
    pub fn with_categories(mut self, categories: impl IntoIterator<Item = Category>) -> Self {
        self.categories = dedup_categories(categories);
        self
    }

    /// Set the author.
    #[must_use]
    pub fn with_author(mut self, author: impl Into<String>) -> Self {
        self.author = author.into();
        self
    }

    /// Set the estimated time in hours. Negative values are clamped to zero.
    #[must_use]
    pub const fn with_estimated_time(mut self, hours: f64) -> Self {
        self.estimated_time = if hours > 0.0 { hours } else { 0.0 };
        self
    }

    /// The service-assigned identifier.
    #[must_use]
    pub const fn id(&self) -> &RequirementId {
        &self.id
    }

    /// The requirement statement.
    #[must_use]
    pub fn text(&self) -> &str {
        self.text.as_str()
    }

    /// Review status.
    #[must_use]
    pub const fn status(&self) -> Status {
        self.status
    }

    /// Priority.
    #[must_use]
    pub const fn priority(&self) -> Priority {
        self.priority
    }

    /// Complexity.
    #[must_use]
    pub const fn complexity(&self) -> Complexity {
        self.complexity
    }

    /// Categories, in the order the service listed them.
    #[must_use]
    pub fn categories(&self) -> &[Category] {
        &self.categories
    }

    /// Who wrote or extracted the requirement.
    #[must_use]
    pub fn author(&self) -> &str {
        &self.author
    }

    /// When the requirement was recorded.
    #[must_use]
    pub const fn date(&self) -> DateTime<Utc> {
        self.date
    }

    /// Estimated effort in hours.
    #[must_use]
    pub const fn estimated_time(&self) -> f64 {
        self.estimated_time
    }
}

fn dedup_categories(categories: impl IntoIterator<Item = Category>) -> Vec<Category> {
    let mut out = Vec::new();
    for category in categories {
        if !out.contains(&category) {
            out.push(category);
        }
    }
    out
}

/// The shape the service uses for requirement records.
#[derive(Debug, Serialize, Deserialize)]
pub(crate) struct WireRequirement {
    id: RequirementId,
    requirement: String,
    #[serde(default)]
    status: Status,
    #[serde(default)]
    priority: Priority,
    #[serde(default)]
    complexity: Complexity,
    #[serde(default, with = "categories")]
    categories: Vec<Category>,
    #[serde(default, deserialize_with = "null_as_default")]
    author: String,
    #[serde(with = "timestamp")]
    date: DateTime<Utc>,
    #[serde(default, deserialize_with = "null_as_default")]
    estimated_time: f64,
}

impl TryFrom<WireRequirement> for Requirement {
    type Error = InvalidRequirement;

    fn try_from(wire: WireRequirement) -> Result<Self, Self::Error> {
        let Ok(text) = NonEmptyString::new(wire.requirement) else {
            return Err(InvalidRequirement::EmptyText(wire.id));
        };
        if !wire.estimated_time.is_finite() || wire.estimated_time < 0.0 {
            return Err(InvalidRequirement::InvalidEstimate(wire.id));
        }

        Ok(Self {
            id: wire.id,
            text,
            status: wire.status,
            priority: wire.priority,
            complexity: wire.complexity,
            categories: dedup_categories(wire.categories),
            author: wire.author,
            date: wire.date,
            estimated_time: wire.estimated_time,
        })
    }
}

impl From<Requirement> for WireRequirement {
    fn from(requirement: Requirement) -> Self {
        Self {
            id: requirement.id,
            requirement: requirement.text.as_str().to_string(),
            status: requirement.status,
            priority: requirement.priority,
            complexity: requirement.complexity,
            categories: requirement.categories,
            author: requirement.author,
            date: requirement.date,
            estimated_time: requirement.estimated_time,
        }
    }
}

fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

/// Categories travel either as a `", "`-joined string or as a list.
pub(crate) mod categories {
    use serde::{Deserialize, Deserializer, Serializer};

    use super::Category;

    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Wire {
        Joined(String),
        List(Vec<String>),
    }

    pub fn serialize<S: Serializer>(categories: &[Category], serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&join(categories))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Vec<Category>, D::Error> {
        let labels = match Option::<Wire>::deserialize(deserializer)? {
            None => Vec::new(),
            Some(Wire::Joined(joined)) => joined.split(',').map(str::to_string).collect(),
            Some(Wire::List(list)) => list,
        };

        Ok(labels
            .iter()
            .map(|label| label.trim())
            .filter(|label| !label.is_empty())
            .filter_map(|label| match label.parse() {
                Ok(category) => Some(category),
                Err(e) => {
                    tracing::warn!("skipping {e}");
                    None
                }
            })
            .collect())
    }

    pub fn join(categories: &[Category]) -> String {
        categories
            .iter()
            .map(|category| category.as_str())
            .collect::<Vec<_>>()
            .join(", ")
    }
}

/// Timestamps are written as RFC 3339 and read from any format the service
/// has been seen to emit.
pub(crate) mod timestamp {
    use chrono::{DateTime, Utc};
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(date: &DateTime<Utc>, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&super::format_timestamp(*date))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<DateTime<Utc>, D::Error> {
        let raw = String::deserialize(deserializer)?;
        super::parse_timestamp(&raw)
            .ok_or_else(|| serde::de::Error::custom(format!("unrecognised date '{raw}'")))
    }
}

pub(crate) fn format_timestamp(date: DateTime<Utc>) -> String {
    date.to_rfc3339_opts(SecondsFormat::Millis, true)
}

/// Parse a timestamp in RFC 3339, naive ISO-8601 (taken as UTC), RFC 2822,
/// or plain calendar-date form.
pub(crate) fn parse_timestamp(raw: &str) -> Option<DateTime<Utc>> {
    let raw = raw.trim();

    if let Ok(date) = DateTime::parse_from_rfc3339(raw) {
        return Some(date.with_timezone(&Utc));
    }

    for format in ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f"] {
        if let Ok(naive) = NaiveDateTime::parse_from_str(raw, format) {
            return Some(naive.and_utc());
        }
    }

    if let Ok(date) = DateTime::parse_from_rfc2822(raw) {
        return Some(date.with_timezone(&Utc));
    }

    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .ok()
        .and_then(|date| date.and_hms_opt(0, 0, 0))
        .map(|naive| naive.and_utc())
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone;
    use test_case::test_case;

    use super::*;

    #[test_case("Non-Functional", Category::NonFunctional; "wire label")]
    #[test_case("non-functional", Category::NonFunctional; "lowercase")]
    #[test_case("nonfunctional", Category::NonFunctional; "no separator")]
    #[test_case("ui", Category::Ui; "acronym")]
    fn category_parses_loosely(input: &str, expected: Category) {
        assert_eq!(input.parse::<Category>().unwrap(), expected);
    }

    #[test]
    fn unknown_status_is_rejected() {
        let error = "Pending".parse::<Status>().unwrap_err();
        assert_eq!(error.to_string(), "unknown status 'Pending'");
    }

    #[test]
    fn decodes_service_record() {
        let json = r#"{
            "id": 17,
            "requirement": "The system shall log in users",
            "status": "Approved",
            "priority": "High",
            "complexity": "Low",
            "categories": "Functional, Security",
            "author": "extractor",
            "date": "2024-03-05T10:20:30",
            "estimated_time": 2.5
        }"#;

        let requirement: Requirement = serde_json::from_str(json).unwrap();

        assert_eq!(requirement.id().as_str(), "17");
        assert_eq!(requirement.text(), "The system shall log in users");
        assert_eq!(requirement.status(), Status::Approved);
        assert_eq!(requirement.priority(), Priority::High);
        assert_eq!(requirement.complexity(), Complexity::Low);
        assert_eq!(
            requirement.categories(),
            &[Category::Functional, Category::Security]
        );
        assert_eq!(
            requirement.date(),
            Utc.with_ymd_and_hms(2024, 3, 5, 10, 20, 30).unwrap()
        );
        assert!((requirement.estimated_time() - 2.5).abs() < f64::EPSILON);
    }

    #[test]
    fn categories_accept_list_and_skip_unknown() {
        let json = r#"{
            "id": "a1",
            "requirement": "x",
            "categories": ["UI", "Legal", "Performance"],
            "date": "Tue, 05 Mar 2024 10:20:30 GMT"
        }"#;

        let requirement: Requirement = serde_json::from_str(json).unwrap();

        assert_eq!(
            requirement.categories(),
            &[Category::Ui, Category::Performance]
        );
        assert_eq!(requirement.status(), Status::Draft);
        assert_eq!(
            requirement.date(),
            Utc.with_ymd_and_hms(2024, 3, 5, 10, 20, 30).unwrap()
        );
    }

    #[test]
    fn empty_text_is_rejected() {
        let json = r#"{"id": 1, "requirement": "", "date": "2024-03-05"}"#;
        let error = serde_json::from_str::<Requirement>(json).unwrap_err();
        assert!(error.to_string().contains("empty text"));
    }

    #[test]
    fn negative_estimate_is_rejected() {
        let json = r#"{"id": 1, "requirement": "x", "date": "2024-03-05", "estimated_time": -1}"#;
        assert!(serde_json::from_str::<Requirement>(json).is_err());
    }

    #[test]
    fn serializes_categories_joined() {
        let requirement = Requirement::new(
            3_u64,
            NonEmptyString::new("text".to_string()).unwrap(),
            Utc.with_ymd_and_hms(2024, 1, 2, 3, 4, 5).unwrap(),
        )
        .with_categories([Category::Ui, Category::Functional, Category::Ui]);

        let value = serde_json::to_value(&requirement).unwrap();

        assert_eq!(value["categories"], "UI, Functional");
        assert_eq!(value["id"], "3");
        assert_eq!(value["date"], "2024-01-02T03:04:05.000Z");
    }
}
