use serde::{Deserialize, Serialize};

use super::requirement::{Requirement, Status};

/// Aggregate counts over a set of requirements.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct StatsSnapshot {
    /// Number of requirements in the set.
    pub total: u64,
    /// Number with status `Approved`.
    pub approved: u64,
    /// Number with status `Review`.
    pub in_review: u64,
    /// Number with status `Disapproved`.
    pub disapproved: u64,
}

impl StatsSnapshot {
    /// The all-zero snapshot.
    pub const ZERO: Self = Self {
        total: 0,
        approved: 0,
        in_review: 0,
        disapproved: 0,
    };

    /// Count a set of requirements.
    #[must_use]
    pub fn tally<'a>(requirements: impl IntoIterator<Item = &'a Requirement>) -> Self {
        requirements
            .into_iter()
            .fold(Self::ZERO, |mut stats, requirement| {
                stats.total += 1;
                match requirement.status() {
                    Status::Approved => stats.approved += 1,
                    Status::Review => stats.in_review += 1,
                    Status::Disapproved => stats.disapproved += 1,
                    Status::Draft => {}
                }
                stats
            })
    }

    /// Requirements not yet approved, in review or disapproved.
    #[must_use]
    pub const fn draft(&self) -> u64 {
        self.total
            .saturating_sub(self.approved)
            .saturating_sub(self.in_review)
            .saturating_sub(self.disapproved)
    }
}
