use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::errors::TracerError;

/// Review status of a data request
///
/// Every request starts in `Pending`. `Completed` and `Rejected` are
/// terminal.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RequestStatus {
    #[default]
    Pending,
    Approved,
    InProgress,
    Completed,
    Rejected,
    RequiresRevision,
}

impl RequestStatus {
    /// All states, in workflow order
    pub const ALL: [RequestStatus; 6] = [
        RequestStatus::Pending,
        RequestStatus::Approved,
        RequestStatus::InProgress,
        RequestStatus::Completed,
        RequestStatus::Rejected,
        RequestStatus::RequiresRevision,
    ];

    /// Statuses reachable in one step from this one
    pub fn allowed_targets(&self) -> &'static [RequestStatus] {
        use RequestStatus::*;
        match self {
            Pending => &[Approved, Rejected, RequiresRevision],
            Approved => &[InProgress, Rejected],
            InProgress => &[Completed, RequiresRevision],
            RequiresRevision => &[Pending],
            Rejected | Completed => &[],
        }
    }

    pub fn can_transition_to(&self, target: RequestStatus) -> bool {
        self.allowed_targets().contains(&target)
    }

    pub fn is_terminal(&self) -> bool {
        self.allowed_targets().is_empty()
    }

    /// Leaving one of these states should be announced to the requester
    pub fn notifies_on_exit(&self) -> bool {
        matches!(
            self,
            RequestStatus::Pending | RequestStatus::Approved | RequestStatus::InProgress
        )
    }

    /// The student may still change the request's attributes
    pub fn is_amendable(&self) -> bool {
        matches!(
            self,
            RequestStatus::Pending | RequestStatus::RequiresRevision
        )
    }

    /// Canonical wire form
    pub fn as_str(&self) -> &'static str {
        match self {
            RequestStatus::Pending => "PENDING",
            RequestStatus::Approved => "APPROVED",
            RequestStatus::InProgress => "IN_PROGRESS",
            RequestStatus::Completed => "COMPLETED",
            RequestStatus::Rejected => "REJECTED",
            RequestStatus::RequiresRevision => "REQUIRES_REVISION",
        }
    }

    /// Human-readable label used in admin screens and mail
    pub fn label(&self) -> &'static str {
        match self {
            RequestStatus::Pending => "Pending Review",
            RequestStatus::Approved => "Approved",
            RequestStatus::InProgress => "In Progress",
            RequestStatus::Completed => "Completed",
            RequestStatus::Rejected => "Rejected",
            RequestStatus::RequiresRevision => "Needs Revision",
        }
    }
}

impl fmt::Display for RequestStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for RequestStatus {
    type Err = TracerError;

    /// Case-insensitive; accepts `-` or space in place of `_`
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_ascii_uppercase().replace(['-', ' '], "_");
        RequestStatus::ALL
            .into_iter()
            .find(|status| status.as_str() == normalized)
            .ok_or_else(|| TracerError::InvalidStatus {
                value: s.to_string(),
            })
    }
}
