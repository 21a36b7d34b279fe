//! Lifecycle event kinds
//!
//! Cancellation, transfer, waiting-list removal and no-membership
//! determinations are all recorded as one tagged event entity rather than a
//! flat table of nullable special-purpose columns.

use serde::{Deserialize, Serialize};

/// What happened to the booking
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LifecycleEventKind {
    /// Booking cancelled (immediately or on a scheduled date)
    Cancelled,
    /// Booking moved to a different class/venue
    Transferred,
    /// Waiting-list entry removed
    Removed,
    /// Attended trial that did not convert to a membership
    NoMembership,
}

impl LifecycleEventKind {
    pub fn from_db(s: &str) -> Option<Self> {
        match s {
            "cancelled" => Some(Self::Cancelled),
            "transferred" => Some(Self::Transferred),
            "removed" => Some(Self::Removed),
            "no_membership" => Some(Self::NoMembership),
            _ => None,
        }
    }

    pub fn as_db(&self) -> &'static str {
        match self {
            Self::Cancelled => "cancelled",
            Self::Transferred => "transferred",
            Self::Removed => "removed",
            Self::NoMembership => "no_membership",
        }
    }
}

/// Whether a cancellation takes effect now or at a stored future date
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CancellationType {
    Immediate,
    Scheduled,
}

impl CancellationType {
    pub fn from_db(s: &str) -> Option<Self> {
        match s {
            "immediate" => Some(Self::Immediate),
            "scheduled" => Some(Self::Scheduled),
            _ => None,
        }
    }

    pub fn as_db(&self) -> &'static str {
        match self {
            Self::Immediate => "immediate",
            Self::Scheduled => "scheduled",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kind_roundtrip() {
        for k in [
            LifecycleEventKind::Cancelled,
            LifecycleEventKind::Transferred,
            LifecycleEventKind::Removed,
            LifecycleEventKind::NoMembership,
        ] {
            assert_eq!(LifecycleEventKind::from_db(k.as_db()), Some(k));
        }
        assert_eq!(LifecycleEventKind::from_db("frozen"), None);
    }

    #[test]
    fn test_cancellation_type_roundtrip() {
        assert_eq!(
            CancellationType::from_db("immediate"),
            Some(CancellationType::Immediate)
        );
        assert_eq!(
            CancellationType::from_db("scheduled"),
            Some(CancellationType::Scheduled)
        );
        assert_eq!(CancellationType::from_db("later"), None);
    }
}
