//! Booking aggregate enums and the status transition guard

use serde::{Deserialize, Serialize};

/// Commercial category of a booking
///
/// DB strings are inherited from the original data set, spaces included
/// (`"waiting list"`), so the mapping is explicit rather than derived.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum BookingType {
    /// Free trial
    #[serde(rename = "free")]
    Free,
    /// Paid membership
    #[serde(rename = "paid")]
    Paid,
    /// Removed from the waiting list
    #[serde(rename = "removed")]
    Removed,
    /// Held against a full class
    #[serde(rename = "waiting list")]
    WaitingList,
}

impl BookingType {
    pub fn from_db(s: &str) -> Option<Self> {
        match s {
            "free" => Some(Self::Free),
            "paid" => Some(Self::Paid),
            "removed" => Some(Self::Removed),
            "waiting list" => Some(Self::WaitingList),
            _ => None,
        }
    }

    pub fn as_db(&self) -> &'static str {
        match self {
            Self::Free => "free",
            Self::Paid => "paid",
            Self::Removed => "removed",
            Self::WaitingList => "waiting list",
        }
    }
}

/// Lifecycle state of a booking
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum BookingStatus {
    /// Trial booked, outcome not yet recorded
    #[serde(rename = "pending")]
    Pending,
    /// Trial attended
    #[serde(rename = "attended")]
    Attended,
    /// Trial not attended
    #[serde(rename = "not attend")]
    NotAttend,
    /// Cancelled (terminal)
    #[serde(rename = "cancelled")]
    Cancelled,
    /// Trial rebooked to a later date
    #[serde(rename = "rebooked")]
    Rebooked,
    /// Attended but did not take a membership (terminal)
    #[serde(rename = "no_membership")]
    NoMembership,
    /// Active paid membership
    #[serde(rename = "active")]
    Active,
    /// Membership temporarily paused
    #[serde(rename = "frozen")]
    Frozen,
    /// Held on the waiting list
    #[serde(rename = "waiting list")]
    WaitingList,
    /// Scheduled cancellation requested, not yet due
    #[serde(rename = "request_to_cancel")]
    RequestToCancel,
    /// Removed from the waiting list (terminal)
    #[serde(rename = "removed")]
    RemovedFromWaitingList,
}

impl BookingStatus {
    pub fn from_db(s: &str) -> Option<Self> {
        match s {
            "pending" => Some(Self::Pending),
            "attended" => Some(Self::Attended),
            "not attend" => Some(Self::NotAttend),
            "cancelled" => Some(Self::Cancelled),
            "rebooked" => Some(Self::Rebooked),
            "no_membership" => Some(Self::NoMembership),
            "active" => Some(Self::Active),
            "frozen" => Some(Self::Frozen),
            "waiting list" => Some(Self::WaitingList),
            "request_to_cancel" => Some(Self::RequestToCancel),
            "removed" => Some(Self::RemovedFromWaitingList),
            _ => None,
        }
    }

    pub fn as_db(&self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Attended => "attended",
            Self::NotAttend => "not attend",
            Self::Cancelled => "cancelled",
            Self::Rebooked => "rebooked",
            Self::NoMembership => "no_membership",
            Self::Active => "active",
            Self::Frozen => "frozen",
            Self::WaitingList => "waiting list",
            Self::RequestToCancel => "request_to_cancel",
            Self::RemovedFromWaitingList => "removed",
        }
    }

    /// Terminal states admit no further transitions
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            Self::Cancelled | Self::NoMembership | Self::RemovedFromWaitingList
        )
    }

    /// Whether this booking state can move to `next`
    pub fn can_transition_to(&self, next: BookingStatus) -> bool {
        use BookingStatus::*;
        match self {
            Pending => matches!(next, Attended | NotAttend | Cancelled | Rebooked),
            Attended => matches!(next, NoMembership | Active),
            Active => matches!(next, Frozen | Cancelled | RequestToCancel),
            Frozen => matches!(next, Active),
            WaitingList => matches!(next, Active | Cancelled | RemovedFromWaitingList),
            RequestToCancel => matches!(next, Cancelled),
            // Rebooked trials go through the pending pipeline again
            Rebooked => matches!(next, Attended | NotAttend | Cancelled),
            NotAttend => matches!(next, Rebooked | Cancelled),
            Cancelled | NoMembership | RemovedFromWaitingList => false,
        }
    }
}

/// Reported family interest in continuing after a trial
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum InterestLevel {
    Low,
    Medium,
    High,
}

impl InterestLevel {
    pub fn from_db(s: &str) -> Option<Self> {
        match s {
            "low" => Some(Self::Low),
            "medium" => Some(Self::Medium),
            "high" => Some(Self::High),
            _ => None,
        }
    }

    pub fn as_db(&self) -> &'static str {
        match self {
            Self::Low => "low",
            Self::Medium => "medium",
            Self::High => "high",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_db_roundtrip() {
        let statuses = [
            BookingStatus::Pending,
            BookingStatus::Attended,
            BookingStatus::NotAttend,
            BookingStatus::Cancelled,
            BookingStatus::Rebooked,
            BookingStatus::NoMembership,
            BookingStatus::Active,
            BookingStatus::Frozen,
            BookingStatus::WaitingList,
            BookingStatus::RequestToCancel,
            BookingStatus::RemovedFromWaitingList,
        ];
        for s in statuses {
            assert_eq!(BookingStatus::from_db(s.as_db()), Some(s));
        }
        assert_eq!(BookingStatus::from_db("nonsense"), None);
    }

    #[test]
    fn test_type_db_roundtrip() {
        for t in [
            BookingType::Free,
            BookingType::Paid,
            BookingType::Removed,
            BookingType::WaitingList,
        ] {
            assert_eq!(BookingType::from_db(t.as_db()), Some(t));
        }
        assert_eq!(BookingType::WaitingList.as_db(), "waiting list");
    }

    #[test]
    fn test_pending_transitions() {
        use BookingStatus::*;
        assert!(Pending.can_transition_to(Attended));
        assert!(Pending.can_transition_to(NotAttend));
        assert!(Pending.can_transition_to(Cancelled));
        assert!(Pending.can_transition_to(Rebooked));
        assert!(!Pending.can_transition_to(Frozen));
        assert!(!Pending.can_transition_to(Active));
    }

    #[test]
    fn test_membership_transitions() {
        use BookingStatus::*;
        assert!(Attended.can_transition_to(Active));
        assert!(Attended.can_transition_to(NoMembership));
        assert!(Active.can_transition_to(Frozen));
        assert!(Active.can_transition_to(RequestToCancel));
        assert!(Active.can_transition_to(Cancelled));
        assert!(Frozen.can_transition_to(Active));
        assert!(!Frozen.can_transition_to(Cancelled));
    }

    #[test]
    fn test_waiting_list_transitions() {
        use BookingStatus::*;
        assert!(WaitingList.can_transition_to(Active));
        assert!(WaitingList.can_transition_to(Cancelled));
        assert!(WaitingList.can_transition_to(RemovedFromWaitingList));
        assert!(!WaitingList.can_transition_to(Frozen));
    }

    #[test]
    fn test_terminal_states() {
        use BookingStatus::*;
        for terminal in [Cancelled, NoMembership, RemovedFromWaitingList] {
            assert!(terminal.is_terminal());
            assert!(!terminal.can_transition_to(Active));
            assert!(!terminal.can_transition_to(Pending));
        }
        assert!(!Pending.is_terminal());
        assert!(!Frozen.is_terminal());
    }

    #[test]
    fn test_request_to_cancel_only_cancels() {
        use BookingStatus::*;
        assert!(RequestToCancel.can_transition_to(Cancelled));
        assert!(!RequestToCancel.can_transition_to(Active));
        assert!(!RequestToCancel.can_transition_to(Frozen));
    }

    #[test]
    fn test_serde_uses_db_strings() {
        let json = serde_json::to_string(&BookingStatus::WaitingList).unwrap();
        assert_eq!(json, "\"waiting list\"");
        let json = serde_json::to_string(&BookingStatus::NotAttend).unwrap();
        assert_eq!(json, "\"not attend\"");
        let parsed: BookingStatus = serde_json::from_str("\"request_to_cancel\"").unwrap();
        assert_eq!(parsed, BookingStatus::RequestToCancel);
    }
}
