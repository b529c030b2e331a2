use serde::{Deserialize, Serialize};

/// Lifecycle status of a booking.
///
/// ```text
/// pending ──► confirmed ──► completed
///    │             │
///    ├──► rejected └──► cancelled
///    └──► cancelled
/// ```
///
/// Rejected, completed, and cancelled are terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BookingStatus {
    /// Awaiting operator review. Occupies calendar availability.
    Pending,
    /// Accepted by an operator. Occupies calendar availability.
    Confirmed,
    /// Declined by an operator. Terminal.
    Rejected,
    /// The stay took place; counted by the revenue rollups. Terminal.
    Completed,
    /// Called off by either side. Terminal.
    Cancelled,
}

impl BookingStatus {
    /// Statuses that still occupy calendar availability.
    pub const OCCUPYING: [BookingStatus; 2] = [BookingStatus::Pending, BookingStatus::Confirmed];

    /// Storage representation of the status.
    pub fn as_str(&self) -> &'static str {
        match self {
            BookingStatus::Pending => "pending",
            BookingStatus::Confirmed => "confirmed",
            BookingStatus::Rejected => "rejected",
            BookingStatus::Completed => "completed",
            BookingStatus::Cancelled => "cancelled",
        }
    }

    /// Parses a stored status string.
    pub fn parse(s: &str) -> Option<BookingStatus> {
        match s {
            "pending" => Some(BookingStatus::Pending),
            "confirmed" => Some(BookingStatus::Confirmed),
            "rejected" => Some(BookingStatus::Rejected),
            "completed" => Some(BookingStatus::Completed),
            "cancelled" => Some(BookingStatus::Cancelled),
            _ => None,
        }
    }

    /// Whether no further transitions are permitted from this status.
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            BookingStatus::Rejected | BookingStatus::Completed | BookingStatus::Cancelled
        )
    }

    /// Whether bookings in this status block the calendar for their item.
    pub fn occupies_calendar(&self) -> bool {
        matches!(self, BookingStatus::Pending | BookingStatus::Confirmed)
    }

    /// Whether moving to `target` is a legal transition.
    pub fn can_transition_to(&self, target: BookingStatus) -> bool {
        match self {
            BookingStatus::Pending => matches!(
                target,
                BookingStatus::Confirmed | BookingStatus::Rejected | BookingStatus::Cancelled
            ),
            BookingStatus::Confirmed => {
                matches!(target, BookingStatus::Completed | BookingStatus::Cancelled)
            }
            BookingStatus::Rejected | BookingStatus::Completed | BookingStatus::Cancelled => false,
        }
    }
}

impl std::fmt::Display for BookingStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use BookingStatus::*;

    #[test]
    fn pending_can_move_to_confirmed_rejected_or_cancelled() {
        assert!(Pending.can_transition_to(Confirmed));
        assert!(Pending.can_transition_to(Rejected));
        assert!(Pending.can_transition_to(Cancelled));
        assert!(!Pending.can_transition_to(Completed));
        assert!(!Pending.can_transition_to(Pending));
    }

    #[test]
    fn confirmed_can_only_complete_or_cancel() {
        assert!(Confirmed.can_transition_to(Completed));
        assert!(Confirmed.can_transition_to(Cancelled));
        assert!(!Confirmed.can_transition_to(Pending));
        assert!(!Confirmed.can_transition_to(Rejected));
    }

    #[test]
    fn terminal_statuses_allow_no_transitions() {
        for terminal in [Rejected, Completed, Cancelled] {
            assert!(terminal.is_terminal());
            for target in [Pending, Confirmed, Rejected, Completed, Cancelled] {
                assert!(!terminal.can_transition_to(target));
            }
        }
        // The case quoted back by support the most: un-rejecting a booking.
        assert!(!Rejected.can_transition_to(Confirmed));
    }

    #[test]
    fn only_pending_and_confirmed_block_the_calendar() {
        assert!(Pending.occupies_calendar());
        assert!(Confirmed.occupies_calendar());
        assert!(!Rejected.occupies_calendar());
        assert!(!Completed.occupies_calendar());
        assert!(!Cancelled.occupies_calendar());
    }

    #[test]
    fn statuses_round_trip_through_strings() {
        for status in [Pending, Confirmed, Rejected, Completed, Cancelled] {
            assert_eq!(BookingStatus::parse(status.as_str()), Some(status));
        }
        assert_eq!(BookingStatus::parse("archived"), None);
    }
}
