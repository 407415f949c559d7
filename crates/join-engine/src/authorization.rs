//! Role-gated action authorization.

use crate::models::AvailabilityState;
use common::types::MeetingRole;

/// Whether the join/create action may be invoked.
///
/// - `Expired`: never.
/// - Participants: only when a meeting already exists; they never create one.
/// - `Active`: always (subject to the participant rule).
/// - `StartingSoon`: never, the caller has to wait for the window.
/// - `NotAvailable`: hosts only, so a meeting can be created ahead of time.
pub fn is_action_allowed(state: AvailabilityState, role: MeetingRole, has_meeting: bool) -> bool {
    if state == AvailabilityState::Expired {
        return false;
    }
    if role == MeetingRole::Participant && !has_meeting {
        return false;
    }
    match state {
        AvailabilityState::Active => true,
        AvailabilityState::NotAvailable => role == MeetingRole::Host,
        AvailabilityState::StartingSoon | AvailabilityState::Expired => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const ALL_STATES: [AvailabilityState; 4] = [
        AvailabilityState::NotAvailable,
        AvailabilityState::StartingSoon,
        AvailabilityState::Active,
        AvailabilityState::Expired,
    ];

    const ALL_ROLES: [MeetingRole; 2] = [MeetingRole::Host, MeetingRole::Participant];

    #[test]
    fn test_expired_is_never_allowed() {
        for role in ALL_ROLES {
            for has_meeting in [true, false] {
                assert!(!is_action_allowed(
                    AvailabilityState::Expired,
                    role,
                    has_meeting
                ));
            }
        }
    }

    #[test]
    fn test_not_available_is_host_only() {
        for has_meeting in [true, false] {
            assert!(is_action_allowed(
                AvailabilityState::NotAvailable,
                MeetingRole::Host,
                has_meeting
            ));
            assert!(!is_action_allowed(
                AvailabilityState::NotAvailable,
                MeetingRole::Participant,
                has_meeting
            ));
        }
    }

    #[test]
    fn test_starting_soon_blocks_everyone() {
        for role in ALL_ROLES {
            for has_meeting in [true, false] {
                assert!(!is_action_allowed(
                    AvailabilityState::StartingSoon,
                    role,
                    has_meeting
                ));
            }
        }
    }

    #[test]
    fn test_active_allows_host_and_participant_with_meeting() {
        assert!(is_action_allowed(AvailabilityState::Active, MeetingRole::Host, false));
        assert!(is_action_allowed(AvailabilityState::Active, MeetingRole::Host, true));
        assert!(is_action_allowed(
            AvailabilityState::Active,
            MeetingRole::Participant,
            true
        ));
    }

    #[test]
    fn test_participant_without_meeting_is_always_blocked() {
        for state in ALL_STATES {
            assert!(!is_action_allowed(state, MeetingRole::Participant, false));
        }
    }
}
