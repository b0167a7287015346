//! Pure transition rules for the quiz session lifecycle.
//!
//! The stored session document is the source of truth; this module only
//! decides whether an admin command is legal from the state that was just
//! read, and what the resulting phase and registration flag must be.

use thiserror::Error;

use crate::store::models::SessionStatus;

/// Admin commands that move the session between phases.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionEvent {
    /// Begin a fresh round and let participants join.
    OpenRegistration,
    /// Stop accepting participants while staying in registration.
    CloseRegistration,
    /// Enter the active phase and release the first question.
    StartGame,
    /// Finalize scores and end the round.
    EndGame,
    /// Wipe the round back to idle.
    Reset,
}

/// Error returned when a command cannot be applied from the current phase.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("cannot apply {event:?} while session is {from:?}")]
pub struct InvalidTransition {
    /// Phase the session was in when the command arrived.
    pub from: SessionStatus,
    /// The rejected command.
    pub event: SessionEvent,
}

/// Compute the phase and registration flag after applying `event`.
///
/// Returns the `(status, registration_open)` pair the session document must
/// be moved to. The pair always satisfies the session invariant
/// `registration_open => status = registration`.
pub fn next_session_state(
    status: SessionStatus,
    event: SessionEvent,
) -> Result<(SessionStatus, bool), InvalidTransition> {
    let next = match (status, event) {
        // Opening registration is treated as a fresh round start from any phase.
        (_, SessionEvent::OpenRegistration) => (SessionStatus::Registration, true),
        (SessionStatus::Registration, SessionEvent::CloseRegistration) => {
            (SessionStatus::Registration, false)
        }
        (SessionStatus::Registration, SessionEvent::StartGame) => (SessionStatus::Active, false),
        (SessionStatus::Active, SessionEvent::EndGame) => (SessionStatus::Ended, false),
        (_, SessionEvent::Reset) => (SessionStatus::Idle, false),
        (from, event) => return Err(InvalidTransition { from, event }),
    };

    Ok(next)
}

#[cfg(test)]
mod tests {
    use super::*;

    const ALL_STATUSES: [SessionStatus; 4] = [
        SessionStatus::Idle,
        SessionStatus::Registration,
        SessionStatus::Active,
        SessionStatus::Ended,
    ];

    #[test]
    fn full_happy_path_through_round() {
        let (status, open) =
            next_session_state(SessionStatus::Idle, SessionEvent::OpenRegistration).unwrap();
        assert_eq!((status, open), (SessionStatus::Registration, true));

        let (status, open) =
            next_session_state(status, SessionEvent::CloseRegistration).unwrap();
        assert_eq!((status, open), (SessionStatus::Registration, false));

        let (status, open) = next_session_state(status, SessionEvent::StartGame).unwrap();
        assert_eq!((status, open), (SessionStatus::Active, false));

        let (status, open) = next_session_state(status, SessionEvent::EndGame).unwrap();
        assert_eq!((status, open), (SessionStatus::Ended, false));
    }

    #[test]
    fn open_registration_is_legal_from_every_phase() {
        for status in ALL_STATUSES {
            let next = next_session_state(status, SessionEvent::OpenRegistration).unwrap();
            assert_eq!(next, (SessionStatus::Registration, true));
        }
    }

    #[test]
    fn reset_is_legal_from_every_phase() {
        for status in ALL_STATUSES {
            let next = next_session_state(status, SessionEvent::Reset).unwrap();
            assert_eq!(next, (SessionStatus::Idle, false));
        }
    }

    #[test]
    fn start_requires_registration() {
        for status in [SessionStatus::Idle, SessionStatus::Active, SessionStatus::Ended] {
            let err = next_session_state(status, SessionEvent::StartGame).unwrap_err();
            assert_eq!(err.from, status);
            assert_eq!(err.event, SessionEvent::StartGame);
        }
    }

    #[test]
    fn end_requires_active() {
        for status in [
            SessionStatus::Idle,
            SessionStatus::Registration,
            SessionStatus::Ended,
        ] {
            assert!(next_session_state(status, SessionEvent::EndGame).is_err());
        }
    }

    #[test]
    fn close_registration_outside_registration_is_rejected() {
        for status in [SessionStatus::Idle, SessionStatus::Active, SessionStatus::Ended] {
            assert!(next_session_state(status, SessionEvent::CloseRegistration).is_err());
        }
    }

    #[test]
    fn registration_flag_only_ever_set_in_registration() {
        for status in ALL_STATUSES {
            for event in [
                SessionEvent::OpenRegistration,
                SessionEvent::CloseRegistration,
                SessionEvent::StartGame,
                SessionEvent::EndGame,
                SessionEvent::Reset,
            ] {
                if let Ok((next_status, open)) = next_session_state(status, event) {
                    assert!(!open || next_status == SessionStatus::Registration);
                }
            }
        }
    }
}
