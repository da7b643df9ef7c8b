use thiserror::Error;

/// A guard failure rejects the requested write outright; there is no retry
/// or fallback path.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum GuardError {
    #[error("You are already registered for this event.")]
    DuplicateRegistration,

    #[error("This event is full.")]
    CapacityExceeded,

    #[error("You can only rate events you have participated in.")]
    NotAParticipant,

    #[error("You have already rated this event.")]
    DuplicateRating,
}

impl GuardError {
    pub fn code(&self) -> &'static str {
        match self {
            GuardError::DuplicateRegistration => "DUPLICATE_REGISTRATION",
            GuardError::CapacityExceeded => "CAPACITY_EXCEEDED",
            GuardError::NotAParticipant => "NOT_A_PARTICIPANT",
            GuardError::DuplicateRating => "DUPLICATE_RATING",
        }
    }
}

/// Current state relevant to a registration attempt, read before the check.
#[derive(Debug, Clone, Copy)]
pub struct RegistrationSnapshot {
    /// A participant row already exists for this (user, event).
    pub already_registered: bool,
    pub participant_count: i64,
    pub max_participants: i32,
}

/// Decide whether a new participant row may be created.
///
/// The snapshot is a plain read with no lock held, so two concurrent
/// registrations can both pass the capacity check. The (user, event)
/// uniqueness has a database constraint as backstop; the capacity limit
/// does not.
pub fn check_registration(snapshot: &RegistrationSnapshot) -> Result<(), GuardError> {
    if snapshot.already_registered {
        return Err(GuardError::DuplicateRegistration);
    }
    if snapshot.participant_count >= i64::from(snapshot.max_participants) {
        return Err(GuardError::CapacityExceeded);
    }
    Ok(())
}

/// Current state relevant to a rating attempt.
#[derive(Debug, Clone, Copy)]
pub struct RatingSnapshot {
    pub is_participant: bool,
    pub already_rated: bool,
}

/// Decide whether a new rating row may be created.
pub fn check_rating(snapshot: &RatingSnapshot) -> Result<(), GuardError> {
    if !snapshot.is_participant {
        return Err(GuardError::NotAParticipant);
    }
    if snapshot.already_rated {
        return Err(GuardError::DuplicateRating);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn open_event(count: i64, max: i32) -> RegistrationSnapshot {
        RegistrationSnapshot {
            already_registered: false,
            participant_count: count,
            max_participants: max,
        }
    }

    #[test]
    fn registration_succeeds_below_capacity() {
        assert_eq!(check_registration(&open_event(0, 1)), Ok(()));
        assert_eq!(check_registration(&open_event(9, 10)), Ok(()));
    }

    #[test]
    fn registration_fails_at_capacity() {
        assert_eq!(
            check_registration(&open_event(1, 1)),
            Err(GuardError::CapacityExceeded)
        );
        assert_eq!(
            check_registration(&open_event(10, 10)),
            Err(GuardError::CapacityExceeded)
        );
    }

    #[test]
    fn duplicate_registration_checked_before_capacity() {
        // A user already registered gets the duplicate error even when the
        // event is also full.
        let snapshot = RegistrationSnapshot {
            already_registered: true,
            participant_count: 5,
            max_participants: 5,
        };
        assert_eq!(
            check_registration(&snapshot),
            Err(GuardError::DuplicateRegistration)
        );
    }

    #[test]
    fn zero_capacity_event_rejects_everyone() {
        assert_eq!(
            check_registration(&open_event(0, 0)),
            Err(GuardError::CapacityExceeded)
        );
    }

    #[test]
    fn rating_requires_participation() {
        let snapshot = RatingSnapshot {
            is_participant: false,
            already_rated: false,
        };
        assert_eq!(check_rating(&snapshot), Err(GuardError::NotAParticipant));
    }

    #[test]
    fn rating_rejects_second_rating() {
        let snapshot = RatingSnapshot {
            is_participant: true,
            already_rated: true,
        };
        assert_eq!(check_rating(&snapshot), Err(GuardError::DuplicateRating));
    }

    #[test]
    fn rating_succeeds_for_unrated_participant() {
        let snapshot = RatingSnapshot {
            is_participant: true,
            already_rated: false,
        };
        assert_eq!(check_rating(&snapshot), Ok(()));
    }
}
