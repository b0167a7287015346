//! Participant registration and self-service lookups.

use rand::Rng;
use tracing::info;

use crate::{
    dto::participant::{ParticipantSummary, RegisterResponse},
    error::ServiceError,
    state::SharedState,
    store::{
        document::StoreError,
        models::{ParticipantRecord, epoch_ms},
        repository::{ParticipantRepository, SessionRepository},
    },
};

const ID_PREFIX: &str = "quiz_";
const ID_RANDOM_LEN: usize = 6;
const BASE36: &[u8; 36] = b"0123456789abcdefghijklmnopqrstuvwxyz";

/// Mint a display identity: prefix, millisecond timestamp in base 36, and a
/// short random suffix. Collisions are practically impossible; the store's
/// unique-key insert catches the rest.
fn mint_participant_id(now: i64) -> String {
    let mut rng = rand::rng();
    let mut id = String::with_capacity(ID_PREFIX.len() + 9 + ID_RANDOM_LEN);
    id.push_str(ID_PREFIX);
    id.push_str(&to_base36(now.max(0) as u64));
    for _ in 0..ID_RANDOM_LEN {
        id.push(BASE36[rng.random_range(0..BASE36.len())] as char);
    }
    id
}

fn to_base36(mut value: u64) -> String {
    if value == 0 {
        return "0".to_string();
    }
    let mut digits = Vec::new();
    while value > 0 {
        digits.push(BASE36[(value % 36) as usize]);
        value /= 36;
    }
    digits.reverse();
    String::from_utf8(digits).expect("base36 digits are ascii")
}

/// Register a new participant. Fails unless registration is currently open.
///
/// The identity is only returned once the store acknowledged the insert, so
/// a participant never holds an id that does not exist server-side.
pub async fn register(state: &SharedState) -> Result<RegisterResponse, ServiceError> {
    let store = state.require_store().await?;
    let sessions = SessionRepository::new(store.clone());

    let session = sessions
        .load()
        .await?
        .ok_or_else(|| ServiceError::PreconditionFailed("session not initialized".into()))?;
    if !session.registration_open {
        return Err(ServiceError::PreconditionFailed(
            "registration is closed".into(),
        ));
    }

    let now = epoch_ms();
    let record = ParticipantRecord {
        participant_id: mint_participant_id(now),
        total_score: 0,
        is_active: true,
        joined_at: now,
        last_active_at: now,
        answered_questions: Vec::new(),
    };

    let participants = ParticipantRepository::new(store);
    match participants.insert(&record).await {
        Ok(_) => {}
        // A timestamp+random collision; mint again once.
        Err(StoreError::Conflict { .. }) => {
            let retry = ParticipantRecord {
                participant_id: mint_participant_id(epoch_ms()),
                ..record.clone()
            };
            participants.insert(&retry).await?;
            info!(participant_id = %retry.participant_id, "participant registered");
            return Ok(RegisterResponse {
                participant_id: retry.participant_id,
                total_score: retry.total_score,
            });
        }
        Err(err) => return Err(err.into()),
    }

    info!(participant_id = %record.participant_id, "participant registered");
    Ok(RegisterResponse {
        participant_id: record.participant_id,
        total_score: record.total_score,
    })
}

/// Fetch a participant's own record.
pub async fn get_participant(
    state: &SharedState,
    participant_id: &str,
) -> Result<ParticipantSummary, ServiceError> {
    let repo = ParticipantRepository::new(state.require_store().await?);
    let record = repo
        .find(participant_id)
        .await?
        .ok_or_else(|| ServiceError::NotFound(format!("participant `{participant_id}`")))?;
    Ok(record.into())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn minted_ids_carry_prefix_and_suffix() {
        let id = mint_participant_id(1_700_000_000_000);
        assert!(id.starts_with(ID_PREFIX));
        assert!(id.len() > ID_PREFIX.len() + ID_RANDOM_LEN);
    }

    #[test]
    fn base36_round_numbers() {
        assert_eq!(to_base36(0), "0");
        assert_eq!(to_base36(35), "z");
        assert_eq!(to_base36(36), "10");
    }
}
