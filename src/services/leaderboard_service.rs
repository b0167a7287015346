//! Leaderboard ranking and end-of-game finalization.

use std::collections::HashMap;
use std::sync::Arc;

use tracing::info;

use crate::{
    dto::public::LeaderboardEntry,
    error::ServiceError,
    state::SharedState,
    store::{
        document::{DocumentStore, StoreResult},
        models::{ParticipantRecord, SessionStatus},
        repository::{ParticipantRepository, ResponseRepository, SessionRepository},
    },
};

/// Rank active participants by stored `totalScore`, descending. Ties share
/// nothing: ranks are dense 1..N and the order among equals is the
/// deterministic id order the registry returns.
pub fn rank(mut participants: Vec<ParticipantRecord>) -> Vec<LeaderboardEntry> {
    participants.sort_by(|a, b| b.total_score.cmp(&a.total_score));
    participants
        .into_iter()
        .enumerate()
        .map(|(index, record)| LeaderboardEntry {
            rank: index as u32 + 1,
            participant_id: record.participant_id,
            total_score: record.total_score,
        })
        .collect()
}

/// The live leaderboard over the currently active participants.
pub async fn live(state: &SharedState) -> Result<Vec<LeaderboardEntry>, ServiceError> {
    let store = state.require_store().await?;
    Ok(live_from_store(&store).await?)
}

pub(crate) async fn live_from_store(
    store: &Arc<dyn DocumentStore>,
) -> StoreResult<Vec<LeaderboardEntry>> {
    let participants = ParticipantRepository::new(store.clone()).list_active().await?;
    Ok(rank(participants))
}

/// Whether leaderboard totals are final rather than advisory.
pub async fn is_finalized(state: &SharedState) -> Result<bool, ServiceError> {
    let sessions = SessionRepository::new(state.require_store().await?);
    let session = sessions.load().await?;
    Ok(matches!(
        session.map(|record| record.status),
        Some(SessionStatus::Ended)
    ))
}

/// Recompute every active participant's total from the response ledger and
/// overwrite the stored totals in one batch.
///
/// The ledger is the authority: stored totals are advisory until this runs.
/// Re-running it recomputes the same sums, so finalization is idempotent.
pub async fn finalize(store: &Arc<dyn DocumentStore>) -> StoreResult<()> {
    let participants_repo = ParticipantRepository::new(store.clone());
    let responses = ResponseRepository::new(store.clone());

    let participants = participants_repo.list_active().await?;
    let ledger = responses.list_all().await?;

    let mut sums: HashMap<String, i64> = HashMap::new();
    for response in &ledger {
        *sums.entry(response.participant_id.clone()).or_insert(0) += response.score;
    }

    let totals: Vec<(String, i64)> = participants
        .iter()
        .map(|record| {
            let total = sums.get(&record.participant_id).copied().unwrap_or(0);
            (record.participant_id.clone(), total)
        })
        .collect();

    participants_repo.set_totals(&totals).await?;
    info!(participants = totals.len(), "leaderboard finalized from ledger");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn participant(id: &str, total_score: i64) -> ParticipantRecord {
        ParticipantRecord {
            participant_id: id.to_string(),
            total_score,
            is_active: true,
            joined_at: 0,
            last_active_at: 0,
            answered_questions: Vec::new(),
        }
    }

    #[test]
    fn ranks_are_dense_and_descending() {
        let entries = rank(vec![
            participant("p1", 5),
            participant("p2", 25),
            participant("p3", 10),
        ]);
        let order: Vec<(&str, u32, i64)> = entries
            .iter()
            .map(|entry| (entry.participant_id.as_str(), entry.rank, entry.total_score))
            .collect();
        assert_eq!(order, vec![("p2", 1, 25), ("p3", 2, 10), ("p1", 3, 5)]);
    }

    #[test]
    fn ties_keep_input_order() {
        let entries = rank(vec![participant("p1", 10), participant("p2", 10)]);
        assert_eq!(entries[0].participant_id, "p1");
        assert_eq!(entries[0].rank, 1);
        assert_eq!(entries[1].participant_id, "p2");
        assert_eq!(entries[1].rank, 2);
    }
}
