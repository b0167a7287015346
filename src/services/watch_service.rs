//! Snapshot broadcaster: turns store change notifications into SSE events.
//!
//! Deliveries from the store are best-effort, so this task never diffs them.
//! Any notification on any watched collection triggers a full re-read, and
//! the re-derived views are what clients receive. A lagging or duplicated
//! notification therefore costs a redundant read, never a wrong view.

use std::sync::Arc;

use tokio::sync::broadcast::error::RecvError;
use tracing::{debug, info, warn};

use crate::{
    dto::sse::{LeaderboardChangedEvent, QuestionChangedEvent, SessionChangedEvent, SystemStatusEvent},
    services::{public_service, sse_events},
    state::SharedState,
    store::{
        document::{CollectionSnapshot, DocumentStore},
        repository::{PARTICIPANTS_COLLECTION, QUESTIONS_COLLECTION, SESSION_COLLECTION},
    },
};

/// Drive the broadcaster until the process shuts down.
///
/// While degraded, the task waits for a store to be installed; when the store
/// is lost it announces degraded mode and goes back to waiting.
pub async fn run(state: SharedState) {
    let mut degraded_rx = state.degraded_watcher();

    loop {
        let degraded = *degraded_rx.borrow_and_update();
        sse_events::send_to_all(
            &state,
            sse_events::SYSTEM_STATUS,
            &SystemStatusEvent { degraded },
        );

        if degraded {
            if degraded_rx.changed().await.is_err() {
                return;
            }
            continue;
        }

        let Some(store) = state.store().await else {
            // Store vanished between the flag flip and the read; loop back
            // and wait for the next transition.
            if degraded_rx.changed().await.is_err() {
                return;
            }
            continue;
        };

        info!("snapshot broadcaster attached to store");
        watch_store(&state, &store, &mut degraded_rx).await;
        warn!("snapshot broadcaster detached from store");
    }
}

async fn watch_store(
    state: &SharedState,
    store: &Arc<dyn DocumentStore>,
    degraded_rx: &mut tokio::sync::watch::Receiver<bool>,
) {
    let mut session_rx = match store.subscribe(SESSION_COLLECTION) {
        Ok(rx) => rx,
        Err(err) => {
            warn!(error = %err, "failed to subscribe to session changes");
            return;
        }
    };
    let mut questions_rx = match store.subscribe(QUESTIONS_COLLECTION) {
        Ok(rx) => rx,
        Err(err) => {
            warn!(error = %err, "failed to subscribe to question changes");
            return;
        }
    };
    let mut participants_rx = match store.subscribe(PARTICIPANTS_COLLECTION) {
        Ok(rx) => rx,
        Err(err) => {
            warn!(error = %err, "failed to subscribe to participant changes");
            return;
        }
    };

    // Prime connected clients with the current state.
    publish_all(state, store).await;

    loop {
        let notified = tokio::select! {
            delivery = session_rx.recv() => delivery,
            delivery = questions_rx.recv() => delivery,
            delivery = participants_rx.recv() => delivery,
            changed = degraded_rx.changed() => {
                match changed {
                    Ok(()) if *degraded_rx.borrow() => return,
                    Ok(()) => continue,
                    Err(_) => return,
                }
            }
        };

        match notified {
            Ok(CollectionSnapshot {
                collection,
                revision,
                ..
            }) => {
                debug!(collection = %collection, revision, "store change notification");
                publish_all(state, store).await;
            }
            Err(RecvError::Lagged(skipped)) => {
                debug!(skipped, "change notifications lagged; re-deriving");
                publish_all(state, store).await;
            }
            Err(RecvError::Closed) => return,
        }
    }
}

/// Re-derive all three views and broadcast them. On a transient store error
/// the previous deliveries stand; clients keep their last view.
async fn publish_all(state: &SharedState, store: &Arc<dyn DocumentStore>) {
    match public_service::session_view_from_store(store).await {
        Ok(Some(view)) => sse_events::send_to_all(
            state,
            sse_events::SESSION_CHANGED,
            &SessionChangedEvent(view),
        ),
        Ok(None) => {}
        Err(err) => {
            warn!(error = %err, "failed to derive session view; keeping last");
            return;
        }
    }

    let time_limit = state.config().question_time_limit_secs();
    match public_service::current_question_from_store(store, time_limit).await {
        Ok(question) => sse_events::send_to_all(
            state,
            sse_events::QUESTION_CHANGED,
            &QuestionChangedEvent { question },
        ),
        Err(err) => {
            warn!(error = %err, "failed to derive question view; keeping last");
            return;
        }
    }

    match public_service::leaderboard_from_store(store).await {
        Ok(leaderboard) => sse_events::send_to_all(
            state,
            sse_events::LEADERBOARD_CHANGED,
            &LeaderboardChangedEvent {
                entries: leaderboard.entries,
            },
        ),
        Err(err) => {
            warn!(error = %err, "failed to derive leaderboard; keeping last");
        }
    }
}
