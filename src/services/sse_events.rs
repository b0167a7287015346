//! Event names and fan-out helpers for the SSE streams.

use serde::Serialize;
use tracing::warn;

use crate::{dto::sse::ServerEvent, state::SharedState};

/// Event name carried when the session document changed.
pub const SESSION_CHANGED: &str = "session.changed";
/// Event name carried when the released question changed.
pub const QUESTION_CHANGED: &str = "question.changed";
/// Event name carried when the leaderboard changed.
pub const LEADERBOARD_CHANGED: &str = "leaderboard.changed";
/// Event name carried when the backend enters or leaves degraded mode.
pub const SYSTEM_STATUS: &str = "system.status";

/// Serialize and deliver an event on both the public and admin streams.
pub fn send_to_all(state: &SharedState, event_name: &str, payload: &impl Serialize) {
    let event = match ServerEvent::json(Some(event_name.to_string()), payload) {
        Ok(event) => event,
        Err(err) => {
            warn!(event_name, error = %err, "failed to serialize SSE payload");
            return;
        }
    };
    state.public_sse().broadcast(event.clone());
    state.admin_sse().broadcast(event);
}
