//! SSE event payloads. Every event carries a full re-derived snapshot;
//! clients replace their local state rather than diffing deliveries.

use serde::Serialize;
use utoipa::ToSchema;

use crate::dto::public::{ActiveQuestionView, LeaderboardEntry, SessionView};

#[derive(Clone, Debug)]
/// Dispatched payload carried across SSE channels.
pub struct ServerEvent {
    /// Optional SSE event name.
    pub event: Option<String>,
    /// Serialized data field.
    pub data: String,
}

impl ServerEvent {
    /// Convenience wrapper that serialises `payload` into the SSE data field.
    pub fn json<E, T>(event: E, payload: &T) -> serde_json::Result<Self>
    where
        E: Into<Option<String>>,
        T: Serialize,
    {
        Ok(Self {
            event: event.into(),
            data: serde_json::to_string(payload)?,
        })
    }

    /// Build an event from a pre-rendered data string.
    pub fn new(event: Option<String>, data: String) -> Self {
        Self { event, data }
    }
}

#[derive(Debug, Serialize, ToSchema)]
/// Initial metadata sent to an SSE client when it connects.
pub struct Handshake {
    /// Identifier of the SSE stream (`public` or `admin`).
    pub stream: String,
    /// Human-readable message confirming the subscription.
    pub message: String,
    /// Whether the backend is running without a store connection.
    pub degraded: bool,
}

#[derive(Debug, Serialize, ToSchema)]
/// Broadcast when the backend enters or leaves degraded mode.
pub struct SystemStatusEvent {
    /// Current degraded flag.
    pub degraded: bool,
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(transparent)]
/// Broadcast whenever the session document changes.
pub struct SessionChangedEvent(pub SessionView);

#[derive(Debug, Serialize, ToSchema)]
/// Broadcast whenever the released question changes. `question` is absent
/// when no question is currently released.
pub struct QuestionChangedEvent {
    /// The question participants should render, if any.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub question: Option<ActiveQuestionView>,
}

#[derive(Debug, Serialize, ToSchema)]
/// Broadcast whenever participant standings change.
pub struct LeaderboardChangedEvent {
    /// Rows ordered by rank.
    pub entries: Vec<LeaderboardEntry>,
}
