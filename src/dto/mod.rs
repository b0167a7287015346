//! Request, response, and SSE payload definitions.

use time::{OffsetDateTime, format_description::well_known::Rfc3339};

use crate::store::models::EpochMillis;

/// Admin command payloads.
pub mod admin;
/// Health payloads.
pub mod health;
/// Participant-facing payloads.
pub mod participant;
/// Read-only public projections.
pub mod public;
/// SSE event payloads.
pub mod sse;
/// Custom validators.
pub mod validation;

/// Render an epoch-millisecond timestamp as RFC 3339 for client payloads.
pub(crate) fn format_epoch_ms(timestamp: EpochMillis) -> String {
    OffsetDateTime::from_unix_timestamp_nanos(i128::from(timestamp) * 1_000_000)
        .ok()
        .and_then(|datetime| datetime.format(&Rfc3339).ok())
        .unwrap_or_else(|| "invalid-timestamp".into())
}
