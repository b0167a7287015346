//! Liveness reporting.

use crate::{dto::health::HealthResponse, state::SharedState};

/// Current health of the backend: `ok` with a store installed, `degraded`
/// otherwise. The process answers either way.
pub async fn current(state: &SharedState) -> HealthResponse {
    if state.is_degraded().await {
        HealthResponse::degraded()
    } else {
        HealthResponse::ok()
    }
}
