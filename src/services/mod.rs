/// Session commands issued by the quiz host.
pub mod admin_service;
/// OpenAPI documentation generation.
pub mod documentation;
/// Health check service.
pub mod health_service;
/// Leaderboard ranking and finalization.
pub mod leaderboard_service;
/// Participant registration and lookups.
pub mod participant_service;
/// Read-only projections for participant frontends.
pub mod public_service;
/// Question lifecycle management.
pub mod question_service;
/// Answer and timeout submissions.
pub mod response_service;
/// Pure scoring engine.
pub mod scoring;
/// Server-Sent Events message generation.
pub mod sse_events;
/// Server-Sent Events broadcasting service.
pub mod sse_service;
/// Store lifecycle supervision and degraded mode.
pub mod storage_supervisor;
/// Store-change to SSE snapshot bridging.
pub mod watch_service;
