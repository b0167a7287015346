use utoipa::OpenApi;

#[derive(OpenApi)]
/// Aggregated OpenAPI specification for Live Quiz Back.
#[openapi(
    paths(
        crate::routes::health::healthcheck,
        crate::routes::sse::public_stream,
        crate::routes::sse::admin_stream,
        crate::routes::public::get_session,
        crate::routes::public::get_current_question,
        crate::routes::public::get_leaderboard,
        crate::routes::participant::register,
        crate::routes::participant::get_participant,
        crate::routes::participant::submit_answer,
        crate::routes::participant::submit_timeout,
        crate::routes::admin::initialize_session,
        crate::routes::admin::get_session,
        crate::routes::admin::open_registration,
        crate::routes::admin::close_registration,
        crate::routes::admin::start_game,
        crate::routes::admin::next_question,
        crate::routes::admin::end_game,
        crate::routes::admin::reset_game,
        crate::routes::admin::list_questions,
        crate::routes::admin::add_question,
        crate::routes::admin::update_question,
        crate::routes::admin::delete_question,
        crate::routes::admin::get_leaderboard,
    ),
    components(
        schemas(
            crate::dto::health::HealthResponse,
            crate::dto::sse::Handshake,
            crate::dto::sse::SystemStatusEvent,
            crate::dto::admin::AddQuestionRequest,
            crate::dto::admin::UpdateQuestionRequest,
            crate::dto::admin::QuestionSummary,
            crate::dto::admin::SessionSummary,
            crate::dto::admin::ActionResponse,
            crate::dto::admin::StartGameResponse,
            crate::dto::admin::NextQuestionResponse,
            crate::dto::participant::RegisterResponse,
            crate::dto::participant::SubmitAnswerRequest,
            crate::dto::participant::SubmitTimeoutRequest,
            crate::dto::participant::ResponseSummary,
            crate::dto::participant::ParticipantSummary,
            crate::dto::public::SessionView,
            crate::dto::public::ActiveQuestionView,
            crate::dto::public::LeaderboardEntry,
            crate::dto::public::LeaderboardResponse,
            crate::store::models::AnswerLabel,
            crate::store::models::SessionStatus,
        )
    ),
    tags(
        (name = "health", description = "Health check endpoints"),
        (name = "sse", description = "Server-sent events streams"),
        (name = "public", description = "Read-only session views"),
        (name = "participant", description = "Registration and answer submission"),
        (name = "admin", description = "Host-only session and question management"),
    )
)]
pub struct ApiDoc;
