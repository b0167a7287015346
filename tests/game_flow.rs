//! End-to-end flows exercised through the service layer against the
//! in-memory store backend.

use std::{sync::Arc, time::Duration};

use axum::{http::header::CONTENT_TYPE, response::IntoResponse};
use indexmap::IndexMap;
use utoipa::OpenApi;

use live_quiz_back::{
    config::AppConfig,
    dto::admin::AddQuestionRequest,
    error::ServiceError,
    services::{
        admin_service, documentation::ApiDoc, leaderboard_service, participant_service,
        question_service, response_service, sse_events, sse_service, watch_service,
    },
    state::{AppState, SharedState},
    store::{
        document::DocumentStore,
        models::{AnswerLabel, SessionStatus},
        repository::{ParticipantRepository, QuestionRepository, ResponseRepository},
    },
};

async fn setup() -> SharedState {
    let state = AppState::new(AppConfig::default());
    state
        .install_store(Arc::new(live_quiz_back::store::memory::MemoryStore::new()))
        .await;
    state
}

fn question(text: &str, correct: AnswerLabel) -> AddQuestionRequest {
    let options: IndexMap<AnswerLabel, String> = AnswerLabel::ALL
        .into_iter()
        .map(|label| (label, format!("{text} option {label:?}")))
        .collect();
    AddQuestionRequest {
        text: text.to_string(),
        options,
        correct_answer: correct,
    }
}

async fn store(state: &SharedState) -> Arc<dyn DocumentStore> {
    state.require_store().await.expect("store installed")
}

/// Full happy path: two questions, two participants, scoring, finalization.
#[tokio::test]
async fn two_participants_play_a_full_round() {
    let state = setup().await;

    admin_service::initialize(&state).await.unwrap();
    question_service::add_question(&state, question("q1", AnswerLabel::A))
        .await
        .unwrap();
    question_service::add_question(&state, question("q2", AnswerLabel::B))
        .await
        .unwrap();

    admin_service::open_registration(&state).await.unwrap();
    let p1 = participant_service::register(&state).await.unwrap();
    let p2 = participant_service::register(&state).await.unwrap();
    assert_ne!(p1.participant_id, p2.participant_id);

    admin_service::close_registration(&state).await.unwrap();
    let started = admin_service::start_game(&state).await.unwrap();
    assert_eq!(started.total_questions, 2);
    assert_eq!(started.released_question, 1);

    let session = admin_service::session_summary(&state).await.unwrap();
    assert_eq!(session.status, SessionStatus::Active);
    assert_eq!(session.current_question_index, 0);

    let questions = QuestionRepository::new(store(&state).await);
    let (_, q1) = questions.find_by_number(1).await.unwrap().unwrap();
    assert!(q1.is_active);

    let r1 = response_service::submit_answer(&state, &p1.participant_id, 1, AnswerLabel::A)
        .await
        .unwrap();
    assert!(r1.is_correct);
    assert_eq!(r1.score, 10);

    let r2 = response_service::submit_answer(&state, &p2.participant_id, 1, AnswerLabel::C)
        .await
        .unwrap();
    assert!(!r2.is_correct);
    assert_eq!(r2.score, -5);

    let advanced = admin_service::release_next_question(&state).await.unwrap();
    assert_eq!(advanced.current_question_index, 1);
    assert_eq!(advanced.released_question, 2);

    let (_, q1) = questions.find_by_number(1).await.unwrap().unwrap();
    assert!(!q1.is_active);
    let (_, q2) = questions.find_by_number(2).await.unwrap().unwrap();
    assert!(q2.is_active);

    let t1 = response_service::submit_timeout(&state, &p1.participant_id, 2)
        .await
        .unwrap();
    assert_eq!(t1.score, 0);
    assert!(t1.selected_answer.is_none());

    let r4 = response_service::submit_answer(&state, &p2.participant_id, 2, AnswerLabel::B)
        .await
        .unwrap();
    assert_eq!(r4.score, 10);

    admin_service::end_game(&state).await.unwrap();

    let board = admin_service::leaderboard(&state).await.unwrap();
    assert!(board.finalized);
    assert_eq!(board.entries.len(), 2);
    assert_eq!(board.entries[0].participant_id, p1.participant_id);
    assert_eq!(board.entries[0].rank, 1);
    assert_eq!(board.entries[0].total_score, 10);
    assert_eq!(board.entries[1].participant_id, p2.participant_id);
    assert_eq!(board.entries[1].rank, 2);
    assert_eq!(board.entries[1].total_score, 5);

    let session = admin_service::session_summary(&state).await.unwrap();
    assert_eq!(session.status, SessionStatus::Ended);
    assert_eq!(session.current_question_index, -1);
    assert!(session.game_ended_at.is_some());
}

/// Duplicate submissions lose the unique insert and leave one ledger record.
#[tokio::test]
async fn second_submission_for_the_same_question_is_rejected() {
    let state = setup().await;

    admin_service::initialize(&state).await.unwrap();
    question_service::add_question(&state, question("q1", AnswerLabel::A))
        .await
        .unwrap();
    admin_service::open_registration(&state).await.unwrap();
    let p1 = participant_service::register(&state).await.unwrap();
    admin_service::close_registration(&state).await.unwrap();
    admin_service::start_game(&state).await.unwrap();

    response_service::submit_answer(&state, &p1.participant_id, 1, AnswerLabel::A)
        .await
        .unwrap();
    let duplicate =
        response_service::submit_answer(&state, &p1.participant_id, 1, AnswerLabel::B).await;
    assert!(matches!(
        duplicate,
        Err(ServiceError::AlreadyAnswered { question_number: 1 })
    ));

    // A late timeout for the same question loses the same way.
    let late_timeout = response_service::submit_timeout(&state, &p1.participant_id, 1).await;
    assert!(matches!(
        late_timeout,
        Err(ServiceError::AlreadyAnswered { question_number: 1 })
    ));

    let responses = ResponseRepository::new(store(&state).await);
    let ledger = responses
        .list_for_participant(&p1.participant_id)
        .await
        .unwrap();
    assert_eq!(ledger.len(), 1);
    assert_eq!(ledger[0].selected_answer, Some(AnswerLabel::A));
    assert_eq!(ledger[0].score, 10);
}

/// Starting without questions (or outside registration) is refused.
#[tokio::test]
async fn start_game_requires_registration_phase_and_questions() {
    let state = setup().await;
    admin_service::initialize(&state).await.unwrap();

    // Straight from idle: illegal transition.
    let from_idle = admin_service::start_game(&state).await;
    assert!(matches!(from_idle, Err(ServiceError::PreconditionFailed(_))));
    let session = admin_service::session_summary(&state).await.unwrap();
    assert_eq!(session.status, SessionStatus::Idle);

    // From registration but with zero questions.
    admin_service::open_registration(&state).await.unwrap();
    let no_questions = admin_service::start_game(&state).await;
    assert!(matches!(
        no_questions,
        Err(ServiceError::PreconditionFailed(_))
    ));
    let session = admin_service::session_summary(&state).await.unwrap();
    assert_eq!(session.status, SessionStatus::Registration);
    assert_eq!(session.total_questions, 0);
}

/// Reset wipes participants and responses, keeps questions with numbering.
#[tokio::test]
async fn reset_returns_to_a_clean_idle_round() {
    let state = setup().await;

    admin_service::initialize(&state).await.unwrap();
    question_service::add_question(&state, question("q1", AnswerLabel::A))
        .await
        .unwrap();
    question_service::add_question(&state, question("q2", AnswerLabel::B))
        .await
        .unwrap();
    admin_service::open_registration(&state).await.unwrap();
    let p1 = participant_service::register(&state).await.unwrap();
    admin_service::close_registration(&state).await.unwrap();
    admin_service::start_game(&state).await.unwrap();
    response_service::submit_answer(&state, &p1.participant_id, 1, AnswerLabel::A)
        .await
        .unwrap();
    admin_service::end_game(&state).await.unwrap();

    admin_service::reset_game(&state).await.unwrap();

    let session = admin_service::session_summary(&state).await.unwrap();
    assert_eq!(session.status, SessionStatus::Idle);
    assert!(!session.registration_open);
    assert_eq!(session.current_question_index, -1);
    assert_eq!(session.total_questions, 0);
    assert!(session.game_started_at.is_none());
    assert!(session.game_ended_at.is_none());

    let handle = store(&state).await;
    let participants = ParticipantRepository::new(handle.clone());
    assert!(participants.list_active().await.unwrap().is_empty());
    let responses = ResponseRepository::new(handle.clone());
    assert!(responses.list_all().await.unwrap().is_empty());

    let questions = QuestionRepository::new(handle);
    let remaining = questions.list_ordered().await.unwrap();
    assert_eq!(remaining.len(), 2);
    for (index, (_, record)) in remaining.iter().enumerate() {
        assert_eq!(record.question_number, index as u32 + 1);
        assert!(!record.is_active);
        assert!(record.released_at.is_none());
        assert!(record.closed_at.is_none());
    }

    // The wiped round is immediately reusable.
    admin_service::open_registration(&state).await.unwrap();
    assert!(participant_service::register(&state).await.is_ok());
}

/// Initializing twice leaves the session exactly as one call would.
#[tokio::test]
async fn initialize_is_idempotent() {
    let state = setup().await;

    let first = admin_service::initialize(&state).await.unwrap();
    admin_service::open_registration(&state).await.unwrap();
    let second = admin_service::initialize(&state).await.unwrap();

    // The second call must not overwrite the registration round.
    assert_eq!(second.status, SessionStatus::Registration);
    assert!(second.registration_open);
    assert_eq!(first.current_question_index, second.current_question_index);
}

/// Deleting questions renumbers the survivors down to 1.
#[tokio::test]
async fn delete_renumbers_to_a_dense_sequence() {
    let state = setup().await;
    admin_service::initialize(&state).await.unwrap();

    let q1 = question_service::add_question(&state, question("q1", AnswerLabel::A))
        .await
        .unwrap();
    let q2 = question_service::add_question(&state, question("q2", AnswerLabel::B))
        .await
        .unwrap();
    let q3 = question_service::add_question(&state, question("q3", AnswerLabel::C))
        .await
        .unwrap();
    assert_eq!((q1.question_number, q2.question_number, q3.question_number), (1, 2, 3));

    question_service::delete_question(&state, &q1.id).await.unwrap();
    question_service::delete_question(&state, &q3.id).await.unwrap();

    let listed = question_service::list_questions(&state).await.unwrap();
    assert_eq!(listed.len(), 1);
    assert_eq!(listed[0].id, q2.id);
    assert_eq!(listed[0].question_number, 1);
}

/// Deleting the released question is refused until it closes.
#[tokio::test]
async fn released_question_cannot_be_deleted() {
    let state = setup().await;
    admin_service::initialize(&state).await.unwrap();
    let q1 = question_service::add_question(&state, question("q1", AnswerLabel::A))
        .await
        .unwrap();
    admin_service::open_registration(&state).await.unwrap();
    admin_service::close_registration(&state).await.unwrap();
    admin_service::start_game(&state).await.unwrap();

    let refused = question_service::delete_question(&state, &q1.id).await;
    assert!(matches!(refused, Err(ServiceError::PreconditionFailed(_))));
}

/// Finalization recomputes from the ledger; running it twice changes nothing.
#[tokio::test]
async fn finalization_is_idempotent() {
    let state = setup().await;

    admin_service::initialize(&state).await.unwrap();
    question_service::add_question(&state, question("q1", AnswerLabel::A))
        .await
        .unwrap();
    admin_service::open_registration(&state).await.unwrap();
    let p1 = participant_service::register(&state).await.unwrap();
    admin_service::close_registration(&state).await.unwrap();
    admin_service::start_game(&state).await.unwrap();
    response_service::submit_answer(&state, &p1.participant_id, 1, AnswerLabel::A)
        .await
        .unwrap();
    admin_service::end_game(&state).await.unwrap();

    let first = leaderboard_service::live(&state).await.unwrap();

    // Re-run the authoritative recomputation directly.
    let handle = store(&state).await;
    leaderboard_service::finalize(&handle).await.unwrap();

    let second = leaderboard_service::live(&state).await.unwrap();
    assert_eq!(first.len(), second.len());
    assert_eq!(first[0].total_score, second[0].total_score);
    assert_eq!(second[0].total_score, 10);
}

/// The snapshot broadcaster turns store writes into SSE deliveries.
#[tokio::test]
async fn store_writes_reach_sse_subscribers() {
    let state = setup().await;
    let mut rx = state.public_sse().subscribe();
    tokio::spawn(watch_service::run(state.clone()));

    admin_service::initialize(&state).await.unwrap();
    admin_service::open_registration(&state).await.unwrap();

    let event = tokio::time::timeout(Duration::from_secs(2), async {
        loop {
            let event = rx.recv().await.expect("hub stays open");
            if event.event.as_deref() == Some(sse_events::SESSION_CHANGED)
                && event.data.contains("\"registration\"")
            {
                return event;
            }
        }
    })
    .await
    .expect("session snapshot delivered");

    assert!(event.data.contains("\"registration_open\":true"));
}

/// Subscribing yields a ready SSE response with keep-alives attached.
#[tokio::test]
async fn sse_subscription_responds_with_an_event_stream() {
    let state = setup().await;

    let response = sse_service::subscribe_public(&state).await.into_response();
    let content_type = response
        .headers()
        .get(CONTENT_TYPE)
        .expect("SSE responses carry a content type");
    assert_eq!(content_type, "text/event-stream");
}

/// The OpenAPI document renders, including the option-map payload schemas.
#[test]
fn openapi_document_describes_the_question_payloads() {
    let doc = ApiDoc::openapi()
        .to_json()
        .expect("OpenAPI document serializes");
    assert!(doc.contains("AddQuestionRequest"));
    assert!(doc.contains("ActiveQuestionView"));
    assert!(doc.contains("LeaderboardResponse"));
}

/// Registration is refused once closed.
#[tokio::test]
async fn registration_closes() {
    let state = setup().await;
    admin_service::initialize(&state).await.unwrap();
    admin_service::open_registration(&state).await.unwrap();
    participant_service::register(&state).await.unwrap();
    admin_service::close_registration(&state).await.unwrap();

    let late = participant_service::register(&state).await;
    assert!(matches!(late, Err(ServiceError::PreconditionFailed(_))));
}
