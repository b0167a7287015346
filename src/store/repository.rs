//! Typed per-collection repositories layered over [`DocumentStore`].
//!
//! Repositories own the collection names, document keys, and (de)serialization
//! of the records in [`crate::store::models`]; services never touch raw JSON.

use std::sync::Arc;

use serde::{Serialize, de::DeserializeOwned};
use serde_json::{Map, Value};
use serde_with::skip_serializing_none;
use uuid::Uuid;

use crate::store::{
    document::{Document, DocumentStore, Query, SortOrder, StoreError, StoreResult, WriteOp},
    models::{EpochMillis, ParticipantRecord, QuestionRecord, ResponseRecord, SessionRecord,
        SessionStatus},
};

/// Collection holding the singleton session document.
pub const SESSION_COLLECTION: &str = "game_session";
/// Fixed id of the singleton session document.
pub const SESSION_DOC_ID: &str = "current";
/// Collection holding the quiz questions.
pub const QUESTIONS_COLLECTION: &str = "questions";
/// Collection holding joined participants.
pub const PARTICIPANTS_COLLECTION: &str = "participants";
/// Collection holding the append-only response ledger.
pub const RESPONSES_COLLECTION: &str = "responses";

fn decode<T: DeserializeOwned>(collection: &str, document: Document) -> StoreResult<(String, T)> {
    let record = serde_json::from_value(document.body).map_err(|source| StoreError::Corrupt {
        collection: collection.to_string(),
        source,
    })?;
    Ok((document.id, record))
}

fn encode<T: Serialize>(record: &T) -> Value {
    serde_json::to_value(record).expect("records serialize to JSON objects")
}

fn encode_fields<T: Serialize>(patch: &T) -> Map<String, Value> {
    match encode(patch) {
        Value::Object(map) => map,
        _ => Map::new(),
    }
}

/// Partial update of the session document. `None` leaves a field untouched;
/// `Some(None)` on a clearable field writes an explicit `null`.
#[skip_serializing_none]
#[derive(Debug, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionPatch {
    /// New phase, if changing.
    pub status: Option<SessionStatus>,
    /// New registration flag, if changing.
    pub registration_open: Option<bool>,
    /// New question index, if changing.
    pub current_question_index: Option<i64>,
    /// New question count, if changing.
    pub total_questions: Option<u32>,
    /// New (or cleared) game start timestamp.
    pub game_started_at: Option<Option<EpochMillis>>,
    /// New (or cleared) game end timestamp.
    pub game_ended_at: Option<Option<EpochMillis>>,
    /// Mutation timestamp; set by every command.
    pub updated_at: Option<EpochMillis>,
}

/// Repository for the singleton session document.
#[derive(Clone)]
pub struct SessionRepository {
    store: Arc<dyn DocumentStore>,
}

impl SessionRepository {
    /// Wrap a store handle.
    pub fn new(store: Arc<dyn DocumentStore>) -> Self {
        Self { store }
    }

    /// Load the session, `None` when it was never initialized.
    pub async fn load(&self) -> StoreResult<Option<SessionRecord>> {
        match self.store.get(SESSION_COLLECTION, SESSION_DOC_ID).await? {
            Some(document) => decode(SESSION_COLLECTION, document).map(|(_, record)| Some(record)),
            None => Ok(None),
        }
    }

    /// Create the singleton when absent; an existing document is left intact.
    pub async fn create_if_absent(&self, record: &SessionRecord) -> StoreResult<bool> {
        match self
            .store
            .insert_if_absent(SESSION_COLLECTION, SESSION_DOC_ID, encode(record))
            .await
        {
            Ok(_) => Ok(true),
            Err(StoreError::Conflict { .. }) => Ok(false),
            Err(err) => Err(err),
        }
    }

    /// Field-level upsert of the full record (create-or-merge).
    pub async fn upsert_merge(&self, record: &SessionRecord) -> StoreResult<()> {
        self.store
            .set(SESSION_COLLECTION, SESSION_DOC_ID, encode(record), true)
            .await
    }

    /// Merge a partial update into the existing document.
    pub async fn patch(&self, patch: &SessionPatch) -> StoreResult<()> {
        self.store
            .update(SESSION_COLLECTION, SESSION_DOC_ID, encode_fields(patch))
            .await
    }
}

/// Repository for the questions collection.
#[derive(Clone)]
pub struct QuestionRepository {
    store: Arc<dyn DocumentStore>,
}

impl QuestionRepository {
    /// Wrap a store handle.
    pub fn new(store: Arc<dyn DocumentStore>) -> Self {
        Self { store }
    }

    /// Insert a new question under a fresh id.
    pub async fn insert(&self, record: &QuestionRecord) -> StoreResult<String> {
        let id = Uuid::new_v4().simple().to_string();
        self.store
            .set(QUESTIONS_COLLECTION, &id, encode(record), false)
            .await?;
        Ok(id)
    }

    /// Fetch a question by document id.
    pub async fn get(&self, id: &str) -> StoreResult<Option<QuestionRecord>> {
        match self.store.get(QUESTIONS_COLLECTION, id).await? {
            Some(document) => {
                decode(QUESTIONS_COLLECTION, document).map(|(_, record)| Some(record))
            }
            None => Ok(None),
        }
    }

    /// All questions ordered by their dense number.
    pub async fn list_ordered(&self) -> StoreResult<Vec<(String, QuestionRecord)>> {
        let documents = self
            .store
            .query(
                QUESTIONS_COLLECTION,
                Query::all().order_by("questionNumber", SortOrder::Ascending),
            )
            .await?;
        documents
            .into_iter()
            .map(|document| decode(QUESTIONS_COLLECTION, document))
            .collect()
    }

    /// Look up the question carrying the given number, `None` when absent.
    pub async fn find_by_number(
        &self,
        question_number: u32,
    ) -> StoreResult<Option<(String, QuestionRecord)>> {
        let mut documents = self
            .store
            .query(
                QUESTIONS_COLLECTION,
                Query::all().filter_eq("questionNumber", question_number),
            )
            .await?;
        match documents.pop() {
            Some(document) => decode(QUESTIONS_COLLECTION, document).map(Some),
            None => Ok(None),
        }
    }

    /// Merge fields into an existing question document.
    pub async fn update_fields(&self, id: &str, fields: Map<String, Value>) -> StoreResult<()> {
        self.store.update(QUESTIONS_COLLECTION, id, fields).await
    }

    /// Apply a batch of writes to the questions collection atomically.
    pub async fn batch(&self, ops: Vec<WriteOp>) -> StoreResult<()> {
        self.store.batch_write(QUESTIONS_COLLECTION, ops).await
    }
}

/// Repository for the participants collection. Documents are keyed by the
/// participant's display identity, so a duplicate registration would surface
/// as a store-level conflict.
#[derive(Clone)]
pub struct ParticipantRepository {
    store: Arc<dyn DocumentStore>,
}

impl ParticipantRepository {
    /// Wrap a store handle.
    pub fn new(store: Arc<dyn DocumentStore>) -> Self {
        Self { store }
    }

    /// Insert a freshly registered participant.
    pub async fn insert(&self, record: &ParticipantRecord) -> StoreResult<String> {
        self.store
            .insert_if_absent(
                PARTICIPANTS_COLLECTION,
                &record.participant_id,
                encode(record),
            )
            .await
    }

    /// Fetch a participant by identity.
    pub async fn find(&self, participant_id: &str) -> StoreResult<Option<ParticipantRecord>> {
        match self.store.get(PARTICIPANTS_COLLECTION, participant_id).await? {
            Some(document) => {
                decode(PARTICIPANTS_COLLECTION, document).map(|(_, record)| Some(record))
            }
            None => Ok(None),
        }
    }

    /// Every participant still marked active, in deterministic id order.
    pub async fn list_active(&self) -> StoreResult<Vec<ParticipantRecord>> {
        let documents = self
            .store
            .query(
                PARTICIPANTS_COLLECTION,
                Query::all().filter_eq("isActive", true),
            )
            .await?;
        documents
            .into_iter()
            .map(|document| decode(PARTICIPANTS_COLLECTION, document).map(|(_, record)| record))
            .collect()
    }

    /// Record that a participant answered a question: append to the answered
    /// list, refresh activity, and bump the advisory running total.
    pub async fn mark_answered(
        &self,
        participant_id: &str,
        question_number: u32,
        score_delta: i64,
        now: EpochMillis,
    ) -> StoreResult<()> {
        let Some(record) = self.find(participant_id).await? else {
            return Err(StoreError::NotFound {
                collection: PARTICIPANTS_COLLECTION.to_string(),
                id: participant_id.to_string(),
            });
        };

        let mut answered = record.answered_questions;
        if !answered.contains(&question_number) {
            answered.push(question_number);
        }

        let mut fields = Map::new();
        fields.insert("answeredQuestions".into(), encode(&answered));
        fields.insert("totalScore".into(), Value::from(record.total_score + score_delta));
        fields.insert("lastActiveAt".into(), Value::from(now));
        self.store
            .update(PARTICIPANTS_COLLECTION, participant_id, fields)
            .await
    }

    /// Overwrite the stored totals in one atomic batch (finalization).
    pub async fn set_totals(&self, totals: &[(String, i64)]) -> StoreResult<()> {
        if totals.is_empty() {
            return Ok(());
        }
        let ops = totals
            .iter()
            .map(|(participant_id, total)| {
                let mut fields = Map::new();
                fields.insert("totalScore".into(), Value::from(*total));
                WriteOp::Update {
                    id: participant_id.clone(),
                    fields,
                }
            })
            .collect();
        self.store.batch_write(PARTICIPANTS_COLLECTION, ops).await
    }

    /// Delete every participant record. Safe to re-run.
    pub async fn delete_all(&self) -> StoreResult<()> {
        delete_collection(&self.store, PARTICIPANTS_COLLECTION).await
    }
}

/// Repository for the response ledger. Documents are keyed by
/// `participantId:questionNumber`, which is what enforces at-most-one scored
/// response per pair at the store level.
#[derive(Clone)]
pub struct ResponseRepository {
    store: Arc<dyn DocumentStore>,
}

impl ResponseRepository {
    /// Wrap a store handle.
    pub fn new(store: Arc<dyn DocumentStore>) -> Self {
        Self { store }
    }

    fn key(participant_id: &str, question_number: u32) -> String {
        format!("{participant_id}:{question_number}")
    }

    /// Append a response, failing with [`StoreError::Conflict`] when the
    /// participant already answered this question.
    pub async fn insert_unique(&self, record: &ResponseRecord) -> StoreResult<String> {
        self.store
            .insert_if_absent(
                RESPONSES_COLLECTION,
                &Self::key(&record.participant_id, record.question_number),
                encode(record),
            )
            .await
    }

    /// Whether a response exists for the given pair.
    pub async fn exists(&self, participant_id: &str, question_number: u32) -> StoreResult<bool> {
        Ok(self
            .store
            .get(RESPONSES_COLLECTION, &Self::key(participant_id, question_number))
            .await?
            .is_some())
    }

    /// All responses submitted by one participant.
    pub async fn list_for_participant(
        &self,
        participant_id: &str,
    ) -> StoreResult<Vec<ResponseRecord>> {
        let documents = self
            .store
            .query(
                RESPONSES_COLLECTION,
                Query::all().filter_eq("participantId", participant_id),
            )
            .await?;
        documents
            .into_iter()
            .map(|document| decode(RESPONSES_COLLECTION, document).map(|(_, record)| record))
            .collect()
    }

    /// The full ledger.
    pub async fn list_all(&self) -> StoreResult<Vec<ResponseRecord>> {
        let documents = self.store.query(RESPONSES_COLLECTION, Query::all()).await?;
        documents
            .into_iter()
            .map(|document| decode(RESPONSES_COLLECTION, document).map(|(_, record)| record))
            .collect()
    }

    /// Delete the entire ledger. Safe to re-run.
    pub async fn delete_all(&self) -> StoreResult<()> {
        delete_collection(&self.store, RESPONSES_COLLECTION).await
    }
}

async fn delete_collection(store: &Arc<dyn DocumentStore>, collection: &str) -> StoreResult<()> {
    let documents = store.query(collection, Query::all()).await?;
    if documents.is_empty() {
        return Ok(());
    }
    let ops = documents
        .into_iter()
        .map(|document| WriteOp::Delete { id: document.id })
        .collect();
    store.batch_write(collection, ops).await
}
