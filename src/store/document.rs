//! Backend-agnostic document store contract.
//!
//! The orchestration core never talks to a concrete database. Everything goes
//! through [`DocumentStore`], which captures the minimum a backing store must
//! provide: per-document atomic read-modify-write, filtered queries, batched
//! writes that are atomic within a single collection, and full-snapshot change
//! subscriptions.

use std::error::Error;

use futures::future::BoxFuture;
use serde_json::{Map, Value};
use thiserror::Error;
use tokio::sync::broadcast;

/// Result alias for store operations.
pub type StoreResult<T> = Result<T, StoreError>;

/// Error raised by store backends regardless of the underlying database.
#[derive(Debug, Error)]
pub enum StoreError {
    /// The backend could not be reached or failed mid-operation.
    #[error("store unavailable: {message}")]
    Unavailable {
        /// Human-readable description of the failure.
        message: String,
        /// Underlying backend error.
        #[source]
        source: Box<dyn Error + Send + Sync>,
    },
    /// The targeted document does not exist.
    #[error("document `{id}` not found in `{collection}`")]
    NotFound {
        /// Collection that was queried.
        collection: String,
        /// Identifier of the missing document.
        id: String,
    },
    /// A unique-key insert collided with an existing document.
    #[error("key `{key}` already exists in `{collection}`")]
    Conflict {
        /// Collection the insert targeted.
        collection: String,
        /// Unique key that collided.
        key: String,
    },
    /// A stored document could not be decoded into its expected shape.
    #[error("malformed document in `{collection}`")]
    Corrupt {
        /// Collection holding the malformed document.
        collection: String,
        /// Decoding error.
        #[source]
        source: serde_json::Error,
    },
}

impl StoreError {
    /// Construct an unavailable error from any backend failure.
    pub fn unavailable(message: String, source: impl Error + Send + Sync + 'static) -> Self {
        StoreError::Unavailable {
            message,
            source: Box::new(source),
        }
    }
}

/// A stored document together with its identifier.
#[derive(Debug, Clone, PartialEq)]
pub struct Document {
    /// Identifier of the document within its collection.
    pub id: String,
    /// JSON body of the document.
    pub body: Value,
}

/// Equality/range predicates ANDed together by [`DocumentStore::query`].
#[derive(Debug, Clone)]
pub enum Filter {
    /// Field must equal the given value.
    Eq(String, Value),
}

/// Sort direction for query results.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortOrder {
    /// Smallest value first.
    Ascending,
    /// Largest value first.
    Descending,
}

/// Filtered, optionally ordered read over a collection.
#[derive(Debug, Clone, Default)]
pub struct Query {
    /// Predicates every returned document must satisfy.
    pub filters: Vec<Filter>,
    /// Optional field to order the result set by.
    pub order_by: Option<(String, SortOrder)>,
}

impl Query {
    /// Query matching every document in the collection.
    pub fn all() -> Self {
        Self::default()
    }

    /// Add an equality predicate.
    pub fn filter_eq(mut self, field: impl Into<String>, value: impl Into<Value>) -> Self {
        self.filters.push(Filter::Eq(field.into(), value.into()));
        self
    }

    /// Order the result set by the given field.
    pub fn order_by(mut self, field: impl Into<String>, order: SortOrder) -> Self {
        self.order_by = Some((field.into(), order));
        self
    }
}

/// Single operation inside a [`DocumentStore::batch_write`] call.
#[derive(Debug, Clone)]
pub enum WriteOp {
    /// Create or replace (or field-merge) a document.
    Set {
        /// Document identifier.
        id: String,
        /// Full document body.
        document: Value,
        /// When true, merge top-level fields into any existing document.
        merge: bool,
    },
    /// Merge fields into an existing document; the batch fails if it is absent.
    Update {
        /// Document identifier.
        id: String,
        /// Fields to merge; a `null` value clears the field.
        fields: Map<String, Value>,
    },
    /// Remove a document. Removing an absent document is a no-op.
    Delete {
        /// Document identifier.
        id: String,
    },
}

/// Full result-set snapshot delivered to change subscribers.
///
/// Deliveries are best-effort: they may be duplicated, batched, or dropped
/// under lag. Consumers must re-derive their state from the latest snapshot
/// (or by re-reading) rather than diffing consecutive deliveries.
#[derive(Debug, Clone)]
pub struct CollectionSnapshot {
    /// Collection the snapshot belongs to.
    pub collection: String,
    /// Monotonic revision counter, bumped on every committed write.
    pub revision: u64,
    /// Every document currently in the collection.
    pub documents: Vec<Document>,
}

/// Abstraction over the persistence layer shared by every client.
///
/// Single-document writes are atomic and last-writer-wins; batches are atomic
/// only within one collection; nothing composes across calls. These are the
/// only coordination primitives the orchestration core relies on.
pub trait DocumentStore: Send + Sync {
    /// Fetch a document by id, `None` when absent.
    fn get(&self, collection: &str, id: &str) -> BoxFuture<'static, StoreResult<Option<Document>>>;

    /// Create or replace a document. With `merge` set, top-level fields are
    /// merged into any existing document instead of replacing it.
    fn set(
        &self,
        collection: &str,
        id: &str,
        document: Value,
        merge: bool,
    ) -> BoxFuture<'static, StoreResult<()>>;

    /// Merge fields into an existing document, failing with
    /// [`StoreError::NotFound`] when it is absent. A `null` field value
    /// clears the field.
    fn update(
        &self,
        collection: &str,
        id: &str,
        fields: Map<String, Value>,
    ) -> BoxFuture<'static, StoreResult<()>>;

    /// Run a filtered query over a collection.
    fn query(
        &self,
        collection: &str,
        query: Query,
    ) -> BoxFuture<'static, StoreResult<Vec<Document>>>;

    /// Apply a batch of writes atomically within a single collection.
    fn batch_write(
        &self,
        collection: &str,
        ops: Vec<WriteOp>,
    ) -> BoxFuture<'static, StoreResult<()>>;

    /// Insert a document under a caller-chosen unique key, failing with
    /// [`StoreError::Conflict`] when the key is already taken. This is the
    /// primitive that makes check-then-insert races impossible for the
    /// response ledger.
    fn insert_if_absent(
        &self,
        collection: &str,
        unique_key: &str,
        document: Value,
    ) -> BoxFuture<'static, StoreResult<String>>;

    /// Subscribe to change notifications for a collection. Each delivery
    /// carries the full current result set; see [`CollectionSnapshot`].
    fn subscribe(&self, collection: &str) -> StoreResult<broadcast::Receiver<CollectionSnapshot>>;

    /// Cheap connectivity probe used by the storage supervisor.
    fn health_check(&self) -> BoxFuture<'static, StoreResult<()>>;
}
