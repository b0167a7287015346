//! In-process reference backend implementing the full [`DocumentStore`]
//! contract, including per-collection full-snapshot change broadcasts.
//!
//! Collections live in a [`DashMap`]; every committed write bumps the
//! collection revision and broadcasts a fresh snapshot. Snapshot fan-out
//! copies the whole collection, which is fine at quiz scale.

use std::{collections::BTreeMap, sync::Arc};

use dashmap::DashMap;
use futures::future::BoxFuture;
use serde_json::{Map, Value};
use tokio::sync::broadcast;
use uuid::Uuid;

use crate::store::document::{
    CollectionSnapshot, Document, DocumentStore, Filter, Query, SortOrder, StoreError,
    StoreResult, WriteOp,
};

const CHANGE_CHANNEL_CAPACITY: usize = 32;

/// In-memory [`DocumentStore`] used as the default backend and by tests.
#[derive(Clone, Default)]
pub struct MemoryStore {
    collections: Arc<DashMap<String, MemoryCollection>>,
}

struct MemoryCollection {
    docs: BTreeMap<String, Value>,
    revision: u64,
    changes: broadcast::Sender<CollectionSnapshot>,
}

impl MemoryCollection {
    fn new() -> Self {
        let (changes, _) = broadcast::channel(CHANGE_CHANNEL_CAPACITY);
        Self {
            docs: BTreeMap::new(),
            revision: 0,
            changes,
        }
    }

    /// Bump the revision and push a full snapshot to subscribers.
    fn commit(&mut self, collection: &str) {
        self.revision += 1;
        let snapshot = CollectionSnapshot {
            collection: collection.to_string(),
            revision: self.revision,
            documents: self
                .docs
                .iter()
                .map(|(id, body)| Document {
                    id: id.clone(),
                    body: body.clone(),
                })
                .collect(),
        };
        let _ = self.changes.send(snapshot);
    }
}

impl MemoryStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    fn with_collection<T>(&self, name: &str, f: impl FnOnce(&mut MemoryCollection) -> T) -> T {
        let mut entry = self
            .collections
            .entry(name.to_string())
            .or_insert_with(MemoryCollection::new);
        f(entry.value_mut())
    }
}

fn merge_fields(target: &mut Value, fields: &Map<String, Value>) {
    if !target.is_object() {
        *target = Value::Object(Map::new());
    }
    if let Value::Object(existing) = target {
        for (key, value) in fields {
            existing.insert(key.clone(), value.clone());
        }
    }
}

fn matches(body: &Value, filters: &[Filter]) -> bool {
    filters.iter().all(|filter| match filter {
        Filter::Eq(field, expected) => body.get(field) == Some(expected),
    })
}

fn compare_values(a: &Value, b: &Value) -> std::cmp::Ordering {
    use std::cmp::Ordering;
    match (a.as_f64(), b.as_f64()) {
        (Some(x), Some(y)) => x.partial_cmp(&y).unwrap_or(Ordering::Equal),
        _ => a
            .as_str()
            .unwrap_or_default()
            .cmp(b.as_str().unwrap_or_default()),
    }
}

impl DocumentStore for MemoryStore {
    fn get(&self, collection: &str, id: &str) -> BoxFuture<'static, StoreResult<Option<Document>>> {
        let store = self.clone();
        let collection = collection.to_string();
        let id = id.to_string();
        Box::pin(async move {
            Ok(store.with_collection(&collection, |col| {
                col.docs.get(&id).map(|body| Document {
                    id: id.clone(),
                    body: body.clone(),
                })
            }))
        })
    }

    fn set(
        &self,
        collection: &str,
        id: &str,
        document: Value,
        merge: bool,
    ) -> BoxFuture<'static, StoreResult<()>> {
        let store = self.clone();
        let collection = collection.to_string();
        let id = id.to_string();
        Box::pin(async move {
            store.with_collection(&collection, |col| {
                match col.docs.get_mut(&id) {
                    Some(existing) if merge => {
                        if let Value::Object(fields) = &document {
                            merge_fields(existing, fields);
                        } else {
                            *existing = document;
                        }
                    }
                    _ => {
                        col.docs.insert(id.clone(), document);
                    }
                }
                col.commit(&collection);
            });
            Ok(())
        })
    }

    fn update(
        &self,
        collection: &str,
        id: &str,
        fields: Map<String, Value>,
    ) -> BoxFuture<'static, StoreResult<()>> {
        let store = self.clone();
        let collection = collection.to_string();
        let id = id.to_string();
        Box::pin(async move {
            store.with_collection(&collection, |col| {
                let Some(existing) = col.docs.get_mut(&id) else {
                    return Err(StoreError::NotFound {
                        collection: collection.clone(),
                        id: id.clone(),
                    });
                };
                merge_fields(existing, &fields);
                col.commit(&collection);
                Ok(())
            })
        })
    }

    fn query(
        &self,
        collection: &str,
        query: Query,
    ) -> BoxFuture<'static, StoreResult<Vec<Document>>> {
        let store = self.clone();
        let collection = collection.to_string();
        Box::pin(async move {
            let mut documents = store.with_collection(&collection, |col| {
                col.docs
                    .iter()
                    .filter(|(_, body)| matches(body, &query.filters))
                    .map(|(id, body)| Document {
                        id: id.clone(),
                        body: body.clone(),
                    })
                    .collect::<Vec<_>>()
            });

            if let Some((field, order)) = &query.order_by {
                documents.sort_by(|a, b| {
                    let ordering = compare_values(
                        a.body.get(field).unwrap_or(&Value::Null),
                        b.body.get(field).unwrap_or(&Value::Null),
                    );
                    match order {
                        SortOrder::Ascending => ordering,
                        SortOrder::Descending => ordering.reverse(),
                    }
                });
            }

            Ok(documents)
        })
    }

    fn batch_write(
        &self,
        collection: &str,
        ops: Vec<WriteOp>,
    ) -> BoxFuture<'static, StoreResult<()>> {
        let store = self.clone();
        let collection = collection.to_string();
        Box::pin(async move {
            store.with_collection(&collection, |col| {
                // Validate before mutating so the batch applies atomically.
                for op in &ops {
                    if let WriteOp::Update { id, .. } = op
                        && !col.docs.contains_key(id)
                    {
                        return Err(StoreError::NotFound {
                            collection: collection.clone(),
                            id: id.clone(),
                        });
                    }
                }

                for op in ops {
                    match op {
                        WriteOp::Set {
                            id,
                            document,
                            merge,
                        } => match col.docs.get_mut(&id) {
                            Some(existing) if merge => {
                                if let Value::Object(fields) = &document {
                                    merge_fields(existing, fields);
                                } else {
                                    *existing = document;
                                }
                            }
                            _ => {
                                col.docs.insert(id, document);
                            }
                        },
                        WriteOp::Update { id, fields } => {
                            if let Some(existing) = col.docs.get_mut(&id) {
                                merge_fields(existing, &fields);
                            }
                        }
                        WriteOp::Delete { id } => {
                            col.docs.remove(&id);
                        }
                    }
                }

                col.commit(&collection);
                Ok(())
            })
        })
    }

    fn insert_if_absent(
        &self,
        collection: &str,
        unique_key: &str,
        document: Value,
    ) -> BoxFuture<'static, StoreResult<String>> {
        let store = self.clone();
        let collection = collection.to_string();
        let key = if unique_key.is_empty() {
            Uuid::new_v4().simple().to_string()
        } else {
            unique_key.to_string()
        };
        Box::pin(async move {
            store.with_collection(&collection, |col| {
                if col.docs.contains_key(&key) {
                    return Err(StoreError::Conflict {
                        collection: collection.clone(),
                        key: key.clone(),
                    });
                }
                col.docs.insert(key.clone(), document);
                col.commit(&collection);
                Ok(key.clone())
            })
        })
    }

    fn subscribe(&self, collection: &str) -> StoreResult<broadcast::Receiver<CollectionSnapshot>> {
        Ok(self.with_collection(collection, |col| col.changes.subscribe()))
    }

    fn health_check(&self) -> BoxFuture<'static, StoreResult<()>> {
        Box::pin(async { Ok(()) })
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    fn fields(value: Value) -> Map<String, Value> {
        match value {
            Value::Object(map) => map,
            other => panic!("expected object, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn set_with_merge_preserves_existing_fields() {
        let store = MemoryStore::new();
        store
            .set("col", "doc", json!({"a": 1, "b": 2}), false)
            .await
            .unwrap();
        store.set("col", "doc", json!({"b": 3}), true).await.unwrap();

        let doc = store.get("col", "doc").await.unwrap().unwrap();
        assert_eq!(doc.body, json!({"a": 1, "b": 3}));
    }

    #[tokio::test]
    async fn update_missing_document_fails() {
        let store = MemoryStore::new();
        let err = store
            .update("col", "missing", fields(json!({"a": 1})))
            .await
            .unwrap_err();
        assert!(matches!(err, StoreError::NotFound { .. }));
    }

    #[tokio::test]
    async fn insert_if_absent_rejects_duplicate_key() {
        let store = MemoryStore::new();
        store
            .insert_if_absent("col", "key", json!({"n": 1}))
            .await
            .unwrap();
        let err = store
            .insert_if_absent("col", "key", json!({"n": 2}))
            .await
            .unwrap_err();
        assert!(matches!(err, StoreError::Conflict { .. }));

        let doc = store.get("col", "key").await.unwrap().unwrap();
        assert_eq!(doc.body, json!({"n": 1}));
    }

    #[tokio::test]
    async fn query_filters_and_orders() {
        let store = MemoryStore::new();
        for (id, n, active) in [("a", 2, true), ("b", 1, true), ("c", 3, false)] {
            store
                .set("col", id, json!({"n": n, "active": active}), false)
                .await
                .unwrap();
        }

        let docs = store
            .query(
                "col",
                Query::all()
                    .filter_eq("active", true)
                    .order_by("n", SortOrder::Ascending),
            )
            .await
            .unwrap();

        let ids: Vec<_> = docs.iter().map(|d| d.id.as_str()).collect();
        assert_eq!(ids, vec!["b", "a"]);
    }

    #[tokio::test]
    async fn batch_with_missing_update_target_applies_nothing() {
        let store = MemoryStore::new();
        store.set("col", "a", json!({"n": 1}), false).await.unwrap();

        let err = store
            .batch_write(
                "col",
                vec![
                    WriteOp::Update {
                        id: "a".into(),
                        fields: fields(json!({"n": 9})),
                    },
                    WriteOp::Update {
                        id: "missing".into(),
                        fields: fields(json!({"n": 9})),
                    },
                ],
            )
            .await
            .unwrap_err();
        assert!(matches!(err, StoreError::NotFound { .. }));

        let doc = store.get("col", "a").await.unwrap().unwrap();
        assert_eq!(doc.body, json!({"n": 1}));
    }

    #[tokio::test]
    async fn subscribers_receive_full_snapshots() {
        let store = MemoryStore::new();
        let mut rx = store.subscribe("col").unwrap();

        store.set("col", "a", json!({"n": 1}), false).await.unwrap();
        store.set("col", "b", json!({"n": 2}), false).await.unwrap();

        let first = rx.recv().await.unwrap();
        assert_eq!(first.revision, 1);
        assert_eq!(first.documents.len(), 1);

        let second = rx.recv().await.unwrap();
        assert_eq!(second.revision, 2);
        assert_eq!(second.documents.len(), 2);
    }
}
