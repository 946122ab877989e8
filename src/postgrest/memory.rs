//! In-process collection store for tests and demos

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde_json::Value;
use std::cmp::Ordering;
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering as AtomicOrdering};
use std::sync::RwLock;
use uuid::Uuid;

use crate::auth::Session;
use crate::error::{Error, Result};
use crate::postgrest::{CollectionStore, Filter, ListOptions};

/// A call received by [`MemoryStore`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoreCall {
    List { table: String },
    Create { table: String },
    Update { table: String, id: String },
    Delete { table: String, id: String },
    Upsert { table: String },
    DeleteWhere { table: String },
}

impl StoreCall {
    pub fn is_mutation(&self) -> bool {
        !matches!(self, StoreCall::List { .. })
    }
}

/// Collection store keeping every table in memory, with a call journal
#[derive(Default)]
pub struct MemoryStore {
    tables: RwLock<HashMap<String, Vec<Value>>>,
    calls: RwLock<Vec<StoreCall>>,
    failing: AtomicBool,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append rows to a table without journaling a call
    pub fn seed(&self, table: &str, rows: Vec<Value>) {
        self.tables
            .write()
            .unwrap_or_else(|e| e.into_inner())
            .entry(table.to_string())
            .or_default()
            .extend(rows);
    }

    /// Snapshot of a table
    pub fn rows(&self, table: &str) -> Vec<Value> {
        self.tables
            .read()
            .unwrap_or_else(|e| e.into_inner())
            .get(table)
            .cloned()
            .unwrap_or_default()
    }

    /// Every call received so far
    pub fn calls(&self) -> Vec<StoreCall> {
        self.calls.read().unwrap_or_else(|e| e.into_inner()).clone()
    }

    /// Calls that would have written to the backend
    pub fn mutations(&self) -> Vec<StoreCall> {
        self.calls().into_iter().filter(StoreCall::is_mutation).collect()
    }

    pub fn clear_calls(&self) {
        self.calls.write().unwrap_or_else(|e| e.into_inner()).clear();
    }

    /// Make every following call fail, as an unreachable backend would
    pub fn set_failing(&self, failing: bool) {
        self.failing.store(failing, AtomicOrdering::SeqCst);
    }

    fn record(&self, call: StoreCall) -> Result<()> {
        self.calls
            .write()
            .unwrap_or_else(|e| e.into_inner())
            .push(call);
        if self.failing.load(AtomicOrdering::SeqCst) {
            return Err(Error::database("Backend unavailable"));
        }
        Ok(())
    }
}

fn compare_values(a: Option<&Value>, b: Option<&Value>) -> Ordering {
    match (a, b) {
        (Some(Value::Number(x)), Some(Value::Number(y))) => x
            .as_f64()
            .partial_cmp(&y.as_f64())
            .unwrap_or(Ordering::Equal),
        (Some(Value::String(x)), Some(Value::String(y))) => {
            match (x.parse::<DateTime<Utc>>(), y.parse::<DateTime<Utc>>()) {
                (Ok(x), Ok(y)) => x.cmp(&y),
                _ => x.cmp(y),
            }
        }
        (None | Some(Value::Null), None | Some(Value::Null)) => Ordering::Equal,
        (None | Some(Value::Null), _) => Ordering::Less,
        (_, None | Some(Value::Null)) => Ordering::Greater,
        (Some(x), Some(y)) => x.to_string().cmp(&y.to_string()),
    }
}

fn merge(target: &mut Value, patch: &Value) {
    if let (Some(target), Some(patch)) = (target.as_object_mut(), patch.as_object()) {
        for (key, value) in patch {
            target.insert(key.clone(), value.clone());
        }
    }
}

fn id_of(row: &Value) -> Option<&str> {
    row.get("id").and_then(Value::as_str)
}

#[async_trait]
impl CollectionStore for MemoryStore {
    async fn list(&self, _session: &Session, table: &str, options: &ListOptions) -> Result<Vec<Value>> {
        self.record(StoreCall::List {
            table: table.to_string(),
        })?;

        let mut rows: Vec<Value> = self
            .rows(table)
            .into_iter()
            .filter(|row| options.filters.iter().all(|f| f.matches(row)))
            .collect();

        if let Some(order) = &options.order_by {
            rows.sort_by(|a, b| {
                let ordering = compare_values(a.get(&order.column), b.get(&order.column));
                if order.ascending {
                    ordering
                } else {
                    ordering.reverse()
                }
            });
        }
        Ok(rows)
    }

    async fn create(&self, _session: &Session, table: &str, mut record: Value) -> Result<Value> {
        self.record(StoreCall::Create {
            table: table.to_string(),
        })?;

        let object = record
            .as_object_mut()
            .ok_or_else(|| Error::database("Record must be a JSON object"))?;
        object
            .entry("id")
            .or_insert_with(|| Value::String(Uuid::new_v4().to_string()));
        object
            .entry("created_at")
            .or_insert_with(|| Value::String(Utc::now().to_rfc3339()));

        let mut tables = self.tables.write().unwrap_or_else(|e| e.into_inner());
        let rows = tables.entry(table.to_string()).or_default();
        if rows.iter().any(|row| id_of(row) == id_of(&record)) {
            return Err(Error::database(
                "duplicate key value violates unique constraint",
            ));
        }
        rows.push(record.clone());
        Ok(record)
    }

    async fn update(&self, _session: &Session, table: &str, id: &str, patch: Value) -> Result<Value> {
        self.record(StoreCall::Update {
            table: table.to_string(),
            id: id.to_string(),
        })?;

        let mut tables = self.tables.write().unwrap_or_else(|e| e.into_inner());
        let row = tables
            .get_mut(table)
            .and_then(|rows| rows.iter_mut().find(|row| id_of(row) == Some(id)))
            .ok_or_else(|| Error::database("No row returned after update"))?;
        merge(row, &patch);
        Ok(row.clone())
    }

    async fn delete(&self, _session: &Session, table: &str, id: &str) -> Result<()> {
        self.record(StoreCall::Delete {
            table: table.to_string(),
            id: id.to_string(),
        })?;

        let mut tables = self.tables.write().unwrap_or_else(|e| e.into_inner());
        if let Some(rows) = tables.get_mut(table) {
            rows.retain(|row| id_of(row) != Some(id));
        }
        Ok(())
    }

    async fn upsert(
        &self,
        _session: &Session,
        table: &str,
        record: Value,
        on_conflict: &[&str],
    ) -> Result<Value> {
        self.record(StoreCall::Upsert {
            table: table.to_string(),
        })?;

        let mut tables = self.tables.write().unwrap_or_else(|e| e.into_inner());
        let rows = tables.entry(table.to_string()).or_default();
        let existing = rows.iter_mut().find(|row| {
            on_conflict
                .iter()
                .all(|column| row.get(*column).is_some() && row.get(*column) == record.get(*column))
        });

        match existing {
            Some(row) => {
                merge(row, &record);
                Ok(row.clone())
            }
            None => {
                let mut record = record;
                if let Some(object) = record.as_object_mut() {
                    object
                        .entry("created_at")
                        .or_insert_with(|| Value::String(Utc::now().to_rfc3339()));
                }
                rows.push(record.clone());
                Ok(record)
            }
        }
    }

    async fn delete_where(&self, _session: &Session, table: &str, filters: &[Filter]) -> Result<u64> {
        self.record(StoreCall::DeleteWhere {
            table: table.to_string(),
        })?;
        if filters.is_empty() {
            return Err(Error::database("Refusing to delete without a filter"));
        }

        let mut tables = self.tables.write().unwrap_or_else(|e| e.into_inner());
        let Some(rows) = tables.get_mut(table) else {
            return Ok(0);
        };
        let before = rows.len();
        rows.retain(|row| !filters.iter().all(|f| f.matches(row)));
        Ok((before - rows.len()) as u64)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::User;
    use serde_json::json;

    fn session() -> Session {
        let user = User {
            id: "u1".to_string(),
            email: "u1@example.com".to_string(),
            display_name: None,
            created_at: Utc::now(),
        };
        Session::new("token".to_string(), "refresh".to_string(), 3600, user)
    }

    #[tokio::test]
    async fn list_filters_and_orders_by_timestamp() {
        let store = MemoryStore::new();
        store.seed(
            "items",
            vec![
                json!({ "id": "a", "owner": "u1", "created_at": "2024-01-01T10:00:00Z" }),
                json!({ "id": "b", "owner": "u2", "created_at": "2024-01-03T10:00:00Z" }),
                json!({ "id": "c", "owner": "u1", "created_at": "2024-01-02T10:00:00.500Z" }),
            ],
        );

        let options = ListOptions::new().eq("owner", "u1").order("created_at", false);
        let rows = store.list(&session(), "items", &options).await.unwrap();
        let ids: Vec<_> = rows.iter().filter_map(id_of).collect();
        assert_eq!(ids, vec!["c", "a"]);
    }

    #[tokio::test]
    async fn upsert_merges_on_conflict_columns() {
        let store = MemoryStore::new();
        let s = session();
        let first = json!({ "id": "v1", "user_id": "u1", "restaurant_id": "r1", "vote_type": "up" });
        store.upsert(&s, "votes", first, &["user_id", "restaurant_id"]).await.unwrap();

        let second = json!({ "id": "v1", "user_id": "u1", "restaurant_id": "r1", "vote_type": "down" });
        let row = store
            .upsert(&s, "votes", second, &["user_id", "restaurant_id"])
            .await
            .unwrap();

        assert_eq!(row["vote_type"], "down");
        assert_eq!(store.rows("votes").len(), 1);
        assert_eq!(store.mutations().len(), 2);
    }

    #[tokio::test]
    async fn failing_store_still_journals_the_call() {
        let store = MemoryStore::new();
        store.set_failing(true);
        let result = store.delete(&session(), "items", "a").await;
        assert!(matches!(result, Err(Error::Database(_))));
        assert_eq!(
            store.calls(),
            vec![StoreCall::Delete {
                table: "items".to_string(),
                id: "a".to_string()
            }]
        );
    }

    #[tokio::test]
    async fn duplicate_ids_are_rejected() {
        let store = MemoryStore::new();
        let s = session();
        store.create(&s, "items", json!({ "id": "a" })).await.unwrap();
        assert!(store.create(&s, "items", json!({ "id": "a" })).await.is_err());
    }
}
