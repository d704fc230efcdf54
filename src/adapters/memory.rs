use async_trait::async_trait;
use chrono::Utc;
use std::collections::BTreeMap;
use std::sync::{Arc, Mutex, MutexGuard};

use crate::{
    adapters::{Adapter, ResourceRecord},
    error::Error,
    query::Query,
};

type Records = BTreeMap<String, BTreeMap<String, ResourceRecord>>;

#[derive(Clone, Default)]
struct MemoryStore {
    // type_name -> id -> record; BTreeMap keeps query order stable
    records: Arc<Mutex<Records>>,
}

impl MemoryStore {
    fn lock(&self) -> Result<MutexGuard<'_, Records>, Error> {
        self.records
            .lock()
            .map_err(|_| Error::Storage("memory store lock poisoned".to_string()))
    }
}

/// In-process adapter. Clones share the same store.
#[derive(Clone, Default)]
pub struct MemoryAdapter {
    store: MemoryStore,
}

impl MemoryAdapter {
    pub fn new() -> Self {
        Self {
            store: MemoryStore::default(),
        }
    }
}

#[async_trait]
impl Adapter for MemoryAdapter {
    async fn insert_records(&self, records: Vec<ResourceRecord>) -> Result<(), Error> {
        let mut store = self.store.lock()?;

        // Step 1: reject the whole batch on any existing or repeated key
        for (index, record) in records.iter().enumerate() {
            let exists = store
                .get(&record.type_name)
                .is_some_and(|by_id| by_id.contains_key(&record.id));
            let repeated = records[..index]
                .iter()
                .any(|r| r.type_name == record.type_name && r.id == record.id);
            if exists || repeated {
                return Err(Error::DuplicateKey(record.key()));
            }
        }

        // Step 2: apply
        for record in records {
            store
                .entry(record.type_name.clone())
                .or_default()
                .insert(record.id.clone(), record);
        }

        Ok(())
    }

    async fn fetch_record(
        &self,
        type_name: &str,
        id: &str,
    ) -> Result<Option<ResourceRecord>, Error> {
        let store = self.store.lock()?;
        Ok(store.get(type_name).and_then(|by_id| by_id.get(id)).cloned())
    }

    async fn update_record(&self, record: ResourceRecord) -> Result<Option<ResourceRecord>, Error> {
        let mut store = self.store.lock()?;
        let Some(stored) = store
            .get_mut(&record.type_name)
            .and_then(|by_id| by_id.get_mut(&record.id))
        else {
            return Ok(None);
        };

        if stored.version != record.version {
            return Err(Error::Conflict(format!(
                "{} is at version {}, update was based on version {}",
                record.key(),
                stored.version,
                record.version
            )));
        }

        stored.data = record.data;
        stored.index_meta = record.index_meta;
        stored.version += 1;
        stored.updated_at = Utc::now();
        Ok(Some(stored.clone()))
    }

    async fn delete_record(
        &self,
        type_name: &str,
        id: &str,
    ) -> Result<Option<ResourceRecord>, Error> {
        let mut store = self.store.lock()?;
        Ok(store.get_mut(type_name).and_then(|by_id| by_id.remove(id)))
    }

    async fn query_records(
        &self,
        type_name: &str,
        query: &Query,
    ) -> Result<Vec<ResourceRecord>, Error> {
        let store = self.store.lock()?;
        let Some(by_id) = store.get(type_name) else {
            return Ok(Vec::new());
        };

        let matching = by_id
            .values()
            .filter(|record| query.matches(&record.index_meta))
            .cloned();

        Ok(match query.limit {
            Some(limit) => matching.take(limit as usize).collect(),
            None => matching.collect(),
        })
    }

    async fn count_records(&self, type_name: &str, query: Option<&Query>) -> Result<u64, Error> {
        let store = self.store.lock()?;
        let Some(by_id) = store.get(type_name) else {
            return Ok(0);
        };

        let count = match query {
            Some(query) => by_id
                .values()
                .filter(|record| query.matches(&record.index_meta))
                .count(),
            None => by_id.len(),
        };
        Ok(count as u64)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::query::{IndexField, IndexMeta};

    static QUANTITY: IndexField = IndexField { name: "quantity" };

    fn record(id: &str, quantity: i64) -> ResourceRecord {
        let now = Utc::now();
        ResourceRecord {
            id: id.to_string(),
            type_name: "Commodity".to_string(),
            version: 0,
            data: serde_json::json!({ "quantity": quantity }),
            index_meta: IndexMeta::default().with("quantity", quantity),
            created_at: now,
            updated_at: now,
        }
    }

    #[tokio::test]
    async fn test_insert_is_atomic() {
        let adapter = MemoryAdapter::new();
        adapter.insert_records(vec![record("EMA", 100)]).await.unwrap();

        let err = adapter
            .insert_records(vec![record("XYZ", 50), record("EMA", 10)])
            .await
            .unwrap_err();
        assert_eq!(err, Error::DuplicateKey("Commodity#EMA".to_string()));

        // XYZ must not have been inserted
        assert!(adapter.fetch_record("Commodity", "XYZ").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_duplicate_inside_batch() {
        let adapter = MemoryAdapter::new();
        let err = adapter
            .insert_records(vec![record("EMA", 1), record("EMA", 2)])
            .await
            .unwrap_err();
        assert!(matches!(err, Error::DuplicateKey(_)));
        assert_eq!(adapter.count_records("Commodity", None).await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_update_bumps_version_and_detects_conflict() {
        let adapter = MemoryAdapter::new();
        adapter.insert_records(vec![record("EMA", 100)]).await.unwrap();

        let stale = adapter.fetch_record("Commodity", "EMA").await.unwrap().unwrap();
        let updated = adapter
            .update_record(record("EMA", 90))
            .await
            .unwrap()
            .unwrap();
        assert_eq!(updated.version, 1);

        let err = adapter.update_record(stale).await.unwrap_err();
        assert!(matches!(err, Error::Conflict(_)));
    }

    #[tokio::test]
    async fn test_update_and_delete_missing() {
        let adapter = MemoryAdapter::new();
        assert!(adapter.update_record(record("EMA", 1)).await.unwrap().is_none());
        assert!(adapter.delete_record("Commodity", "EMA").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_query_orders_by_id_and_limits() {
        let adapter = MemoryAdapter::new();
        adapter
            .insert_records(vec![record("XYZ", 80), record("ABC", 90), record("LOW", 5)])
            .await
            .unwrap();

        let query = Query::new().where_gte(&QUANTITY, 75_i64);
        let ids: Vec<String> = adapter
            .query_records("Commodity", &query)
            .await
            .unwrap()
            .into_iter()
            .map(|r| r.id)
            .collect();
        assert_eq!(ids, vec!["ABC".to_string(), "XYZ".to_string()]);

        let limited = adapter
            .query_records("Commodity", &query.clone().with_limit(1))
            .await
            .unwrap();
        assert_eq!(limited.len(), 1);
        assert_eq!(
            adapter.count_records("Commodity", Some(&query)).await.unwrap(),
            2
        );
    }

    #[tokio::test]
    async fn test_clones_share_store() {
        let adapter = MemoryAdapter::new();
        let other = adapter.clone();
        adapter.insert_records(vec![record("EMA", 100)]).await.unwrap();
        assert!(other.fetch_record("Commodity", "EMA").await.unwrap().is_some());
    }
}
