use async_trait::async_trait;
use std::collections::btree_map::Entry;
use std::collections::BTreeMap;
use tokio::sync::RwLock;

use super::{ProgressStore, StoreError};
use crate::progress::ProgressRecord;

type CompositeKey = (String, String);

/// In-process store for development and tests.
///
/// The existence check and the insert happen under one write lock, so the
/// conditional put keeps the same atomicity as the Postgres store.
#[derive(Default)]
pub struct MemoryProgressStore {
    items: RwLock<BTreeMap<CompositeKey, ProgressRecord>>,
}

impl MemoryProgressStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn len(&self) -> usize {
        self.items.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.items.read().await.is_empty()
    }
}

#[async_trait]
impl ProgressStore for MemoryProgressStore {
    async fn put_if_absent(&self, record: &ProgressRecord) -> Result<(), StoreError> {
        let key = (record.partition_key(), record.sort_key());
        let mut items = self.items.write().await;

        match items.entry(key) {
            Entry::Occupied(existing) => {
                let (partition_key, sort_key) = existing.key().clone();
                Err(StoreError::AlreadyExists {
                    partition_key,
                    sort_key,
                })
            }
            Entry::Vacant(slot) => {
                slot.insert(record.clone());
                Ok(())
            }
        }
    }

    async fn query_partition(&self, partition_key: &str) -> Result<Vec<ProgressRecord>, StoreError> {
        let items = self.items.read().await;
        let start = (partition_key.to_string(), String::new());

        Ok(items
            .range(start..)
            .take_while(|((pk, _), _)| pk == partition_key)
            .map(|(_, record)| record.clone())
            .collect())
    }

    async fn health_check(&self) -> Result<(), StoreError> {
        Ok(())
    }
}
