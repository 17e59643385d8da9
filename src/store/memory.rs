use crate::core::error::Result;
use crate::core::reference::{ReferenceRecord, ReferenceStore};
use async_trait::async_trait;
use chrono::Utc;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::debug;

/// In-memory reference store, used for dry runs and tests
#[derive(Clone, Default)]
pub struct MemoryReferenceStore {
    inner: Arc<Mutex<HashMap<String, ReferenceRecord>>>,
}

impl MemoryReferenceStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn len(&self) -> usize {
        self.inner.lock().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }
}

#[async_trait]
impl ReferenceStore for MemoryReferenceStore {
    async fn get(&self, key: &str) -> Result<Option<ReferenceRecord>> {
        let records = self.inner.lock().await;
        if let Some(record) = records.get(key) {
            if record.is_expired(Utc::now()) {
                debug!("Reference record expired for key: {}", key);
                return Ok(None);
            }
            debug!("Reference HIT for key: {}", key);
            return Ok(Some(record.clone()));
        }
        debug!("Reference MISS for key: {}", key);
        Ok(None)
    }

    async fn put(&self, record: ReferenceRecord) -> Result<()> {
        let mut records = self.inner.lock().await;
        debug!("Reference PUT for key: {}", record.key);
        records.insert(record.key.clone(), record);
        Ok(())
    }
}
