use crate::core::error::{AlertError, Result};
use crate::core::reference::{ReferenceRecord, ReferenceStore};
use async_trait::async_trait;
use chrono::Utc;
use fjall::{Keyspace, PartitionCreateOptions, PartitionHandle, PersistMode};
use std::path::Path;
use tracing::debug;

/// Reference records kept in a fjall partition named after the table.
///
/// Values are the JSON form of [`ReferenceRecord`]. Records past their
/// `expires_at` are dropped on read.
pub struct FjallReferenceStore {
    keyspace: Keyspace,
    partition: PartitionHandle,
}

impl FjallReferenceStore {
    pub fn open(db_path: &Path, table_name: &str) -> Result<Self> {
        std::fs::create_dir_all(db_path).map_err(|e| {
            AlertError::Config(format!(
                "failed to create store directory {}: {e}",
                db_path.display()
            ))
        })?;

        let keyspace = fjall::Config::new(db_path)
            .open()
            .map_err(|e| AlertError::Config(format!("failed to open store: {e}")))?;
        let partition = keyspace
            .open_partition(table_name, PartitionCreateOptions::default())
            .map_err(|e| AlertError::Config(format!("failed to open table {table_name}: {e}")))?;

        Ok(Self {
            keyspace,
            partition,
        })
    }
}

#[async_trait]
impl ReferenceStore for FjallReferenceStore {
    async fn get(&self, key: &str) -> Result<Option<ReferenceRecord>> {
        let Some(value) = self
            .partition
            .get(key.as_bytes())
            .map_err(|e| AlertError::StoreRead(e.to_string()))?
        else {
            debug!("Reference MISS for key: {}", key);
            return Ok(None);
        };

        let record: ReferenceRecord = serde_json::from_slice(&value)
            .map_err(|e| AlertError::StoreRead(format!("failed to unmarshal item: {e}")))?;
        if record.is_expired(Utc::now()) {
            debug!("Reference record expired for key: {}", key);
            self.partition
                .remove(key.as_bytes())
                .map_err(|e| AlertError::StoreRead(e.to_string()))?;
            return Ok(None);
        }

        debug!("Reference HIT for key: {}", key);
        Ok(Some(record))
    }

    async fn put(&self, record: ReferenceRecord) -> Result<()> {
        let value =
            serde_json::to_vec(&record).map_err(|e| AlertError::StoreWrite(e.to_string()))?;
        self.partition
            .insert(record.key.as_bytes(), value)
            .map_err(|e| AlertError::StoreWrite(e.to_string()))?;
        self.keyspace
            .persist(PersistMode::SyncAll)
            .map_err(|e| AlertError::StoreWrite(e.to_string()))?;
        debug!("Reference PUT for key: {}", record.key);
        Ok(())
    }
}
