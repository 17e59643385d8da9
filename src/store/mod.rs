pub mod disk;
pub mod memory;

use crate::core::config::AppConfig;
use crate::core::reference::ReferenceStore;
use anyhow::{Context, Result};
use disk::FjallReferenceStore;
use std::sync::Arc;
use tracing::debug;

/// Opens the persistent reference store described by `config`.
pub fn open_reference_store(config: &AppConfig) -> Result<Arc<dyn ReferenceStore>> {
    let data_path = config.default_data_path()?.join("store");
    debug!(
        "Opening reference store {} at {}",
        config.store.table_name,
        data_path.display()
    );
    let store = FjallReferenceStore::open(&data_path, &config.store.table_name)
        .with_context(|| format!("Failed to open reference store at {}", data_path.display()))?;
    Ok(Arc::new(store))
}
