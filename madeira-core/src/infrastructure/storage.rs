use std::path::Path;
use std::sync::Arc;

use tracing::info;

use crate::data::keys;
use crate::data::store::{JsonFileStore, Storage, StorageError};

/// Opens the JSON-file store and stamps the schema version on first use.
pub async fn open_storage(path: &Path) -> Result<Storage, StorageError> {
    let store = JsonFileStore::open(path).await?;
    let storage = Storage::new(Arc::new(store));
    ensure_schema(&storage).await?;
    Ok(storage)
}

pub async fn ensure_schema(storage: &Storage) -> Result<u32, StorageError> {
    match storage.try_get::<u32>(keys::SCHEMA_VERSION).await {
        Some(version) => Ok(version),
        None => {
            storage
                .set(keys::SCHEMA_VERSION, &keys::CURRENT_SCHEMA_VERSION)
                .await?;
            info!(version = keys::CURRENT_SCHEMA_VERSION, "schema version written");
            Ok(keys::CURRENT_SCHEMA_VERSION)
        }
    }
}
