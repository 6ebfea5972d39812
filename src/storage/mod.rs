pub mod file;
pub mod memory;
pub mod traits;

use crate::{
    config::GalleryConfig,
    error::{Result, StudioError},
    models::GalleryRecord,
};
use std::path::{Path, PathBuf};
use std::sync::Arc;

pub use file::FileStore;
pub use memory::MemoryStore;
pub use traits::KeyValueStore;

/// The ordered (newest-first) collection of generated images, persisted under one key.
pub struct GalleryStore {
    backend: Arc<dyn KeyValueStore>,
    key: String,
    records: Vec<GalleryRecord>,
}

impl GalleryStore {
    /// Opens the store and loads whatever is persisted under `key`.
    pub async fn open(backend: Arc<dyn KeyValueStore>, key: impl Into<String>) -> Self {
        let mut store = Self {
            backend,
            key: key.into(),
            records: Vec::new(),
        };
        store.records = store.load().await;
        store
    }

    pub async fn from_config(config: &GalleryConfig) -> Self {
        Self::open(Arc::new(FileStore::new(&config.dir)), config.key.clone()).await
    }

    /// Reads the persisted collection. Unreadable or unparseable data is cleared and yields an empty gallery.
    pub async fn load(&self) -> Vec<GalleryRecord> {
        let raw = match self.backend.get(&self.key).await {
            Ok(Some(raw)) => raw,
            Ok(None) => return Vec::new(),
            Err(e @ StudioError::CorruptData(_)) => {
                self.reset_corrupt(e.to_string()).await;
                return Vec::new();
            }
            Err(e) => {
                log::error!("Failed to read gallery '{}': {}", self.key, e);
                return Vec::new();
            }
        };

        match serde_json::from_str::<Vec<GalleryRecord>>(&raw) {
            Ok(records) => {
                log::debug!("Loaded {} gallery records", records.len());
                records
            }
            Err(e) => {
                self.reset_corrupt(e.to_string()).await;
                Vec::new()
            }
        }
    }

    async fn reset_corrupt(&self, cause: String) {
        log::warn!("Failed to parse gallery '{}', resetting it: {}", self.key, cause);
        if let Err(e) = self.backend.remove(&self.key).await {
            log::error!("Failed to clear corrupt gallery '{}': {}", self.key, e);
        }
    }

    /// Replaces the collection with `records`, then persists it.
    /// The in-memory collection is updated even when persisting fails.
    pub async fn save(&mut self, records: Vec<GalleryRecord>) -> Result<()> {
        self.records = records;
        let json = serde_json::to_string(&self.records)?;
        self.backend.set(&self.key, &json).await
    }

    pub fn records(&self) -> &[GalleryRecord] {
        &self.records
    }

    pub fn get(&self, id: &str) -> Option<&GalleryRecord> {
        self.records.iter().find(|record| record.id == id)
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Inserts at the front and persists.
    pub async fn prepend(&mut self, record: GalleryRecord) -> Result<()> {
        let mut records = Vec::with_capacity(self.records.len() + 1);
        records.push(record);
        records.extend(self.records.iter().cloned());
        self.save(records).await
    }

    /// Removes the record with `id`; returns whether one was removed.
    pub async fn delete(&mut self, id: &str) -> Result<bool> {
        if self.get(id).is_none() {
            return Ok(false);
        }
        let records = self
            .records
            .iter()
            .filter(|record| record.id != id)
            .cloned()
            .collect();
        self.save(records).await?;
        Ok(true)
    }

    /// Whole-gallery reset.
    pub async fn clear(&mut self) -> Result<()> {
        self.save(Vec::new()).await
    }

    /// Writes the decoded image into `dir` under its download name.
    pub async fn export(&self, id: &str, dir: &Path) -> Result<PathBuf> {
        let record = self
            .get(id)
            .ok_or_else(|| StudioError::NotFound(id.to_string()))?;
        let bytes = record.image.decode()?;

        tokio::fs::create_dir_all(dir).await?;
        let path = dir.join(record.download_name());
        tokio::fs::write(&path, bytes).await?;
        log::info!("💾 Exported {} to {}", id, path.display());
        Ok(path)
    }
}


#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{ImageData, ImageSize, ModelId};

    const KEY: &str = "pika-gallery";

    fn record(prompt: &str) -> GalleryRecord {
        GalleryRecord::new(
            ImageData::from_bytes("image/png", prompt.as_bytes()),
            prompt,
            ModelId::GeminiFlashImage,
            ImageSize::Square512,
        )
    }

    fn memory() -> Arc<MemoryStore> {
        Arc::new(MemoryStore::new())
    }

    #[tokio::test]
    async fn test_round_trip_preserves_content_and_order() {
        let backend = memory();
        let mut store = GalleryStore::open(backend.clone(), KEY).await;
        let records = vec![record("one"), record("two"), record("three")];
        store.save(records.clone()).await.unwrap();

        let reopened = GalleryStore::open(backend, KEY).await;
        assert_eq!(reopened.records(), records.as_slice());
        assert_eq!(reopened.load().await, records);
    }

    #[tokio::test]
    async fn test_round_trip_empty() {
        let backend = memory();
        let mut store = GalleryStore::open(backend.clone(), KEY).await;
        store.save(Vec::new()).await.unwrap();
        assert_eq!(backend.get(KEY).await.unwrap().as_deref(), Some("[]"));
        assert!(GalleryStore::open(backend, KEY).await.is_empty());
    }

    #[tokio::test]
    async fn test_corrupt_data_is_cleared() {
        let backend = memory();
        backend.set(KEY, "{not valid json").await.unwrap();

        let store = GalleryStore::open(backend.clone(), KEY).await;
        assert!(store.is_empty());
        assert_eq!(backend.get(KEY).await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_wrong_shape_is_cleared() {
        let backend = memory();
        backend.set(KEY, r#"{"id":"not-a-list"}"#).await.unwrap();
        assert!(GalleryStore::open(backend.clone(), KEY).await.is_empty());
        assert_eq!(backend.get(KEY).await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_prepend_keeps_newest_first() {
        let mut store = GalleryStore::open(memory(), KEY).await;
        for n in 0..5 {
            let newest = record(&format!("prompt {}", n));
            let before: Vec<_> = store.records().to_vec();
            store.prepend(newest.clone()).await.unwrap();

            assert_eq!(store.records()[0], newest);
            assert_eq!(&store.records()[1..], before.as_slice());
        }
        assert_eq!(store.len(), 5);
    }

    #[tokio::test]
    async fn test_delete_is_idempotent() {
        let backend = memory();
        let mut store = GalleryStore::open(backend.clone(), KEY).await;
        let keep = record("keep");
        let drop = record("drop");
        store.save(vec![drop.clone(), keep.clone()]).await.unwrap();

        assert!(store.delete(&drop.id).await.unwrap());
        let after_first = backend.get(KEY).await.unwrap();
        assert!(!store.delete(&drop.id).await.unwrap());
        assert_eq!(backend.get(KEY).await.unwrap(), after_first);
        assert_eq!(store.records(), &[keep]);
    }

    #[tokio::test]
    async fn test_clear_resets_gallery() {
        let backend = memory();
        let mut store = GalleryStore::open(backend.clone(), KEY).await;
        store.prepend(record("a")).await.unwrap();
        store.clear().await.unwrap();
        assert!(store.is_empty());
        assert!(GalleryStore::open(backend, KEY).await.is_empty());
    }

    #[tokio::test]
    async fn test_export_writes_decoded_image() {
        let temp = tempfile::tempdir().unwrap();
        let mut store = GalleryStore::open(memory(), KEY).await;
        let saved = record("pixels");
        store.prepend(saved.clone()).await.unwrap();

        let path = store.export(&saved.id, temp.path()).await.unwrap();
        assert_eq!(path.file_name().unwrap().to_str().unwrap(), saved.download_name());
        assert_eq!(std::fs::read(path).unwrap(), b"pixels");

        let err = store.export("missing", temp.path()).await.unwrap_err();
        assert!(matches!(err, StudioError::NotFound(_)));
    }

    #[tokio::test]
    async fn test_file_backed_gallery() {
        let temp = tempfile::tempdir().unwrap();
        let config = GalleryConfig::new().with_dir(temp.path());
        let mut store = GalleryStore::from_config(&config).await;
        store.prepend(record("persisted")).await.unwrap();

        let reopened = GalleryStore::from_config(&config).await;
        assert_eq!(reopened.records()[0].prompt, "persisted");
    }

    #[tokio::test]
    async fn test_non_utf8_gallery_file_is_cleared() {
        let temp = tempfile::tempdir().unwrap();
        let path = temp.path().join(format!("{}.json", KEY));
        std::fs::write(&path, [0xc3, 0x28, 0x5b, 0x5d]).unwrap();

        let config = GalleryConfig::new().with_dir(temp.path());
        assert!(GalleryStore::from_config(&config).await.is_empty());
        assert!(!path.exists());
    }

    #[tokio::test]
    async fn test_failed_persist_keeps_record_in_memory() {
        let mut store = GalleryStore::open(Arc::new(failing::FailingStore), KEY).await;
        let saved = record("unsaved");

        let err = store.prepend(saved.clone()).await.unwrap_err();
        assert!(matches!(err, StudioError::StorageError(_)));
        assert_eq!(store.records(), &[saved]);
    }
}
