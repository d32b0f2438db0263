use std::{io::ErrorKind, path::PathBuf, sync::Arc};
use tokio::{fs, io::AsyncWriteExt, sync::Mutex};
use tracing::{debug, info};

use crate::document::Document;
use crate::errors::ServiceError;

/// Single JSON file holding the whole `Document`.
///
/// Nothing is cached: every call reads the file again. Mutations go through
/// [`DocumentStore::update`], which holds one process-wide lock across
/// load, mutate and save so concurrent requests cannot overwrite each
/// other's changes. Separate processes sharing the file are not coordinated.
pub struct DocumentStore {
    file_path: PathBuf,
    lock: Mutex<()>,
}

impl DocumentStore {
    /// Prepare a store for the given path. The parent directory is created;
    /// the file itself is created lazily by the first `load`.
    pub async fn new<P: Into<PathBuf>>(path: P) -> Result<Arc<Self>, ServiceError> {
        let file_path = path.into();
        if let Some(parent) = file_path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent).await?;
            }
        }
        Ok(Arc::new(Self { file_path, lock: Mutex::new(()) }))
    }

    pub fn path(&self) -> &std::path::Path {
        &self.file_path
    }

    /// Read the current document. A missing file yields an empty document,
    /// which is written out so later loads see the same state.
    pub async fn load(&self) -> Result<Document, ServiceError> {
        let _guard = self.lock.lock().await;
        self.read_document().await
    }

    /// Replace the persisted document.
    pub async fn save(&self, doc: &Document) -> Result<(), ServiceError> {
        let _guard = self.lock.lock().await;
        self.write_document(doc).await
    }

    /// Load and hand the document to a read-only closure.
    pub async fn read<F, T>(&self, f: F) -> Result<T, ServiceError>
    where
        F: FnOnce(&Document) -> Result<T, ServiceError>,
    {
        let doc = self.load().await?;
        f(&doc)
    }

    /// Load, apply a mutation and persist, all under the store lock.
    /// When the closure fails nothing is written.
    pub async fn update<F, T>(&self, f: F) -> Result<T, ServiceError>
    where
        F: FnOnce(&mut Document) -> Result<T, ServiceError>,
    {
        let _guard = self.lock.lock().await;
        let mut doc = self.read_document().await?;
        let out = f(&mut doc)?;
        self.write_document(&doc).await?;
        Ok(out)
    }

    async fn read_document(&self) -> Result<Document, ServiceError> {
        match fs::read(&self.file_path).await {
            Ok(bytes) => serde_json::from_slice(&bytes).map_err(|e| {
                ServiceError::CorruptData(format!("{}: {}", self.file_path.display(), e))
            }),
            Err(e) if e.kind() == ErrorKind::NotFound => {
                let empty = Document::default();
                self.write_document(&empty).await?;
                info!(path = %self.file_path.display(), "initialized empty data file");
                Ok(empty)
            }
            Err(e) => Err(ServiceError::Persistence(format!("read {}: {}", self.file_path.display(), e))),
        }
    }

    /// Write to a sibling temp file, flush it, then rename over the target.
    async fn write_document(&self, doc: &Document) -> Result<(), ServiceError> {
        let data = serde_json::to_vec_pretty(doc).map_err(|e| ServiceError::Persistence(e.to_string()))?;
        let tmp_path = self.tmp_path();
        let write = async {
            let mut file = fs::File::create(&tmp_path).await?;
            file.write_all(&data).await?;
            file.sync_all().await?;
            drop(file);
            fs::rename(&tmp_path, &self.file_path).await?;
            Ok::<(), std::io::Error>(())
        };
        if let Err(e) = write.await {
            let _ = fs::remove_file(&tmp_path).await;
            return Err(ServiceError::Persistence(format!("write {}: {}", self.file_path.display(), e)));
        }
        debug!(
            path = %self.file_path.display(),
            persons = doc.persons.len(),
            reviews = doc.reviews.len(),
            bytes = data.len(),
            "document saved"
        );
        Ok(())
    }

    fn tmp_path(&self) -> PathBuf {
        let mut name = self.file_path.file_name().map(|n| n.to_os_string()).unwrap_or_default();
        name.push(".tmp");
        self.file_path.with_file_name(name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::{GalleryItem, Person, Review, ReviewId};

    fn tmp_file(tag: &str) -> PathBuf {
        std::env::temp_dir()
            .join(format!("greetbook_store_{}", uuid::Uuid::new_v4()))
            .join(format!("{tag}.json"))
    }

    fn sample_person(id: &str) -> Person {
        Person {
            id: id.into(),
            name: "Ann".into(),
            greeting: "hi".into(),
            theme: "dark".into(),
            custom_message: String::new(),
            review: String::new(),
            gallery: vec![GalleryItem { image_url: "https://img/1.png".into(), text: "beach".into() }],
            videos: vec![],
            voice: Some("https://audio/1.mp3".into()),
        }
    }

    #[tokio::test]
    async fn missing_file_loads_empty_and_is_persisted() -> Result<(), anyhow::Error> {
        let path = tmp_file("missing");
        let store = DocumentStore::new(&path).await?;

        let doc = store.load().await?;
        assert_eq!(doc, Document::default());
        let raw = tokio::fs::read_to_string(&path).await?;
        let on_disk: serde_json::Value = serde_json::from_str(&raw)?;
        assert_eq!(on_disk, serde_json::json!({ "persons": [], "reviews": [] }));

        let _ = tokio::fs::remove_dir_all(path.parent().unwrap()).await;
        Ok(())
    }

    #[tokio::test]
    async fn save_then_fresh_load_round_trips() -> Result<(), anyhow::Error> {
        let path = tmp_file("roundtrip");
        let store = DocumentStore::new(&path).await?;
        let doc = Document {
            persons: vec![sample_person("p1")],
            reviews: vec![
                Review {
                    id: Some(ReviewId::Number(1_700_000_000_000)),
                    username: Some("bob".into()),
                    message: "great show".into(),
                    timestamp: Some(chrono::Utc::now()),
                },
                Review { id: None, username: Some("cid".into()), message: "ok".into(), timestamp: None },
            ],
        };
        store.save(&doc).await?;

        // a new store instance stands in for a process restart
        let reopened = DocumentStore::new(&path).await?;
        assert_eq!(reopened.load().await?, doc);
        assert!(tokio::fs::metadata(store.tmp_path()).await.is_err());

        let _ = tokio::fs::remove_dir_all(path.parent().unwrap()).await;
        Ok(())
    }

    #[tokio::test]
    async fn corrupt_file_is_reported() -> Result<(), anyhow::Error> {
        let path = tmp_file("corrupt");
        let store = DocumentStore::new(&path).await?;
        tokio::fs::write(&path, b"{ not json").await?;

        assert!(matches!(store.load().await, Err(ServiceError::CorruptData(_))));
        assert!(matches!(store.update(|_| Ok(())).await, Err(ServiceError::CorruptData(_))));
        // the broken file is left untouched for inspection
        assert_eq!(tokio::fs::read(&path).await?, b"{ not json");

        let _ = tokio::fs::remove_dir_all(path.parent().unwrap()).await;
        Ok(())
    }

    #[tokio::test]
    async fn file_with_null_fields_loads() -> Result<(), anyhow::Error> {
        let path = tmp_file("nulls");
        let store = DocumentStore::new(&path).await?;
        tokio::fs::write(
            &path,
            br#"{"persons":[{"id":"p1","name":"Ann","gallery":[{"imageUrl":"u","text":null}],"voice":null}],"reviews":[]}"#,
        )
        .await?;

        let doc = store.load().await?;
        assert_eq!(doc.persons[0].gallery[0].text, "");
        // written back as an empty string
        store.update(|_| Ok(())).await?;
        let raw: serde_json::Value = serde_json::from_slice(&tokio::fs::read(&path).await?)?;
        assert_eq!(raw["persons"][0]["gallery"][0]["text"], "");

        let _ = tokio::fs::remove_dir_all(path.parent().unwrap()).await;
        Ok(())
    }

    #[tokio::test]
    async fn failed_update_does_not_write() -> Result<(), anyhow::Error> {
        let path = tmp_file("failed");
        let store = DocumentStore::new(&path).await?;
        store.update(|doc| { doc.persons.push(sample_person("p1")); Ok(()) }).await?;

        let res: Result<(), _> = store
            .update(|doc| {
                doc.persons.clear();
                Err(ServiceError::not_found("person"))
            })
            .await;
        assert!(matches!(res, Err(ServiceError::NotFound(_))));
        assert_eq!(store.load().await?.persons.len(), 1);

        let _ = tokio::fs::remove_dir_all(path.parent().unwrap()).await;
        Ok(())
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn concurrent_updates_do_not_lose_writes() -> Result<(), anyhow::Error> {
        let path = tmp_file("concurrent");
        let store = DocumentStore::new(&path).await?;

        let mut handles = Vec::new();
        for i in 0..16 {
            let store = Arc::clone(&store);
            handles.push(tokio::spawn(async move {
                store
                    .update(move |doc| {
                        doc.persons.push(sample_person(&format!("p{i}")));
                        Ok(())
                    })
                    .await
            }));
        }
        for h in handles {
            h.await??;
        }
        assert_eq!(store.load().await?.persons.len(), 16);

        let _ = tokio::fs::remove_dir_all(path.parent().unwrap()).await;
        Ok(())
    }

    #[tokio::test]
    async fn read_passes_current_document() -> Result<(), anyhow::Error> {
        let path = tmp_file("read");
        let store = DocumentStore::new(&path).await?;
        store.update(|doc| { doc.persons.push(sample_person("p1")); Ok(()) }).await?;
        let count = store.read(|doc| Ok(doc.persons.len())).await?;
        assert_eq!(count, 1);

        let _ = tokio::fs::remove_dir_all(path.parent().unwrap()).await;
        Ok(())
    }
}
