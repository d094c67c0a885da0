use ratescan_core::{Error, Result};
use std::fs;
use std::path::PathBuf;
use std::time::{Duration, SystemTime, UNIX_EPOCH};

pub mod ollama;
pub mod pdf;
pub mod pipeline;
pub mod prompt;
pub mod reply;

/// Seconds since the Unix epoch; used to timestamp store records.
pub fn now_epoch_s() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or(Duration::from_secs(0))
        .as_secs()
}

/// Filesystem-backed keyed JSON collections: one record per file under
/// `{root}/{collection}/{id}.json`.
///
/// This is a provenance sink, not a database: records are written (insert)
/// or merged (upsert) and never read back by the pipeline itself.
#[derive(Debug, Clone)]
pub struct FsStore {
    root: PathBuf,
}

impl FsStore {
    pub fn new(root: PathBuf) -> Self {
        Self { root }
    }

    fn record_path(&self, collection: &str, id: &str) -> PathBuf {
        // Record ids are generated internally (sha256/uuid based); keep the
        // path derivation trivially predictable.
        self.root.join(collection).join(format!("{id}.json"))
    }

    /// Write a fresh record, replacing any existing one wholesale.
    pub fn insert(&self, collection: &str, id: &str, record: &serde_json::Value) -> Result<()> {
        let path = self.record_path(collection, id);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).map_err(|e| Error::Store(e.to_string()))?;
        }
        let bytes = serde_json::to_vec_pretty(record).map_err(|e| Error::Store(e.to_string()))?;
        fs::write(&path, bytes).map_err(|e| Error::Store(e.to_string()))?;
        log::debug!("stored {collection}/{id}");
        Ok(())
    }

    /// Merge top-level fields into an existing record, creating it if absent.
    pub fn upsert(&self, collection: &str, id: &str, fields: &serde_json::Value) -> Result<()> {
        let path = self.record_path(collection, id);
        let mut record = if path.exists() {
            let bytes = fs::read(&path).map_err(|e| Error::Store(e.to_string()))?;
            serde_json::from_slice(&bytes).map_err(|e| Error::Store(e.to_string()))?
        } else {
            serde_json::json!({})
        };
        if let (Some(obj), Some(new)) = (record.as_object_mut(), fields.as_object()) {
            for (k, v) in new {
                obj.insert(k.clone(), v.clone());
            }
        } else {
            return Err(Error::Store(format!(
                "upsert into {collection}/{id} requires object records"
            )));
        }
        self.insert(collection, id, &record)
    }

    /// Read a record back (diagnostics and tests; the pipeline never reads).
    pub fn get(&self, collection: &str, id: &str) -> Result<Option<serde_json::Value>> {
        let path = self.record_path(collection, id);
        if !path.exists() {
            return Ok(None);
        }
        let bytes = fs::read(&path).map_err(|e| Error::Store(e.to_string()))?;
        let v = serde_json::from_slice(&bytes).map_err(|e| Error::Store(e.to_string()))?;
        Ok(Some(v))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn insert_then_get_round_trips() {
        let tmp = tempfile::tempdir().unwrap();
        let store = FsStore::new(tmp.path().to_path_buf());
        let rec = serde_json::json!({ "doc_id": "sha256:abc", "path": "a.pdf" });
        store.insert("documents", "sha256:abc", &rec).unwrap();
        let got = store.get("documents", "sha256:abc").unwrap().unwrap();
        assert_eq!(got, rec);
    }

    #[test]
    fn upsert_merges_top_level_fields() {
        let tmp = tempfile::tempdir().unwrap();
        let store = FsStore::new(tmp.path().to_path_buf());
        store
            .insert(
                "excerpts",
                "rate_1",
                &serde_json::json!({ "status": "selected", "page_start": 4 }),
            )
            .unwrap();
        store
            .upsert(
                "excerpts",
                "rate_1",
                &serde_json::json!({ "status": "extracted", "current_extraction_id": "ext_1" }),
            )
            .unwrap();
        let got = store.get("excerpts", "rate_1").unwrap().unwrap();
        assert_eq!(got["status"], "extracted");
        assert_eq!(got["page_start"], 4);
        assert_eq!(got["current_extraction_id"], "ext_1");
    }

    #[test]
    fn upsert_creates_missing_record() {
        let tmp = tempfile::tempdir().unwrap();
        let store = FsStore::new(tmp.path().to_path_buf());
        store
            .upsert("documents", "d1", &serde_json::json!({ "path": "x.pdf" }))
            .unwrap();
        let got = store.get("documents", "d1").unwrap().unwrap();
        assert_eq!(got["path"], "x.pdf");
    }

    #[test]
    fn get_missing_record_is_none() {
        let tmp = tempfile::tempdir().unwrap();
        let store = FsStore::new(tmp.path().to_path_buf());
        assert!(store.get("documents", "nope").unwrap().is_none());
    }
}
