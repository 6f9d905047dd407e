use crate::error::StoreError;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashMap;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tokio::sync::Mutex;

/// Every saved array, keyed by username.
///
/// Entries are kept as raw JSON so a file holding a non-array value under
/// some key (older writers stored `null` for a missing array) still loads;
/// such entries read as empty and are written back untouched.
#[derive(Debug, Default, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Document {
    sessions: HashMap<String, Value>,
}

impl Document {
    pub fn new() -> Document {
        Document::default()
    }

    /// The array saved under `key`, or an empty one if nothing was saved.
    pub fn get(&self, key: &str) -> Vec<Value> {
        match self.sessions.get(key) {
            Some(Value::Array(array)) => array.clone(),
            _ => Vec::new(),
        }
    }

    /// Replaces whatever was saved under `key`.
    pub fn set(&mut self, key: String, value: Vec<Value>) {
        self.sessions.insert(key, Value::Array(value));
    }

    pub fn len(&self) -> usize {
        self.sessions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sessions.is_empty()
    }
}

/// File-backed session store.
///
/// The file is the source of truth: every operation reads it in full and
/// `save_array` writes it back in full. All access goes through `lock`, so a
/// save never interleaves with another save or a load.
pub struct Store {
    path: PathBuf,
    lock: Mutex<()>,
}

impl Store {
    /// Opens the store at `path`, creating the parent directory and an empty
    /// `{}` document if they do not exist yet.
    pub async fn open(path: impl Into<PathBuf>) -> Result<Store, StoreError> {
        let path = path.into();
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            tokio::fs::create_dir_all(parent)
                .await
                .map_err(|e| StoreError::io(parent, e))?;
        }
        match tokio::fs::metadata(&path).await {
            Ok(_) => {}
            Err(e) if e.kind() == ErrorKind::NotFound => {
                tracing::info!(path = %path.display(), "creating empty session document");
                save_document(&path, &Document::new()).await?;
            }
            Err(e) => return Err(StoreError::io(&path, e)),
        }
        Ok(Store {
            path,
            lock: Mutex::new(()),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Reads the whole document.
    pub async fn load_document(&self) -> Result<Document, StoreError> {
        let _guard = self.lock.lock().await;
        load_document(&self.path).await
    }

    pub async fn load_array(&self, username: &str) -> Result<Vec<Value>, StoreError> {
        Ok(self.load_document().await?.get(username))
    }

    /// Read-modify-write of the document under a single lock acquisition.
    pub async fn save_array(&self, username: String, array: Vec<Value>) -> Result<(), StoreError> {
        let _guard = self.lock.lock().await;
        let mut doc = load_document(&self.path).await?;
        doc.set(username, array);
        save_document(&self.path, &doc).await
    }
}

async fn load_document(path: &Path) -> Result<Document, StoreError> {
    let content = match tokio::fs::read_to_string(path).await {
        Ok(content) => content,
        Err(e) if e.kind() == ErrorKind::NotFound => return Ok(Document::new()),
        Err(e) => return Err(StoreError::io(path, e)),
    };
    if content.trim().is_empty() {
        return Ok(Document::new());
    }
    serde_json::from_str(&content).map_err(|source| StoreError::Corrupt {
        path: path.to_path_buf(),
        source,
    })
}

/// Replaces the file through a sibling temp file and a rename, so readers see
/// either the old document or the new one.
async fn save_document(path: &Path, doc: &Document) -> Result<(), StoreError> {
    let json = serde_json::to_vec(doc).map_err(StoreError::Serialize)?;
    let tmp = temp_path(path);
    tokio::fs::write(&tmp, json)
        .await
        .map_err(|e| StoreError::io(&tmp, e))?;
    tokio::fs::rename(&tmp, path)
        .await
        .map_err(|e| StoreError::io(path, e))
}

fn temp_path(path: &Path) -> PathBuf {
    let mut name = path.file_name().unwrap_or_default().to_os_string();
    name.push(".tmp");
    path.with_file_name(name)
}
