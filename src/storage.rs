use crate::errors::AppError;
use serde::{Deserialize, Serialize};
use std::{collections::BTreeMap, env, path::Path, path::PathBuf};
use tokio::fs;
use tracing::error;

pub const KEY_THEME: &str = "theme";
pub const KEY_PLAN: &str = "plan";
pub const KEY_PROGRESS: &str = "progress";
pub const KEY_HISTORY: &str = "history";
pub const KEY_RAMADAN_DAY: &str = "ramadanDay";

/// Flat string key-value store, written to disk as a single JSON object.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct KvStore {
    entries: BTreeMap<String, String>,
}

impl KvStore {
    pub fn get(&self, key: &str) -> Option<&str> {
        self.entries.get(key).map(String::as_str)
    }

    pub fn set(&mut self, key: &str, value: impl Into<String>) {
        self.entries.insert(key.to_string(), value.into());
    }

    pub fn remove(&mut self, key: &str) {
        self.entries.remove(key);
    }

    pub fn contains(&self, key: &str) -> bool {
        self.entries.contains_key(key)
    }

    /// Decodes a JSON-encoded value; absent or malformed keys yield `None`.
    pub fn get_json<T: for<'de> Deserialize<'de>>(&self, key: &str) -> Option<T> {
        let raw = self.get(key)?;
        match serde_json::from_str(raw) {
            Ok(value) => Some(value),
            Err(err) => {
                error!("ignoring malformed value for {key}: {err}");
                None
            }
        }
    }

    pub fn set_json<T: Serialize>(&mut self, key: &str, value: &T) -> Result<(), AppError> {
        let encoded = serde_json::to_string(value).map_err(AppError::internal)?;
        self.set(key, encoded);
        Ok(())
    }
}

pub fn resolve_data_path() -> Result<PathBuf, std::io::Error> {
    if let Ok(path) = env::var("APP_DATA_PATH") {
        return Ok(PathBuf::from(path));
    }

    Ok(PathBuf::from("data/state.json"))
}

pub async fn load_store(path: &Path) -> KvStore {
    match fs::read(path).await {
        Ok(bytes) => match serde_json::from_slice(&bytes) {
            Ok(store) => store,
            Err(err) => {
                error!("failed to parse data file: {err}");
                KvStore::default()
            }
        },
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => KvStore::default(),
        Err(err) => {
            error!("failed to read data file: {err}");
            KvStore::default()
        }
    }
}

pub async fn persist_store(path: &Path, store: &KvStore) -> Result<(), AppError> {
    let payload = serde_json::to_vec_pretty(store).map_err(AppError::internal)?;
    fs::write(path, payload).await.map_err(AppError::internal)?;
    Ok(())
}
