use std::collections::BTreeMap;
use std::path::PathBuf;

use serde::de::DeserializeOwned;
use serde::Serialize;

/// Local key-value store backed by a single JSON object file.
///
/// Persistence is best-effort: every I/O or parse failure is logged and
/// swallowed, so a missing or unwritable file degrades the store to plain
/// in-memory state and the application keeps running.
#[derive(Debug, Clone)]
pub struct Storage {
    path: Option<PathBuf>,
    values: BTreeMap<String, String>,
}

impl Storage {
    /// Open the store at `path`, loading whatever is already there. An
    /// unreadable or unparsable file starts the store empty.
    pub fn open(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let values = match std::fs::read_to_string(&path) {
            Ok(content) if !content.trim().is_empty() => {
                match serde_json::from_str(&content) {
                    Ok(values) => values,
                    Err(err) => {
                        tracing::warn!("ignoring unparsable storage file {}: {err}", path.display());
                        BTreeMap::new()
                    }
                }
            }
            Ok(_) => BTreeMap::new(),
            Err(err) => {
                tracing::debug!("no storage file at {}: {err}", path.display());
                BTreeMap::new()
            }
        };
        Self {
            path: Some(path),
            values,
        }
    }

    /// A store that never touches disk. Used by tests and as the fallback
    /// when no storage location is available.
    pub fn in_memory() -> Self {
        Self {
            path: None,
            values: BTreeMap::new(),
        }
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.values.get(key).map(String::as_str)
    }

    pub fn set(&mut self, key: &str, value: impl Into<String>) {
        self.values.insert(key.to_owned(), value.into());
        self.flush();
    }

    pub fn remove(&mut self, key: &str) {
        if self.values.remove(key).is_some() {
            self.flush();
        }
    }

    /// Deserialize the JSON value stored under `key`. A malformed record is
    /// treated the same as a missing one.
    pub fn get_json<T: DeserializeOwned>(&self, key: &str) -> Option<T> {
        let raw = self.get(key)?;
        match serde_json::from_str(raw) {
            Ok(value) => Some(value),
            Err(err) => {
                tracing::warn!("ignoring unparsable record under {key}: {err}");
                None
            }
        }
    }

    pub fn set_json<T: Serialize>(&mut self, key: &str, value: &T) {
        match serde_json::to_string(value) {
            Ok(raw) => self.set(key, raw),
            Err(err) => tracing::warn!("failed to serialize record under {key}: {err}"),
        }
    }

    fn flush(&self) {
        let Some(path) = &self.path else {
            return;
        };
        if let Err(err) = self.try_flush(path) {
            tracing::warn!("failed to persist storage to {}: {err}", path.display());
        }
    }

    fn try_flush(&self, path: &PathBuf) -> anyhow::Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let json = serde_json::to_string_pretty(&self.values)?;
        std::fs::write(path, json)?;
        Ok(())
    }
}
