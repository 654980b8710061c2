use std::io::ErrorKind;
use std::path::PathBuf;

use async_trait::async_trait;
use fs4::tokio::AsyncFileExt;
use thiserror::Error;
use tokio::fs::File;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tracing::debug;

/// Failures the store can surface on the write path. Reads never produce
/// these at the typed-accessor level; they degrade to defaults instead.
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("local store is not writable")]
    Unavailable(#[source] std::io::Error),
    #[error("failed to write key {key}")]
    WriteFailed {
        key: String,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to read key {key}")]
    ReadFailed {
        key: String,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to serialize value for key {key}")]
    Serialize {
        key: String,
        #[source]
        source: serde_json::Error,
    },
}

/// Interface for abstracting a flat key/value text store. Only the typed
/// data-access layer is supposed to touch raw keys.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait KeyValueStore: Send + Sync {
    /// Confirms the store is currently writable with a trial write. The
    /// result must not be cached between calls since availability can change
    /// underneath a running process.
    async fn probe(&self) -> Result<(), StorageError>;

    async fn get(&self, key: &str) -> Result<Option<String>, StorageError>;

    async fn set(&self, key: &str, value: &str) -> Result<(), StorageError>;

    async fn remove(&self, key: &str) -> Result<(), StorageError>;
}

const PROBE_KEY: &str = "__probe__";

/// The main realization of [KeyValueStore]: one file per key inside a
/// dedicated directory.
pub struct FileKeyValueStore {
    store_dir: PathBuf,
}

impl FileKeyValueStore {
    pub fn new(store_dir: PathBuf) -> Result<Self, std::io::Error> {
        std::fs::create_dir_all(&store_dir)?;

        Ok(Self { store_dir })
    }

    fn key_path(&self, key: &str) -> PathBuf {
        self.store_dir.join(key)
    }
}

#[async_trait]
impl KeyValueStore for FileKeyValueStore {
    async fn probe(&self) -> Result<(), StorageError> {
        let path = self.key_path(PROBE_KEY);
        tokio::fs::write(&path, b"probe")
            .await
            .map_err(StorageError::Unavailable)?;
        tokio::fs::remove_file(&path)
            .await
            .map_err(StorageError::Unavailable)?;
        Ok(())
    }

    async fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        let path = self.key_path(key);
        debug!("Reading {path:?}");

        let read = async {
            let file = File::open(&path).await?;
            file.lock_shared()?;
            let mut reader = file;
            let mut contents = String::new();
            reader.read_to_string(&mut contents).await?;
            reader.unlock_async().await?;
            Ok::<_, std::io::Error>(contents)
        };

        match read.await {
            Ok(contents) => Ok(Some(contents)),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(StorageError::ReadFailed {
                key: key.to_string(),
                source: e,
            }),
        }
    }

    async fn set(&self, key: &str, value: &str) -> Result<(), StorageError> {
        // Availability can flip between calls, so every write re-probes.
        self.probe().await?;

        let path = self.key_path(key);
        let write = async {
            let file = File::options()
                .write(true)
                .create(true)
                .truncate(true)
                .open(&path)
                .await?;
            // Semi-safe acquire-release for the file
            file.lock_exclusive()?;
            let mut file = file;
            let result = async {
                file.write_all(value.as_bytes()).await?;
                file.flush().await
            }
            .await;
            file.unlock_async().await?;
            result
        };

        write.await.map_err(|e| StorageError::WriteFailed {
            key: key.to_string(),
            source: e,
        })
    }

    async fn remove(&self, key: &str) -> Result<(), StorageError> {
        match tokio::fs::remove_file(self.key_path(key)).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(e) => Err(StorageError::WriteFailed {
                key: key.to_string(),
                source: e,
            }),
        }
    }
}

#[cfg(test)]
pub(crate) mod memory {
    //! In-memory store used as a test double across the storage tests.

    use std::collections::HashMap;
    use std::sync::Mutex;

    use super::*;

    #[derive(Default)]
    pub struct MemoryKeyValueStore {
        values: Mutex<HashMap<String, String>>,
    }

    impl MemoryKeyValueStore {
        pub fn with(values: &[(&str, &str)]) -> Self {
            let store = Self::default();
            {
                let mut guard = store.values.lock().unwrap();
                for (key, value) in values {
                    guard.insert(key.to_string(), value.to_string());
                }
            }
            store
        }

        pub fn raw(&self, key: &str) -> Option<String> {
            self.values.lock().unwrap().get(key).cloned()
        }
    }

    #[async_trait]
    impl KeyValueStore for MemoryKeyValueStore {
        async fn probe(&self) -> Result<(), StorageError> {
            Ok(())
        }

        async fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
            Ok(self.values.lock().unwrap().get(key).cloned())
        }

        async fn set(&self, key: &str, value: &str) -> Result<(), StorageError> {
            self.values
                .lock()
                .unwrap()
                .insert(key.to_string(), value.to_string());
            Ok(())
        }

        async fn remove(&self, key: &str) -> Result<(), StorageError> {
            self.values.lock().unwrap().remove(key);
            Ok(())
        }
    }
}
