use std::{
    io::ErrorKind,
    path::{Path, PathBuf},
};

use anyhow::{bail, Context, Result};
use async_trait::async_trait;
use fs4::tokio::AsyncFileExt;
use tokio::{
    fs::File,
    io::{AsyncReadExt, AsyncWriteExt},
};
use tracing::{debug, trace};

/// Interface for abstracting storage of values. Every key holds one whole value, reads and
/// writes of a key are atomic with respect to each other and the last write wins.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait KeyValueStore: Send + Sync {
    /// Returns `None` if the key was never written.
    async fn get(&self, key: &str) -> Result<Option<String>>;

    async fn set(&self, key: &str, value: &str) -> Result<()>;
}

/// The main realization of [KeyValueStore]. Every key is a file inside `store_dir`.
///
/// File locks are taken with blocking calls and a shared lock is held while the value is read.
/// On a single-threaded runtime calls on one store must not overlap.
pub struct FileKeyValueStore {
    store_dir: PathBuf,
}

impl FileKeyValueStore {
    pub fn new(store_dir: PathBuf) -> Result<Self, std::io::Error> {
        std::fs::create_dir_all(&store_dir)?;

        Ok(Self { store_dir })
    }

    fn key_path(&self, key: &str) -> Result<PathBuf> {
        let valid = !key.is_empty()
            && key
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-');
        if !valid {
            bail!("Illegal store key {key:?}");
        }
        Ok(self.store_dir.join(key))
    }
}

#[async_trait]
impl KeyValueStore for FileKeyValueStore {
    async fn get(&self, key: &str) -> Result<Option<String>> {
        let path = self.key_path(key)?;

        async fn read(path: &Path) -> std::result::Result<String, std::io::Error> {
            let mut file = File::open(path).await?;
            file.lock_shared()?;
            let mut value = String::new();
            let result = file.read_to_string(&mut value).await;
            file.unlock_async().await?;
            result.map(|_| value)
        }

        match read(&path).await {
            Ok(value) => {
                trace!("Read {} bytes from {path:?}", value.len());
                Ok(Some(value))
            }
            Err(e) if e.kind() == ErrorKind::NotFound => {
                debug!("Key {key} has no value yet");
                Ok(None)
            }
            Err(e) => Err(e).with_context(|| format!("Failed to read {path:?}")),
        }
    }

    async fn set(&self, key: &str, value: &str) -> Result<()> {
        let path = self.key_path(key)?;

        let mut file = File::options()
            .write(true)
            .create(true)
            .truncate(false)
            .open(&path)
            .await
            .with_context(|| format!("Failed to open {path:?}"))?;

        // Truncation has to wait for the lock, otherwise a reader could see an empty value.
        file.lock_exclusive()?;
        let result = async {
            file.set_len(0).await?;
            file.write_all(value.as_bytes()).await?;
            file.flush().await?;
            file.sync_data().await
        }
        .await;
        file.unlock_async().await?;

        result.with_context(|| format!("Failed to write {path:?}"))?;
        trace!("Wrote {} bytes into {path:?}", value.len());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use anyhow::Result;
    use tempfile::tempdir;

    use super::{FileKeyValueStore, KeyValueStore};

    #[tokio::test]
    async fn test_missing_key_is_none() -> Result<()> {
        let dir = tempdir()?;
        let store = FileKeyValueStore::new(dir.path().to_owned())?;

        assert_eq!(store.get("tasks").await?, None);
        Ok(())
    }

    #[tokio::test]
    async fn test_set_then_get() -> Result<()> {
        let dir = tempdir()?;
        let store = FileKeyValueStore::new(dir.path().to_owned())?;

        store.set("last_date", "2025-01-01").await?;
        assert_eq!(store.get("last_date").await?.as_deref(), Some("2025-01-01"));
        Ok(())
    }

    #[tokio::test]
    async fn test_shorter_value_overwrites_longer() -> Result<()> {
        let dir = tempdir()?;
        let store = FileKeyValueStore::new(dir.path().to_owned())?;

        store.set("tasks", r#"[{"a":1},{"b":2}]"#).await?;
        store.set("tasks", "[]").await?;
        assert_eq!(store.get("tasks").await?.as_deref(), Some("[]"));
        Ok(())
    }

    #[tokio::test]
    async fn test_values_survive_reopening() -> Result<()> {
        let dir = tempdir()?;
        {
            let store = FileKeyValueStore::new(dir.path().to_owned())?;
            store.set("history", "{}").await?;
        }
        let store = FileKeyValueStore::new(dir.path().to_owned())?;
        assert_eq!(store.get("history").await?.as_deref(), Some("{}"));
        Ok(())
    }

    #[tokio::test]
    async fn test_illegal_keys_are_rejected() -> Result<()> {
        let dir = tempdir()?;
        let store = FileKeyValueStore::new(dir.path().to_owned())?;

        assert!(store.set("../escape", "x").await.is_err());
        assert!(store.get("").await.is_err());
        assert!(store.get("a/b").await.is_err());
        Ok(())
    }
}
