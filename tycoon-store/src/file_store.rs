use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use tokio::sync::Mutex;

/// JSON object on disk mirrored by an in-process map.
///
/// Every write rewrites the whole file through a sibling temp file and a
/// rename, so a crash leaves either the old or the new contents.
#[derive(Clone, Debug)]
pub struct FileStore {
    path: PathBuf,
    entries: Arc<Mutex<BTreeMap<String, String>>>,
}

impl FileStore {
    /// Load `path`, starting empty when the file does not exist yet.
    pub async fn open(path: impl Into<PathBuf>) -> anyhow::Result<Self> {
        let path = path.into();

        let entries = match tokio::fs::read_to_string(&path).await {
            Ok(raw) if raw.trim().is_empty() => BTreeMap::new(),
            Ok(raw) => serde_json::from_str(&raw).map_err(|e| {
                anyhow::anyhow!("failed to parse local store `{}`: {e}", path.display())
            })?,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => BTreeMap::new(),
            Err(e) => {
                return Err(anyhow::anyhow!(
                    "failed to read local store `{}`: {e}",
                    path.display()
                ));
            }
        };

        if let Some(parent) = path.parent().filter(|parent| !parent.as_os_str().is_empty()) {
            tokio::fs::create_dir_all(parent).await.map_err(|e| {
                anyhow::anyhow!("failed to create local store dir `{}`: {e}", parent.display())
            })?;
        }

        Ok(Self {
            path,
            entries: Arc::new(Mutex::new(entries)),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub async fn get(&self, key: &str) -> anyhow::Result<Option<String>> {
        Ok(self.entries.lock().await.get(key).cloned())
    }

    pub async fn set(&self, key: &str, value: String) -> anyhow::Result<()> {
        let mut entries = self.entries.lock().await;
        entries.insert(key.to_owned(), value);
        self.flush(&entries).await
    }

    pub async fn del(&self, key: &str) -> anyhow::Result<()> {
        let mut entries = self.entries.lock().await;
        if entries.remove(key).is_some() {
            self.flush(&entries).await?;
        }
        Ok(())
    }

    async fn flush(&self, entries: &BTreeMap<String, String>) -> anyhow::Result<()> {
        let payload = serde_json::to_vec_pretty(entries)
            .map_err(|e| anyhow::anyhow!("failed to serialize local store: {e}"))?;

        let mut tmp = self.path.clone().into_os_string();
        tmp.push(".tmp");
        let tmp = PathBuf::from(tmp);

        tokio::fs::write(&tmp, payload)
            .await
            .map_err(|e| anyhow::anyhow!("failed to write `{}`: {e}", tmp.display()))?;
        tokio::fs::rename(&tmp, &self.path).await.map_err(|e| {
            anyhow::anyhow!("failed to replace local store `{}`: {e}", self.path.display())
        })
    }
}

#[cfg(test)]
mod tests {
    use tempfile::tempdir;

    use super::FileStore;

    #[tokio::test]
    async fn values_survive_reopening() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("nested").join("progress.json");

        let store = FileStore::open(&path).await.unwrap();
        store.set("a", "1".to_owned()).await.unwrap();
        store.set("b", "2".to_owned()).await.unwrap();
        store.del("b").await.unwrap();
        drop(store);

        let reopened = FileStore::open(&path).await.unwrap();
        assert_eq!(reopened.get("a").await.unwrap().as_deref(), Some("1"));
        assert_eq!(reopened.get("b").await.unwrap(), None);
    }

    #[tokio::test]
    async fn unreadable_file_is_an_error() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("progress.json");
        tokio::fs::write(&path, "not json").await.unwrap();

        assert!(FileStore::open(&path).await.is_err());
    }
}
