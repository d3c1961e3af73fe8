use crate::errors::{ProvisioningError, Result};
use async_trait::async_trait;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use tokio::sync::RwLock;
use tracing::info;

/// Durable key-value store for derived gateway configuration.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait SettingsStore: Send + Sync {
    async fn get(&self, key: &str) -> Option<String>;
    async fn set(&self, key: &str, value: &str);
    /// Flush pending writes to durable storage.
    async fn save(&self) -> Result<()>;
}

/// JSON-file-backed settings store. Writes are staged in memory and
/// flushed as a whole on `save`.
pub struct FileSettingsStore {
    path: PathBuf,
    entries: RwLock<BTreeMap<String, String>>,
}

impl FileSettingsStore {
    pub async fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref().to_path_buf();

        let entries = match tokio::fs::read_to_string(&path).await {
            Ok(raw) => serde_json::from_str(&raw).map_err(|e| {
                ProvisioningError::Persistence(format!(
                    "settings file {} is not valid JSON: {}",
                    path.display(),
                    e
                ))
            })?,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => BTreeMap::new(),
            Err(e) => {
                return Err(ProvisioningError::Persistence(format!(
                    "cannot read settings file {}: {}",
                    path.display(),
                    e
                )))
            }
        };

        Ok(FileSettingsStore {
            path,
            entries: RwLock::new(entries),
        })
    }
}

#[async_trait]
impl SettingsStore for FileSettingsStore {
    async fn get(&self, key: &str) -> Option<String> {
        self.entries.read().await.get(key).cloned()
    }

    async fn set(&self, key: &str, value: &str) {
        self.entries
            .write()
            .await
            .insert(key.to_string(), value.to_string());
    }

    async fn save(&self) -> Result<()> {
        let entries = self.entries.read().await;
        let raw = serde_json::to_string_pretty(&*entries).map_err(|e| {
            ProvisioningError::Persistence(format!("cannot serialize settings: {}", e))
        })?;

        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                tokio::fs::create_dir_all(parent).await.map_err(|e| {
                    ProvisioningError::Persistence(format!(
                        "cannot create settings directory {}: {}",
                        parent.display(),
                        e
                    ))
                })?;
            }
        }

        tokio::fs::write(&self.path, raw).await.map_err(|e| {
            ProvisioningError::Persistence(format!(
                "cannot write settings file {}: {}",
                self.path.display(),
                e
            ))
        })?;

        info!("Settings saved to {}", self.path.display());
        Ok(())
    }
}
