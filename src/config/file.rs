//! JSON file configuration provider

use std::path::PathBuf;

use tokio::sync::RwLock;

use super::ConfigResult;
use super::provider::ConfigProvider;

/// Reads a JSON document once and serves dotted keys from it, so
/// `security.anonymous.key` resolves `{"security": {"anonymous": {"key": ..}}}`.
/// A missing file behaves as an empty document.
pub struct FileConfigProvider {
    path: PathBuf,
    data: RwLock<Option<serde_json::Value>>,
}

impl FileConfigProvider {
    pub fn new(path: PathBuf) -> Self {
        Self {
            path,
            data: RwLock::new(None),
        }
    }

    async fn load(&self) -> ConfigResult<serde_json::Value> {
        if !tokio::fs::try_exists(&self.path).await? {
            tracing::debug!(
                path = %self.path.display(),
                "Config file not found, using empty document"
            );
            return Ok(serde_json::Value::Null);
        }
        let content = tokio::fs::read_to_string(&self.path).await?;
        Ok(serde_json::from_str(&content)?)
    }

    /// Re-reads the file on the next lookup.
    pub async fn reload(&self) -> ConfigResult<()> {
        let fresh = self.load().await?;
        *self.data.write().await = Some(fresh);
        Ok(())
    }

    pub fn path(&self) -> &PathBuf {
        &self.path
    }
}

#[async_trait::async_trait]
impl ConfigProvider for FileConfigProvider {
    fn name(&self) -> &str {
        "file"
    }

    async fn get_raw(&self, key: &str) -> ConfigResult<Option<String>> {
        let mut data = self.data.write().await;
        if data.is_none() {
            *data = Some(self.load().await?);
        }

        let mut current = data.as_ref();
        for part in key.split('.') {
            current = current.and_then(|v| v.get(part));
        }

        Ok(match current {
            None | Some(serde_json::Value::Null) => None,
            Some(serde_json::Value::String(s)) => Some(s.clone()),
            Some(v) => Some(v.to_string()),
        })
    }
}

impl std::fmt::Debug for FileConfigProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FileConfigProvider")
            .field("path", &self.path)
            .finish()
    }
}
