//! In-memory configuration provider
//!
//! Useful for tests and code-defined configuration.

use std::collections::HashMap;

use tokio::sync::RwLock;

use super::ConfigResult;
use super::provider::ConfigProvider;

#[derive(Debug)]
pub struct MemoryConfigProvider {
    data: RwLock<HashMap<String, String>>,
    name: String,
}

impl MemoryConfigProvider {
    pub fn new() -> Self {
        Self::named("memory")
    }

    pub fn named(name: impl Into<String>) -> Self {
        Self {
            data: RwLock::new(HashMap::new()),
            name: name.into(),
        }
    }

    pub fn from_data(data: HashMap<String, String>) -> Self {
        Self {
            data: RwLock::new(data),
            name: "memory".to_string(),
        }
    }

    /// Adds a value during construction.
    pub fn value(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.data.get_mut().insert(key.into(), value.into());
        self
    }

    pub async fn insert(&self, key: impl Into<String>, value: impl Into<String>) {
        self.data.write().await.insert(key.into(), value.into());
    }

    pub async fn remove(&self, key: &str) -> bool {
        self.data.write().await.remove(key).is_some()
    }

    pub async fn len(&self) -> usize {
        self.data.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.data.read().await.is_empty()
    }
}

impl Default for MemoryConfigProvider {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait::async_trait]
impl ConfigProvider for MemoryConfigProvider {
    fn name(&self) -> &str {
        &self.name
    }

    async fn get_raw(&self, key: &str) -> ConfigResult<Option<String>> {
        Ok(self.data.read().await.get(key).cloned())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_memory_provider_basic() {
        let provider = MemoryConfigProvider::new().value("security.erase_credentials", "true");
        assert_eq!(
            provider.get_raw("security.erase_credentials").await.unwrap(),
            Some("true".to_string())
        );
        assert_eq!(provider.get_raw("nonexistent").await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_memory_provider_runtime_updates() {
        let provider = MemoryConfigProvider::named("overrides");
        assert!(provider.is_empty().await);

        provider.insert("security.anonymous.key", "k3y").await;
        assert_eq!(provider.len().await, 1);
        assert!(provider.remove("security.anonymous.key").await);
        assert!(!provider.remove("security.anonymous.key").await);
        assert_eq!(provider.name(), "overrides");
    }

    #[tokio::test]
    async fn test_memory_provider_with_data() {
        let data = HashMap::from([("a".to_string(), "1".to_string())]);
        let provider = MemoryConfigProvider::from_data(data);
        assert_eq!(provider.get_raw("a").await.unwrap(), Some("1".to_string()));
    }
}
