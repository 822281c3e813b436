//! Composite configuration provider
//!
//! Earlier providers have higher priority.

use super::ConfigResult;
use super::provider::ConfigProvider;

#[derive(Default)]
pub struct CompositeConfigProvider {
    providers: Vec<Box<dyn ConfigProvider>>,
}

impl CompositeConfigProvider {
    pub fn new() -> Self {
        Self::default()
    }

    /// First added = highest priority.
    pub fn add_provider(&mut self, provider: Box<dyn ConfigProvider>) {
        self.providers.push(provider);
    }

    pub fn provider(mut self, provider: Box<dyn ConfigProvider>) -> Self {
        self.providers.push(provider);
        self
    }

    pub fn provider_count(&self) -> usize {
        self.providers.len()
    }

    pub fn provider_names(&self) -> Vec<&str> {
        self.providers.iter().map(|p| p.name()).collect()
    }
}

#[async_trait::async_trait]
impl ConfigProvider for CompositeConfigProvider {
    fn name(&self) -> &str {
        "composite"
    }

    async fn get_raw(&self, key: &str) -> ConfigResult<Option<String>> {
        for provider in &self.providers {
            if let Some(value) = provider.get_raw(key).await? {
                tracing::trace!(key, provider = provider.name(), "Config value resolved");
                return Ok(Some(value));
            }
        }
        Ok(None)
    }
}

impl std::fmt::Debug for CompositeConfigProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CompositeConfigProvider")
            .field("provider_names", &self.provider_names())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::memory::MemoryConfigProvider;

    #[tokio::test]
    async fn test_composite_provider_priority() {
        let high = MemoryConfigProvider::named("high").value("key", "high_value");
        let low = MemoryConfigProvider::named("low")
            .value("key", "low_value")
            .value("only_low", "from_low");

        let composite = CompositeConfigProvider::new()
            .provider(Box::new(high))
            .provider(Box::new(low));

        assert_eq!(
            composite.get_raw("key").await.unwrap(),
            Some("high_value".to_string())
        );
        assert_eq!(
            composite.get_raw("only_low").await.unwrap(),
            Some("from_low".to_string())
        );
        assert_eq!(composite.get_raw("absent").await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_composite_provider_names() {
        let composite = CompositeConfigProvider::new()
            .provider(Box::new(MemoryConfigProvider::named("first")))
            .provider(Box::new(MemoryConfigProvider::named("second")));

        assert_eq!(composite.provider_names(), vec!["first", "second"]);
        assert_eq!(composite.provider_count(), 2);
    }
}
