//! Configuration provider trait

use serde::de::DeserializeOwned;

use super::{ConfigError, ConfigResult};

/// Source of raw configuration values addressed by dotted keys.
#[async_trait::async_trait]
pub trait ConfigProvider: Send + Sync {
    /// Provider name for logging
    fn name(&self) -> &str;

    async fn get_raw(&self, key: &str) -> ConfigResult<Option<String>>;
}

/// Typed access on top of [`ConfigProvider::get_raw`].
pub trait ConfigProviderExt: ConfigProvider {
    /// Parses the raw value as JSON. A value that is not valid JSON is
    /// retried as a JSON string, so plain text works for string settings.
    fn get<T: DeserializeOwned + Send>(
        &self,
        key: &str,
    ) -> impl std::future::Future<Output = ConfigResult<Option<T>>> + Send
    where
        Self: Sync,
    {
        async move {
            match self.get_raw(key).await? {
                Some(raw) => parse(key, &raw).map(Some),
                None => Ok(None),
            }
        }
    }

    /// A list given either as a JSON array or as comma-separated text.
    fn get_list(
        &self,
        key: &str,
    ) -> impl std::future::Future<Output = ConfigResult<Option<Vec<String>>>> + Send
    where
        Self: Sync,
    {
        async move {
            let Some(raw) = self.get_raw(key).await? else {
                return Ok(None);
            };
            if raw.trim_start().starts_with('[') {
                return parse(key, &raw).map(Some);
            }
            Ok(Some(
                raw.split(',')
                    .map(str::trim)
                    .filter(|s| !s.is_empty())
                    .map(String::from)
                    .collect(),
            ))
        }
    }
}

impl<P: ConfigProvider + ?Sized> ConfigProviderExt for P {}

fn parse<T: DeserializeOwned>(key: &str, raw: &str) -> ConfigResult<T> {
    serde_json::from_str(raw)
        .or_else(|_| serde_json::from_value(serde_json::Value::String(raw.to_string())))
        .map_err(|e| ConfigError::invalid(key, e.to_string()))
}
