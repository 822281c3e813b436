//! Environment variable configuration provider
//!
//! Environment variables are treated as immutable at runtime because
//! modifying them is not thread-safe.

use super::provider::ConfigProvider;
use super::{ConfigError, ConfigResult};

/// Maps dotted keys to environment variables: with prefix `GATEKEEPER`,
/// `security.anonymous.key` reads `GATEKEEPER_SECURITY_ANONYMOUS_KEY`.
#[derive(Debug, Clone, Default)]
pub struct EnvConfigProvider {
    prefix: Option<String>,
}

impl EnvConfigProvider {
    pub fn new() -> Self {
        Self { prefix: None }
    }

    pub fn prefixed(prefix: impl Into<String>) -> Self {
        let mut prefix = prefix.into();
        if !prefix.is_empty() && !prefix.ends_with('_') {
            prefix.push('_');
        }
        Self {
            prefix: Some(prefix),
        }
    }

    fn env_key(&self, key: &str) -> String {
        let name = key.to_uppercase().replace(['.', '-'], "_");
        match &self.prefix {
            Some(prefix) => format!("{}{}", prefix.to_uppercase(), name),
            None => name,
        }
    }
}

#[async_trait::async_trait]
impl ConfigProvider for EnvConfigProvider {
    fn name(&self) -> &str {
        "env"
    }

    async fn get_raw(&self, key: &str) -> ConfigResult<Option<String>> {
        match std::env::var(self.env_key(key)) {
            Ok(value) => Ok(Some(value)),
            Err(std::env::VarError::NotPresent) => Ok(None),
            Err(e) => Err(ConfigError::Env(e)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_env_key_conversion() {
        let provider = EnvConfigProvider::new();
        assert_eq!(provider.env_key("security.erase_credentials"), "SECURITY_ERASE_CREDENTIALS");

        let provider = EnvConfigProvider::prefixed("gatekeeper");
        assert_eq!(
            provider.env_key("security.anonymous.key"),
            "GATEKEEPER_SECURITY_ANONYMOUS_KEY"
        );
        assert_eq!(
            EnvConfigProvider::prefixed("GK_").env_key("a.b"),
            "GK_A_B"
        );
    }

    #[tokio::test]
    async fn test_env_provider_get() {
        let provider = EnvConfigProvider::prefixed("GATEKEEPER_ENV_TEST");

        // SAFETY: Test-only environment setup with a variable no other test reads
        unsafe { std::env::set_var("GATEKEEPER_ENV_TEST_SECURITY_ANONYMOUS_KEY", "k3y") };
        let value = provider.get_raw("security.anonymous.key").await.unwrap();
        assert_eq!(value, Some("k3y".to_string()));
        unsafe { std::env::remove_var("GATEKEEPER_ENV_TEST_SECURITY_ANONYMOUS_KEY") };
    }

    #[tokio::test]
    async fn test_env_provider_not_found() {
        let provider = EnvConfigProvider::prefixed("GATEKEEPER_NONEXISTENT");
        assert_eq!(provider.get_raw("some.key").await.unwrap(), None);
    }
}
