//! Security settings loaded from any [`ConfigProvider`].

use serde::{Deserialize, Serialize};

use super::provider::{ConfigProvider, ConfigProviderExt};
use super::{ConfigError, ConfigResult};

pub const ERASE_CREDENTIALS: &str = "security.erase_credentials";
pub const ALLOW_SAME_KIND_CONFIGURERS: &str = "security.allow_same_kind_configurers";
pub const ANONYMOUS_KEY: &str = "security.anonymous.key";
pub const ANONYMOUS_PRINCIPAL: &str = "security.anonymous.principal";
pub const ANONYMOUS_AUTHORITIES: &str = "security.anonymous.authorities";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SecuritySettings {
    /// Erase credentials on successful results before returning them.
    pub erase_credentials: bool,
    /// Let configurers of the same kind accumulate instead of replacing.
    pub allow_same_kind_configurers: bool,
    pub anonymous: AnonymousSettings,
}

impl Default for SecuritySettings {
    fn default() -> Self {
        Self {
            erase_credentials: true,
            allow_same_kind_configurers: false,
            anonymous: AnonymousSettings::default(),
        }
    }
}

/// What an unauthenticated request runs as.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnonymousSettings {
    /// Identifies tokens issued by this application.
    pub key: String,
    pub principal: String,
    pub authorities: Vec<String>,
}

impl Default for AnonymousSettings {
    fn default() -> Self {
        Self {
            key: uuid::Uuid::new_v4().to_string(),
            principal: "anonymousUser".to_string(),
            authorities: vec!["ROLE_ANONYMOUS".to_string()],
        }
    }
}

impl SecuritySettings {
    /// Defaults overlaid with whatever `provider` supplies, then validated.
    pub async fn load(provider: &dyn ConfigProvider) -> ConfigResult<Self> {
        let mut settings = Self::default();

        if let Some(erase) = provider.get::<bool>(ERASE_CREDENTIALS).await? {
            settings.erase_credentials = erase;
        }
        if let Some(allow) = provider.get::<bool>(ALLOW_SAME_KIND_CONFIGURERS).await? {
            settings.allow_same_kind_configurers = allow;
        }
        if let Some(key) = provider.get::<String>(ANONYMOUS_KEY).await? {
            settings.anonymous.key = key;
        }
        if let Some(principal) = provider.get::<String>(ANONYMOUS_PRINCIPAL).await? {
            settings.anonymous.principal = principal;
        }
        if let Some(authorities) = provider.get_list(ANONYMOUS_AUTHORITIES).await? {
            settings.anonymous.authorities = authorities;
        }

        settings.validate()?;
        tracing::debug!(
            provider = provider.name(),
            erase_credentials = settings.erase_credentials,
            allow_same_kind_configurers = settings.allow_same_kind_configurers,
            "Loaded security settings"
        );
        Ok(settings)
    }

    pub fn validate(&self) -> ConfigResult<()> {
        if self.anonymous.key.trim().is_empty() {
            return Err(ConfigError::invalid(ANONYMOUS_KEY, "must not be empty"));
        }
        if self.anonymous.principal.trim().is_empty() {
            return Err(ConfigError::invalid(ANONYMOUS_PRINCIPAL, "must not be empty"));
        }
        if self.anonymous.authorities.is_empty() {
            return Err(ConfigError::invalid(
                ANONYMOUS_AUTHORITIES,
                "at least one authority is required",
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{CompositeConfigProvider, EnvConfigProvider, MemoryConfigProvider};

    #[tokio::test]
    async fn test_defaults() {
        let settings = SecuritySettings::load(&MemoryConfigProvider::new()).await.unwrap();
        assert!(settings.erase_credentials);
        assert!(!settings.allow_same_kind_configurers);
        assert_eq!(settings.anonymous.principal, "anonymousUser");
        assert_eq!(settings.anonymous.authorities, ["ROLE_ANONYMOUS"]);
        assert!(!settings.anonymous.key.is_empty());
    }

    #[tokio::test]
    async fn test_overrides() {
        let provider = MemoryConfigProvider::new()
            .value(ERASE_CREDENTIALS, "false")
            .value(ALLOW_SAME_KIND_CONFIGURERS, "true")
            .value(ANONYMOUS_KEY, "k3y")
            .value(ANONYMOUS_PRINCIPAL, "guest")
            .value(ANONYMOUS_AUTHORITIES, "ROLE_GUEST,ROLE_READER");

        let settings = SecuritySettings::load(&provider).await.unwrap();
        assert!(!settings.erase_credentials);
        assert!(settings.allow_same_kind_configurers);
        assert_eq!(settings.anonymous.key, "k3y");
        assert_eq!(settings.anonymous.principal, "guest");
        assert_eq!(settings.anonymous.authorities, ["ROLE_GUEST", "ROLE_READER"]);
    }

    #[tokio::test]
    async fn test_empty_key_rejected() {
        let provider = MemoryConfigProvider::new().value(ANONYMOUS_KEY, "  ");
        let err = SecuritySettings::load(&provider).await.unwrap_err();
        assert!(matches!(err, ConfigError::InvalidValue { ref key, .. } if key == ANONYMOUS_KEY));
    }

    #[tokio::test]
    async fn test_invalid_flag_rejected() {
        let provider = MemoryConfigProvider::new().value(ERASE_CREDENTIALS, "maybe");
        assert!(SecuritySettings::load(&provider).await.is_err());
    }

    #[tokio::test]
    async fn test_env_overrides_memory() {
        const VAR: &str = "GATEKEEPER_SETTINGS_TEST_SECURITY_ANONYMOUS_PRINCIPAL";
        // SAFETY: Test-only environment setup with a variable no other test reads
        unsafe { std::env::set_var(VAR, "env-user") };

        let provider = CompositeConfigProvider::new()
            .provider(Box::new(EnvConfigProvider::prefixed("GATEKEEPER_SETTINGS_TEST")))
            .provider(Box::new(
                MemoryConfigProvider::new().value(ANONYMOUS_PRINCIPAL, "memory-user"),
            ));
        let settings = SecuritySettings::load(&provider).await.unwrap();
        assert_eq!(settings.anonymous.principal, "env-user");

        unsafe { std::env::remove_var(VAR) };
    }

    #[tokio::test]
    async fn test_load_from_file() {
        let temp_dir = tempfile::TempDir::new().unwrap();
        let path = temp_dir.path().join("security.json");
        let config = serde_json::json!({
            "security": {
                "erase_credentials": false,
                "anonymous": { "key": "file-key", "authorities": ["ROLE_GUEST", "ROLE_READER"] }
            }
        });
        tokio::fs::write(&path, config.to_string()).await.unwrap();

        let settings = SecuritySettings::load(&crate::config::FileConfigProvider::new(path))
            .await
            .unwrap();
        assert!(!settings.erase_credentials);
        assert_eq!(settings.anonymous.key, "file-key");
        assert_eq!(settings.anonymous.authorities, ["ROLE_GUEST", "ROLE_READER"]);
        assert_eq!(settings.anonymous.principal, "anonymousUser");
    }

    #[test]
    fn test_serde_defaults() {
        let settings: SecuritySettings =
            serde_json::from_str(r#"{"anonymous": {"key": "k"}}"#).unwrap();
        assert!(settings.erase_credentials);
        assert_eq!(settings.anonymous.key, "k");
        assert_eq!(settings.anonymous.principal, "anonymousUser");
    }
}
