//! Read-only configuration providers and the settings they feed.
//!
//! ```rust,no_run
//! use gatekeeper::config::{
//!     CompositeConfigProvider, EnvConfigProvider, FileConfigProvider, SecuritySettings,
//! };
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let provider = CompositeConfigProvider::new()
//!     .provider(Box::new(EnvConfigProvider::prefixed("GATEKEEPER")))
//!     .provider(Box::new(FileConfigProvider::new("security.json".into())));
//! let settings = SecuritySettings::load(&provider).await?;
//! # let _ = settings;
//! # Ok(())
//! # }
//! ```

pub mod composite;
pub mod env;
pub mod file;
pub mod memory;
pub mod provider;
pub mod settings;

pub use composite::CompositeConfigProvider;
pub use env::EnvConfigProvider;
pub use file::FileConfigProvider;
pub use memory::MemoryConfigProvider;
pub use provider::{ConfigProvider, ConfigProviderExt};
pub use settings::{AnonymousSettings, SecuritySettings};

use thiserror::Error;

/// Errors that can occur while reading configuration.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// A value was present but could not be used
    #[error("Invalid value for {key}: {message}")]
    InvalidValue { key: String, message: String },

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Environment error: {0}")]
    Env(#[from] std::env::VarError),

    #[error("Provider error: {message}")]
    Provider { message: String },
}

impl ConfigError {
    pub fn invalid(key: impl Into<String>, message: impl Into<String>) -> Self {
        ConfigError::InvalidValue {
            key: key.into(),
            message: message.into(),
        }
    }
}

pub type ConfigResult<T> = std::result::Result<T, ConfigError>;
