//! # gatekeeper
//!
//! Two small engines that security plumbing plugs into:
//!
//! - [`builder`]: a staged builder that lets independent [`Configurer`]s
//!   register, exchange intermediate state and contribute to one object,
//!   built exactly once.
//! - [`auth`]: an ordered chain of [`AuthenticationStrategy`]s with an
//!   optional fallback resolver, producing one authenticated result or one
//!   error.
//!
//! ## Resolving a credential
//!
//! ```rust
//! use std::sync::Arc;
//! use gatekeeper::auth::{
//!     AuthError, AuthResult, Authentication, AuthenticationStrategy, AuthenticationToken,
//!     ChainResolver, CredentialKind,
//! };
//!
//! #[derive(Debug)]
//! struct StaticToken;
//!
//! impl AuthenticationStrategy for StaticToken {
//!     fn name(&self) -> &str {
//!         "static-token"
//!     }
//!
//!     fn supports(&self, kind: CredentialKind) -> bool {
//!         kind == CredentialKind::BEARER_TOKEN
//!     }
//!
//!     fn authenticate(
//!         &self,
//!         credential: &dyn Authentication,
//!     ) -> AuthResult<Option<Box<dyn Authentication>>> {
//!         if credential.name() == "service-a" {
//!             let token = AuthenticationToken::authenticated(
//!                 CredentialKind::BEARER_TOKEN,
//!                 "service-a",
//!                 ["ROLE_SERVICE"],
//!             );
//!             return Ok(Some(Box::new(token)));
//!         }
//!         Err(AuthError::bad_credentials("unknown service"))
//!     }
//! }
//!
//! # fn main() -> gatekeeper::Result<()> {
//! let resolver = ChainResolver::builder().strategy(Arc::new(StaticToken)).build()?;
//! let credential =
//!     AuthenticationToken::unauthenticated(CredentialKind::BEARER_TOKEN, "service-a", "t0k3n");
//! let result = resolver.resolve(&credential)?;
//! assert!(result.is_authenticated());
//! # Ok(())
//! # }
//! ```

#![cfg_attr(docsrs, feature(doc_cfg))]
#![deny(rustdoc::broken_intra_doc_links)]

pub mod auth;
pub mod builder;
pub mod config;
pub mod context;
pub mod observability;
pub mod prelude;

pub use auth::{
    AccountStatus, AuthError, AuthResult, Authentication, AuthenticationDetails,
    AuthenticationEventSink, AuthenticationManager, AuthenticationStrategy, AuthenticationToken,
    ChainResolver, ChainResolverBuilder, CredentialKind, CredentialsContainer, RejectionReason,
    ResolverBuilder,
};
pub use builder::{
    BuildState, BuildTarget, BuilderContext, CompositePostProcessor, ConfiguredBuilder,
    Configurer, ConfigurerKind, ObjectPostProcessor, SharedObjects,
};
pub use config::{ConfigError, ConfigProvider, ConfigProviderExt, SecuritySettings};
pub use context::SecurityContext;

/// Error type for gatekeeper operations.
#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum Error {
    /// An operation was attempted in a state that forbids it.
    #[error("Illegal state: {0}")]
    IllegalState(String),

    /// Invalid or missing configuration.
    #[error("Configuration error: {0}")]
    Config(String),

    /// A configurer callback or build step rejected the build.
    #[error("Configurer '{kind}' failed: {message}")]
    Configurer { kind: String, message: String },

    /// Authentication failed.
    #[error(transparent)]
    Auth(#[from] AuthError),

    /// File system operation failed.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization or deserialization failed.
    #[error("JSON parsing failed: {0}")]
    Json(#[from] serde_json::Error),
}

/// Error category for unified error handling.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    /// Caller or programmer defect; never retried.
    IllegalState,
    /// Configuration, parsing, or setup errors.
    Configuration,
    /// Authentication rejections of any class.
    Authentication,
    /// IO and serialization failures.
    Internal,
}

impl Error {
    pub fn illegal_state(message: impl Into<String>) -> Self {
        Error::IllegalState(message.into())
    }

    pub fn configurer(kind: impl Into<String>, message: impl Into<String>) -> Self {
        Error::Configurer {
            kind: kind.into(),
            message: message.into(),
        }
    }

    pub fn category(&self) -> ErrorCategory {
        match self {
            Error::IllegalState(_) => ErrorCategory::IllegalState,
            Error::Config(_) | Error::Configurer { .. } => ErrorCategory::Configuration,
            Error::Auth(_) => ErrorCategory::Authentication,
            Error::Io(_) | Error::Json(_) => ErrorCategory::Internal,
        }
    }

    pub fn is_illegal_state(&self) -> bool {
        self.category() == ErrorCategory::IllegalState
    }

    pub fn is_authentication_error(&self) -> bool {
        self.category() == ErrorCategory::Authentication
    }

    /// The wrapped authentication error, if any.
    pub fn as_auth(&self) -> Option<&AuthError> {
        match self {
            Error::Auth(e) => Some(e),
            _ => None,
        }
    }
}

impl From<config::ConfigError> for Error {
    fn from(err: config::ConfigError) -> Self {
        match err {
            config::ConfigError::InvalidValue { key, message } => {
                Error::Config(format!("Invalid value for {}: {}", key, message))
            }
            config::ConfigError::Serialization(e) => Error::Json(e),
            config::ConfigError::Io(e) => Error::Io(e),
            config::ConfigError::Env(e) => Error::Config(e.to_string()),
            config::ConfigError::Provider { message } => Error::Config(message),
        }
    }
}

pub type Result<T> = std::result::Result<T, Error>;
