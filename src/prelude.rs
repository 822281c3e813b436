//! Prelude module for convenient imports.
//!
//! ```rust
//! use gatekeeper::prelude::*;
//! ```

// Core types
pub use crate::Error;
pub use crate::Result;

// Builder
pub use crate::builder::{
    BuildState, BuildTarget, BuilderContext, CompositePostProcessor, ConfiguredBuilder,
    Configurer, ObjectPostProcessor,
};

// Authentication
pub use crate::auth::{
    AuthError, AuthResult, Authentication, AuthenticationEventSink, AuthenticationManager,
    AuthenticationStrategy, AuthenticationToken, ChainResolver, CredentialKind, ResolverBuilder,
    StrategyConfigurer,
};

// Context and settings
pub use crate::config::{ConfigProvider, ConfigProviderExt, SecuritySettings};
pub use crate::context::SecurityContext;
