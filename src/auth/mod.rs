//! Authentication chain resolution.
//!
//! A [`ChainResolver`] walks an ordered list of [`AuthenticationStrategy`]s:
//! - **Dispatch** by [`CredentialKind`]; unsupported strategies are skipped
//! - **First success wins**; later strategies are never consulted
//! - **Definitive errors** (account status, internal service) stop the walk
//! - **Fallback** manager runs only when the chain produced nothing
//!
//! Resolvers are usually assembled with [`ChainResolver::builder`] or, when
//! several components contribute strategies, through a
//! [`ResolverBuilder`] driven by configurers.

mod authentication;
mod error;
mod events;
mod kind;
mod resolver;
mod resolver_builder;
mod strategy;
mod token;

pub use authentication::{Authentication, AuthenticationDetails, CredentialsContainer};
pub use error::{AccountStatus, AuthError, AuthResult, RejectionReason};
pub use events::{
    AuthenticationEvent, AuthenticationEventSink, CompositeEventSink, MetricsEventSink,
    NoopEventSink, Outcome, RecordingEventSink, TracingEventSink,
};
pub use kind::CredentialKind;
pub use resolver::{ChainResolver, ChainResolverBuilder};
pub use resolver_builder::{
    EventSinkConfigurer, FallbackConfigurer, ResolverBuilder, SettingsConfigurer,
    StrategyConfigurer,
};
pub use strategy::{AuthenticationManager, AuthenticationStrategy};
pub use token::AuthenticationToken;
