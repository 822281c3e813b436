//! The authentication chain resolver.

use std::fmt;
use std::sync::Arc;

use super::{
    AuthError, AuthResult, Authentication, AuthenticationEventSink, AuthenticationManager,
    AuthenticationStrategy, NoopEventSink,
};
use crate::config::SecuritySettings;
use crate::context::SecurityContext;
use crate::{Error, Result};

/// Tries an ordered list of strategies against a credential, then an
/// optional fallback manager.
///
/// Resolution rules:
/// - strategies that do not support the credential's kind are skipped;
/// - the first strategy returning a result wins;
/// - account-status and internal-service errors end resolution at once;
/// - other errors are remembered and the walk continues;
/// - the fallback runs only when no strategy produced a result.
///
/// The strategy list and fallback are fixed once built, so one resolver can
/// serve any number of concurrent callers.
pub struct ChainResolver {
    strategies: Vec<Arc<dyn AuthenticationStrategy>>,
    fallback: Option<Arc<dyn AuthenticationManager>>,
    event_sink: Arc<dyn AuthenticationEventSink>,
    erase_credentials: bool,
}

impl ChainResolver {
    pub fn builder() -> ChainResolverBuilder {
        ChainResolverBuilder::default()
    }

    /// Resolves `credential` to exactly one result or exactly one error.
    pub fn resolve(&self, credential: &dyn Authentication) -> AuthResult<Box<dyn Authentication>> {
        let kind = credential.kind();
        let size = self.strategies.len();
        let mut position = 0;
        let mut result: Option<Box<dyn Authentication>> = None;
        let mut from_fallback = false;
        let mut last_error: Option<AuthError> = None;
        let mut fallback_failed = false;

        for strategy in &self.strategies {
            if !strategy.supports(kind) {
                continue;
            }
            position += 1;
            tracing::trace!(
                "Authenticating request with {} ({}/{})",
                strategy.name(),
                position,
                size
            );

            match strategy.authenticate(credential) {
                Ok(Some(mut authenticated)) => {
                    copy_details(credential, authenticated.as_mut());
                    result = Some(authenticated);
                    break;
                }
                Ok(None) => {}
                Err(e) if e.is_definitive() => {
                    self.event_sink.on_failure(&e, credential);
                    let reason = match &e {
                        AuthError::AccountStatus { .. } => {
                            "Authentication failed since the account status is not valid"
                        }
                        _ => "Authentication service failed internally",
                    };
                    tracing::debug!(principal = credential.name(), error = %e, "{}", reason);
                    return Err(e);
                }
                Err(e) => {
                    tracing::debug!(
                        strategy = strategy.name(),
                        error = %e,
                        "Authentication failed with strategy"
                    );
                    last_error = Some(e);
                }
            }
        }

        if result.is_none() {
            if let Some(fallback) = &self.fallback {
                match fallback.authenticate(credential) {
                    Ok(authenticated) => {
                        result = Some(authenticated);
                        from_fallback = true;
                    }
                    // The fallback may have no opinion even when a strategy here
                    // already failed; keep that failure.
                    Err(e) if e.is_provider_not_found() => {}
                    Err(e) => {
                        last_error = Some(e);
                        fallback_failed = true;
                    }
                }
            }
        }

        if let Some(mut authenticated) = result {
            if self.erase_credentials {
                if let Some(container) = authenticated.credentials_container() {
                    container.erase_credentials();
                }
            }
            // A fallback publishes its own success.
            if !from_fallback {
                self.event_sink.on_success(authenticated.as_ref());
            }
            return Ok(authenticated);
        }

        let error = last_error.unwrap_or_else(|| AuthError::provider_not_found(kind));
        if !fallback_failed {
            self.event_sink.on_failure(&error, credential);
        }
        if self.fallback.is_some() {
            tracing::debug!("Denying authentication since all attempted strategies failed");
        }
        Err(error)
    }

    /// Resolves `credential` and stores the result in `ctx`. On failure `ctx`
    /// is left as it was.
    pub fn resolve_into(
        &self,
        ctx: &mut SecurityContext,
        credential: &dyn Authentication,
    ) -> AuthResult<()> {
        let authenticated = self.resolve(credential)?;
        ctx.set_authentication(Arc::from(authenticated));
        Ok(())
    }

    /// Strategies in priority order.
    pub fn strategies(&self) -> &[Arc<dyn AuthenticationStrategy>] {
        &self.strategies
    }

    pub fn fallback(&self) -> Option<&Arc<dyn AuthenticationManager>> {
        self.fallback.as_ref()
    }

    /// True if successful results keep their credentials.
    pub fn retains_credentials(&self) -> bool {
        !self.erase_credentials
    }
}

fn copy_details(source: &dyn Authentication, dest: &mut dyn Authentication) {
    if dest.details().is_none() {
        if let Some(details) = source.details() {
            dest.set_details(details.clone());
        }
    }
}

impl AuthenticationManager for ChainResolver {
    fn authenticate(
        &self,
        credential: &dyn Authentication,
    ) -> AuthResult<Box<dyn Authentication>> {
        self.resolve(credential)
    }
}

impl fmt::Debug for ChainResolver {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let names: Vec<_> = self.strategies.iter().map(|s| s.name()).collect();
        f.debug_struct("ChainResolver")
            .field("strategies", &names)
            .field("fallback", &self.fallback.is_some())
            .field("erase_credentials", &self.erase_credentials)
            .finish()
    }
}

/// Builder for [`ChainResolver`].
pub struct ChainResolverBuilder {
    strategies: Vec<Arc<dyn AuthenticationStrategy>>,
    fallback: Option<Arc<dyn AuthenticationManager>>,
    event_sink: Arc<dyn AuthenticationEventSink>,
    erase_credentials: bool,
}

impl Default for ChainResolverBuilder {
    fn default() -> Self {
        Self {
            strategies: Vec::new(),
            fallback: None,
            event_sink: Arc::new(NoopEventSink),
            erase_credentials: true,
        }
    }
}

impl ChainResolverBuilder {
    pub fn strategy(mut self, strategy: Arc<dyn AuthenticationStrategy>) -> Self {
        self.strategies.push(strategy);
        self
    }

    pub fn strategies<I>(mut self, strategies: I) -> Self
    where
        I: IntoIterator<Item = Arc<dyn AuthenticationStrategy>>,
    {
        self.strategies.extend(strategies);
        self
    }

    pub fn fallback(mut self, fallback: Arc<dyn AuthenticationManager>) -> Self {
        self.fallback = Some(fallback);
        self
    }

    pub fn event_sink(mut self, sink: Arc<dyn AuthenticationEventSink>) -> Self {
        self.event_sink = sink;
        self
    }

    /// Keep credentials on successful results instead of erasing them.
    pub fn retain_credentials(mut self, retain: bool) -> Self {
        self.erase_credentials = !retain;
        self
    }

    pub fn settings(mut self, settings: &SecuritySettings) -> Self {
        self.erase_credentials = settings.erase_credentials;
        self
    }

    /// Fails with [`Error::Config`] when there is neither a strategy nor a
    /// fallback.
    pub fn build(self) -> Result<ChainResolver> {
        if self.strategies.is_empty() && self.fallback.is_none() {
            return Err(Error::Config(
                "a fallback manager is required when no strategies are configured".into(),
            ));
        }
        Ok(ChainResolver {
            strategies: self.strategies,
            fallback: self.fallback,
            event_sink: self.event_sink,
            erase_credentials: self.erase_credentials,
        })
    }
}
