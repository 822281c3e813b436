//! Explicit, request-scoped security context.

use std::sync::Arc;

use crate::auth::{Authentication, AuthenticationToken};
use crate::config::AnonymousSettings;

/// Who the current request runs as.
///
/// Passed by value or reference to whatever needs it; nothing is stored in
/// ambient or thread-local state.
#[derive(Debug, Clone, Default)]
pub struct SecurityContext {
    authentication: Option<Arc<dyn Authentication>>,
}

impl SecurityContext {
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn with_authentication(authentication: Arc<dyn Authentication>) -> Self {
        Self {
            authentication: Some(authentication),
        }
    }

    pub fn authentication(&self) -> Option<&Arc<dyn Authentication>> {
        self.authentication.as_ref()
    }

    pub fn set_authentication(&mut self, authentication: Arc<dyn Authentication>) {
        self.authentication = Some(authentication);
    }

    /// Removes and returns the current authentication.
    pub fn clear(&mut self) -> Option<Arc<dyn Authentication>> {
        self.authentication.take()
    }

    pub fn is_authenticated(&self) -> bool {
        self.authentication
            .as_ref()
            .is_some_and(|a| a.is_authenticated())
    }

    /// Returns `self` if it already carries an authentication, otherwise a
    /// context holding an anonymous token built from `settings`.
    pub fn or_anonymous(self, settings: &AnonymousSettings) -> Self {
        if self.authentication.is_some() {
            tracing::trace!("Did not populate anonymous context, authentication already present");
            return self;
        }
        let token = AuthenticationToken::anonymous(
            &settings.key,
            settings.principal.clone(),
            settings.authorities.iter().cloned(),
        );
        tracing::trace!(principal = %settings.principal, "Populated context with anonymous token");
        Self::with_authentication(Arc::new(token))
    }
}
