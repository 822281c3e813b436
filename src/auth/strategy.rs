//! Strategy and manager traits.

use super::{AuthResult, Authentication, CredentialKind};

/// One pluggable rule for verifying credentials.
pub trait AuthenticationStrategy: Send + Sync {
    /// Name used in logs.
    fn name(&self) -> &str;

    fn supports(&self, kind: CredentialKind) -> bool;

    /// `Ok(None)` means no opinion; the chain moves on to the next strategy.
    fn authenticate(
        &self,
        credential: &dyn Authentication,
    ) -> AuthResult<Option<Box<dyn Authentication>>>;
}

/// Anything that turns a credential into an authenticated result or an
/// error. Used as the fallback of a chain resolver.
pub trait AuthenticationManager: Send + Sync {
    fn authenticate(&self, credential: &dyn Authentication)
    -> AuthResult<Box<dyn Authentication>>;
}

impl<F> AuthenticationManager for F
where
    F: Fn(&dyn Authentication) -> AuthResult<Box<dyn Authentication>> + Send + Sync,
{
    fn authenticate(
        &self,
        credential: &dyn Authentication,
    ) -> AuthResult<Box<dyn Authentication>> {
        self(credential)
    }
}
