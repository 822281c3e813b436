//! Credential kinds used for strategy dispatch.

use std::fmt;

use serde::Serialize;

/// Capability token naming a family of credentials.
///
/// Strategies decide whether they handle a credential by comparing kinds,
/// never by inspecting the credential's concrete type. New kinds are plain
/// constants:
///
/// ```rust
/// use gatekeeper::CredentialKind;
///
/// const CLIENT_CERT: CredentialKind = CredentialKind::new("client_cert");
/// assert_ne!(CLIENT_CERT, CredentialKind::BEARER_TOKEN);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(transparent)]
pub struct CredentialKind(&'static str);

impl CredentialKind {
    pub const USERNAME_PASSWORD: CredentialKind = CredentialKind("username_password");
    pub const BEARER_TOKEN: CredentialKind = CredentialKind("bearer_token");
    pub const ANONYMOUS: CredentialKind = CredentialKind("anonymous");
    pub const PRE_AUTHENTICATED: CredentialKind = CredentialKind("pre_authenticated");

    pub const fn new(name: &'static str) -> Self {
        Self(name)
    }

    pub fn as_str(&self) -> &'static str {
        self.0
    }
}

impl fmt::Display for CredentialKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.0)
    }
}
