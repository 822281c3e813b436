//! General-purpose authentication token.

use std::hash::{DefaultHasher, Hash, Hasher};

use secrecy::SecretString;

use super::{Authentication, AuthenticationDetails, CredentialKind, CredentialsContainer};

/// Concrete [`Authentication`] covering the common request and result
/// shapes: an unauthenticated principal plus secret, an authenticated
/// principal with authorities, or an anonymous principal.
#[derive(Debug, Clone)]
pub struct AuthenticationToken {
    kind: CredentialKind,
    principal: String,
    credentials: Option<SecretString>,
    authorities: Vec<String>,
    authenticated: bool,
    details: Option<AuthenticationDetails>,
    key_hash: Option<u64>,
}

impl AuthenticationToken {
    /// A credential presented for verification.
    pub fn unauthenticated(
        kind: CredentialKind,
        principal: impl Into<String>,
        secret: impl Into<String>,
    ) -> Self {
        Self {
            kind,
            principal: principal.into(),
            credentials: Some(SecretString::from(secret.into())),
            authorities: Vec::new(),
            authenticated: false,
            details: None,
            key_hash: None,
        }
    }

    /// A verified principal.
    pub fn authenticated<I, S>(
        kind: CredentialKind,
        principal: impl Into<String>,
        authorities: I,
    ) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            kind,
            principal: principal.into(),
            credentials: None,
            authorities: authorities.into_iter().map(Into::into).collect(),
            authenticated: true,
            details: None,
            key_hash: None,
        }
    }

    /// An anonymous principal. Only a hash of `key` is kept, so the token
    /// can later be matched against the key that issued it.
    pub fn anonymous<I, S>(key: &str, principal: impl Into<String>, authorities: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut token = Self::authenticated(CredentialKind::ANONYMOUS, principal, authorities);
        token.key_hash = Some(key_hash(key));
        token
    }

    /// Attaches a secret to an already-built token.
    pub fn with_credentials(mut self, secret: impl Into<String>) -> Self {
        self.credentials = Some(SecretString::from(secret.into()));
        self
    }

    pub fn with_details(mut self, details: AuthenticationDetails) -> Self {
        self.details = Some(details);
        self
    }

    /// True if this is an anonymous token issued with `key`.
    pub fn issued_with(&self, key: &str) -> bool {
        self.key_hash == Some(key_hash(key))
    }
}

fn key_hash(key: &str) -> u64 {
    let mut hasher = DefaultHasher::new();
    key.hash(&mut hasher);
    hasher.finish()
}

impl Authentication for AuthenticationToken {
    fn kind(&self) -> CredentialKind {
        self.kind
    }

    fn name(&self) -> &str {
        &self.principal
    }

    fn is_authenticated(&self) -> bool {
        self.authenticated
    }

    fn authorities(&self) -> &[String] {
        &self.authorities
    }

    fn credentials(&self) -> Option<&SecretString> {
        self.credentials.as_ref()
    }

    fn details(&self) -> Option<&AuthenticationDetails> {
        self.details.as_ref()
    }

    fn set_details(&mut self, details: AuthenticationDetails) {
        self.details = Some(details);
    }

    fn credentials_container(&mut self) -> Option<&mut dyn CredentialsContainer> {
        Some(self)
    }
}

impl CredentialsContainer for AuthenticationToken {
    fn erase_credentials(&mut self) {
        self.credentials = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use secrecy::ExposeSecret;

    #[test]
    fn test_unauthenticated_holds_secret() {
        let token = AuthenticationToken::unauthenticated(
            CredentialKind::USERNAME_PASSWORD,
            "alice",
            "s3cret",
        );
        assert!(!token.is_authenticated());
        assert_eq!(token.name(), "alice");
        assert_eq!(token.credentials().unwrap().expose_secret(), "s3cret");
    }

    #[test]
    fn test_debug_redacts_secret() {
        let token = AuthenticationToken::unauthenticated(
            CredentialKind::USERNAME_PASSWORD,
            "alice",
            "s3cret",
        );
        assert!(!format!("{:?}", token).contains("s3cret"));
    }

    #[test]
    fn test_erase_credentials() {
        let mut token = AuthenticationToken::authenticated(
            CredentialKind::BEARER_TOKEN,
            "svc",
            ["ROLE_SERVICE"],
        )
        .with_credentials("t0k3n");
        token.credentials_container().unwrap().erase_credentials();
        assert!(token.credentials().is_none());
        assert_eq!(token.authorities(), ["ROLE_SERVICE".to_string()]);
    }

    #[test]
    fn test_anonymous_key() {
        let token = AuthenticationToken::anonymous("k3y", "anonymousUser", ["ROLE_ANONYMOUS"]);
        assert_eq!(token.kind(), CredentialKind::ANONYMOUS);
        assert!(token.is_authenticated());
        assert!(token.issued_with("k3y"));
        assert!(!token.issued_with("other"));
    }
}
