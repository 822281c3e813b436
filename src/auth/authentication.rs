//! The authentication abstraction strategies consume and produce.

use std::collections::HashMap;
use std::fmt;

use secrecy::SecretString;
use serde::{Deserialize, Serialize};

use super::CredentialKind;

/// An authentication request or an authenticated principal.
///
/// The chain resolver only looks at [`kind`](Self::kind) for dispatch, at
/// the details slot, and at the optional [`CredentialsContainer`]
/// capability. Everything else is for strategies and callers.
pub trait Authentication: Send + Sync + fmt::Debug {
    fn kind(&self) -> CredentialKind;

    /// Principal name.
    fn name(&self) -> &str;

    fn is_authenticated(&self) -> bool;

    fn authorities(&self) -> &[String] {
        &[]
    }

    /// Secret material proving the principal, if still held.
    fn credentials(&self) -> Option<&SecretString> {
        None
    }

    fn details(&self) -> Option<&AuthenticationDetails> {
        None
    }

    fn set_details(&mut self, _details: AuthenticationDetails) {}

    /// Returns the scrubbing capability if this value holds sensitive
    /// material.
    fn credentials_container(&mut self) -> Option<&mut dyn CredentialsContainer> {
        None
    }
}

/// Values that can drop their sensitive material once it is no longer
/// needed.
pub trait CredentialsContainer {
    fn erase_credentials(&mut self);
}

/// Caller context captured alongside a credential.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthenticationDetails {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub remote_address: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub session_id: Option<String>,
    #[serde(default, skip_serializing_if = "HashMap::is_empty")]
    pub attributes: HashMap<String, String>,
}

impl AuthenticationDetails {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn remote_address(mut self, address: impl Into<String>) -> Self {
        self.remote_address = Some(address.into());
        self
    }

    pub fn session_id(mut self, id: impl Into<String>) -> Self {
        self.session_id = Some(id.into());
        self
    }

    pub fn attribute(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.attributes.insert(key.into(), value.into());
        self
    }
}
