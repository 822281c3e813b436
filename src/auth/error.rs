//! Authentication error taxonomy.

use std::fmt;

use super::CredentialKind;

/// Account states that reject authentication outright.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AccountStatus {
    Locked,
    Disabled,
    Expired,
    CredentialsExpired,
}

impl fmt::Display for AccountStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            AccountStatus::Locked => "locked",
            AccountStatus::Disabled => "disabled",
            AccountStatus::Expired => "expired",
            AccountStatus::CredentialsExpired => "credentials expired",
        })
    }
}

/// Why a single strategy turned a credential down.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RejectionReason {
    BadCredentials,
    InsufficientAuthentication,
    CredentialsNotFound,
    Other,
}

impl fmt::Display for RejectionReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            RejectionReason::BadCredentials => "Bad credentials",
            RejectionReason::InsufficientAuthentication => "Insufficient authentication",
            RejectionReason::CredentialsNotFound => "Credentials not found",
            RejectionReason::Other => "Authentication rejected",
        })
    }
}

/// Error returned by strategies and by the chain resolver.
#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum AuthError {
    /// Definitive rejection tied to the account. Stops the chain.
    #[error("Account is {status}: {message}")]
    AccountStatus {
        status: AccountStatus,
        message: String,
    },

    /// A strategy's own dependency failed. Stops the chain.
    #[error("Authentication service failed: {message}")]
    InternalService {
        message: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// Ordinary rejection by one strategy; the next one may still succeed.
    #[error("{reason}: {message}")]
    Rejected {
        reason: RejectionReason,
        message: String,
    },

    /// Nothing could handle the credential's kind.
    #[error("No authentication strategy found for {kind}")]
    ProviderNotFound { kind: CredentialKind },
}

pub type AuthResult<T> = std::result::Result<T, AuthError>;

impl AuthError {
    pub fn bad_credentials(message: impl Into<String>) -> Self {
        Self::rejected(RejectionReason::BadCredentials, message)
    }

    pub fn rejected(reason: RejectionReason, message: impl Into<String>) -> Self {
        AuthError::Rejected {
            reason,
            message: message.into(),
        }
    }

    pub fn account_status(status: AccountStatus, message: impl Into<String>) -> Self {
        AuthError::AccountStatus {
            status,
            message: message.into(),
        }
    }

    pub fn internal(message: impl Into<String>) -> Self {
        AuthError::InternalService {
            message: message.into(),
            source: None,
        }
    }

    pub fn internal_with_source(
        message: impl Into<String>,
        source: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        AuthError::InternalService {
            message: message.into(),
            source: Some(Box::new(source)),
        }
    }

    pub fn provider_not_found(kind: CredentialKind) -> Self {
        AuthError::ProviderNotFound { kind }
    }

    /// Account-status and internal-service errors end resolution at once.
    pub fn is_definitive(&self) -> bool {
        matches!(
            self,
            AuthError::AccountStatus { .. } | AuthError::InternalService { .. }
        )
    }

    pub fn is_provider_not_found(&self) -> bool {
        matches!(self, AuthError::ProviderNotFound { .. })
    }

    /// Stable label for logs and metrics.
    pub fn label(&self) -> &'static str {
        match self {
            AuthError::AccountStatus { .. } => "account_status",
            AuthError::InternalService { .. } => "internal_service",
            AuthError::Rejected { .. } => "rejected",
            AuthError::ProviderNotFound { .. } => "provider_not_found",
        }
    }
}
