//! Driven ports for bearer-credential checks.
//!
//! Credentials are issued by the identity service. Verification proves the
//! signature and expiry and yields the author identity; the revocation list
//! records credentials invalidated at logout.

use async_trait::async_trait;

use crate::domain::AuthorId;

use super::define_port_error;

define_port_error! {
    /// Reasons a bearer credential was rejected.
    pub enum AccessTokenError {
        /// Signature, encoding or claims are invalid.
        Invalid { message: String } => "invalid token: {message}",
        /// The credential is past its expiry.
        Expired => "token has expired",
        /// The credential verified but its identity claim is unusable.
        MissingIdentity => "token carries no usable user identity",
    }
}

define_port_error! {
    /// Failures consulting the revocation list.
    pub enum TokenRevocationError {
        /// Backing store could not be reached.
        Unavailable { message: String } => "token revocation list unavailable: {message}",
    }
}

/// Verify a bearer credential and return its author identity.
#[cfg_attr(test, mockall::automock)]
pub trait AccessTokenVerifier: Send + Sync {
    /// Check signature and expiry, then extract the author identifier.
    fn verify(&self, token: &str) -> Result<AuthorId, AccessTokenError>;
}

/// Look up whether a credential was revoked.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait TokenRevocationList: Send + Sync {
    /// `true` when the credential must be rejected.
    async fn is_revoked(&self, token: &str) -> Result<bool, TokenRevocationError>;
}

/// Revocation list used when no backing store is configured.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopTokenRevocationList;

#[async_trait]
impl TokenRevocationList for NoopTokenRevocationList {
    async fn is_revoked(&self, _token: &str) -> Result<bool, TokenRevocationError> {
        Ok(false)
    }
}
