//! HS256 JWT verification for credentials issued by the identity service.

use jsonwebtoken::errors::ErrorKind;
use jsonwebtoken::{Algorithm, DecodingKey, Validation, decode};
use serde::Deserialize;
use tracing::debug;
use zeroize::Zeroizing;

use crate::domain::AuthorId;
use crate::domain::ports::{AccessTokenError, AccessTokenVerifier};

#[derive(Debug, Deserialize)]
struct Claims {
    #[serde(default)]
    user_id: Option<serde_json::Number>,
}

/// Verifies HS256 signatures and expiry, then extracts `user_id`.
pub struct JwtAccessTokenVerifier {
    key: DecodingKey,
    validation: Validation,
}

impl JwtAccessTokenVerifier {
    /// Build a verifier for the shared secret.
    ///
    /// The caller's copy of the secret is wiped when the wrapper drops; the
    /// decoding key keeps its own bytes.
    pub fn new(secret: Zeroizing<String>) -> Self {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.leeway = 0;
        validation.set_required_spec_claims(&["exp"]);
        Self {
            key: DecodingKey::from_secret(secret.as_bytes()),
            validation,
        }
    }
}

impl std::fmt::Debug for JwtAccessTokenVerifier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("JwtAccessTokenVerifier").finish_non_exhaustive()
    }
}

fn identity(raw: Option<&serde_json::Number>) -> Result<AuthorId, AccessTokenError> {
    let value = raw
        .and_then(serde_json::Number::as_i64)
        .ok_or_else(AccessTokenError::missing_identity)?;
    AuthorId::new(value).map_err(|_| AccessTokenError::missing_identity())
}

impl AccessTokenVerifier for JwtAccessTokenVerifier {
    fn verify(&self, token: &str) -> Result<AuthorId, AccessTokenError> {
        let data = decode::<Claims>(token, &self.key, &self.validation).map_err(|error| {
            debug!(%error, "bearer credential rejected");
            match error.kind() {
                ErrorKind::ExpiredSignature => AccessTokenError::expired(),
                _ => AccessTokenError::invalid(error.to_string()),
            }
        })?;
        identity(data.claims.user_id.as_ref())
    }
}
