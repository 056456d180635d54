//! DTOs for decoding identity-service responses.
//!
//! Every response is wrapped in `{code, message, data}`. A successful user
//! lookup carries `data.user`.

use chrono::{DateTime, Utc};
use serde::Deserialize;

use crate::domain::{AuthorId, AuthorView};

/// Wire code for success.
pub(super) const CODE_SUCCESS: &str = "000";
/// Wire code for a missing user.
pub(super) const CODE_NOT_FOUND: &str = "005";
/// Wire code for invalid lookup arguments.
pub(super) const CODE_INVALID_ARGUMENT: &str = "003";
/// Wire code for a temporarily unavailable identity service.
pub(super) const CODE_UNAVAILABLE: &str = "015";

#[derive(Debug, Deserialize)]
pub(super) struct UserEnvelopeDto {
    pub(super) code: String,
    #[serde(default)]
    pub(super) message: String,
    #[serde(default)]
    pub(super) data: Option<UserDataDto>,
}

#[derive(Debug, Deserialize)]
pub(super) struct UserDataDto {
    pub(super) user: Option<UserDto>,
}

#[derive(Debug, Deserialize)]
pub(super) struct UserDto {
    pub(super) id: i64,
    pub(super) name: String,
    pub(super) email: String,
    pub(super) created_at: DateTime<Utc>,
    pub(super) updated_at: DateTime<Utc>,
}

impl UserEnvelopeDto {
    /// Take the user out of a success envelope.
    pub(super) fn into_user(self) -> Option<UserDto> {
        self.data.and_then(|data| data.user)
    }
}

impl UserDto {
    pub(super) fn into_author(self, requested: AuthorId) -> Result<AuthorView, String> {
        let id = AuthorId::new(self.id).map_err(|error| format!("user id {}: {error}", self.id))?;
        if id != requested {
            return Err(format!("asked for user {requested}, received user {id}"));
        }
        Ok(AuthorView {
            id,
            name: self.name,
            email: self.email,
            created_at: self.created_at,
            updated_at: self.updated_at,
        })
    }
}
