//! Bearer authentication for write endpoints.
//!
//! Order of checks: an `Authorization: Bearer <token>` header must be
//! present, the token must verify (signature and expiry), and it must not be
//! on the revocation list. The verified identity is the author of record.

use actix_web::dev::Payload;
use actix_web::http::header::AUTHORIZATION;
use actix_web::{FromRequest, HttpRequest, web};
use futures_util::future::LocalBoxFuture;
use tracing::{debug, warn};

use crate::domain::ports::{AccessTokenError, TokenRevocationError};
use crate::domain::{AuthorId, Error};

use super::state::HttpState;

const BEARER_PREFIX: &str = "Bearer ";

/// Identity proven by the request's bearer credential.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Authenticated {
    author_id: AuthorId,
}

impl Authenticated {
    /// Author encoded in the credential.
    pub fn author_id(self) -> AuthorId {
        self.author_id
    }
}

fn bearer_token(req: &HttpRequest) -> Result<String, Error> {
    let missing = || Error::unauthenticated("authentication required");
    let header = req.headers().get(AUTHORIZATION).ok_or_else(missing)?;
    let value = header.to_str().map_err(|_| missing())?;
    let token = value.strip_prefix(BEARER_PREFIX).ok_or_else(missing)?.trim();
    if token.is_empty() {
        return Err(missing());
    }
    Ok(token.to_owned())
}

fn map_token_error(error: AccessTokenError) -> Error {
    match error {
        AccessTokenError::Invalid { .. } => Error::unauthenticated("invalid token"),
        AccessTokenError::Expired => Error::unauthenticated("token has expired"),
        AccessTokenError::MissingIdentity => {
            Error::unauthorized("token does not identify a user")
        }
    }
}

fn map_revocation_error(error: TokenRevocationError) -> Error {
    warn!(%error, "revocation list unavailable; rejecting credential");
    Error::unavailable("authentication service is currently unavailable")
}

async fn authenticate(state: &HttpState, token: &str) -> Result<Authenticated, Error> {
    let author_id = state.tokens.verify(token).map_err(map_token_error)?;
    let (ctx, _guard) = state.call_context();
    if ctx
        .run(state.revocations.is_revoked(token))
        .await?
        .map_err(map_revocation_error)?
    {
        debug!(%author_id, "revoked credential presented");
        return Err(Error::unauthenticated("token has been revoked"));
    }
    Ok(Authenticated { author_id })
}

impl FromRequest for Authenticated {
    type Error = Error;
    type Future = LocalBoxFuture<'static, Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _payload: &mut Payload) -> Self::Future {
        let state = req.app_data::<web::Data<HttpState>>().cloned();
        let token = bearer_token(req);
        Box::pin(async move {
            let state =
                state.ok_or_else(|| Error::internal("HTTP state is not configured"))?;
            authenticate(&state, &token?).await
        })
    }
}
