//! Wire envelope and error mapping for the HTTP adapter.
//!
//! Every response body is `{code, message, data}`. Domain errors carry an
//! [`ErrorCode`]; this module owns the one table turning it into a wire code,
//! an HTTP status and the fixed hint appended to the message. Internal
//! failures are redacted so storage or upstream details never reach callers.

use actix_web::error::{JsonPayloadError, PathError, QueryPayloadError};
use actix_web::http::StatusCode;
use actix_web::{HttpRequest, HttpResponse, ResponseError, web};
use serde::{Deserialize, Serialize};
use tracing::{debug, error};
use utoipa::ToSchema;

use crate::domain::{Error, ErrorCode};

/// Wire code for a successful operation.
pub const SUCCESS_CODE: &str = "000";

/// Message attached to successful responses.
pub const SUCCESS_MESSAGE: &str = "success";

/// Convenient result alias for HTTP handlers.
pub type ApiResult<T> = Result<T, Error>;

/// Wire code for a failure class.
///
/// # Examples
/// ```
/// use article_backend::domain::ErrorCode;
/// use article_backend::inbound::http::envelope::wire_code;
///
/// assert_eq!(wire_code(ErrorCode::Unavailable), "015");
/// ```
#[must_use]
pub const fn wire_code(code: ErrorCode) -> &'static str {
    match code {
        ErrorCode::Unknown => "002",
        ErrorCode::InvalidArgument => "003",
        ErrorCode::NotFound => "005",
        ErrorCode::AlreadyExists => "006",
        ErrorCode::PermissionDenied => "007",
        ErrorCode::Internal => "013",
        ErrorCode::Unauthenticated => "014",
        ErrorCode::Unavailable => "015",
        ErrorCode::Unauthorized => "016",
    }
}

/// HTTP status for a failure class.
#[must_use]
pub const fn status_for(code: ErrorCode) -> StatusCode {
    match code {
        ErrorCode::Unknown => StatusCode::REQUEST_TIMEOUT,
        ErrorCode::InvalidArgument => StatusCode::BAD_REQUEST,
        ErrorCode::NotFound => StatusCode::NOT_FOUND,
        ErrorCode::AlreadyExists => StatusCode::CONFLICT,
        ErrorCode::PermissionDenied | ErrorCode::Unauthorized => StatusCode::FORBIDDEN,
        ErrorCode::Internal => StatusCode::INTERNAL_SERVER_ERROR,
        ErrorCode::Unauthenticated => StatusCode::UNAUTHORIZED,
        ErrorCode::Unavailable => StatusCode::SERVICE_UNAVAILABLE,
    }
}

/// Fixed advisory suffix for a failure class; empty when none applies.
#[must_use]
pub const fn hint_for(code: ErrorCode) -> &'static str {
    match code {
        ErrorCode::InvalidArgument => " Check input parameters for validity.",
        ErrorCode::NotFound => " Verify the resource ID exists.",
        ErrorCode::Unauthenticated => " Provide valid authentication credentials.",
        ErrorCode::PermissionDenied => " Ensure you have the required permissions.",
        ErrorCode::Internal => " Contact support if the issue persists.",
        ErrorCode::Unknown
        | ErrorCode::AlreadyExists
        | ErrorCode::Unavailable
        | ErrorCode::Unauthorized => "",
    }
}

/// Response wrapper shared by every endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct Envelope<T> {
    /// Three-digit outcome code; `000` on success.
    pub code: String,
    /// Human-readable outcome.
    pub message: String,
    /// Payload; `null` on failure.
    pub data: Option<T>,
}

impl<T> Envelope<T> {
    /// Successful envelope with the standard message.
    pub fn success(data: T) -> Self {
        Self::success_with_message(SUCCESS_MESSAGE, data)
    }

    /// Successful envelope with an advisory message.
    pub fn success_with_message(message: impl Into<String>, data: T) -> Self {
        Self {
            code: SUCCESS_CODE.to_owned(),
            message: message.into(),
            data: Some(data),
        }
    }
}

/// Failure body as documented in the OpenAPI schema.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct ErrorEnvelope {
    /// Three-digit failure code.
    #[schema(example = "005")]
    pub code: String,
    /// Caller-safe message with advisory hint.
    pub message: String,
    /// Always `null`.
    #[schema(value_type = Object, nullable)]
    pub data: Option<()>,
}

impl From<&Error> for ErrorEnvelope {
    fn from(error: &Error) -> Self {
        let code = error.code();
        let message = match code {
            ErrorCode::Internal => "internal server error",
            _ => error.message(),
        };
        Self {
            code: wire_code(code).to_owned(),
            message: format!("{message}{}", hint_for(code)),
            data: None,
        }
    }
}

impl ResponseError for Error {
    fn status_code(&self) -> StatusCode {
        status_for(self.code())
    }

    fn error_response(&self) -> HttpResponse {
        if self.code() == ErrorCode::Internal {
            error!(message = self.message(), "request failed with internal error");
        } else {
            debug!(code = wire_code(self.code()), message = self.message(), "request failed");
        }
        HttpResponse::build(self.status_code()).json(ErrorEnvelope::from(self))
    }
}

/// `200 OK` with a success envelope.
pub fn ok<T: Serialize>(data: T) -> HttpResponse {
    HttpResponse::Ok().json(Envelope::success(data))
}

/// `201 Created` with a success envelope.
pub fn created<T: Serialize>(data: T) -> HttpResponse {
    HttpResponse::Created().json(Envelope::success(data))
}

fn json_error(error: JsonPayloadError, _req: &HttpRequest) -> actix_web::Error {
    debug!(%error, "rejected request body");
    Error::invalid_argument(format!("invalid request body: {error}")).into()
}

fn query_error(error: QueryPayloadError, _req: &HttpRequest) -> actix_web::Error {
    debug!(%error, "rejected query string");
    Error::invalid_argument(format!("invalid query parameters: {error}")).into()
}

fn path_error(error: PathError, _req: &HttpRequest) -> actix_web::Error {
    debug!(%error, "rejected path parameter");
    Error::invalid_argument(format!("invalid path parameter: {error}")).into()
}

/// Extractor configuration so malformed input yields `003` envelopes.
pub fn configure_extractors(cfg: &mut web::ServiceConfig) {
    cfg.app_data(web::JsonConfig::default().error_handler(json_error))
        .app_data(web::QueryConfig::default().error_handler(query_error))
        .app_data(web::PathConfig::default().error_handler(path_error));
}

#[cfg(test)]
mod tests;
