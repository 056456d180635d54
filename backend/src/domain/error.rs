//! Domain-level error types.
//!
//! These errors are transport agnostic. The HTTP adapter maps each
//! [`ErrorCode`] to a wire code, a status and a fixed advisory hint.

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use super::article::ArticleValidationError;
use super::call_context::Interrupted;

/// Closed set of failure classes a domain operation can report.
///
/// Every internal failure kind maps to exactly one variant, and no two
/// conditions share one; see the adapter mapping for the wire codes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum ErrorCode {
    /// The caller cancelled the request or its deadline elapsed.
    Unknown,
    /// The request is malformed, fails validation, or references an
    /// author that does not exist.
    InvalidArgument,
    /// The requested article does not exist.
    NotFound,
    /// Storage reported a uniqueness conflict.
    AlreadyExists,
    /// The caller is authenticated but may not perform the operation.
    PermissionDenied,
    /// Storage failure or a permanent upstream failure.
    Internal,
    /// The bearer credential is missing, invalid, expired or revoked.
    Unauthenticated,
    /// A required dependency is temporarily unavailable.
    Unavailable,
    /// The credential verified but carries no usable author identity.
    Unauthorized,
}

impl ErrorCode {
    fn default_message(self) -> &'static str {
        match self {
            Self::Unknown => "request was interrupted",
            Self::InvalidArgument => "invalid argument",
            Self::NotFound => "resource not found",
            Self::AlreadyExists => "resource already exists",
            Self::PermissionDenied => "permission denied",
            Self::Internal => "internal error",
            Self::Unauthenticated => "authentication required",
            Self::Unavailable => "service unavailable",
            Self::Unauthorized => "unauthorized",
        }
    }
}

/// Domain error payload.
///
/// ## Invariants
/// - `message` is non-empty once trimmed; blank messages are replaced by a
///   per-code default at construction.
///
/// # Examples
/// ```
/// use article_backend::domain::{Error, ErrorCode};
///
/// let err = Error::not_found("article with ID 7 not found");
/// assert_eq!(err.code(), ErrorCode::NotFound);
/// assert_eq!(err.message(), "article with ID 7 not found");
///
/// let blank = Error::new(ErrorCode::Internal, "  ");
/// assert_eq!(blank.message(), "internal error");
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Error {
    code: ErrorCode,
    message: String,
}

impl Error {
    /// Create a new error; a blank message falls back to the code default.
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        let message = message.into();
        let message = if message.trim().is_empty() {
            code.default_message().to_owned()
        } else {
            message
        };
        Self { code, message }
    }

    /// Stable machine-readable error code.
    pub fn code(&self) -> ErrorCode {
        self.code
    }

    /// Human-readable message returned to adapters.
    pub fn message(&self) -> &str {
        self.message.as_str()
    }

    /// Convenience constructor for [`ErrorCode::InvalidArgument`].
    pub fn invalid_argument(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::InvalidArgument, message)
    }

    /// Convenience constructor for [`ErrorCode::NotFound`].
    pub fn not_found(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::NotFound, message)
    }

    /// Convenience constructor for [`ErrorCode::AlreadyExists`].
    pub fn already_exists(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::AlreadyExists, message)
    }

    /// Convenience constructor for [`ErrorCode::PermissionDenied`].
    pub fn permission_denied(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::PermissionDenied, message)
    }

    /// Convenience constructor for [`ErrorCode::Internal`].
    pub fn internal(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::Internal, message)
    }

    /// Convenience constructor for [`ErrorCode::Unauthenticated`].
    pub fn unauthenticated(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::Unauthenticated, message)
    }

    /// Convenience constructor for [`ErrorCode::Unavailable`].
    pub fn unavailable(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::Unavailable, message)
    }

    /// Convenience constructor for [`ErrorCode::Unauthorized`].
    pub fn unauthorized(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::Unauthorized, message)
    }
}

impl std::fmt::Display for Error {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl From<Interrupted> for Error {
    fn from(value: Interrupted) -> Self {
        Self::new(ErrorCode::Unknown, value.to_string())
    }
}

impl From<ArticleValidationError> for Error {
    fn from(value: ArticleValidationError) -> Self {
        Self::invalid_argument(value.to_string())
    }
}
