//! Translate port failures into domain errors.

use tracing::error;

use crate::domain::ports::{ArticleRepositoryError, UpstreamOutcome};
use crate::domain::{AuthorId, Error, RetryReport};

pub(super) fn map_repository_error(error: ArticleRepositoryError) -> Error {
    match error {
        ArticleRepositoryError::NotFound { id } => {
            Error::not_found(format!("article with ID {id} not found"))
        }
        ArticleRepositoryError::Conflict { message } => {
            error!(%message, "article write conflicted");
            Error::already_exists("article already exists")
        }
        ArticleRepositoryError::Connection { message }
        | ArticleRepositoryError::Query { message } => {
            error!(%message, "article storage failed");
            Error::internal("failed to access article storage")
        }
    }
}

/// Decide whether a retried author check lets creation proceed.
///
/// A missing author is the caller's fault; a transient failure is ours and
/// temporary; anything else is an internal failure.
pub(super) fn map_verification_outcome(
    author_id: AuthorId,
    report: &RetryReport,
) -> Result<(), Error> {
    match &report.outcome {
        UpstreamOutcome::Found(_) => Ok(()),
        UpstreamOutcome::NotFound => Err(Error::invalid_argument(format!(
            "user with ID {author_id} not found"
        ))),
        UpstreamOutcome::TransientFailure(kind) => {
            error!(
                %author_id,
                attempts = report.attempts,
                ?kind,
                "user service unavailable while verifying author"
            );
            Err(Error::unavailable(
                "user service is currently unavailable, please try again later",
            ))
        }
        UpstreamOutcome::PermanentFailure(kind) => {
            error!(%author_id, ?kind, "user service returned an unusable response");
            Err(Error::internal("failed to verify author"))
        }
    }
}

#[cfg(test)]
mod tests {
    //! Mapping totality.

    use rstest::rstest;

    use super::*;
    use crate::domain::ErrorCode;
    use crate::domain::ports::{PermanentKind, TransientKind};
    use crate::test_support::sample_author;

    #[rstest]
    #[case(ArticleRepositoryError::not_found(3), ErrorCode::NotFound)]
    #[case(ArticleRepositoryError::conflict("dup"), ErrorCode::AlreadyExists)]
    #[case(ArticleRepositoryError::connection("refused"), ErrorCode::Internal)]
    #[case(ArticleRepositoryError::query("syntax"), ErrorCode::Internal)]
    fn repository_errors_map_to_codes(
        #[case] error: ArticleRepositoryError,
        #[case] expected: ErrorCode,
    ) {
        assert_eq!(map_repository_error(error).code(), expected);
    }

    #[test]
    fn storage_text_is_not_exposed() {
        let mapped = map_repository_error(ArticleRepositoryError::query("relation missing"));
        assert!(!mapped.message().contains("relation"));
    }

    #[rstest]
    #[case(UpstreamOutcome::NotFound, ErrorCode::InvalidArgument)]
    #[case(
        UpstreamOutcome::TransientFailure(TransientKind::Timeout),
        ErrorCode::Unavailable
    )]
    #[case(
        UpstreamOutcome::PermanentFailure(PermanentKind::UnexpectedStatus(500)),
        ErrorCode::Internal
    )]
    fn failed_verification_maps_to_distinct_codes(
        #[case] outcome: UpstreamOutcome,
        #[case] expected: ErrorCode,
    ) {
        let author_id = AuthorId::new(5).expect("valid id");
        let report = RetryReport {
            outcome,
            attempts: 3,
        };
        let error = map_verification_outcome(author_id, &report).expect_err("must fail");
        assert_eq!(error.code(), expected);
    }

    #[test]
    fn found_author_passes_verification() {
        let author_id = AuthorId::new(5).expect("valid id");
        let report = RetryReport {
            outcome: UpstreamOutcome::Found(sample_author(5)),
            attempts: 1,
        };
        assert_eq!(map_verification_outcome(author_id, &report), Ok(()));
    }
}
