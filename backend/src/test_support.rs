//! Test utilities for the backend crate.
//!
//! Shared by unit tests in `src/` and integration tests in `tests/`. Only
//! compiled for tests or with the `test-support` feature.

mod article_enrichment;

pub use article_enrichment::{
    MutableClock, RecordingSleeper, ScriptedAuthorSource, sample_article, sample_author,
    signed_token,
};
