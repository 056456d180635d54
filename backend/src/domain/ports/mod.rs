//! Domain ports for the hexagonal boundary.
//!
//! Driving ports ([`ArticleCommand`], [`ArticleQuery`]) are implemented by the
//! domain service and called by inbound adapters. Driven ports are
//! implemented by outbound adapters and called by the domain.

mod macros;
pub(crate) use macros::define_port_error;

mod access_token;
mod article_command;
mod article_query;
mod article_repository;
mod author_source;

#[cfg(test)]
pub use access_token::{MockAccessTokenVerifier, MockTokenRevocationList};
pub use access_token::{
    AccessTokenError, AccessTokenVerifier, NoopTokenRevocationList, TokenRevocationError,
    TokenRevocationList,
};
#[cfg(test)]
pub use article_command::MockArticleCommand;
pub use article_command::ArticleCommand;
#[cfg(test)]
pub use article_query::MockArticleQuery;
pub use article_query::{ArticleQuery, ListArticlesRequest};
#[cfg(test)]
pub use article_repository::MockArticleRepository;
pub use article_repository::{ArticleListing, ArticleRepository, ArticleRepositoryError};
#[cfg(test)]
pub use author_source::MockAuthorSource;
pub use author_source::{AuthorSource, PermanentKind, TransientKind, UpstreamOutcome};
