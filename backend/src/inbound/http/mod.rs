//! HTTP inbound adapter exposing the article API.

pub mod articles;
pub mod auth;
pub mod envelope;
pub mod health;
pub mod state;

use actix_web::{Scope, web};

pub use envelope::{ApiResult, configure_extractors};

/// Versioned API scope with every article endpoint.
///
/// # Examples
/// ```
/// use actix_web::App;
/// use article_backend::inbound::http::{api_scope, configure_extractors};
///
/// let _app = App::new().configure(configure_extractors).service(api_scope());
/// ```
pub fn api_scope() -> Scope {
    web::scope("/api/v1")
        .service(articles::create_article)
        .service(articles::list_articles)
        .service(articles::get_article)
        .service(articles::update_article)
        .service(articles::delete_article)
}
