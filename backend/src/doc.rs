//! OpenAPI document for the article API.
//!
//! Registers the article and health paths plus a bearer security scheme for
//! the write endpoints. Served by Swagger UI in debug builds and printed by
//! the `openapi-dump` binary.

use utoipa::openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme};
use utoipa::{Modify, OpenApi};

use crate::inbound::http::envelope::ErrorEnvelope;

struct BearerAddon;

impl Modify for BearerAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        let components = openapi
            .components
            .get_or_insert_with(utoipa::openapi::Components::default);
        components.add_security_scheme(
            "bearer",
            SecurityScheme::Http(
                HttpBuilder::new()
                    .scheme(HttpAuthScheme::Bearer)
                    .bearer_format("JWT")
                    .description(Some("HS256 token issued by the identity service."))
                    .build(),
            ),
        );
    }
}

/// OpenAPI document for the REST API.
#[derive(OpenApi)]
#[openapi(
    modifiers(&BearerAddon),
    info(
        title = "Article service API",
        description = "Articles enriched with author data from the identity service. Every body is a {code, message, data} envelope."
    ),
    servers((url = "/", description = "Relative to the deployment base URL")),
    paths(
        crate::inbound::http::articles::create_article,
        crate::inbound::http::articles::get_article,
        crate::inbound::http::articles::list_articles,
        crate::inbound::http::articles::update_article,
        crate::inbound::http::articles::delete_article,
        crate::inbound::http::health::ready,
        crate::inbound::http::health::live,
    ),
    components(schemas(ErrorEnvelope)),
    tags(
        (name = "articles", description = "Article storage with author enrichment"),
        (name = "health", description = "Liveness and readiness probes")
    )
)]
pub struct ApiDoc;
