//! End-to-end coverage: HTTP surface, real identity-service client and a
//! stubbed identity service.

use std::sync::Arc;
use std::time::Duration;

use actix_web::http::StatusCode;
use actix_web::http::header::AUTHORIZATION;
use actix_web::{App, test as actix_test, web};
use rstest::rstest;
use serde_json::{Value, json};
use url::Url;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};
use zeroize::Zeroizing;

use article_backend::domain::ports::NoopTokenRevocationList;
use article_backend::domain::{ArticleService, RetryConfig, RetryPolicy};
use article_backend::inbound::http::state::HttpState;
use article_backend::inbound::http::{api_scope, configure_extractors};
use article_backend::outbound::auth::JwtAccessTokenVerifier;
use article_backend::outbound::persistence::InMemoryArticleRepository;
use article_backend::outbound::user_service::{UserServiceClient, UserServiceClientConfig};
use article_backend::test_support::{RecordingSleeper, signed_token};

const SECRET: &str = "e2e-secret";

fn user_envelope(id: i64) -> Value {
    json!({
        "code": "000",
        "message": "success",
        "data": {
            "user": {
                "id": id,
                "name": "Ada",
                "email": "ada@example.com",
                "created_at": "2025-01-15T09:30:00Z",
                "updated_at": "2025-01-16T10:00:00Z"
            }
        }
    })
}

async fn mount_healthy_user(server: &MockServer, id: i64) {
    Mock::given(method("GET"))
        .and(path(format!("/api/v1/users/{id}")))
        .respond_with(ResponseTemplate::new(200).set_body_json(user_envelope(id)))
        .mount(server)
        .await;
}

async fn mount_outage(server: &MockServer) {
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(503))
        .mount(server)
        .await;
}

struct Deployment {
    state: HttpState,
    sleeper: Arc<RecordingSleeper>,
}

impl Deployment {
    async fn against(server: &MockServer) -> Self {
        Self::with_call_timeout(server, Duration::from_secs(2)).await
    }

    async fn with_call_timeout(server: &MockServer, call_timeout: Duration) -> Self {
        let client = UserServiceClient::connect(UserServiceClientConfig {
            base_url: Url::parse(&server.uri()).expect("mock server url"),
            connect_timeout: Duration::from_secs(1),
            call_timeout,
        })
        .await
        .expect("identity service reachable");
        let sleeper = Arc::new(RecordingSleeper::default());
        let service = Arc::new(ArticleService::new(
            Arc::new(InMemoryArticleRepository::default()),
            Arc::new(client),
            RetryPolicy::with_sleeper(RetryConfig::default(), sleeper.clone()),
        ));
        let state = HttpState::new(
            service.clone(),
            service,
            Arc::new(JwtAccessTokenVerifier::new(Zeroizing::new(SECRET.to_owned()))),
            Arc::new(NoopTokenRevocationList),
        );
        Self { state, sleeper }
    }

    async fn send(&self, request: actix_test::TestRequest) -> (StatusCode, Value) {
        let app = actix_test::init_service(
            App::new()
                .app_data(web::Data::new(self.state.clone()))
                .configure(configure_extractors)
                .service(api_scope()),
        )
        .await;
        let res = actix_test::call_service(&app, request.to_request()).await;
        let status = res.status();
        let body: Value = actix_test::read_body_json(res).await;
        (status, body)
    }
}

fn bearer(user_id: i64) -> (actix_web::http::header::HeaderName, String) {
    (AUTHORIZATION, format!("Bearer {}", signed_token(SECRET, user_id, 3600)))
}

async fn create_article(deployment: &Deployment, user_id: i64) -> i64 {
    let (status, body) = deployment
        .send(
            actix_test::TestRequest::post()
                .uri("/api/v1/articles")
                .insert_header(bearer(user_id))
                .set_json(json!({"title": "Notes", "content": "On engines"})),
        )
        .await;
    assert_eq!(status, StatusCode::CREATED, "create failed: {body}");
    body["data"]["article"]["id"].as_i64().expect("article id")
}

async fn lookups_of(server: &MockServer, user_path: &str) -> usize {
    server
        .received_requests()
        .await
        .unwrap_or_default()
        .into_iter()
        .filter(|req| req.url.path() == user_path)
        .count()
}

#[rstest]
#[actix_web::test]
async fn reads_degrade_during_an_outage_and_recover_afterwards() {
    let server = MockServer::start().await;
    mount_healthy_user(&server, 1).await;
    let deployment = Deployment::against(&server).await;
    let id = create_article(&deployment, 1).await;

    server.reset().await;
    mount_outage(&server).await;
    let (status, body) = deployment
        .send(actix_test::TestRequest::get().uri(&format!("/api/v1/articles/{id}")))
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["code"], "000");
    assert!(body["data"]["article"]["author"].is_null());
    assert_eq!(body["data"]["article"]["title"], "Notes");

    server.reset().await;
    mount_healthy_user(&server, 1).await;
    let (status, body) = deployment
        .send(actix_test::TestRequest::get().uri(&format!("/api/v1/articles/{id}")))
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "success");
    assert_eq!(body["data"]["article"]["author"]["id"], 1);
    assert_eq!(body["data"]["article"]["author"]["name"], "Ada");
}

#[rstest]
#[actix_web::test]
async fn create_fails_unavailable_after_exhausting_retries() {
    let server = MockServer::start().await;
    let deployment = Deployment::against(&server).await;
    mount_outage(&server).await;

    let (status, body) = deployment
        .send(
            actix_test::TestRequest::post()
                .uri("/api/v1/articles")
                .insert_header(bearer(1))
                .set_json(json!({"title": "Notes", "content": "On engines"})),
        )
        .await;

    assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
    assert_eq!(body["code"], "015");
    assert!(body["data"].is_null());
    assert_eq!(lookups_of(&server, "/api/v1/users/1").await, 3);
    assert_eq!(deployment.sleeper.delays().len(), 2);
}

#[rstest]
#[actix_web::test]
async fn an_identity_service_that_never_answers_in_time() {
    let server = MockServer::start().await;
    mount_healthy_user(&server, 1).await;
    let deployment = Deployment::with_call_timeout(&server, Duration::from_millis(100)).await;
    let id = create_article(&deployment, 1).await;

    server.reset().await;
    Mock::given(method("GET"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(user_envelope(1))
                .set_delay(Duration::from_millis(500)),
        )
        .mount(&server)
        .await;

    let (status, body) = deployment
        .send(actix_test::TestRequest::get().uri(&format!("/api/v1/articles/{id}")))
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["code"], "000");
    assert!(body["data"]["article"]["author"].is_null());
    assert_eq!(lookups_of(&server, "/api/v1/users/1").await, 1);

    let (status, body) = deployment
        .send(
            actix_test::TestRequest::post()
                .uri("/api/v1/articles")
                .insert_header(bearer(1))
                .set_json(json!({"title": "Late", "content": "Never confirmed"})),
        )
        .await;
    assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
    assert_eq!(body["code"], "015");
    assert_eq!(lookups_of(&server, "/api/v1/users/1").await, 4);
    assert_eq!(deployment.sleeper.delays().len(), 2);
}

#[rstest]
#[actix_web::test]
async fn create_rejects_an_author_the_identity_service_does_not_know() {
    let server = MockServer::start().await;
    let deployment = Deployment::against(&server).await;
    Mock::given(method("GET"))
        .and(path("/api/v1/users/7"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&server)
        .await;

    let (status, body) = deployment
        .send(
            actix_test::TestRequest::post()
                .uri("/api/v1/articles")
                .insert_header(bearer(7))
                .set_json(json!({"title": "Notes", "content": "On engines"})),
        )
        .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], "003");
    assert_eq!(lookups_of(&server, "/api/v1/users/7").await, 1);
}

#[rstest]
#[actix_web::test]
async fn deleted_articles_are_not_found() {
    let server = MockServer::start().await;
    mount_healthy_user(&server, 1).await;
    let deployment = Deployment::against(&server).await;
    let id = create_article(&deployment, 1).await;

    let (status, body) = deployment
        .send(
            actix_test::TestRequest::delete()
                .uri(&format!("/api/v1/articles/{id}"))
                .insert_header(bearer(1)),
        )
        .await;
    assert_eq!(status, StatusCode::OK, "delete failed: {body}");
    assert_eq!(body["code"], "000");

    let (status, body) = deployment
        .send(actix_test::TestRequest::get().uri(&format!("/api/v1/articles/{id}")))
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["code"], "005");
    assert!(
        body["message"]
            .as_str()
            .is_some_and(|m| m.ends_with("Verify the resource ID exists."))
    );
}
