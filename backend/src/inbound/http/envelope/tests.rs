//! Wire mapping coverage.

use std::collections::HashSet;

use actix_web::body::to_bytes;
use actix_web::{App, test as actix_test};
use rstest::rstest;
use serde_json::{Value, json};

use super::*;

const ALL_CODES: [ErrorCode; 9] = [
    ErrorCode::Unknown,
    ErrorCode::InvalidArgument,
    ErrorCode::NotFound,
    ErrorCode::AlreadyExists,
    ErrorCode::PermissionDenied,
    ErrorCode::Internal,
    ErrorCode::Unauthenticated,
    ErrorCode::Unavailable,
    ErrorCode::Unauthorized,
];

async fn body_of(error: &Error) -> Value {
    let response = ResponseError::error_response(error);
    let bytes = to_bytes(response.into_body()).await.expect("body bytes");
    serde_json::from_slice(&bytes).expect("json body")
}

#[test]
fn wire_codes_are_distinct_and_never_success() {
    let codes: HashSet<_> = ALL_CODES.iter().copied().map(wire_code).collect();
    assert_eq!(codes.len(), ALL_CODES.len());
    assert!(!codes.contains(SUCCESS_CODE));
}

#[rstest]
#[case(ErrorCode::Unknown, "002", StatusCode::REQUEST_TIMEOUT)]
#[case(ErrorCode::InvalidArgument, "003", StatusCode::BAD_REQUEST)]
#[case(ErrorCode::NotFound, "005", StatusCode::NOT_FOUND)]
#[case(ErrorCode::AlreadyExists, "006", StatusCode::CONFLICT)]
#[case(ErrorCode::PermissionDenied, "007", StatusCode::FORBIDDEN)]
#[case(ErrorCode::Internal, "013", StatusCode::INTERNAL_SERVER_ERROR)]
#[case(ErrorCode::Unauthenticated, "014", StatusCode::UNAUTHORIZED)]
#[case(ErrorCode::Unavailable, "015", StatusCode::SERVICE_UNAVAILABLE)]
#[case(ErrorCode::Unauthorized, "016", StatusCode::FORBIDDEN)]
fn codes_map_to_wire_and_status(
    #[case] code: ErrorCode,
    #[case] wire: &str,
    #[case] status: StatusCode,
) {
    assert_eq!(wire_code(code), wire);
    assert_eq!(status_for(code), status);
}

#[rstest]
#[actix_web::test]
async fn not_found_messages_carry_the_hint() {
    let body = body_of(&Error::not_found("article with ID 9 not found")).await;
    assert_eq!(
        body,
        json!({
            "code": "005",
            "message": "article with ID 9 not found Verify the resource ID exists.",
            "data": null,
        })
    );
}

#[rstest]
#[actix_web::test]
async fn internal_messages_are_redacted() {
    let body = body_of(&Error::internal("connection refused at 10.0.0.3:5432")).await;
    assert_eq!(body["code"], "013");
    assert_eq!(
        body["message"],
        "internal server error Contact support if the issue persists."
    );
}

#[rstest]
#[actix_web::test]
async fn unavailable_messages_pass_through() {
    let message = "user service is currently unavailable, please try again later";
    let body = body_of(&Error::unavailable(message)).await;
    assert_eq!(body["code"], "015");
    assert_eq!(body["message"], message);
}

#[test]
fn success_envelopes_use_code_000() {
    let envelope = Envelope::success(json!({"ok": true}));
    assert_eq!(envelope.code, "000");
    assert_eq!(envelope.message, "success");
}

#[actix_web::test]
async fn malformed_json_is_an_invalid_argument() {
    async fn echo(body: web::Json<Value>) -> HttpResponse {
        ok(body.into_inner())
    }

    let app = actix_test::init_service(
        App::new()
            .configure(configure_extractors)
            .route("/echo", web::post().to(echo)),
    )
    .await;
    let req = actix_test::TestRequest::post()
        .uri("/echo")
        .insert_header(("content-type", "application/json"))
        .set_payload("{not json")
        .to_request();
    let res = actix_test::call_service(&app, req).await;

    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    let body: Value = actix_test::read_body_json(res).await;
    assert_eq!(body["code"], "003");
    assert!(body["data"].is_null());
}
