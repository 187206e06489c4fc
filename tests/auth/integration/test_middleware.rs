//! Authorization middleware behavior at the HTTP boundary: public
//! passthrough, bearer parsing, tamper/expiry rejection, and the 401/403
//! split.

use std::time::Duration;

use axum::http::{header::AUTHORIZATION, Method, Request, StatusCode};
use axum::body::Body;
use serde_json::json;
use tower::ServiceExt;
use trayline::auth::Role;

use crate::support::{send_request, setup_test_app, setup_test_app_with_ttl};

async fn register_chef(app: &crate::support::TestApp) -> String {
    let response = send_request(
        app.router(),
        Method::POST,
        "/auth/register?role=CHEF",
        None,
        Some(json!({ "identity": "chef@x.dk", "password": "pw1" })),
    )
    .await;
    assert_eq!(response.status(), StatusCode::CREATED);
    app.issue_token("chef@x.dk", "pw1").await
}

#[tokio::test]
async fn public_route_needs_no_authorization_header() {
    let app = setup_test_app().await;
    let response = send_request(app.router(), Method::GET, "/health", None, None).await;
    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn protected_route_without_header_is_unauthorized() {
    let app = setup_test_app().await;
    let response = send_request(
        app.router(),
        Method::POST,
        "/auth/user/addrole",
        None,
        Some(json!({ "role": "NURSE" })),
    )
    .await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn malformed_authorization_headers_are_unauthorized() {
    let app = setup_test_app().await;
    let token = register_chef(&app).await;

    for header in [
        "Bearer".to_string(),
        format!("bearer {}", token),
        format!("Token {}", token),
        format!("Bearer {} extra", token),
    ] {
        let request = Request::builder()
            .method(Method::POST)
            .uri("/auth/user/addrole")
            .header(AUTHORIZATION, header.clone())
            .header("content-type", "application/json")
            .body(Body::from(serde_json::to_vec(&json!({ "role": "NURSE" })).unwrap()))
            .unwrap();

        let response = app.router().oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED, "header: {header:?}");
    }
}

#[tokio::test]
async fn tampered_token_is_unauthorized() {
    let app = setup_test_app().await;
    let token = register_chef(&app).await;

    let mut segments: Vec<String> = token.split('.').map(str::to_string).collect();
    let flipped = if segments[1].as_bytes()[0] == b'A' { "B" } else { "A" };
    segments[1].replace_range(0..1, flipped);
    let tampered = segments.join(".");

    let response = send_request(
        app.router(),
        Method::POST,
        "/auth/user/addrole",
        Some(&tampered),
        Some(json!({ "role": "NURSE" })),
    )
    .await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn expired_token_is_unauthorized_despite_valid_signature() {
    let app = setup_test_app_with_ttl(Duration::ZERO).await;
    let token = register_chef(&app).await;

    let response = send_request(
        app.router(),
        Method::POST,
        "/auth/user/addrole",
        Some(&token),
        Some(json!({ "role": "NURSE" })),
    )
    .await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn authentic_caller_with_wrong_role_is_forbidden_not_unauthorized() {
    let app = setup_test_app().await;
    let token = register_chef(&app).await;

    let response =
        send_request(app.router_with_probes(), Method::GET, "/probe/admin", Some(&token), None)
            .await;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn matching_role_reaches_the_handler() {
    let app = setup_test_app().await;
    let token = register_chef(&app).await;

    let response =
        send_request(app.router_with_probes(), Method::GET, "/probe/chef", Some(&token), None)
            .await;
    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn lowercase_role_query_still_matches_uppercase_allow_list() {
    let app = setup_test_app().await;

    let response = send_request(
        app.router(),
        Method::POST,
        "/auth/register?role=chef",
        None,
        Some(json!({ "identity": "chef@x.dk", "password": "pw1" })),
    )
    .await;
    assert_eq!(response.status(), StatusCode::CREATED);

    let token = app.issue_token("chef@x.dk", "pw1").await;
    let response =
        send_request(app.router_with_probes(), Method::GET, "/probe/chef", Some(&token), None)
            .await;
    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn admin_probe_admits_seeded_admin() {
    let app = setup_test_app().await;
    app.credential_store.create("root@x.dk", "pw1", None, Role::Admin).await.unwrap();
    let token = app.issue_token("root@x.dk", "pw1").await;

    let response =
        send_request(app.router_with_probes(), Method::GET, "/probe/admin", Some(&token), None)
            .await;
    assert_eq!(response.status(), StatusCode::OK);
}
