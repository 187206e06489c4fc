//! Registration, login, and role-grant flows through the HTTP surface.

use axum::http::{Method, StatusCode};
use serde_json::{json, Value};
use trayline::auth::Role;

use crate::support::{read_json, send_request, setup_test_app};

#[tokio::test]
async fn register_issues_token_with_role_snapshot() {
    let app = setup_test_app().await;

    let response = send_request(
        app.router(),
        Method::POST,
        "/auth/register?role=CHEF",
        None,
        Some(json!({ "identity": "chef@x.dk", "password": "pw1" })),
    )
    .await;

    assert_eq!(response.status(), StatusCode::CREATED);
    let body: Value = read_json(response).await;
    assert_eq!(body["username"], "chef@x.dk");

    let principal = app
        .token_service
        .verify_token(body["token"].as_str().expect("token in body"))
        .expect("verify issued token");
    assert_eq!(principal.identity, "chef@x.dk");
    assert_eq!(principal.roles, vec![Role::Chef]);
}

#[tokio::test]
async fn login_reissues_token_with_identical_claims() {
    let app = setup_test_app().await;

    send_request(
        app.router(),
        Method::POST,
        "/auth/register?role=CHEF",
        None,
        Some(json!({ "identity": "chef@x.dk", "password": "pw1" })),
    )
    .await;

    let response = send_request(
        app.router(),
        Method::POST,
        "/auth/login",
        None,
        Some(json!({ "identity": "chef@x.dk", "password": "pw1" })),
    )
    .await;

    assert_eq!(response.status(), StatusCode::OK);
    let body: Value = read_json(response).await;
    assert_eq!(body["username"], "chef@x.dk");

    let principal =
        app.token_service.verify_token(body["token"].as_str().unwrap()).expect("verify token");
    assert_eq!(principal.identity, "chef@x.dk");
    assert_eq!(principal.roles, vec![Role::Chef]);
}

#[tokio::test]
async fn register_without_role_defaults_to_guest() {
    let app = setup_test_app().await;

    let response = send_request(
        app.router(),
        Method::POST,
        "/auth/register",
        None,
        Some(json!({ "identity": "visitor@x.dk", "password": "pw1" })),
    )
    .await;

    assert_eq!(response.status(), StatusCode::CREATED);
    let body: Value = read_json(response).await;
    let principal = app.token_service.verify_token(body["token"].as_str().unwrap()).unwrap();
    assert_eq!(principal.roles, vec![Role::Guest]);
}

#[tokio::test]
async fn duplicate_registration_yields_exactly_one_success() {
    let app = setup_test_app().await;
    let body = json!({ "identity": "chef@x.dk", "password": "pw1" });

    let first = send_request(
        app.router(),
        Method::POST,
        "/auth/register?role=CHEF",
        None,
        Some(body.clone()),
    )
    .await;
    assert_eq!(first.status(), StatusCode::CREATED);

    let second =
        send_request(app.router(), Method::POST, "/auth/register?role=NURSE", None, Some(body))
            .await;
    assert_eq!(second.status(), StatusCode::CONFLICT);

    // The loser must not have touched the winner's account.
    let principal = app.credential_store.verify("chef@x.dk", "pw1").await.unwrap();
    assert_eq!(principal.roles, vec![Role::Chef]);
}

#[tokio::test]
async fn unknown_role_is_a_named_bad_request() {
    let app = setup_test_app().await;

    let response = send_request(
        app.router(),
        Method::POST,
        "/auth/register?role=SOUS_CHEF",
        None,
        Some(json!({ "identity": "x@x.dk", "password": "pw1" })),
    )
    .await;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body: Value = read_json(response).await;
    assert_eq!(body["error"], "bad_request");
    assert!(body["msg"].as_str().unwrap().contains("SOUS_CHEF"));
}

#[tokio::test]
async fn admin_cannot_be_self_registered() {
    let app = setup_test_app().await;

    let response = send_request(
        app.router(),
        Method::POST,
        "/auth/register?role=ADMIN",
        None,
        Some(json!({ "identity": "mallory@x.dk", "password": "pw1" })),
    )
    .await;

    assert_eq!(response.status(), StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn login_failures_are_indistinguishable_to_the_client() {
    let app = setup_test_app().await;

    send_request(
        app.router(),
        Method::POST,
        "/auth/register?role=CHEF",
        None,
        Some(json!({ "identity": "chef@x.dk", "password": "pw1" })),
    )
    .await;

    let wrong_password = send_request(
        app.router(),
        Method::POST,
        "/auth/login",
        None,
        Some(json!({ "identity": "chef@x.dk", "password": "nope" })),
    )
    .await;
    let unknown_identity = send_request(
        app.router(),
        Method::POST,
        "/auth/login",
        None,
        Some(json!({ "identity": "ghost@x.dk", "password": "pw1" })),
    )
    .await;

    assert_eq!(wrong_password.status(), StatusCode::UNAUTHORIZED);
    assert_eq!(unknown_identity.status(), StatusCode::UNAUTHORIZED);

    let first: Value = read_json(wrong_password).await;
    let second: Value = read_json(unknown_identity).await;
    assert_eq!(first, second, "401 bodies must not reveal whether the identity exists");
}

#[tokio::test]
async fn addrole_grants_and_subsequent_tokens_see_it() {
    let app = setup_test_app().await;

    send_request(
        app.router(),
        Method::POST,
        "/auth/register?role=CHEF",
        None,
        Some(json!({ "identity": "chef@x.dk", "password": "pw1" })),
    )
    .await;
    let token = app.issue_token("chef@x.dk", "pw1").await;

    let response = send_request(
        app.router(),
        Method::POST,
        "/auth/user/addrole",
        Some(&token),
        Some(json!({ "role": "NURSE" })),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);

    // The old token still carries the snapshot; a fresh one sees the grant.
    let old = app.token_service.verify_token(&token).unwrap();
    assert_eq!(old.roles, vec![Role::Chef]);

    let fresh = app.issue_token("chef@x.dk", "pw1").await;
    let principal = app.token_service.verify_token(&fresh).unwrap();
    assert_eq!(principal.roles, vec![Role::Chef, Role::Nurse]);
}

#[tokio::test]
async fn addrole_is_idempotent_over_http() {
    let app = setup_test_app().await;

    send_request(
        app.router(),
        Method::POST,
        "/auth/register?role=CHEF",
        None,
        Some(json!({ "identity": "chef@x.dk", "password": "pw1" })),
    )
    .await;
    let token = app.issue_token("chef@x.dk", "pw1").await;

    for _ in 0..2 {
        let response = send_request(
            app.router(),
            Method::POST,
            "/auth/user/addrole",
            Some(&token),
            Some(json!({ "role": "CHEF" })),
        )
        .await;
        assert_eq!(response.status(), StatusCode::OK);
    }

    let fresh = app.issue_token("chef@x.dk", "pw1").await;
    let principal = app.token_service.verify_token(&fresh).unwrap();
    assert_eq!(principal.roles, vec![Role::Chef]);
}

#[tokio::test]
async fn non_admin_cannot_grant_admin() {
    let app = setup_test_app().await;

    send_request(
        app.router(),
        Method::POST,
        "/auth/register?role=CHEF",
        None,
        Some(json!({ "identity": "chef@x.dk", "password": "pw1" })),
    )
    .await;
    let token = app.issue_token("chef@x.dk", "pw1").await;

    let response = send_request(
        app.router(),
        Method::POST,
        "/auth/user/addrole",
        Some(&token),
        Some(json!({ "role": "ADMIN" })),
    )
    .await;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn admin_can_grant_admin() {
    let app = setup_test_app().await;

    // Admin accounts are seeded out-of-band, not self-registered.
    app.credential_store.create("root@x.dk", "pw1", None, Role::Admin).await.unwrap();
    let token = app.issue_token("root@x.dk", "pw1").await;

    let response = send_request(
        app.router(),
        Method::POST,
        "/auth/user/addrole",
        Some(&token),
        Some(json!({ "role": "ADMIN" })),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn addrole_rejects_unknown_role() {
    let app = setup_test_app().await;

    send_request(
        app.router(),
        Method::POST,
        "/auth/register?role=CHEF",
        None,
        Some(json!({ "identity": "chef@x.dk", "password": "pw1" })),
    )
    .await;
    let token = app.issue_token("chef@x.dk", "pw1").await;

    let response = send_request(
        app.router(),
        Method::POST,
        "/auth/user/addrole",
        Some(&token),
        Some(json!({ "role": "DIETITIAN" })),
    )
    .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}
