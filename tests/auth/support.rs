use std::sync::Arc;
use std::time::Duration;

use axum::{
    body::{to_bytes, Body},
    http::{Method, Request, Response},
    routing::get,
    Router,
};
use serde::de::DeserializeOwned;
use serde_json::Value;
use sqlx::sqlite::SqlitePoolOptions;
use tower::ServiceExt;
use trayline::{
    api::{build_router, ApiState},
    auth::{
        middleware::{authorize, RouteAccess},
        roles::RoleSet,
        CredentialStore, Role, SigningConfig, TokenService,
    },
    storage::{self, DbPool},
};

pub const TEST_SECRET: &str = "trayline-test-secret-0123456789abcdef";

pub struct TestApp {
    pub pool: DbPool,
    pub credential_store: Arc<CredentialStore>,
    pub token_service: Arc<TokenService>,
}

impl TestApp {
    pub fn router(&self) -> Router {
        build_router(ApiState::new(self.credential_store.clone(), self.token_service.clone()))
    }

    /// Router with extra single-role probe routes, for exercising allow-lists
    /// the real surface does not declare.
    pub fn router_with_probes(&self) -> Router {
        let probe = |allow: RoleSet| {
            axum::middleware::from_fn_with_state(
                RouteAccess::new(self.token_service.clone(), allow),
                authorize,
            )
        };

        self.router()
            .merge(
                Router::new()
                    .route("/probe/admin", get(|| async { "ok" }))
                    .route_layer(probe(RoleSet::of(&[Role::Admin]))),
            )
            .merge(
                Router::new()
                    .route("/probe/chef", get(|| async { "ok" }))
                    .route_layer(probe(RoleSet::of(&[Role::Chef]))),
            )
    }

    /// Mint a token directly, bypassing the HTTP surface.
    pub async fn issue_token(&self, identity: &str, password: &str) -> String {
        let principal =
            self.credential_store.verify(identity, password).await.expect("verify principal");
        self.token_service.create_token(&principal).expect("create token")
    }
}

pub async fn setup_test_app() -> TestApp {
    setup_test_app_with_ttl(Duration::from_secs(3600)).await
}

pub async fn setup_test_app_with_ttl(ttl: Duration) -> TestApp {
    let pool = SqlitePoolOptions::new()
        .max_connections(1)
        .connect("sqlite::memory:")
        .await
        .expect("create sqlite pool");

    storage::run_migrations(&pool).await.expect("run migrations for tests");

    let token_service = Arc::new(TokenService::new(&SigningConfig {
        secret: TEST_SECRET.to_string(),
        issuer: "trayline-test".to_string(),
        ttl,
    }));
    let credential_store = Arc::new(CredentialStore::with_sqlx(pool.clone()));

    TestApp { pool, credential_store, token_service }
}

pub async fn send_request(
    router: Router,
    method: Method,
    path: &str,
    token: Option<&str>,
    body: Option<Value>,
) -> Response<Body> {
    let mut builder = Request::builder().method(method).uri(path);
    if let Some(token) = token {
        builder = builder.header("Authorization", format!("Bearer {}", token));
    }

    let request = if let Some(json) = body {
        let bytes = serde_json::to_vec(&json).expect("serialize body");
        builder
            .header("content-type", "application/json")
            .body(Body::from(bytes))
            .expect("build request")
    } else {
        builder.body(Body::empty()).expect("build request")
    };

    router.oneshot(request).await.expect("send request")
}

pub async fn read_json<T: DeserializeOwned>(response: Response<Body>) -> T {
    let bytes = to_bytes(response.into_body(), usize::MAX).await.expect("read body");
    serde_json::from_slice(&bytes).expect("parse json body")
}
