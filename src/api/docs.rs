//! OpenAPI document for the auth surface, served as plain JSON.

use axum::{routing::get, Json, Router};
use utoipa::OpenApi;

use super::handlers::{auth, health};

#[derive(OpenApi)]
#[openapi(
    paths(
        auth::login_handler,
        auth::register_handler,
        auth::add_role_handler,
        health::health_handler,
    ),
    components(schemas(
        auth::LoginBody,
        auth::RegisterBody,
        auth::AddRoleBody,
        auth::TokenResponse,
        auth::MessageResponse,
        health::HealthResponse,
    )),
    tags(
        (name = "auth", description = "Staff authentication and role management"),
        (name = "health", description = "Liveness probe")
    )
)]
struct ApiDoc;

pub fn docs_router() -> Router {
    Router::new().route("/api-docs/openapi.json", get(serve_openapi))
}

async fn serve_openapi() -> Json<utoipa::openapi::OpenApi> {
    Json(ApiDoc::openapi())
}
