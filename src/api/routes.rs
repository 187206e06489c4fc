//! Router assembly: every route declares its role allow-list here, and the
//! authorization middleware runs in front of each handler, public routes
//! included, so the public short-circuit is exercised rather than bypassed.

use std::sync::Arc;

use axum::{
    middleware,
    routing::{get, post},
    Router,
};
use tower_http::trace::TraceLayer;

use crate::auth::middleware::{authorize, RouteAccess};
use crate::auth::roles::RoleSet;
use crate::auth::{CredentialStore, TokenService};

use super::{
    docs,
    handlers::{add_role_handler, health_handler, login_handler, register_handler},
};

#[derive(Clone)]
pub struct ApiState {
    pub credential_store: Arc<CredentialStore>,
    pub token_service: Arc<TokenService>,
}

impl ApiState {
    pub fn new(credential_store: Arc<CredentialStore>, token_service: Arc<TokenService>) -> Self {
        Self { credential_store, token_service }
    }
}

pub fn build_router(state: ApiState) -> Router {
    let role_layer = {
        let token_service = state.token_service.clone();
        move |allow: RoleSet| {
            middleware::from_fn_with_state(
                RouteAccess::new(token_service.clone(), allow),
                authorize,
            )
        }
    };

    Router::new()
        .merge(
            Router::new()
                .route("/auth/login", post(login_handler))
                .route_layer(role_layer(RoleSet::public())),
        )
        .merge(
            Router::new()
                .route("/auth/register", post(register_handler))
                .route_layer(role_layer(RoleSet::public())),
        )
        .merge(
            Router::new()
                .route("/auth/user/addrole", post(add_role_handler))
                .route_layer(role_layer(RoleSet::authenticated())),
        )
        .merge(
            Router::new()
                .route("/health", get(health_handler))
                .route_layer(role_layer(RoleSet::public())),
        )
        .with_state(state)
        .merge(docs::docs_router())
        .layer(TraceLayer::new_for_http())
}
