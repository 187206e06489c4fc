//! Axum middleware enforcing the per-route role allow-list.
//!
//! This is the single enforcement point: the router attaches it in front of
//! every handler, public routes included. A public allow-list authorizes
//! immediately; otherwise the bearer token is required and verified before
//! the role intersection decides between the handler running and a 401/403.

use std::sync::Arc;

use axum::{
    body::Body,
    extract::State,
    http::{header::AUTHORIZATION, Method, Request},
    middleware::Next,
    response::Response,
};
use tracing::{field, info_span, warn};

use crate::api::error::ApiError;
use crate::auth::roles::RoleSet;
use crate::auth::token_service::TokenService;
use crate::errors::{AuthErrorType, Error};

/// Per-route state for [`authorize`]: the shared verifier plus the
/// allow-list the route declared.
#[derive(Clone)]
pub struct RouteAccess {
    pub token_service: Arc<TokenService>,
    pub allow: RoleSet,
}

impl RouteAccess {
    pub fn new(token_service: Arc<TokenService>, allow: RoleSet) -> Self {
        Self { token_service, allow }
    }
}

/// Middleware entry point authorizing a request against its route's
/// allow-list.
pub async fn authorize(
    State(access): State<RouteAccess>,
    mut request: Request<Body>,
    next: Next,
) -> Result<Response, ApiError> {
    if request.method() == Method::OPTIONS {
        return Ok(next.run(request).await);
    }

    // Public routes skip every further check: no token required, no
    // principal attached.
    if access.allow.is_public() {
        return Ok(next.run(request).await);
    }

    let method = request.method().clone();
    let path = request.uri().path().to_string();
    let correlation_id = uuid::Uuid::new_v4();
    let span = info_span!(
        "auth_middleware.authorize",
        http.method = %method,
        http.path = %path,
        required_roles = %access.allow.summary(),
        auth.identity = field::Empty,
        correlation_id = %correlation_id
    );
    let entered = span.enter();

    let header =
        request.headers().get(AUTHORIZATION).and_then(|value| value.to_str().ok());

    let token = match bearer_token(header) {
        Ok(token) => token,
        Err(err) => {
            warn!(%correlation_id, error = %err, "bearer token missing or malformed");
            return Err(ApiError::from(err));
        }
    };

    let principal = match access.token_service.verify_token(token) {
        Ok(principal) => principal,
        Err(err) => {
            warn!(%correlation_id, error = %err, "token verification failed");
            return Err(ApiError::from(err));
        }
    };
    tracing::Span::current().record("auth.identity", field::display(&principal.identity));

    if !access.allow.allows(&principal.roles) {
        // The caller is known and authentic but lacks privilege: 403, never
        // 401.
        warn!(
            %correlation_id,
            identity = %principal.identity,
            granted = %principal.role_names().join(" "),
            "role check failed"
        );
        return Err(ApiError::from(Error::auth(
            "insufficient role for this route",
            AuthErrorType::InsufficientRole,
        )));
    }

    request.extensions_mut().insert(principal);
    // The span guard is !Send and must not be held across the await below.
    drop(entered);
    Ok(next.run(request).await)
}

/// Extract the token from an `Authorization: Bearer <token>` header.
///
/// The header must split into exactly two space-separated parts with the
/// literal scheme `Bearer`; anything else is rejected before the token is
/// even looked at.
fn bearer_token(header: Option<&str>) -> Result<&str, Error> {
    let header = header
        .ok_or_else(|| Error::auth("bearer token missing", AuthErrorType::MissingToken))?;

    let mut parts = header.split(' ');
    match (parts.next(), parts.next(), parts.next()) {
        (Some("Bearer"), Some(token), None) if !token.is_empty() => Ok(token),
        _ => Err(Error::auth(
            "malformed authorization header",
            AuthErrorType::MalformedToken,
        )),
    }
}
