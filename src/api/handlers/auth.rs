//! Login, registration, and role-grant handlers.

use std::str::FromStr;

use axum::{
    extract::{Query, State},
    http::StatusCode,
    response::IntoResponse,
    Extension, Json,
};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};
use utoipa::{IntoParams, ToSchema};
use validator::Validate;

use crate::api::error::ApiError;
use crate::api::routes::ApiState;
use crate::auth::models::Principal;
use crate::auth::roles::Role;
use crate::errors::{AuthErrorType, Error};

#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct LoginBody {
    #[validate(length(min = 1, max = 128))]
    pub identity: String,
    #[validate(length(min = 1))]
    pub password: String,
}

#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct RegisterBody {
    #[validate(length(min = 1, max = 128))]
    pub identity: String,
    #[validate(length(min = 1))]
    pub password: String,
    #[validate(length(max = 128))]
    pub display_name: Option<String>,
}

#[derive(Debug, Clone, Deserialize, Default, IntoParams)]
pub struct RegisterQuery {
    /// Initial role for the new account; defaults to GUEST
    pub role: Option<String>,
}

#[derive(Debug, Clone, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AddRoleBody {
    pub role: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct TokenResponse {
    pub token: String,
    pub username: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct MessageResponse {
    pub msg: String,
}

#[utoipa::path(
    post,
    path = "/auth/login",
    request_body = LoginBody,
    responses(
        (status = 200, description = "Authenticated", body = TokenResponse),
        (status = 401, description = "Unknown identity or wrong password")
    ),
    tag = "auth"
)]
pub async fn login_handler(
    State(state): State<ApiState>,
    Json(body): Json<LoginBody>,
) -> Result<Json<TokenResponse>, ApiError> {
    body.validate().map_err(Error::from)?;

    let principal = match state.credential_store.verify(&body.identity, &body.password).await {
        Ok(principal) => principal,
        // Unknown identity and wrong password render identically so the
        // login endpoint cannot be used to enumerate accounts. The store
        // already logged which one it was.
        Err(Error::NotFound { .. }) => {
            return Err(ApiError::unauthorized("invalid identity or password"))
        }
        Err(err) if err.is_auth(AuthErrorType::InvalidCredentials) => {
            return Err(ApiError::unauthorized("invalid identity or password"))
        }
        Err(err) => return Err(err.into()),
    };

    let token = state.token_service.create_token(&principal)?;
    info!(identity = %principal.identity, "login token issued");

    Ok(Json(TokenResponse { token, username: principal.identity }))
}

#[utoipa::path(
    post,
    path = "/auth/register",
    request_body = RegisterBody,
    params(RegisterQuery),
    responses(
        (status = 201, description = "Account created", body = TokenResponse),
        (status = 400, description = "Invalid role"),
        (status = 403, description = "ADMIN cannot be self-registered"),
        (status = 409, description = "Identity already registered")
    ),
    tag = "auth"
)]
pub async fn register_handler(
    State(state): State<ApiState>,
    Query(query): Query<RegisterQuery>,
    Json(body): Json<RegisterBody>,
) -> Result<impl IntoResponse, ApiError> {
    body.validate().map_err(Error::from)?;

    let role = match query.role.as_deref() {
        Some(raw) => Role::from_str(raw)
            .map_err(|err| Error::validation(err.to_string()))?,
        None => Role::Guest,
    };
    if role == Role::Public {
        return Err(Error::validation("PUBLIC is not an assignable role").into());
    }
    if role == Role::Admin {
        warn!(identity = %body.identity, "rejected self-registration as ADMIN");
        return Err(ApiError::forbidden("ADMIN accounts cannot be self-registered"));
    }

    let principal = state
        .credential_store
        .create(&body.identity, &body.password, body.display_name.as_deref(), role)
        .await?;

    let token = state.token_service.create_token(&principal)?;
    info!(identity = %principal.identity, role = %role, "registration token issued");

    Ok((
        StatusCode::CREATED,
        Json(TokenResponse { token, username: principal.identity }),
    ))
}

#[utoipa::path(
    post,
    path = "/auth/user/addrole",
    request_body = AddRoleBody,
    responses(
        (status = 200, description = "Role granted", body = MessageResponse),
        (status = 400, description = "Invalid role"),
        (status = 401, description = "Missing or invalid bearer token"),
        (status = 403, description = "Only ADMIN may grant ADMIN"),
        (status = 404, description = "Identity not found")
    ),
    security(("bearerAuth" = [])),
    tag = "auth"
)]
pub async fn add_role_handler(
    State(state): State<ApiState>,
    Extension(principal): Extension<Principal>,
    Json(body): Json<AddRoleBody>,
) -> Result<Json<MessageResponse>, ApiError> {
    let role = Role::from_str(&body.role)
        .map_err(|err| Error::validation(err.to_string()))?;
    if role == Role::Public {
        return Err(Error::validation("PUBLIC is not an assignable role").into());
    }

    // Privilege escalation guard: holding any staff role is enough to reach
    // this route, but only an ADMIN may mint another ADMIN.
    if role == Role::Admin && !principal.has_role(Role::Admin) {
        warn!(identity = %principal.identity, "non-admin attempted to grant ADMIN");
        return Err(ApiError::forbidden("only ADMIN may grant the ADMIN role"));
    }

    let updated = state.credential_store.add_role(&principal.identity, role).await?;

    Ok(Json(MessageResponse {
        msg: format!(
            "role {} granted to {}; roles now: {}",
            role,
            updated.identity,
            updated.role_names().join(", ")
        ),
    }))
}
