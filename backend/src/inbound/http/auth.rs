//! Sign-in, sign-out and the current-user lookup.
//!
//! Credentials are an upstream concern: the login endpoint trusts the email it
//! is given, the way the deployment's authenticating proxy vouches for it.
//!
//! ```text
//! POST /api/v1/login {"email":"officer1@example.com"}
//! POST /api/v1/logout
//! GET  /api/v1/me
//! ```

use actix_web::{HttpResponse, get, post, web};
use serde::{Deserialize, Serialize};
use tracing::info;
use utoipa::ToSchema;

use crate::domain::{Error, User};
use crate::inbound::http::ApiResult;
use crate::inbound::http::session::SessionContext;
use crate::inbound::http::state::HttpState;
use crate::inbound::http::validation::parse_email;

/// Login request body.
#[derive(Debug, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct LoginRequest {
    /// Account email.
    pub email: String,
    /// Display name used when the account is provisioned on first login.
    #[serde(default)]
    pub name: Option<String>,
}

/// Resolve the signed-in user from the session.
///
/// Unknown or deactivated accounts are rejected with `401`.
pub(crate) async fn current_user(state: &HttpState, session: &SessionContext) -> ApiResult<User> {
    let user_id = session.require_user_id()?;
    state.queries.resolve_actor(user_id).await
}

/// Sign in by email.
#[utoipa::path(
    post,
    path = "/api/v1/login",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Signed in", body = User,
            headers(("Set-Cookie" = String, description = "Session cookie"))),
        (status = 400, description = "Invalid email", body = Error),
        (status = 401, description = "Unknown or inactive account", body = Error),
        (status = 503, description = "Store unavailable", body = Error)
    ),
    tags = ["auth"],
    operation_id = "login",
    security([])
)]
#[post("/login")]
pub async fn login(
    state: web::Data<HttpState>,
    session: SessionContext,
    payload: web::Json<LoginRequest>,
) -> ApiResult<web::Json<User>> {
    let LoginRequest {
        email: raw_email,
        name,
    } = payload.into_inner();
    let email = parse_email("email", &raw_email)?;
    let user = match state.queries.find_user_by_email(&email).await? {
        Some(user) => user,
        None if state.auto_provision => state.commands.provision_user(name, email).await?,
        None => return Err(Error::unauthorized("unknown account")),
    };
    if !user.active {
        return Err(Error::unauthorized("account is inactive"));
    }
    session.persist_user(user.id)?;
    info!(user_id = %user.id, role = %user.role, "user signed in");
    Ok(web::Json(user))
}

/// Forget the session.
#[utoipa::path(
    post,
    path = "/api/v1/logout",
    responses((status = 204, description = "Signed out")),
    tags = ["auth"],
    operation_id = "logout",
    security([])
)]
#[post("/logout")]
pub async fn logout(session: SessionContext) -> HttpResponse {
    session.clear();
    HttpResponse::NoContent().finish()
}

/// The signed-in user.
#[utoipa::path(
    get,
    path = "/api/v1/me",
    responses(
        (status = 200, description = "Current user", body = User),
        (status = 401, description = "Not signed in", body = Error)
    ),
    tags = ["auth"],
    operation_id = "currentUser"
)]
#[get("/me")]
pub async fn me(state: web::Data<HttpState>, session: SessionContext) -> ApiResult<web::Json<User>> {
    current_user(&state, &session).await.map(web::Json)
}

#[cfg(test)]
#[path = "auth_tests.rs"]
mod tests;
