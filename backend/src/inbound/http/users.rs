//! User management endpoints.
//!
//! ```text
//! GET   /api/v1/users
//! POST  /api/v1/users {"name":"Officer Two","email":"officer2@example.com","role":"officer"}
//! PATCH /api/v1/users/{id}
//! GET   /api/v1/users/assignable?role=officer
//! ```

use actix_web::{HttpResponse, get, patch, post, web};
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};

use crate::domain::{CreateUser, Error, Role, User, UserId, UserPatch};
use crate::inbound::http::ApiResult;
use crate::inbound::http::auth::current_user;
use crate::inbound::http::session::SessionContext;
use crate::inbound::http::state::HttpState;

fn active_by_default() -> bool {
    true
}

/// Body of `POST /users`.
#[derive(Debug, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateUserRequest {
    /// Display name; required.
    #[serde(default)]
    pub name: String,
    /// Login email; must be unused.
    #[serde(default)]
    pub email: String,
    /// Defaults to officer.
    #[serde(default)]
    pub role: Role,
    /// Defaults to true.
    #[serde(default = "active_by_default")]
    pub active: bool,
}

impl From<CreateUserRequest> for CreateUser {
    fn from(body: CreateUserRequest) -> Self {
        Self {
            name: body.name,
            email: body.email,
            role: body.role,
            active: body.active,
        }
    }
}

/// Body of `PATCH /users/{id}`.
#[derive(Debug, Default, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdateUserRequest {
    /// Blank keeps the current name.
    pub name: Option<String>,
    /// New role.
    pub role: Option<Role>,
    /// Deactivated users cannot sign in or be assigned work.
    pub active: Option<bool>,
}

impl From<UpdateUserRequest> for UserPatch {
    fn from(body: UpdateUserRequest) -> Self {
        Self {
            name: body.name,
            role: body.role,
            active: body.active,
        }
    }
}

/// Role filter for the assignment picker.
#[derive(Debug, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct AssignableQuery {
    /// Only users with this role.
    pub role: Option<Role>,
}

/// Every account, newest first. Admin only.
#[utoipa::path(
    get,
    path = "/api/v1/users",
    responses(
        (status = 200, description = "Users", body = [User]),
        (status = 401, description = "Not signed in", body = Error),
        (status = 403, description = "Admin only", body = Error)
    ),
    tags = ["users"],
    operation_id = "listUsers"
)]
#[get("/users")]
pub async fn list_users(
    state: web::Data<HttpState>,
    session: SessionContext,
) -> ApiResult<web::Json<Vec<User>>> {
    let actor = current_user(&state, &session).await?;
    state.queries.list_users(&actor).await.map(web::Json)
}

/// Create an account. Admin only.
#[utoipa::path(
    post,
    path = "/api/v1/users",
    request_body = CreateUserRequest,
    responses(
        (status = 201, description = "Created", body = User),
        (status = 400, description = "Validation failed or email taken", body = Error),
        (status = 403, description = "Admin only", body = Error)
    ),
    tags = ["users"],
    operation_id = "createUser"
)]
#[post("/users")]
pub async fn create_user(
    state: web::Data<HttpState>,
    session: SessionContext,
    payload: web::Json<CreateUserRequest>,
) -> ApiResult<HttpResponse> {
    let actor = current_user(&state, &session).await?;
    let user = state
        .commands
        .create_user(&actor, payload.into_inner().into())
        .await?;
    Ok(HttpResponse::Created().json(user))
}

/// Rename, change role or (de)activate an account. Admin only.
#[utoipa::path(
    patch,
    path = "/api/v1/users/{id}",
    params(("id" = i64, Path, description = "User id")),
    request_body = UpdateUserRequest,
    responses(
        (status = 200, description = "Updated", body = User),
        (status = 403, description = "Admin only", body = Error),
        (status = 404, description = "No such user", body = Error)
    ),
    tags = ["users"],
    operation_id = "updateUser"
)]
#[patch("/users/{id}")]
pub async fn update_user(
    state: web::Data<HttpState>,
    session: SessionContext,
    path: web::Path<i64>,
    payload: web::Json<UpdateUserRequest>,
) -> ApiResult<web::Json<User>> {
    let actor = current_user(&state, &session).await?;
    state
        .commands
        .update_user(&actor, UserId::new(path.into_inner()), payload.into_inner().into())
        .await
        .map(web::Json)
}

/// Active accounts by name, for assignment pickers.
#[utoipa::path(
    get,
    path = "/api/v1/users/assignable",
    params(AssignableQuery),
    responses(
        (status = 200, description = "Assignable users", body = [User]),
        (status = 401, description = "Not signed in", body = Error)
    ),
    tags = ["users"],
    operation_id = "listAssignableUsers"
)]
#[get("/users/assignable")]
pub async fn list_assignable_users(
    state: web::Data<HttpState>,
    session: SessionContext,
    query: web::Query<AssignableQuery>,
) -> ApiResult<web::Json<Vec<User>>> {
    let actor = current_user(&state, &session).await?;
    state
        .queries
        .list_assignable_users(&actor, query.into_inner().role)
        .await
        .map(web::Json)
}
