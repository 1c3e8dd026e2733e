//! Task endpoints.
//!
//! ```text
//! GET    /api/v1/tasks?status=&assignedTo=&dueBefore=&contractId=
//! POST   /api/v1/tasks
//! GET    /api/v1/tasks/{id}
//! PATCH  /api/v1/tasks/{id}
//! DELETE /api/v1/tasks/{id}
//! ```

use actix_web::{HttpResponse, delete, get, patch, post, web};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};

use crate::domain::{
    ContractId, CreateTask, Error, Task, TaskFilter, TaskId, TaskPatch, TaskStatus, UserId,
};
use crate::inbound::http::ApiResult;
use crate::inbound::http::auth::current_user;
use crate::inbound::http::session::SessionContext;
use crate::inbound::http::state::HttpState;
use crate::inbound::http::validation::{deserialize_clearable_text, deserialize_some};

/// Task listing filters.
#[derive(Debug, Default, Deserialize, IntoParams)]
#[serde(rename_all = "camelCase")]
#[into_params(parameter_in = Query)]
pub struct TaskListQuery {
    /// Exact status.
    pub status: Option<TaskStatus>,
    /// Assignee.
    #[param(value_type = Option<i64>)]
    pub assigned_to: Option<UserId>,
    /// Due on or before this date.
    pub due_before: Option<NaiveDate>,
    /// Parent contract.
    #[param(value_type = Option<i64>)]
    pub contract_id: Option<ContractId>,
}

impl From<TaskListQuery> for TaskFilter {
    fn from(query: TaskListQuery) -> Self {
        Self {
            status: query.status,
            assigned_to: query.assigned_to,
            due_on_or_before: query.due_before,
            contract_id: query.contract_id,
        }
    }
}

/// Body of `POST /tasks`.
#[derive(Debug, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateTaskRequest {
    /// Parent contract; must exist.
    #[schema(value_type = i64)]
    pub contract_id: ContractId,
    /// Required.
    #[serde(default)]
    pub description: String,
    /// Defaults to to_do; done stamps the completion time.
    pub status: Option<TaskStatus>,
    /// Must be an active user.
    #[schema(value_type = Option<i64>)]
    pub assigned_to: Option<UserId>,
    /// Due date.
    pub due_date: Option<NaiveDate>,
    /// Free-form notes.
    pub notes: Option<String>,
}

impl From<CreateTaskRequest> for CreateTask {
    fn from(body: CreateTaskRequest) -> Self {
        Self {
            contract_id: body.contract_id,
            description: body.description,
            status: body.status,
            assigned_to: body.assigned_to,
            due_date: body.due_date,
            notes: body.notes,
        }
    }
}

/// Body of `PATCH /tasks/{id}`.
#[derive(Debug, Default, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdateTaskRequest {
    /// Blank keeps the stored description.
    pub description: Option<String>,
    /// Moving to done stamps the completion time once.
    pub status: Option<TaskStatus>,
    /// `null` unassigns.
    #[serde(default, deserialize_with = "deserialize_some")]
    #[schema(value_type = Option<i64>, nullable)]
    pub assigned_to: Option<Option<UserId>>,
    /// `null` clears.
    #[serde(default, deserialize_with = "deserialize_some")]
    #[schema(value_type = Option<NaiveDate>, nullable)]
    pub due_date: Option<Option<NaiveDate>>,
    /// Blank or `null` clears.
    #[serde(default, deserialize_with = "deserialize_clearable_text")]
    #[schema(nullable)]
    pub notes: Option<String>,
}

impl From<UpdateTaskRequest> for TaskPatch {
    fn from(body: UpdateTaskRequest) -> Self {
        Self {
            description: body.description,
            status: body.status,
            assigned_to: body.assigned_to,
            due_date: body.due_date,
            notes: body.notes,
        }
    }
}

/// List tasks, most recently updated first.
#[utoipa::path(
    get,
    path = "/api/v1/tasks",
    params(TaskListQuery),
    responses(
        (status = 200, description = "Tasks", body = [Task]),
        (status = 400, description = "Invalid filter", body = Error),
        (status = 401, description = "Not signed in", body = Error)
    ),
    tags = ["tasks"],
    operation_id = "listTasks"
)]
#[get("/tasks")]
pub async fn list_tasks(
    state: web::Data<HttpState>,
    session: SessionContext,
    query: web::Query<TaskListQuery>,
) -> ApiResult<web::Json<Vec<Task>>> {
    let actor = current_user(&state, &session).await?;
    let tasks = state
        .queries
        .list_tasks(&actor, query.into_inner().into())
        .await?;
    Ok(web::Json(tasks))
}

/// Create a task.
#[utoipa::path(
    post,
    path = "/api/v1/tasks",
    request_body = CreateTaskRequest,
    responses(
        (status = 201, description = "Created", body = Task),
        (status = 400, description = "Validation failed", body = Error),
        (status = 403, description = "Role may not create tasks", body = Error),
        (status = 404, description = "Contract or assignee not found", body = Error)
    ),
    tags = ["tasks"],
    operation_id = "createTask"
)]
#[post("/tasks")]
pub async fn create_task(
    state: web::Data<HttpState>,
    session: SessionContext,
    payload: web::Json<CreateTaskRequest>,
) -> ApiResult<HttpResponse> {
    let actor = current_user(&state, &session).await?;
    let task = state
        .commands
        .create_task(&actor, payload.into_inner().into())
        .await?;
    Ok(HttpResponse::Created().json(task))
}

/// Fetch one task.
#[utoipa::path(
    get,
    path = "/api/v1/tasks/{id}",
    params(("id" = i64, Path, description = "Task id")),
    responses(
        (status = 200, description = "Task", body = Task),
        (status = 404, description = "No such task", body = Error)
    ),
    tags = ["tasks"],
    operation_id = "getTask"
)]
#[get("/tasks/{id}")]
pub async fn get_task(
    state: web::Data<HttpState>,
    session: SessionContext,
    path: web::Path<i64>,
) -> ApiResult<web::Json<Task>> {
    let actor = current_user(&state, &session).await?;
    let task = state
        .queries
        .get_task(&actor, TaskId::new(path.into_inner()))
        .await?;
    Ok(web::Json(task))
}

/// Apply a partial update.
#[utoipa::path(
    patch,
    path = "/api/v1/tasks/{id}",
    params(("id" = i64, Path, description = "Task id")),
    request_body = UpdateTaskRequest,
    responses(
        (status = 200, description = "Updated", body = Task),
        (status = 400, description = "Validation failed", body = Error),
        (status = 403, description = "Role may not update tasks", body = Error),
        (status = 404, description = "No such task or assignee", body = Error)
    ),
    tags = ["tasks"],
    operation_id = "updateTask"
)]
#[patch("/tasks/{id}")]
pub async fn update_task(
    state: web::Data<HttpState>,
    session: SessionContext,
    path: web::Path<i64>,
    payload: web::Json<UpdateTaskRequest>,
) -> ApiResult<web::Json<Task>> {
    let actor = current_user(&state, &session).await?;
    let task = state
        .commands
        .update_task(&actor, TaskId::new(path.into_inner()), payload.into_inner().into())
        .await?;
    Ok(web::Json(task))
}

/// Delete a task.
#[utoipa::path(
    delete,
    path = "/api/v1/tasks/{id}",
    params(("id" = i64, Path, description = "Task id")),
    responses(
        (status = 204, description = "Deleted"),
        (status = 403, description = "Only admins delete", body = Error),
        (status = 404, description = "No such task", body = Error)
    ),
    tags = ["tasks"],
    operation_id = "deleteTask"
)]
#[delete("/tasks/{id}")]
pub async fn delete_task(
    state: web::Data<HttpState>,
    session: SessionContext,
    path: web::Path<i64>,
) -> ApiResult<HttpResponse> {
    let actor = current_user(&state, &session).await?;
    state
        .commands
        .delete_task(&actor, TaskId::new(path.into_inner()))
        .await?;
    Ok(HttpResponse::NoContent().finish())
}
