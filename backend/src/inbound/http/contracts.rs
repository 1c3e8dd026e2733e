//! Contract endpoints.
//!
//! ```text
//! GET    /api/v1/contracts?status=&officerId=&agency=&naics=
//! POST   /api/v1/contracts
//! GET    /api/v1/contracts/{id}
//! PATCH  /api/v1/contracts/{id}
//! DELETE /api/v1/contracts/{id}
//! ```

use actix_web::{HttpResponse, delete, get, patch, post, web};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};

use crate::domain::{
    Contract, ContractFilter, ContractId, ContractPatch, ContractStatus, CreateContract, Error,
    UserId,
};
use crate::inbound::http::ApiResult;
use crate::inbound::http::auth::current_user;
use crate::inbound::http::session::SessionContext;
use crate::inbound::http::state::HttpState;
use crate::inbound::http::validation::{deserialize_clearable_text, deserialize_some};

/// Contract listing filters.
#[derive(Debug, Default, Deserialize, IntoParams)]
#[serde(rename_all = "camelCase")]
#[into_params(parameter_in = Query)]
pub struct ContractListQuery {
    /// Exact status.
    pub status: Option<ContractStatus>,
    /// Owning officer.
    #[param(value_type = Option<i64>)]
    pub officer_id: Option<UserId>,
    /// Case-sensitive agency substring.
    pub agency: Option<String>,
    /// Exact NAICS code.
    pub naics: Option<String>,
}

impl From<ContractListQuery> for ContractFilter {
    fn from(query: ContractListQuery) -> Self {
        Self {
            status: query.status,
            officer_id: query.officer_id,
            agency_contains: query.agency,
            naics: query.naics,
        }
    }
}

/// Body of `POST /contracts`.
#[derive(Debug, Default, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateContractRequest {
    /// Solicitation number; required.
    #[serde(default)]
    pub number: String,
    /// Title; required.
    #[serde(default)]
    pub title: String,
    /// Awarding agency.
    pub agency: Option<String>,
    /// NAICS industry code.
    pub naics: Option<String>,
    /// Set-aside category.
    pub set_aside: Option<String>,
    /// Free-form notes on the pursuit.
    pub description: Option<String>,
    /// Defaults to draft.
    pub status: Option<ContractStatus>,
    /// Must be an active officer.
    #[schema(value_type = Option<i64>)]
    pub officer_id: Option<UserId>,
    /// Response deadline.
    pub due_date: Option<NaiveDate>,
}

impl From<CreateContractRequest> for CreateContract {
    fn from(body: CreateContractRequest) -> Self {
        Self {
            number: body.number,
            title: body.title,
            agency: body.agency,
            naics: body.naics,
            set_aside: body.set_aside,
            description: body.description,
            status: body.status,
            officer_id: body.officer_id,
            due_date: body.due_date,
        }
    }
}

/// Body of `PATCH /contracts/{id}`.
///
/// Absent fields are kept. Blank or `null` `number`/`title` keep the stored
/// value. Every other nullable field is cleared by `null`, and optional text
/// is also cleared by a blank string.
#[derive(Debug, Default, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdateContractRequest {
    /// New solicitation number.
    pub number: Option<String>,
    /// New title.
    pub title: Option<String>,
    /// Awarding agency.
    #[serde(default, deserialize_with = "deserialize_clearable_text")]
    #[schema(nullable)]
    pub agency: Option<String>,
    /// NAICS industry code.
    #[serde(default, deserialize_with = "deserialize_clearable_text")]
    #[schema(nullable)]
    pub naics: Option<String>,
    /// Set-aside category.
    #[serde(default, deserialize_with = "deserialize_clearable_text")]
    #[schema(nullable)]
    pub set_aside: Option<String>,
    /// Free-form notes on the pursuit.
    #[serde(default, deserialize_with = "deserialize_clearable_text")]
    #[schema(nullable)]
    pub description: Option<String>,
    /// Pipeline status.
    pub status: Option<ContractStatus>,
    /// Owning officer; `null` unassigns.
    #[serde(default, deserialize_with = "deserialize_some")]
    #[schema(value_type = Option<i64>, nullable)]
    pub officer_id: Option<Option<UserId>>,
    /// Response deadline; `null` clears.
    #[serde(default, deserialize_with = "deserialize_some")]
    #[schema(value_type = Option<NaiveDate>, nullable)]
    pub due_date: Option<Option<NaiveDate>>,
}

impl From<UpdateContractRequest> for ContractPatch {
    fn from(body: UpdateContractRequest) -> Self {
        Self {
            number: body.number,
            title: body.title,
            agency: body.agency,
            naics: body.naics,
            set_aside: body.set_aside,
            description: body.description,
            status: body.status,
            officer_id: body.officer_id,
            due_date: body.due_date,
        }
    }
}

/// List contracts, most recently updated first.
#[utoipa::path(
    get,
    path = "/api/v1/contracts",
    params(ContractListQuery),
    responses(
        (status = 200, description = "Contracts", body = [Contract]),
        (status = 400, description = "Invalid filter", body = Error),
        (status = 401, description = "Not signed in", body = Error)
    ),
    tags = ["contracts"],
    operation_id = "listContracts"
)]
#[get("/contracts")]
pub async fn list_contracts(
    state: web::Data<HttpState>,
    session: SessionContext,
    query: web::Query<ContractListQuery>,
) -> ApiResult<web::Json<Vec<Contract>>> {
    let actor = current_user(&state, &session).await?;
    let contracts = state
        .queries
        .list_contracts(&actor, query.into_inner().into())
        .await?;
    Ok(web::Json(contracts))
}

/// Create a contract.
#[utoipa::path(
    post,
    path = "/api/v1/contracts",
    request_body = CreateContractRequest,
    responses(
        (status = 201, description = "Created", body = Contract),
        (status = 400, description = "Validation failed", body = Error),
        (status = 403, description = "Role may not create contracts", body = Error),
        (status = 404, description = "Officer not found", body = Error)
    ),
    tags = ["contracts"],
    operation_id = "createContract"
)]
#[post("/contracts")]
pub async fn create_contract(
    state: web::Data<HttpState>,
    session: SessionContext,
    payload: web::Json<CreateContractRequest>,
) -> ApiResult<HttpResponse> {
    let actor = current_user(&state, &session).await?;
    let contract = state
        .commands
        .create_contract(&actor, payload.into_inner().into())
        .await?;
    Ok(HttpResponse::Created().json(contract))
}

/// Fetch one contract.
#[utoipa::path(
    get,
    path = "/api/v1/contracts/{id}",
    params(("id" = i64, Path, description = "Contract id")),
    responses(
        (status = 200, description = "Contract", body = Contract),
        (status = 404, description = "No such contract", body = Error)
    ),
    tags = ["contracts"],
    operation_id = "getContract"
)]
#[get("/contracts/{id}")]
pub async fn get_contract(
    state: web::Data<HttpState>,
    session: SessionContext,
    path: web::Path<i64>,
) -> ApiResult<web::Json<Contract>> {
    let actor = current_user(&state, &session).await?;
    let contract = state
        .queries
        .get_contract(&actor, ContractId::new(path.into_inner()))
        .await?;
    Ok(web::Json(contract))
}

/// Apply a partial update.
#[utoipa::path(
    patch,
    path = "/api/v1/contracts/{id}",
    params(("id" = i64, Path, description = "Contract id")),
    request_body = UpdateContractRequest,
    responses(
        (status = 200, description = "Updated", body = Contract),
        (status = 400, description = "Validation failed", body = Error),
        (status = 403, description = "Role may not update contracts", body = Error),
        (status = 404, description = "No such contract or officer", body = Error)
    ),
    tags = ["contracts"],
    operation_id = "updateContract"
)]
#[patch("/contracts/{id}")]
pub async fn update_contract(
    state: web::Data<HttpState>,
    session: SessionContext,
    path: web::Path<i64>,
    payload: web::Json<UpdateContractRequest>,
) -> ApiResult<web::Json<Contract>> {
    let actor = current_user(&state, &session).await?;
    let contract = state
        .commands
        .update_contract(
            &actor,
            ContractId::new(path.into_inner()),
            payload.into_inner().into(),
        )
        .await?;
    Ok(web::Json(contract))
}

/// Delete a contract. Its tasks are left in place.
#[utoipa::path(
    delete,
    path = "/api/v1/contracts/{id}",
    params(("id" = i64, Path, description = "Contract id")),
    responses(
        (status = 204, description = "Deleted"),
        (status = 403, description = "Only admins delete", body = Error),
        (status = 404, description = "No such contract", body = Error)
    ),
    tags = ["contracts"],
    operation_id = "deleteContract"
)]
#[delete("/contracts/{id}")]
pub async fn delete_contract(
    state: web::Data<HttpState>,
    session: SessionContext,
    path: web::Path<i64>,
) -> ApiResult<HttpResponse> {
    let actor = current_user(&state, &session).await?;
    state
        .commands
        .delete_contract(&actor, ContractId::new(path.into_inner()))
        .await?;
    Ok(HttpResponse::NoContent().finish())
}

#[cfg(test)]
#[path = "contracts_tests.rs"]
mod tests;
