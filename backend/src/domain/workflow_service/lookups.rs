//! Loads and reference checks shared by the units of work.

use serde_json::json;

use crate::domain::ports::WorkflowTransaction;
use crate::domain::{Contract, ContractId, Error, Task, TaskId, User, UserId};

pub(super) async fn contract(
    tx: &mut dyn WorkflowTransaction,
    id: ContractId,
) -> Result<Contract, Error> {
    tx.find_contract(id)
        .await?
        .ok_or_else(|| Error::not_found(format!("contract {id} not found")))
}

pub(super) async fn task(tx: &mut dyn WorkflowTransaction, id: TaskId) -> Result<Task, Error> {
    tx.find_task(id)
        .await?
        .ok_or_else(|| Error::not_found(format!("task {id} not found")))
}

pub(super) async fn user(tx: &mut dyn WorkflowTransaction, id: UserId) -> Result<User, Error> {
    tx.find_user(id)
        .await?
        .ok_or_else(|| Error::not_found(format!("user {id} not found")))
}

/// Contract owners must be active officers.
pub(super) async fn assignable_officer(
    tx: &mut dyn WorkflowTransaction,
    id: UserId,
) -> Result<(), Error> {
    let officer = user(tx, id).await?;
    if officer.is_active_officer() {
        return Ok(());
    }
    Err(
        Error::invalid_request(format!("user {id} is not an active officer")).with_details(
            json!({ "field": "officerId", "code": "not_active_officer" }),
        ),
    )
}

/// Task assignees must be active.
pub(super) async fn active_assignee(
    tx: &mut dyn WorkflowTransaction,
    id: UserId,
) -> Result<(), Error> {
    let assignee = user(tx, id).await?;
    if assignee.active {
        return Ok(());
    }
    Err(Error::invalid_request(format!("user {id} is inactive"))
        .with_details(json!({ "field": "assignedTo", "code": "inactive_user" })))
}
