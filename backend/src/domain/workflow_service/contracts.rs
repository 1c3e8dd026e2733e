//! Contract units of work.

use std::sync::Arc;

use mockable::Clock;

use super::lookups;
use crate::domain::audit_recorder::{AuditEvent, AuditRecorder};
use crate::domain::ports::WorkflowTransaction;
use crate::domain::timestamps::{next_updated_at, now_micros};
use crate::domain::{
    Actor, Contract, ContractId, ContractPatch, CreateContract, EntityKind, Error,
};

pub(super) async fn create(
    tx: &mut dyn WorkflowTransaction,
    actor: Actor,
    clock: Arc<dyn Clock>,
    command: CreateContract,
) -> Result<Contract, Error> {
    let at = now_micros(clock.as_ref());
    let new = command.validate(at)?;
    if let Some(officer) = new.officer_id {
        lookups::assignable_officer(tx, officer).await?;
    }
    let contract = tx.insert_contract(new).await?;
    let event = AuditEvent::created(EntityKind::Contract, contract.id, contract.snapshot());
    AuditRecorder::record(tx, &actor, at, event).await?;
    Ok(contract)
}

pub(super) async fn update(
    tx: &mut dyn WorkflowTransaction,
    actor: Actor,
    clock: Arc<dyn Clock>,
    id: ContractId,
    patch: ContractPatch,
) -> Result<Contract, Error> {
    let current = lookups::contract(tx, id).await?;
    if let Some(Some(officer)) = patch.officer_change(&current) {
        lookups::assignable_officer(tx, officer).await?;
    }
    let at = next_updated_at(clock.as_ref(), current.updated_at);
    let updated = patch.apply(&current, at);
    tx.update_contract(&updated).await?;
    let event = AuditEvent::updated(
        EntityKind::Contract,
        id,
        current.snapshot(),
        updated.snapshot(),
    );
    AuditRecorder::record(tx, &actor, at, event).await?;
    Ok(updated)
}

/// Child tasks are left in place.
pub(super) async fn delete(
    tx: &mut dyn WorkflowTransaction,
    actor: Actor,
    clock: Arc<dyn Clock>,
    id: ContractId,
) -> Result<(), Error> {
    let current = lookups::contract(tx, id).await?;
    tx.delete_contract(id).await?;
    let event = AuditEvent::deleted(EntityKind::Contract, id, current.snapshot());
    AuditRecorder::record(tx, &actor, now_micros(clock.as_ref()), event).await?;
    Ok(())
}
