//! Task units of work.

use std::sync::Arc;

use mockable::Clock;

use super::lookups;
use crate::domain::audit_recorder::{AuditEvent, AuditRecorder};
use crate::domain::ports::WorkflowTransaction;
use crate::domain::timestamps::{next_updated_at, now_micros};
use crate::domain::{Actor, CreateTask, EntityKind, Error, Task, TaskId, TaskPatch};

pub(super) async fn create(
    tx: &mut dyn WorkflowTransaction,
    actor: Actor,
    clock: Arc<dyn Clock>,
    command: CreateTask,
) -> Result<Task, Error> {
    let at = now_micros(clock.as_ref());
    let new = command.validate(at)?;
    lookups::contract(tx, new.contract_id).await?;
    if let Some(assignee) = new.assigned_to {
        lookups::active_assignee(tx, assignee).await?;
    }
    let task = tx.insert_task(new).await?;
    let event = AuditEvent::created(EntityKind::Task, task.id, task.snapshot());
    AuditRecorder::record(tx, &actor, at, event).await?;
    Ok(task)
}

pub(super) async fn update(
    tx: &mut dyn WorkflowTransaction,
    actor: Actor,
    clock: Arc<dyn Clock>,
    id: TaskId,
    patch: TaskPatch,
) -> Result<Task, Error> {
    let current = lookups::task(tx, id).await?;
    if let Some(Some(assignee)) = patch.assignee_change(&current) {
        lookups::active_assignee(tx, assignee).await?;
    }
    let at = next_updated_at(clock.as_ref(), current.updated_at);
    let updated = patch.apply(&current, at);
    tx.update_task(&updated).await?;
    let event = AuditEvent::updated(EntityKind::Task, id, current.snapshot(), updated.snapshot());
    AuditRecorder::record(tx, &actor, at, event).await?;
    Ok(updated)
}

pub(super) async fn delete(
    tx: &mut dyn WorkflowTransaction,
    actor: Actor,
    clock: Arc<dyn Clock>,
    id: TaskId,
) -> Result<(), Error> {
    let current = lookups::task(tx, id).await?;
    tx.delete_task(id).await?;
    let event = AuditEvent::deleted(EntityKind::Task, id, current.snapshot());
    AuditRecorder::record(tx, &actor, now_micros(clock.as_ref()), event).await?;
    Ok(())
}
