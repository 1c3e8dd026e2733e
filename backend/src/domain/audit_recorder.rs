//! Appends audit entries inside the mutation's transaction.
//!
//! The recorder never swallows failures: an append error is returned to the
//! caller, which propagates it out of the transaction closure so the record
//! change rolls back with it.

use chrono::{DateTime, Utc};
use serde_json::Value;
use tracing::debug;

use super::ports::WorkflowTransaction;
use super::{Actor, AuditAction, AuditEntry, EntityKind, Error, NewAuditEntry};

/// What a mutation did to one record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuditEvent {
    /// Mutation kind.
    pub action: AuditAction,
    /// Record kind.
    pub entity: EntityKind,
    /// Identifier of the mutated record.
    pub entity_id: i64,
    /// Snapshot before the mutation.
    pub before: Option<Value>,
    /// Snapshot after the mutation.
    pub after: Option<Value>,
}

impl AuditEvent {
    /// A record was inserted.
    #[must_use]
    pub fn created(entity: EntityKind, entity_id: impl Into<i64>, after: Value) -> Self {
        Self {
            action: AuditAction::Create,
            entity,
            entity_id: entity_id.into(),
            before: None,
            after: Some(after),
        }
    }

    /// A record was changed.
    #[must_use]
    pub fn updated(
        entity: EntityKind,
        entity_id: impl Into<i64>,
        before: Value,
        after: Value,
    ) -> Self {
        Self {
            action: AuditAction::Update,
            entity,
            entity_id: entity_id.into(),
            before: Some(before),
            after: Some(after),
        }
    }

    /// A record was removed.
    #[must_use]
    pub fn deleted(entity: EntityKind, entity_id: impl Into<i64>, before: Value) -> Self {
        Self {
            action: AuditAction::Delete,
            entity,
            entity_id: entity_id.into(),
            before: Some(before),
            after: None,
        }
    }
}

/// Writes one audit entry per successful mutation.
#[derive(Debug, Default, Clone, Copy)]
pub struct AuditRecorder;

impl AuditRecorder {
    /// Append `event` as performed by `actor` at `at`.
    ///
    /// The actor's display name is copied into the entry so later renames do
    /// not rewrite history.
    pub async fn record(
        tx: &mut dyn WorkflowTransaction,
        actor: &Actor,
        at: DateTime<Utc>,
        event: AuditEvent,
    ) -> Result<AuditEntry, Error> {
        let entry = NewAuditEntry {
            at,
            user_id: actor.user_id(),
            actor: actor.display_name().to_owned(),
            action: event.action,
            entity: event.entity,
            entity_id: event.entity_id,
            before: event.before,
            after: event.after,
        };
        tx.append_audit(entry).await.map_err(|err| {
            debug!(error = %err, "audit append failed");
            Error::from(err)
        })
    }
}
