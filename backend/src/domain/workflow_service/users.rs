//! User units of work.

use std::sync::Arc;

use mockable::Clock;
use serde_json::json;

use super::lookups;
use crate::domain::audit_recorder::{AuditEvent, AuditRecorder};
use crate::domain::fields::{keep_unless_blank, optional_text};
use crate::domain::ports::WorkflowTransaction;
use crate::domain::timestamps::now_micros;
use crate::domain::{
    Actor, CreateUser, Email, EntityKind, Error, NewUser, Role, User, UserId, UserPatch,
};

async fn ensure_email_free(tx: &mut dyn WorkflowTransaction, email: &Email) -> Result<(), Error> {
    if tx.find_user_by_email(email).await?.is_some() {
        return Err(Error::invalid_request(format!("{email} is already registered"))
            .with_details(json!({ "field": "email", "code": "duplicate_email" })));
    }
    Ok(())
}

pub(super) async fn create(
    tx: &mut dyn WorkflowTransaction,
    actor: Actor,
    clock: Arc<dyn Clock>,
    command: CreateUser,
) -> Result<User, Error> {
    let at = now_micros(clock.as_ref());
    let new = command.validate(at)?;
    ensure_email_free(tx, &new.email).await?;
    let user = tx.insert_user(new).await?;
    let event = AuditEvent::created(EntityKind::User, user.id, user.snapshot());
    AuditRecorder::record(tx, &actor, at, event).await?;
    Ok(user)
}

pub(super) async fn update(
    tx: &mut dyn WorkflowTransaction,
    actor: Actor,
    clock: Arc<dyn Clock>,
    id: UserId,
    patch: UserPatch,
) -> Result<User, Error> {
    let current = lookups::user(tx, id).await?;
    let updated = User {
        name: keep_unless_blank(&current.name, patch.name.as_deref()),
        role: patch.role.unwrap_or(current.role),
        active: patch.active.unwrap_or(current.active),
        ..current.clone()
    };
    tx.update_user(&updated).await?;
    let event = AuditEvent::updated(EntityKind::User, id, current.snapshot(), updated.snapshot());
    AuditRecorder::record(tx, &actor, now_micros(clock.as_ref()), event).await?;
    Ok(updated)
}

/// Returns the account and whether it was created by this call. An existing
/// account is returned untouched and nothing is audited.
pub(super) async fn provision(
    tx: &mut dyn WorkflowTransaction,
    clock: Arc<dyn Clock>,
    name: Option<String>,
    email: Email,
) -> Result<(User, bool), Error> {
    if let Some(existing) = tx.find_user_by_email(&email).await? {
        return Ok((existing, false));
    }
    let at = now_micros(clock.as_ref());
    let display_name = optional_text(name).unwrap_or_else(|| local_part(&email).to_owned());
    let new = NewUser {
        name: display_name,
        email,
        role: Role::Officer,
        active: true,
        created_at: at,
    };
    let user = tx.insert_user(new).await?;
    let event = AuditEvent::created(EntityKind::User, user.id, user.snapshot());
    AuditRecorder::record(tx, &Actor::System, at, event).await?;
    Ok((user, true))
}

fn local_part(email: &Email) -> &str {
    let raw = email.as_ref();
    raw.split_once('@').map_or(raw, |(local, _)| local)
}
