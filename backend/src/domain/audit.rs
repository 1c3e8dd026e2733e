//! Append-only audit history.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use utoipa::ToSchema;

use super::token::token_enum;
use super::{AuditEntryId, User, UserId};

/// Display name recorded for system-initiated mutations.
pub const SYSTEM_ACTOR: &str = "system";

token_enum! {
    /// Kind of mutation an audit entry records.
    AuditAction as "audit action" {
        /// Record inserted.
        Create => ("create", "Create"),
        /// Record changed.
        Update => ("update", "Update"),
        /// Record removed.
        Delete => ("delete", "Delete"),
    }
}

token_enum! {
    /// Record kind an audit entry refers to.
    EntityKind as "entity kind" {
        /// A [`crate::domain::Contract`].
        Contract => ("contract", "Contract"),
        /// A [`crate::domain::Task`].
        Task => ("task", "Task"),
        /// A [`crate::domain::User`].
        User => ("user", "User"),
    }
}

/// Principal performing a mutation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Actor {
    /// A signed-in user.
    User(User),
    /// The application itself: seeding and auto-provisioning.
    System,
}

impl Actor {
    /// User id recorded in the audit entry; `None` for the system.
    #[must_use]
    pub fn user_id(&self) -> Option<UserId> {
        match self {
            Self::User(user) => Some(user.id),
            Self::System => None,
        }
    }

    /// Display name captured at the time of the action.
    #[must_use]
    pub fn display_name(&self) -> &str {
        match self {
            Self::User(user) => user.name.as_str(),
            Self::System => SYSTEM_ACTOR,
        }
    }
}

/// Stored audit entry. Never updated or deleted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AuditEntry {
    /// Database-assigned identifier.
    pub id: AuditEntryId,
    /// When the mutation happened.
    pub at: DateTime<Utc>,
    /// Acting user; `None` for the system.
    pub user_id: Option<UserId>,
    /// Actor display name at the time of the action.
    pub actor: String,
    /// Mutation kind.
    pub action: AuditAction,
    /// Record kind.
    pub entity: EntityKind,
    /// Identifier of the mutated record.
    pub entity_id: i64,
    /// Snapshot before the mutation; `None` for creates.
    #[schema(value_type = Option<Object>)]
    pub before: Option<Value>,
    /// Snapshot after the mutation; `None` for deletes.
    #[schema(value_type = Option<Object>)]
    pub after: Option<Value>,
}

/// Audit entry awaiting its identifier.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewAuditEntry {
    /// When the mutation happened.
    pub at: DateTime<Utc>,
    /// Acting user; `None` for the system.
    pub user_id: Option<UserId>,
    /// Actor display name.
    pub actor: String,
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

impl NewAuditEntry {
    /// Attach the identifier assigned by storage.
    #[must_use]
    pub fn with_id(self, id: AuditEntryId) -> AuditEntry {
        AuditEntry {
            id,
            at: self.at,
            user_id: self.user_id,
            actor: self.actor,
            action: self.action,
            entity: self.entity,
            entity_id: self.entity_id,
            before: self.before,
            after: self.after,
        }
    }
}
