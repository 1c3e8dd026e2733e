//! Role-based access policy.
//!
//! [`authorize`] is a pure function of the actor's role, the action and the
//! resource. Callers check the decision before invoking any mutation.

use serde_json::json;

use super::{Error, Role, User};

/// What the actor wants to do.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Action {
    /// Read records.
    View,
    /// Insert records.
    Create,
    /// Change records.
    Update,
    /// Remove records.
    Delete,
}

/// What the action applies to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Resource {
    /// Contract records.
    Contract,
    /// Task records.
    Task,
    /// User directory lookups, such as assignment pickers.
    User,
    /// The audit history.
    AuditLog,
    /// User management.
    AdminConsole,
}

/// Why an action was refused.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, thiserror::Error)]
pub enum DenyReason {
    /// The role is read-only.
    #[error("insufficient role")]
    InsufficientRole,
    /// Officers may not delete records.
    #[error("officer cannot delete")]
    OfficerCannotDelete,
    /// Reserved for administrators.
    #[error("admin only")]
    AdminOnly,
}

impl DenyReason {
    /// Stable machine-readable code.
    #[must_use]
    pub fn code(self) -> &'static str {
        match self {
            Self::InsufficientRole => "insufficient_role",
            Self::OfficerCannotDelete => "officer_cannot_delete",
            Self::AdminOnly => "admin_only",
        }
    }
}

/// Outcome of an authorization check.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Decision {
    /// Go ahead.
    Allowed,
    /// Refused for the given reason.
    Denied(DenyReason),
}

impl Decision {
    /// Whether the action may proceed.
    #[must_use]
    pub fn is_allowed(self) -> bool {
        matches!(self, Self::Allowed)
    }

    /// Convert a denial into a `Forbidden` error carrying the reason.
    pub fn into_result(self) -> Result<(), Error> {
        match self {
            Self::Allowed => Ok(()),
            Self::Denied(reason) => Err(Error::forbidden(reason.to_string())
                .with_details(json!({ "reason": reason.code() }))),
        }
    }
}

/// Decide whether `actor` may perform `action` on `resource`.
///
/// # Examples
/// ```
/// use contract_workflow::domain::access::{authorize, Action, Decision, DenyReason, Resource};
/// use contract_workflow::domain::{Email, Role, User, UserId};
///
/// let viewer = User {
///     id: UserId::new(3),
///     name: "Viewer".into(),
///     email: Email::new("viewer@example.com").expect("valid email"),
///     role: Role::Viewer,
///     active: true,
///     created_at: chrono::Utc::now(),
/// };
/// assert_eq!(
///     authorize(&viewer, Action::Create, Resource::Contract),
///     Decision::Denied(DenyReason::InsufficientRole)
/// );
/// ```
#[must_use]
pub fn authorize(actor: &User, action: Action, resource: Resource) -> Decision {
    authorize_role(actor.role, action, resource)
}

/// Role-only form of [`authorize`].
#[must_use]
pub fn authorize_role(role: Role, action: Action, resource: Resource) -> Decision {
    let admin_area = matches!(resource, Resource::AuditLog | Resource::AdminConsole);
    match role {
        Role::Admin => Decision::Allowed,
        Role::Viewer => match action {
            Action::View if admin_area => Decision::Denied(DenyReason::AdminOnly),
            Action::View => Decision::Allowed,
            _ => Decision::Denied(DenyReason::InsufficientRole),
        },
        Role::Officer => match (action, resource) {
            (_, Resource::AuditLog | Resource::AdminConsole) => {
                Decision::Denied(DenyReason::AdminOnly)
            }
            (Action::View, _) => Decision::Allowed,
            (Action::Delete, _) => Decision::Denied(DenyReason::OfficerCannotDelete),
            (Action::Create | Action::Update, Resource::Contract | Resource::Task) => {
                Decision::Allowed
            }
            (Action::Create | Action::Update, Resource::User) => {
                Decision::Denied(DenyReason::AdminOnly)
            }
        },
    }
}

/// Check a user against the policy, returning `Forbidden` on denial.
pub fn require(actor: &User, action: Action, resource: Resource) -> Result<(), Error> {
    authorize(actor, action, resource).into_result()
}
