//! User accounts and roles.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};
use utoipa::ToSchema;

use super::fields::required_text;
use super::token::token_enum;
use super::{Error, UserId};

token_enum! {
    /// Access level granted to a user.
    ///
    /// # Examples
    /// ```
    /// use contract_workflow::domain::Role;
    ///
    /// assert_eq!("viewer".parse::<Role>(), Ok(Role::Viewer));
    /// assert_eq!(Role::default(), Role::Officer);
    /// ```
    Role as "role" {
        /// Full access, including user management and the audit log.
        Admin => ("admin", "Admin"),
        /// Creates and edits contracts and tasks.
        Officer => ("officer", "Officer"),
        /// Read-only access.
        Viewer => ("viewer", "Viewer"),
    }
}

impl Default for Role {
    fn default() -> Self {
        Self::Officer
    }
}

/// Validation failures for [`Email`].
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum EmailValidationError {
    /// Nothing left after trimming.
    #[error("email must not be empty")]
    Empty,
    /// Not of the form `local@domain`.
    #[error("email must contain a single @ between a local part and a domain")]
    Malformed,
}

/// Trimmed, lowercased email address with exactly one `@` separating
/// non-empty parts.
///
/// Lowercasing happens on construction, so lookups and the unique index see
/// one spelling per mailbox.
///
/// # Examples
/// ```
/// use contract_workflow::domain::Email;
///
/// let email = Email::new(" Officer1@Example.COM ").expect("valid email");
/// assert_eq!(email.as_ref(), "officer1@example.com");
/// assert!(Email::new("nobody").is_err());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(try_from = "String", into = "String")]
#[schema(value_type = String, example = "officer1@example.com")]
pub struct Email(String);

impl Email {
    /// Validate and construct an email address.
    pub fn new(raw: impl AsRef<str>) -> Result<Self, EmailValidationError> {
        let trimmed = raw.as_ref().trim();
        if trimmed.is_empty() {
            return Err(EmailValidationError::Empty);
        }
        let mut parts = trimmed.split('@');
        match (parts.next(), parts.next(), parts.next()) {
            (Some(local), Some(domain), None) if !local.is_empty() && !domain.is_empty() => {
                Ok(Self(trimmed.to_lowercase()))
            }
            _ => Err(EmailValidationError::Malformed),
        }
    }
}

impl AsRef<str> for Email {
    fn as_ref(&self) -> &str {
        self.0.as_str()
    }
}

impl std::fmt::Display for Email {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl TryFrom<String> for Email {
    type Error = EmailValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<Email> for String {
    fn from(value: Email) -> Self {
        value.0
    }
}

/// Parse an email for a command, reporting failures as invalid requests.
pub(crate) fn parse_email(raw: &str) -> Result<Email, Error> {
    Email::new(raw).map_err(|err| {
        Error::invalid_request(err.to_string())
            .with_details(json!({ "field": "email", "code": "invalid_email" }))
    })
}

/// A person who can act on the workflow.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct User {
    /// Database-assigned identifier.
    pub id: UserId,
    /// Display name captured into audit entries.
    pub name: String,
    /// Unique login email.
    pub email: Email,
    /// Access level.
    pub role: Role,
    /// Inactive users cannot sign in or receive assignments.
    pub active: bool,
    /// Creation time.
    pub created_at: DateTime<Utc>,
}

impl User {
    /// Full column mapping recorded in audit entries.
    #[must_use]
    pub fn snapshot(&self) -> Value {
        json!({
            "id": self.id,
            "name": self.name,
            "email": self.email,
            "role": self.role,
            "active": self.active,
            "created_at": self.created_at,
        })
    }

    /// Whether the user may own contracts.
    #[must_use]
    pub fn is_active_officer(&self) -> bool {
        self.active && self.role == Role::Officer
    }
}

/// Validated input for a user that has not been stored yet.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewUser {
    /// Trimmed, non-empty display name.
    pub name: String,
    /// Login email.
    pub email: Email,
    /// Access level.
    pub role: Role,
    /// Whether the account can sign in.
    pub active: bool,
    /// Creation time.
    pub created_at: DateTime<Utc>,
}

impl NewUser {
    /// Attach the identifier assigned by storage.
    #[must_use]
    pub fn with_id(self, id: UserId) -> User {
        User {
            id,
            name: self.name,
            email: self.email,
            role: self.role,
            active: self.active,
            created_at: self.created_at,
        }
    }
}

/// Raw create-user command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CreateUser {
    /// Display name; required.
    pub name: String,
    /// Login email; validated and unique.
    pub email: String,
    /// Access level.
    pub role: Role,
    /// Whether the account can sign in.
    pub active: bool,
}

impl CreateUser {
    pub(crate) fn validate(&self, created_at: DateTime<Utc>) -> Result<NewUser, Error> {
        Ok(NewUser {
            name: required_text("name", &self.name)?,
            email: parse_email(&self.email)?,
            role: self.role,
            active: self.active,
            created_at,
        })
    }
}

/// Partial update of a user; absent fields keep their value.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UserPatch {
    /// New display name; blank keeps the current one.
    pub name: Option<String>,
    /// New access level.
    pub role: Option<Role>,
    /// New active flag.
    pub active: Option<bool>,
}
