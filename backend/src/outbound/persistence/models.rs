//! Internal Diesel row structs for database operations.
//!
//! These types are implementation details of the persistence layer and must
//! never be exposed to the domain. Reading a row back into a domain record
//! re-validates enum tokens and emails; a row that fails is reported as a
//! query error rather than trusted.

use std::str::FromStr;

use chrono::{DateTime, NaiveDate, Utc};
use diesel::prelude::*;
use serde_json::Value;

use crate::domain::ports::WorkflowStoreError;
use crate::domain::{
    AuditEntry, AuditEntryId, Contract, ContractId, Email, NewAuditEntry, NewContract, NewTask,
    NewUser, Task, TaskId, User, UserId,
};

use super::schema::{audit_log, contracts, tasks, users};

fn parse_token<T>(column: &str, raw: &str) -> Result<T, WorkflowStoreError>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    raw.parse()
        .map_err(|err| WorkflowStoreError::query(format!("{column}: {err}")))
}

// ---------------------------------------------------------------------------
// Users
// ---------------------------------------------------------------------------

/// Row struct for reading from the users table.
#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = users)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct UserRow {
    pub id: i64,
    pub name: String,
    pub email: String,
    pub role: String,
    pub active: bool,
    pub created_at: DateTime<Utc>,
}

impl TryFrom<UserRow> for User {
    type Error = WorkflowStoreError;

    fn try_from(row: UserRow) -> Result<Self, Self::Error> {
        Ok(Self {
            id: UserId::new(row.id),
            email: Email::new(&row.email)
                .map_err(|err| WorkflowStoreError::query(format!("users.email: {err}")))?,
            role: parse_token("users.role", &row.role)?,
            name: row.name,
            active: row.active,
            created_at: row.created_at,
        })
    }
}

/// Insertable struct for creating user records.
#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = users)]
pub(crate) struct NewUserRow<'a> {
    pub name: &'a str,
    pub email: &'a str,
    pub role: &'a str,
    pub active: bool,
    pub created_at: DateTime<Utc>,
}

impl<'a> From<&'a NewUser> for NewUserRow<'a> {
    fn from(user: &'a NewUser) -> Self {
        Self {
            name: &user.name,
            email: user.email.as_ref(),
            role: user.role.as_str(),
            active: user.active,
            created_at: user.created_at,
        }
    }
}

/// Changeset overwriting every mutable user column.
#[derive(Debug, Clone, AsChangeset)]
#[diesel(table_name = users)]
pub(crate) struct UserChanges<'a> {
    pub name: &'a str,
    pub email: &'a str,
    pub role: &'a str,
    pub active: bool,
}

impl<'a> From<&'a User> for UserChanges<'a> {
    fn from(user: &'a User) -> Self {
        Self {
            name: &user.name,
            email: user.email.as_ref(),
            role: user.role.as_str(),
            active: user.active,
        }
    }
}

// ---------------------------------------------------------------------------
// Contracts
// ---------------------------------------------------------------------------

/// Row struct for reading from the contracts table.
#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = contracts)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct ContractRow {
    pub id: i64,
    pub number: String,
    pub title: String,
    pub agency: Option<String>,
    pub naics: Option<String>,
    pub set_aside: Option<String>,
    pub description: Option<String>,
    pub status: String,
    pub officer_id: Option<i64>,
    pub due_date: Option<NaiveDate>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl TryFrom<ContractRow> for Contract {
    type Error = WorkflowStoreError;

    fn try_from(row: ContractRow) -> Result<Self, Self::Error> {
        Ok(Self {
            id: ContractId::new(row.id),
            status: parse_token("contracts.status", &row.status)?,
            number: row.number,
            title: row.title,
            agency: row.agency,
            naics: row.naics,
            set_aside: row.set_aside,
            description: row.description,
            officer_id: row.officer_id.map(UserId::new),
            due_date: row.due_date,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

/// Insertable struct for creating contract records.
#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = contracts)]
pub(crate) struct NewContractRow<'a> {
    pub number: &'a str,
    pub title: &'a str,
    pub agency: Option<&'a str>,
    pub naics: Option<&'a str>,
    pub set_aside: Option<&'a str>,
    pub description: Option<&'a str>,
    pub status: &'a str,
    pub officer_id: Option<i64>,
    pub due_date: Option<NaiveDate>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl<'a> From<&'a NewContract> for NewContractRow<'a> {
    fn from(contract: &'a NewContract) -> Self {
        Self {
            number: &contract.number,
            title: &contract.title,
            agency: contract.agency.as_deref(),
            naics: contract.naics.as_deref(),
            set_aside: contract.set_aside.as_deref(),
            description: contract.description.as_deref(),
            status: contract.status.as_str(),
            officer_id: contract.officer_id.map(UserId::get),
            due_date: contract.due_date,
            created_at: contract.created_at,
            updated_at: contract.created_at,
        }
    }
}

/// Changeset overwriting every mutable contract column, writing `NULL` for
/// cleared fields.
#[derive(Debug, Clone, AsChangeset)]
#[diesel(table_name = contracts)]
#[diesel(treat_none_as_null = true)]
pub(crate) struct ContractChanges<'a> {
    pub number: &'a str,
    pub title: &'a str,
    pub agency: Option<&'a str>,
    pub naics: Option<&'a str>,
    pub set_aside: Option<&'a str>,
    pub description: Option<&'a str>,
    pub status: &'a str,
    pub officer_id: Option<i64>,
    pub due_date: Option<NaiveDate>,
    pub updated_at: DateTime<Utc>,
}

impl<'a> From<&'a Contract> for ContractChanges<'a> {
    fn from(contract: &'a Contract) -> Self {
        Self {
            number: &contract.number,
            title: &contract.title,
            agency: contract.agency.as_deref(),
            naics: contract.naics.as_deref(),
            set_aside: contract.set_aside.as_deref(),
            description: contract.description.as_deref(),
            status: contract.status.as_str(),
            officer_id: contract.officer_id.map(UserId::get),
            due_date: contract.due_date,
            updated_at: contract.updated_at,
        }
    }
}

// ---------------------------------------------------------------------------
// Tasks
// ---------------------------------------------------------------------------

/// Row struct for reading from the tasks table.
#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = tasks)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct TaskRow {
    pub id: i64,
    pub contract_id: i64,
    pub description: String,
    pub status: String,
    pub assigned_to: Option<i64>,
    pub due_date: Option<NaiveDate>,
    pub completed_at: Option<DateTime<Utc>>,
    pub notes: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl TryFrom<TaskRow> for Task {
    type Error = WorkflowStoreError;

    fn try_from(row: TaskRow) -> Result<Self, Self::Error> {
        Ok(Self {
            id: TaskId::new(row.id),
            contract_id: ContractId::new(row.contract_id),
            status: parse_token("tasks.status", &row.status)?,
            description: row.description,
            assigned_to: row.assigned_to.map(UserId::new),
            due_date: row.due_date,
            completed_at: row.completed_at,
            notes: row.notes,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

/// Insertable struct for creating task records.
#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = tasks)]
pub(crate) struct NewTaskRow<'a> {
    pub contract_id: i64,
    pub description: &'a str,
    pub status: &'a str,
    pub assigned_to: Option<i64>,
    pub due_date: Option<NaiveDate>,
    pub completed_at: Option<DateTime<Utc>>,
    pub notes: Option<&'a str>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl<'a> From<&'a NewTask> for NewTaskRow<'a> {
    fn from(task: &'a NewTask) -> Self {
        Self {
            contract_id: task.contract_id.get(),
            description: &task.description,
            status: task.status.as_str(),
            assigned_to: task.assigned_to.map(UserId::get),
            due_date: task.due_date,
            completed_at: task.completed_at,
            notes: task.notes.as_deref(),
            created_at: task.created_at,
            updated_at: task.created_at,
        }
    }
}

/// Changeset overwriting every mutable task column.
#[derive(Debug, Clone, AsChangeset)]
#[diesel(table_name = tasks)]
#[diesel(treat_none_as_null = true)]
pub(crate) struct TaskChanges<'a> {
    pub description: &'a str,
    pub status: &'a str,
    pub assigned_to: Option<i64>,
    pub due_date: Option<NaiveDate>,
    pub completed_at: Option<DateTime<Utc>>,
    pub notes: Option<&'a str>,
    pub updated_at: DateTime<Utc>,
}

impl<'a> From<&'a Task> for TaskChanges<'a> {
    fn from(task: &'a Task) -> Self {
        Self {
            description: &task.description,
            status: task.status.as_str(),
            assigned_to: task.assigned_to.map(UserId::get),
            due_date: task.due_date,
            completed_at: task.completed_at,
            notes: task.notes.as_deref(),
            updated_at: task.updated_at,
        }
    }
}

// ---------------------------------------------------------------------------
// Audit log
// ---------------------------------------------------------------------------

/// Row struct for reading from the audit_log table.
#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = audit_log)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct AuditEntryRow {
    pub id: i64,
    pub at: DateTime<Utc>,
    pub user_id: Option<i64>,
    pub actor: String,
    pub action: String,
    pub entity: String,
    pub entity_id: i64,
    pub before: Option<Value>,
    pub after: Option<Value>,
}

impl TryFrom<AuditEntryRow> for AuditEntry {
    type Error = WorkflowStoreError;

    fn try_from(row: AuditEntryRow) -> Result<Self, Self::Error> {
        Ok(Self {
            id: AuditEntryId::new(row.id),
            action: parse_token("audit_log.action", &row.action)?,
            entity: parse_token("audit_log.entity", &row.entity)?,
            at: row.at,
            user_id: row.user_id.map(UserId::new),
            actor: row.actor,
            entity_id: row.entity_id,
            before: row.before,
            after: row.after,
        })
    }
}

/// Insertable struct for appending audit entries.
#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = audit_log)]
pub(crate) struct NewAuditEntryRow<'a> {
    pub at: DateTime<Utc>,
    pub user_id: Option<i64>,
    pub actor: &'a str,
    pub action: &'a str,
    pub entity: &'a str,
    pub entity_id: i64,
    pub before: Option<&'a Value>,
    pub after: Option<&'a Value>,
}

impl<'a> From<&'a NewAuditEntry> for NewAuditEntryRow<'a> {
    fn from(entry: &'a NewAuditEntry) -> Self {
        Self {
            at: entry.at,
            user_id: entry.user_id.map(UserId::get),
            actor: &entry.actor,
            action: entry.action.as_str(),
            entity: entry.entity.as_str(),
            entity_id: entry.entity_id,
            before: entry.before.as_ref(),
            after: entry.after.as_ref(),
        }
    }
}

#[cfg(test)]
mod tests {
    //! Row decoding coverage; no database required.

    use super::*;
    use crate::domain::{ContractStatus, Role};
    use chrono::TimeZone;
    use rstest::{fixture, rstest};

    #[fixture]
    fn at() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 2, 1, 9, 0, 0)
            .single()
            .expect("fixture timestamp")
    }

    fn user_row(role: &str, email: &str, at: DateTime<Utc>) -> UserRow {
        UserRow {
            id: 2,
            name: "Officer One".to_owned(),
            email: email.to_owned(),
            role: role.to_owned(),
            active: true,
            created_at: at,
        }
    }

    #[rstest]
    fn user_rows_decode(at: DateTime<Utc>) {
        let user = User::try_from(user_row("officer", "officer1@example.com", at))
            .expect("row decodes");
        assert_eq!(user.id, UserId::new(2));
        assert_eq!(user.role, Role::Officer);
    }

    #[rstest]
    #[case("owner", "officer1@example.com", "users.role")]
    #[case("officer", "not-an-email", "users.email")]
    fn corrupt_user_rows_are_query_errors(
        at: DateTime<Utc>,
        #[case] role: &str,
        #[case] email: &str,
        #[case] column: &str,
    ) {
        let err = User::try_from(user_row(role, email, at)).expect_err("row rejected");
        assert!(matches!(err, WorkflowStoreError::Query { .. }));
        assert!(err.to_string().contains(column));
    }

    #[rstest]
    fn contract_changes_carry_cleared_fields(at: DateTime<Utc>) {
        let contract = Contract {
            id: ContractId::new(1),
            number: "W56HZV-25-R-0001".to_owned(),
            title: "Vehicle Maintenance Support".to_owned(),
            agency: None,
            naics: Some("811111".to_owned()),
            set_aside: None,
            description: None,
            status: ContractStatus::NotAwarded,
            officer_id: None,
            due_date: None,
            created_at: at,
            updated_at: at,
        };
        let changes = ContractChanges::from(&contract);
        assert_eq!(changes.status, "not_awarded");
        assert!(changes.officer_id.is_none());
        assert_eq!(changes.naics, Some("811111"));
    }
}
