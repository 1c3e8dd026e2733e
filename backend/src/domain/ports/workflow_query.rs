//! Driving port for workflow reads.
//!
//! Each call is authorized for the acting user and served from one read
//! transaction, so the views it returns are mutually consistent.

use async_trait::async_trait;
use serde::Serialize;
use utoipa::ToSchema;

use crate::domain::{
    AuditEntry, Contract, ContractFilter, ContractId, Email, Error, Role, Task, TaskFilter, TaskId,
    User, UserId,
};

/// Largest page the audit log returns.
pub const AUDIT_LOG_MAX_LIMIT: u32 = 1000;

/// Work owned by the acting user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Dashboard {
    /// Contracts the user owns, most recently updated first.
    pub contracts: Vec<Contract>,
    /// Tasks assigned to the user, most recently updated first.
    pub tasks: Vec<Task>,
}

/// Headline counts shown with the report.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ReportSummary {
    /// Every contract.
    pub total_contracts: u64,
    /// Contracts in an active status.
    pub active_contracts: u64,
    /// Every task.
    pub total_tasks: u64,
}

/// Pipeline report.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Report {
    /// Active contracts by due date, undated last.
    pub active_contracts: Vec<Contract>,
    /// Done tasks, most recently completed first.
    pub completed_tasks: Vec<Task>,
    /// Counts.
    pub summary: ReportSummary,
}

/// Authorized read access to the workflow records.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait WorkflowQuery: Send + Sync {
    /// Load the user behind a session. Unknown or inactive accounts are
    /// `Unauthorized`.
    async fn resolve_actor(&self, id: UserId) -> Result<User, Error>;

    /// Look up an account by login email.
    async fn find_user_by_email(&self, email: &Email) -> Result<Option<User>, Error>;

    /// Contracts and tasks belonging to `actor`.
    async fn dashboard(&self, actor: &User) -> Result<Dashboard, Error>;

    /// Filtered contracts, most recently updated first.
    async fn list_contracts(
        &self,
        actor: &User,
        filter: ContractFilter,
    ) -> Result<Vec<Contract>, Error>;

    /// One contract.
    async fn get_contract(&self, actor: &User, id: ContractId) -> Result<Contract, Error>;

    /// Filtered tasks, most recently updated first.
    async fn list_tasks(&self, actor: &User, filter: TaskFilter) -> Result<Vec<Task>, Error>;

    /// One task.
    async fn get_task(&self, actor: &User, id: TaskId) -> Result<Task, Error>;

    /// Pipeline report.
    async fn report(&self, actor: &User) -> Result<Report, Error>;

    /// Newest audit entries. Admin only; `limit` is clamped to
    /// `1..=AUDIT_LOG_MAX_LIMIT` and defaults to the maximum.
    async fn audit_log(&self, actor: &User, limit: Option<u32>) -> Result<Vec<AuditEntry>, Error>;

    /// Every account, newest first. Admin only.
    async fn list_users(&self, actor: &User) -> Result<Vec<User>, Error>;

    /// Active accounts by name, optionally restricted to one role.
    async fn list_assignable_users(
        &self,
        actor: &User,
        role: Option<Role>,
    ) -> Result<Vec<User>, Error>;
}
