//! Driven port for transactional record storage.
//!
//! Every unit of work runs inside [`WorkflowStore::transaction`]: the closure
//! receives a [`WorkflowTransaction`] handle and its result decides the
//! outcome. `Ok` commits, `Err` rolls back, and so does a dropped future.

use async_trait::async_trait;
use futures_util::future::BoxFuture;

use crate::domain::{
    AuditEntry, Contract, ContractFilter, ContractId, Email, Error, NewAuditEntry, NewContract,
    NewTask, NewUser, Role, Task, TaskFilter, TaskId, User, UserId,
};

use super::define_port_error;

define_port_error! {
    /// Persistence failures raised by [`WorkflowStore`] adapters.
    pub enum WorkflowStoreError {
        /// The store is unreachable or the connection dropped.
        Connection { message: String } => "workflow store connection failed: {message}",
        /// A statement failed or a row could not be decoded.
        Query { message: String } => "workflow store query failed: {message}",
        /// A constraint or serialisation conflict; retrying may succeed.
        Conflict { message: String } => "workflow store conflict: {message}",
        /// A row expected by an update or delete was absent.
        MissingRecord { entity: String, id: i64 } => "{entity} {id} not found",
    }
}

impl From<WorkflowStoreError> for Error {
    fn from(error: WorkflowStoreError) -> Self {
        match error {
            WorkflowStoreError::Connection { message } => {
                Self::service_unavailable(format!("workflow store unavailable: {message}"))
            }
            WorkflowStoreError::Conflict { message } => {
                Self::service_unavailable(format!("workflow store conflict: {message}"))
            }
            WorkflowStoreError::Query { message } => {
                Self::internal(format!("workflow store error: {message}"))
            }
            WorkflowStoreError::MissingRecord { entity, id } => {
                Self::not_found(format!("{entity} {id} not found"))
            }
        }
    }
}

/// Sort order for contract listings. Ties break on id.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ContractOrder {
    /// `updated_at` descending.
    #[default]
    RecentlyUpdated,
    /// `due_date` ascending, undated contracts last.
    DueDate,
}

/// Contract listing request.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ContractQuery {
    /// Field criteria.
    pub filter: ContractFilter,
    /// Restrict to active statuses.
    pub active_only: bool,
    /// Sort order.
    pub order: ContractOrder,
}

impl ContractQuery {
    /// Whether `contract` belongs in the listing.
    #[must_use]
    pub fn matches(&self, contract: &Contract) -> bool {
        self.filter.matches(contract) && (!self.active_only || contract.status.is_active())
    }
}

/// Sort order for task listings. Ties break on id.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TaskOrder {
    /// `updated_at` descending.
    #[default]
    RecentlyUpdated,
    /// `completed_at` descending, incomplete tasks last.
    RecentlyCompleted,
}

/// Task listing request.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TaskQuery {
    /// Field criteria.
    pub filter: TaskFilter,
    /// Sort order.
    pub order: TaskOrder,
}

/// Sort order for user listings. Ties break on id.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum UserOrder {
    /// `name` ascending.
    #[default]
    Name,
    /// `created_at` descending.
    Newest,
}

/// User listing request.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UserQuery {
    /// Skip inactive accounts.
    pub active_only: bool,
    /// Restrict to one role.
    pub role: Option<Role>,
    /// Sort order.
    pub order: UserOrder,
}

impl UserQuery {
    /// Whether `user` belongs in the listing.
    #[must_use]
    pub fn matches(&self, user: &User) -> bool {
        (!self.active_only || user.active) && self.role.is_none_or(|role| user.role == role)
    }
}

/// Record access scoped to one open transaction.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait WorkflowTransaction: Send {
    /// Fetch a user by id.
    async fn find_user(&mut self, id: UserId) -> Result<Option<User>, WorkflowStoreError>;

    /// Fetch a user by exact email.
    async fn find_user_by_email(&mut self, email: &Email)
    -> Result<Option<User>, WorkflowStoreError>;

    /// List users.
    async fn list_users(&mut self, query: &UserQuery) -> Result<Vec<User>, WorkflowStoreError>;

    /// Count all users.
    async fn count_users(&mut self) -> Result<u64, WorkflowStoreError>;

    /// Insert a user and return it with its id.
    async fn insert_user(&mut self, user: NewUser) -> Result<User, WorkflowStoreError>;

    /// Overwrite a stored user.
    async fn update_user(&mut self, user: &User) -> Result<(), WorkflowStoreError>;

    /// Fetch a contract by id.
    async fn find_contract(&mut self, id: ContractId)
    -> Result<Option<Contract>, WorkflowStoreError>;

    /// List contracts.
    async fn list_contracts(
        &mut self,
        query: &ContractQuery,
    ) -> Result<Vec<Contract>, WorkflowStoreError>;

    /// Count contracts, optionally only active ones.
    async fn count_contracts(&mut self, active_only: bool) -> Result<u64, WorkflowStoreError>;

    /// Insert a contract and return it with its id.
    async fn insert_contract(&mut self, contract: NewContract)
    -> Result<Contract, WorkflowStoreError>;

    /// Overwrite a stored contract.
    async fn update_contract(&mut self, contract: &Contract) -> Result<(), WorkflowStoreError>;

    /// Remove a contract. Child tasks are left in place.
    async fn delete_contract(&mut self, id: ContractId) -> Result<(), WorkflowStoreError>;

    /// Fetch a task by id.
    async fn find_task(&mut self, id: TaskId) -> Result<Option<Task>, WorkflowStoreError>;

    /// List tasks.
    async fn list_tasks(&mut self, query: &TaskQuery) -> Result<Vec<Task>, WorkflowStoreError>;

    /// Count all tasks.
    async fn count_tasks(&mut self) -> Result<u64, WorkflowStoreError>;

    /// Insert a task and return it with its id.
    async fn insert_task(&mut self, task: NewTask) -> Result<Task, WorkflowStoreError>;

    /// Overwrite a stored task.
    async fn update_task(&mut self, task: &Task) -> Result<(), WorkflowStoreError>;

    /// Remove a task.
    async fn delete_task(&mut self, id: TaskId) -> Result<(), WorkflowStoreError>;

    /// Append an audit entry.
    async fn append_audit(&mut self, entry: NewAuditEntry)
    -> Result<AuditEntry, WorkflowStoreError>;

    /// Newest audit entries first, at most `limit`.
    async fn list_audit(&mut self, limit: u32) -> Result<Vec<AuditEntry>, WorkflowStoreError>;
}

/// Transactional record store.
///
/// # Examples
/// ```
/// use contract_workflow::domain::Error;
/// use contract_workflow::domain::ports::{WorkflowStore, WorkflowTransaction};
/// use futures_util::FutureExt;
///
/// async fn user_count<S: WorkflowStore>(store: &S) -> Result<u64, Error> {
///     store
///         .transaction(|tx: &mut dyn WorkflowTransaction| {
///             async move { Ok(tx.count_users().await?) }.boxed()
///         })
///         .await
/// }
/// ```
#[async_trait]
pub trait WorkflowStore: Send + Sync {
    /// Run `work` in one transaction, committing on `Ok` and rolling back on
    /// `Err`.
    async fn transaction<T, E, F>(&self, work: F) -> Result<T, E>
    where
        F: for<'t> FnOnce(&'t mut dyn WorkflowTransaction) -> BoxFuture<'t, Result<T, E>>
            + Send
            + 'static,
        T: Send + 'static,
        E: From<WorkflowStoreError> + Send + 'static;
}
