//! Driving port for workflow mutations.
//!
//! Inbound adapters call [`WorkflowCommand`] with the signed-in user as the
//! acting principal. Implementations authorize the call, validate the input,
//! persist the change and append one audit entry in a single transaction.

use async_trait::async_trait;

use crate::domain::{
    Contract, ContractId, ContractPatch, CreateContract, CreateTask, CreateUser, Email, Error,
    Task, TaskId, TaskPatch, User, UserId, UserPatch,
};

/// Audited mutations over contracts, tasks and users.
///
/// Every method returns a domain [`Error`] whose code distinguishes denied
/// (`Forbidden`), missing (`NotFound`), invalid (`InvalidRequest`) and
/// retryable persistence failures (`ServiceUnavailable`).
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait WorkflowCommand: Send + Sync {
    /// Create a contract; status defaults to draft.
    async fn create_contract(&self, actor: &User, command: CreateContract)
    -> Result<Contract, Error>;

    /// Apply a partial update to a contract.
    async fn update_contract(
        &self,
        actor: &User,
        id: ContractId,
        patch: ContractPatch,
    ) -> Result<Contract, Error>;

    /// Remove a contract, leaving its tasks in place.
    async fn delete_contract(&self, actor: &User, id: ContractId) -> Result<(), Error>;

    /// Create a task under an existing contract.
    async fn create_task(&self, actor: &User, command: CreateTask) -> Result<Task, Error>;

    /// Apply a partial update to a task.
    async fn update_task(&self, actor: &User, id: TaskId, patch: TaskPatch)
    -> Result<Task, Error>;

    /// Remove a task.
    async fn delete_task(&self, actor: &User, id: TaskId) -> Result<(), Error>;

    /// Create a user account. Admin only.
    async fn create_user(&self, actor: &User, command: CreateUser) -> Result<User, Error>;

    /// Change a user's name, role or active flag. Admin only.
    async fn update_user(&self, actor: &User, id: UserId, patch: UserPatch)
    -> Result<User, Error>;

    /// Create an active officer for an email vouched for by the upstream
    /// authenticator. Audited as the system principal.
    ///
    /// When `name` is absent or blank the local part of the email is used.
    async fn provision_user(&self, name: Option<String>, email: Email) -> Result<User, Error>;
}
