//! Audited mutation engine for contracts, tasks and users.
//!
//! Each command runs as one unit of work: authorize, open a store
//! transaction, load and validate, apply, persist, append exactly one audit
//! entry, commit. The unit-of-work bodies live in the child modules as plain
//! async functions over `&mut dyn WorkflowTransaction`; this module owns
//! authorization, transaction scoping and logging.

use std::sync::Arc;

use async_trait::async_trait;
use futures_util::FutureExt;
use mockable::Clock;
use tracing::info;

use crate::domain::access::{Action, Resource, require};
use crate::domain::ports::{WorkflowCommand, WorkflowStore};
use crate::domain::{
    Actor, Contract, ContractId, ContractPatch, CreateContract, CreateTask, CreateUser, Email,
    Error, Task, TaskId, TaskPatch, User, UserId, UserPatch,
};

mod contracts;
mod lookups;
mod tasks;
mod users;

/// Mutation engine implementing [`WorkflowCommand`].
#[derive(Clone)]
pub struct WorkflowService<S> {
    store: Arc<S>,
    clock: Arc<dyn Clock>,
}

impl<S> WorkflowService<S> {
    /// Create a service over `store`, stamping records with `clock`.
    #[must_use]
    pub const fn new(store: Arc<S>, clock: Arc<dyn Clock>) -> Self {
        Self { store, clock }
    }
}

/// Authorize `actor`; the system principal is always allowed.
fn permit(actor: &Actor, action: Action, resource: Resource) -> Result<(), Error> {
    match actor {
        Actor::User(user) => require(user, action, resource),
        Actor::System => Ok(()),
    }
}

impl<S: WorkflowStore> WorkflowService<S> {
    /// Create a contract on behalf of `actor`.
    pub async fn create_contract_as(
        &self,
        actor: &Actor,
        command: CreateContract,
    ) -> Result<Contract, Error> {
        permit(actor, Action::Create, Resource::Contract)?;
        let (who, clock) = (actor.clone(), Arc::clone(&self.clock));
        let contract = self
            .store
            .transaction(move |tx| contracts::create(tx, who, clock, command).boxed())
            .await?;
        info!(contract_id = %contract.id, actor = actor.display_name(), "contract created");
        Ok(contract)
    }

    /// Update a contract on behalf of `actor`.
    pub async fn update_contract_as(
        &self,
        actor: &Actor,
        id: ContractId,
        patch: ContractPatch,
    ) -> Result<Contract, Error> {
        permit(actor, Action::Update, Resource::Contract)?;
        let (who, clock) = (actor.clone(), Arc::clone(&self.clock));
        let contract = self
            .store
            .transaction(move |tx| contracts::update(tx, who, clock, id, patch).boxed())
            .await?;
        info!(contract_id = %id, actor = actor.display_name(), "contract updated");
        Ok(contract)
    }

    /// Delete a contract on behalf of `actor`.
    pub async fn delete_contract_as(&self, actor: &Actor, id: ContractId) -> Result<(), Error> {
        permit(actor, Action::Delete, Resource::Contract)?;
        let (who, clock) = (actor.clone(), Arc::clone(&self.clock));
        self.store
            .transaction(move |tx| contracts::delete(tx, who, clock, id).boxed())
            .await?;
        info!(contract_id = %id, actor = actor.display_name(), "contract deleted");
        Ok(())
    }

    /// Create a task on behalf of `actor`.
    pub async fn create_task_as(&self, actor: &Actor, command: CreateTask) -> Result<Task, Error> {
        permit(actor, Action::Create, Resource::Task)?;
        let (who, clock) = (actor.clone(), Arc::clone(&self.clock));
        let task = self
            .store
            .transaction(move |tx| tasks::create(tx, who, clock, command).boxed())
            .await?;
        info!(
            task_id = %task.id,
            contract_id = %task.contract_id,
            actor = actor.display_name(),
            "task created"
        );
        Ok(task)
    }

    /// Update a task on behalf of `actor`.
    pub async fn update_task_as(
        &self,
        actor: &Actor,
        id: TaskId,
        patch: TaskPatch,
    ) -> Result<Task, Error> {
        permit(actor, Action::Update, Resource::Task)?;
        let (who, clock) = (actor.clone(), Arc::clone(&self.clock));
        let task = self
            .store
            .transaction(move |tx| tasks::update(tx, who, clock, id, patch).boxed())
            .await?;
        info!(task_id = %id, status = %task.status, actor = actor.display_name(), "task updated");
        Ok(task)
    }

    /// Delete a task on behalf of `actor`.
    pub async fn delete_task_as(&self, actor: &Actor, id: TaskId) -> Result<(), Error> {
        permit(actor, Action::Delete, Resource::Task)?;
        let (who, clock) = (actor.clone(), Arc::clone(&self.clock));
        self.store
            .transaction(move |tx| tasks::delete(tx, who, clock, id).boxed())
            .await?;
        info!(task_id = %id, actor = actor.display_name(), "task deleted");
        Ok(())
    }

    /// Create a user on behalf of `actor`.
    pub async fn create_user_as(&self, actor: &Actor, command: CreateUser) -> Result<User, Error> {
        permit(actor, Action::Create, Resource::User)?;
        let (who, clock) = (actor.clone(), Arc::clone(&self.clock));
        let user = self
            .store
            .transaction(move |tx| users::create(tx, who, clock, command).boxed())
            .await?;
        info!(user_id = %user.id, role = %user.role, actor = actor.display_name(), "user created");
        Ok(user)
    }

    /// Update a user on behalf of `actor`.
    pub async fn update_user_as(
        &self,
        actor: &Actor,
        id: UserId,
        patch: UserPatch,
    ) -> Result<User, Error> {
        permit(actor, Action::Update, Resource::User)?;
        let (who, clock) = (actor.clone(), Arc::clone(&self.clock));
        let user = self
            .store
            .transaction(move |tx| users::update(tx, who, clock, id, patch).boxed())
            .await?;
        info!(user_id = %id, actor = actor.display_name(), "user updated");
        Ok(user)
    }
}

#[async_trait]
impl<S: WorkflowStore> WorkflowCommand for WorkflowService<S> {
    async fn create_contract(
        &self,
        actor: &User,
        command: CreateContract,
    ) -> Result<Contract, Error> {
        self.create_contract_as(&Actor::User(actor.clone()), command)
            .await
    }

    async fn update_contract(
        &self,
        actor: &User,
        id: ContractId,
        patch: ContractPatch,
    ) -> Result<Contract, Error> {
        self.update_contract_as(&Actor::User(actor.clone()), id, patch)
            .await
    }

    async fn delete_contract(&self, actor: &User, id: ContractId) -> Result<(), Error> {
        self.delete_contract_as(&Actor::User(actor.clone()), id).await
    }

    async fn create_task(&self, actor: &User, command: CreateTask) -> Result<Task, Error> {
        self.create_task_as(&Actor::User(actor.clone()), command).await
    }

    async fn update_task(&self, actor: &User, id: TaskId, patch: TaskPatch) -> Result<Task, Error> {
        self.update_task_as(&Actor::User(actor.clone()), id, patch)
            .await
    }

    async fn delete_task(&self, actor: &User, id: TaskId) -> Result<(), Error> {
        self.delete_task_as(&Actor::User(actor.clone()), id).await
    }

    async fn create_user(&self, actor: &User, command: CreateUser) -> Result<User, Error> {
        self.create_user_as(&Actor::User(actor.clone()), command).await
    }

    async fn update_user(&self, actor: &User, id: UserId, patch: UserPatch) -> Result<User, Error> {
        self.update_user_as(&Actor::User(actor.clone()), id, patch)
            .await
    }

    async fn provision_user(&self, name: Option<String>, email: Email) -> Result<User, Error> {
        let clock = Arc::clone(&self.clock);
        let (user, created) = self
            .store
            .transaction(move |tx| users::provision(tx, clock, name, email).boxed())
            .await?;
        if created {
            info!(user_id = %user.id, actor = crate::domain::SYSTEM_ACTOR, "user provisioned");
        }
        Ok(user)
    }
}
