//! Read side of the workflow: dashboards, listings, reports and the audit log.

use std::sync::Arc;

use async_trait::async_trait;
use futures_util::FutureExt;

use crate::domain::access::{Action, Resource, require};
use crate::domain::ports::{
    AUDIT_LOG_MAX_LIMIT, ContractOrder, ContractQuery, Dashboard, Report, ReportSummary,
    TaskOrder, TaskQuery, UserOrder, UserQuery, WorkflowQuery, WorkflowStore, WorkflowStoreError,
};
use crate::domain::{
    AuditEntry, Contract, ContractFilter, ContractId, Email, Error, Role, Task, TaskFilter, TaskId,
    TaskStatus, User, UserId,
};

/// Clamp a requested audit page size to `1..=AUDIT_LOG_MAX_LIMIT`.
#[must_use]
pub fn audit_limit(requested: Option<u32>) -> u32 {
    requested
        .unwrap_or(AUDIT_LOG_MAX_LIMIT)
        .clamp(1, AUDIT_LOG_MAX_LIMIT)
}

/// Query service implementing [`WorkflowQuery`].
#[derive(Clone)]
pub struct WorkflowQueryService<S> {
    store: Arc<S>,
}

impl<S> WorkflowQueryService<S> {
    /// Create a query service over `store`.
    #[must_use]
    pub const fn new(store: Arc<S>) -> Self {
        Self { store }
    }
}

#[async_trait]
impl<S: WorkflowStore> WorkflowQuery for WorkflowQueryService<S> {
    async fn resolve_actor(&self, id: UserId) -> Result<User, Error> {
        let user = self
            .store
            .transaction(move |tx| async move { tx.find_user(id).await }.boxed())
            .await?;
        match user {
            Some(user) if user.active => Ok(user),
            Some(_) => Err(Error::unauthorized("account is inactive")),
            None => Err(Error::unauthorized("login required")),
        }
    }

    async fn find_user_by_email(&self, email: &Email) -> Result<Option<User>, Error> {
        let wanted = email.clone();
        Ok(self
            .store
            .transaction(move |tx| async move { tx.find_user_by_email(&wanted).await }.boxed())
            .await?)
    }

    async fn dashboard(&self, actor: &User) -> Result<Dashboard, Error> {
        require(actor, Action::View, Resource::Contract)?;
        require(actor, Action::View, Resource::Task)?;
        let contract_query = ContractQuery {
            filter: ContractFilter {
                officer_id: Some(actor.id),
                ..ContractFilter::default()
            },
            ..ContractQuery::default()
        };
        let task_query = TaskQuery {
            filter: TaskFilter {
                assigned_to: Some(actor.id),
                ..TaskFilter::default()
            },
            ..TaskQuery::default()
        };
        Ok(self
            .store
            .transaction(move |tx| {
                async move {
                    let contracts = tx.list_contracts(&contract_query).await?;
                    let tasks = tx.list_tasks(&task_query).await?;
                    Ok::<_, WorkflowStoreError>(Dashboard { contracts, tasks })
                }
                .boxed()
            })
            .await?)
    }

    async fn list_contracts(
        &self,
        actor: &User,
        filter: ContractFilter,
    ) -> Result<Vec<Contract>, Error> {
        require(actor, Action::View, Resource::Contract)?;
        let query = ContractQuery {
            filter: filter.normalised(),
            ..ContractQuery::default()
        };
        Ok(self
            .store
            .transaction(move |tx| async move { tx.list_contracts(&query).await }.boxed())
            .await?)
    }

    async fn get_contract(&self, actor: &User, id: ContractId) -> Result<Contract, Error> {
        require(actor, Action::View, Resource::Contract)?;
        self.store
            .transaction(move |tx| async move { tx.find_contract(id).await }.boxed())
            .await?
            .ok_or_else(|| Error::not_found(format!("contract {id} not found")))
    }

    async fn list_tasks(&self, actor: &User, filter: TaskFilter) -> Result<Vec<Task>, Error> {
        require(actor, Action::View, Resource::Task)?;
        let query = TaskQuery {
            filter,
            ..TaskQuery::default()
        };
        Ok(self
            .store
            .transaction(move |tx| async move { tx.list_tasks(&query).await }.boxed())
            .await?)
    }

    async fn get_task(&self, actor: &User, id: TaskId) -> Result<Task, Error> {
        require(actor, Action::View, Resource::Task)?;
        self.store
            .transaction(move |tx| async move { tx.find_task(id).await }.boxed())
            .await?
            .ok_or_else(|| Error::not_found(format!("task {id} not found")))
    }

    async fn report(&self, actor: &User) -> Result<Report, Error> {
        require(actor, Action::View, Resource::Contract)?;
        require(actor, Action::View, Resource::Task)?;
        let active = ContractQuery {
            active_only: true,
            order: ContractOrder::DueDate,
            ..ContractQuery::default()
        };
        let completed = TaskQuery {
            filter: TaskFilter {
                status: Some(TaskStatus::Done),
                ..TaskFilter::default()
            },
            order: TaskOrder::RecentlyCompleted,
        };
        Ok(self
            .store
            .transaction(move |tx| {
                async move {
                    let active_contracts = tx.list_contracts(&active).await?;
                    let completed_tasks = tx.list_tasks(&completed).await?;
                    let summary = ReportSummary {
                        total_contracts: tx.count_contracts(false).await?,
                        active_contracts: tx.count_contracts(true).await?,
                        total_tasks: tx.count_tasks().await?,
                    };
                    Ok::<_, WorkflowStoreError>(Report {
                        active_contracts,
                        completed_tasks,
                        summary,
                    })
                }
                .boxed()
            })
            .await?)
    }

    async fn audit_log(&self, actor: &User, limit: Option<u32>) -> Result<Vec<AuditEntry>, Error> {
        require(actor, Action::View, Resource::AuditLog)?;
        let capped = audit_limit(limit);
        Ok(self
            .store
            .transaction(move |tx| async move { tx.list_audit(capped).await }.boxed())
            .await?)
    }

    async fn list_users(&self, actor: &User) -> Result<Vec<User>, Error> {
        require(actor, Action::View, Resource::AdminConsole)?;
        let query = UserQuery {
            order: UserOrder::Newest,
            ..UserQuery::default()
        };
        Ok(self
            .store
            .transaction(move |tx| async move { tx.list_users(&query).await }.boxed())
            .await?)
    }

    async fn list_assignable_users(
        &self,
        actor: &User,
        role: Option<Role>,
    ) -> Result<Vec<User>, Error> {
        require(actor, Action::View, Resource::User)?;
        let query = UserQuery {
            active_only: true,
            role,
            order: UserOrder::Name,
        };
        Ok(self
            .store
            .transaction(move |tx| async move { tx.list_users(&query).await }.boxed())
            .await?)
    }
}

#[cfg(test)]
#[path = "workflow_queries_tests.rs"]
mod tests;
