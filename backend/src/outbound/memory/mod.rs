//! In-process [`WorkflowStore`] used when no database is configured.
//!
//! Transactions are copy-on-write over the user, contract and task records:
//! the closure works on a clone and the clone replaces the committed records
//! only when the closure returns `Ok`. The audit log is append-only, so it is
//! never cloned; a transaction borrows the committed entries and buffers its
//! own appends, which are moved onto the log on commit. The state mutex is
//! held for the whole unit of work, so transactions are serialised. Ordering
//! and uniqueness rules mirror the PostgreSQL adapter.

use std::cmp::Ordering;
use std::collections::BTreeMap;
#[cfg(any(test, feature = "test-support"))]
use std::sync::atomic::{AtomicBool, Ordering as AtomicOrdering};

use async_trait::async_trait;
use futures_util::future::BoxFuture;
use tokio::sync::Mutex;

use crate::domain::ports::{
    ContractOrder, ContractQuery, TaskOrder, TaskQuery, UserOrder, UserQuery, WorkflowStore,
    WorkflowStoreError, WorkflowTransaction,
};
use crate::domain::{
    AuditEntry, AuditEntryId, Contract, ContractId, Email, NewAuditEntry, NewContract, NewTask,
    NewUser, Task, TaskId, User, UserId,
};

#[derive(Debug, Clone, Default)]
struct Records {
    users: BTreeMap<UserId, User>,
    contracts: BTreeMap<ContractId, Contract>,
    tasks: BTreeMap<TaskId, Task>,
    last_user_id: i64,
    last_contract_id: i64,
    last_task_id: i64,
}

#[derive(Debug, Default)]
struct MemoryState {
    records: Records,
    audit: Vec<AuditEntry>,
    last_audit_id: i64,
}

/// Workflow records held in memory.
#[derive(Debug, Default)]
pub struct InMemoryWorkflowStore {
    state: Mutex<MemoryState>,
    #[cfg(any(test, feature = "test-support"))]
    fail_audit_appends: AtomicBool,
}

impl InMemoryWorkflowStore {
    /// Create an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Make every subsequent audit append fail with a connection error, to
    /// exercise rollback.
    #[cfg(any(test, feature = "test-support"))]
    pub fn fail_audit_appends(&self, fail: bool) {
        self.fail_audit_appends.store(fail, AtomicOrdering::SeqCst);
    }

    #[cfg(any(test, feature = "test-support"))]
    fn audit_failure_armed(&self) -> bool {
        self.fail_audit_appends.load(AtomicOrdering::SeqCst)
    }

    #[cfg(not(any(test, feature = "test-support")))]
    fn audit_failure_armed(&self) -> bool {
        false
    }
}

struct MemoryTransaction<'a> {
    records: Records,
    committed_audit: &'a [AuditEntry],
    pending_audit: Vec<AuditEntry>,
    last_audit_id: i64,
    fail_audit: bool,
}

fn missing(entity: &str, id: impl Into<i64>) -> WorkflowStoreError {
    WorkflowStoreError::missing_record(entity, id)
}

fn newest_first(
    a: (chrono::DateTime<chrono::Utc>, i64),
    b: (chrono::DateTime<chrono::Utc>, i64),
) -> Ordering {
    b.0.cmp(&a.0).then(b.1.cmp(&a.1))
}

/// Ascending with `None` after every value.
fn nulls_last<T: Ord>(a: Option<&T>, b: Option<&T>) -> Ordering {
    match (a, b) {
        (Some(a), Some(b)) => a.cmp(b),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    }
}

/// Descending with `None` after every value.
fn descending_nulls_last<T: Ord>(a: Option<&T>, b: Option<&T>) -> Ordering {
    match (a, b) {
        (Some(a), Some(b)) => b.cmp(a),
        _ => nulls_last(a, b),
    }
}

fn count(len: usize) -> u64 {
    u64::try_from(len).unwrap_or(u64::MAX)
}

#[async_trait]
impl WorkflowTransaction for MemoryTransaction<'_> {
    async fn find_user(&mut self, id: UserId) -> Result<Option<User>, WorkflowStoreError> {
        Ok(self.records.users.get(&id).cloned())
    }

    async fn find_user_by_email(
        &mut self,
        email: &Email,
    ) -> Result<Option<User>, WorkflowStoreError> {
        Ok(self
            .records
            .users
            .values()
            .find(|user| user.email == *email)
            .cloned())
    }

    async fn list_users(&mut self, query: &UserQuery) -> Result<Vec<User>, WorkflowStoreError> {
        let mut users: Vec<User> = self
            .records
            .users
            .values()
            .filter(|user| query.matches(user))
            .cloned()
            .collect();
        match query.order {
            UserOrder::Name => users.sort_by(|a, b| a.name.cmp(&b.name).then(a.id.cmp(&b.id))),
            UserOrder::Newest => users.sort_by(|a, b| {
                newest_first((a.created_at, a.id.get()), (b.created_at, b.id.get()))
            }),
        }
        Ok(users)
    }

    async fn count_users(&mut self) -> Result<u64, WorkflowStoreError> {
        Ok(count(self.records.users.len()))
    }

    async fn insert_user(&mut self, user: NewUser) -> Result<User, WorkflowStoreError> {
        if self.records.users.values().any(|u| u.email == user.email) {
            return Err(WorkflowStoreError::conflict(
                "duplicate key value violates unique constraint \"users_email_key\"",
            ));
        }
        self.records.last_user_id += 1;
        let stored = user.with_id(UserId::new(self.records.last_user_id));
        self.records.users.insert(stored.id, stored.clone());
        Ok(stored)
    }

    async fn update_user(&mut self, user: &User) -> Result<(), WorkflowStoreError> {
        let slot = self
            .records
            .users
            .get_mut(&user.id)
            .ok_or_else(|| missing("user", user.id))?;
        *slot = user.clone();
        Ok(())
    }

    async fn find_contract(
        &mut self,
        id: ContractId,
    ) -> Result<Option<Contract>, WorkflowStoreError> {
        Ok(self.records.contracts.get(&id).cloned())
    }

    async fn list_contracts(
        &mut self,
        query: &ContractQuery,
    ) -> Result<Vec<Contract>, WorkflowStoreError> {
        let mut contracts: Vec<Contract> = self
            .records
            .contracts
            .values()
            .filter(|contract| query.matches(contract))
            .cloned()
            .collect();
        match query.order {
            ContractOrder::RecentlyUpdated => contracts.sort_by(|a, b| {
                newest_first((a.updated_at, a.id.get()), (b.updated_at, b.id.get()))
            }),
            ContractOrder::DueDate => contracts.sort_by(|a, b| {
                nulls_last(a.due_date.as_ref(), b.due_date.as_ref()).then(a.id.cmp(&b.id))
            }),
        }
        Ok(contracts)
    }

    async fn count_contracts(&mut self, active_only: bool) -> Result<u64, WorkflowStoreError> {
        Ok(count(
            self.records
                .contracts
                .values()
                .filter(|contract| !active_only || contract.status.is_active())
                .count(),
        ))
    }

    async fn insert_contract(
        &mut self,
        contract: NewContract,
    ) -> Result<Contract, WorkflowStoreError> {
        self.records.last_contract_id += 1;
        let stored = contract.with_id(ContractId::new(self.records.last_contract_id));
        self.records.contracts.insert(stored.id, stored.clone());
        Ok(stored)
    }

    async fn update_contract(&mut self, contract: &Contract) -> Result<(), WorkflowStoreError> {
        let slot = self
            .records
            .contracts
            .get_mut(&contract.id)
            .ok_or_else(|| missing("contract", contract.id))?;
        *slot = contract.clone();
        Ok(())
    }

    async fn delete_contract(&mut self, id: ContractId) -> Result<(), WorkflowStoreError> {
        self.records
            .contracts
            .remove(&id)
            .map(drop)
            .ok_or_else(|| missing("contract", id))
    }

    async fn find_task(&mut self, id: TaskId) -> Result<Option<Task>, WorkflowStoreError> {
        Ok(self.records.tasks.get(&id).cloned())
    }

    async fn list_tasks(&mut self, query: &TaskQuery) -> Result<Vec<Task>, WorkflowStoreError> {
        let mut tasks: Vec<Task> = self
            .records
            .tasks
            .values()
            .filter(|task| query.filter.matches(task))
            .cloned()
            .collect();
        match query.order {
            TaskOrder::RecentlyUpdated => tasks.sort_by(|a, b| {
                newest_first((a.updated_at, a.id.get()), (b.updated_at, b.id.get()))
            }),
            TaskOrder::RecentlyCompleted => tasks.sort_by(|a, b| {
                descending_nulls_last(a.completed_at.as_ref(), b.completed_at.as_ref())
                    .then(b.id.cmp(&a.id))
            }),
        }
        Ok(tasks)
    }

    async fn count_tasks(&mut self) -> Result<u64, WorkflowStoreError> {
        Ok(count(self.records.tasks.len()))
    }

    async fn insert_task(&mut self, task: NewTask) -> Result<Task, WorkflowStoreError> {
        self.records.last_task_id += 1;
        let stored = task.with_id(TaskId::new(self.records.last_task_id));
        self.records.tasks.insert(stored.id, stored.clone());
        Ok(stored)
    }

    async fn update_task(&mut self, task: &Task) -> Result<(), WorkflowStoreError> {
        let slot = self
            .records
            .tasks
            .get_mut(&task.id)
            .ok_or_else(|| missing("task", task.id))?;
        *slot = task.clone();
        Ok(())
    }

    async fn delete_task(&mut self, id: TaskId) -> Result<(), WorkflowStoreError> {
        self.records
            .tasks
            .remove(&id)
            .map(drop)
            .ok_or_else(|| missing("task", id))
    }

    async fn append_audit(
        &mut self,
        entry: NewAuditEntry,
    ) -> Result<AuditEntry, WorkflowStoreError> {
        if self.fail_audit {
            return Err(WorkflowStoreError::connection("audit log unavailable"));
        }
        self.last_audit_id += 1;
        let stored = entry.with_id(AuditEntryId::new(self.last_audit_id));
        self.pending_audit.push(stored.clone());
        Ok(stored)
    }

    async fn list_audit(&mut self, limit: u32) -> Result<Vec<AuditEntry>, WorkflowStoreError> {
        let mut entries: Vec<&AuditEntry> = self
            .committed_audit
            .iter()
            .chain(&self.pending_audit)
            .collect();
        entries.sort_by(|a, b| newest_first((a.at, a.id.get()), (b.at, b.id.get())));
        let take = usize::try_from(limit).unwrap_or(usize::MAX);
        Ok(entries.into_iter().take(take).cloned().collect())
    }
}

#[async_trait]
impl WorkflowStore for InMemoryWorkflowStore {
    async fn transaction<T, E, F>(&self, work: F) -> Result<T, E>
    where
        F: for<'t> FnOnce(&'t mut dyn WorkflowTransaction) -> BoxFuture<'t, Result<T, E>>
            + Send
            + 'static,
        T: Send + 'static,
        E: From<WorkflowStoreError> + Send + 'static,
    {
        let mut committed = self.state.lock().await;
        let mut tx = MemoryTransaction {
            records: committed.records.clone(),
            committed_audit: &committed.audit,
            pending_audit: Vec::new(),
            last_audit_id: committed.last_audit_id,
            fail_audit: self.audit_failure_armed(),
        };
        let outcome = work(&mut tx).await;
        if outcome.is_ok() {
            let MemoryTransaction {
                records,
                pending_audit,
                last_audit_id,
                ..
            } = tx;
            let state = &mut *committed;
            state.records = records;
            state.audit.extend(pending_audit);
            state.last_audit_id = last_audit_id;
        }
        outcome
    }
}

#[cfg(test)]
mod tests;
