//! PostgreSQL-backed [`WorkflowStore`].
//!
//! Each unit of work checks out one pooled connection and runs inside a
//! single `AsyncConnection::transaction`. The domain closure's error aborts
//! the transaction and is handed back unchanged; Diesel's own failures are
//! mapped to [`WorkflowStoreError`].

use async_trait::async_trait;
use diesel::prelude::*;
use diesel_async::scoped_futures::ScopedFutureExt;
use diesel_async::{AsyncConnection, AsyncPgConnection, RunQueryDsl};
use futures_util::future::BoxFuture;

use crate::domain::ports::{
    ContractOrder, ContractQuery, TaskOrder, TaskQuery, UserOrder, UserQuery, WorkflowStore,
    WorkflowStoreError, WorkflowTransaction,
};
use crate::domain::{
    AuditEntry, Contract, ContractId, ContractStatus, Email, NewAuditEntry, NewContract, NewTask,
    NewUser, Task, TaskId, User, UserId,
};

use super::error_mapping::{map_diesel_error, map_pool_error, to_count};
use super::models::{
    AuditEntryRow, ContractChanges, ContractRow, NewAuditEntryRow, NewContractRow, NewTaskRow,
    NewUserRow, TaskChanges, TaskRow, UserChanges, UserRow,
};
use super::pool::DbPool;
use super::schema::{audit_log, contracts, tasks, users};

/// Diesel-backed workflow store.
#[derive(Clone)]
pub struct DieselWorkflowStore {
    pool: DbPool,
}

impl DieselWorkflowStore {
    /// Create a store drawing connections from `pool`.
    #[must_use]
    pub const fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

/// Why a Diesel transaction was rolled back.
enum Aborted<E> {
    /// The unit of work returned an error.
    Work(E),
    /// Diesel failed to begin, commit or roll back.
    Store(diesel::result::Error),
}

impl<E> From<diesel::result::Error> for Aborted<E> {
    fn from(error: diesel::result::Error) -> Self {
        Self::Store(error)
    }
}

/// `LIKE` pattern matching `needle` anywhere, with wildcards escaped.
fn contains_pattern(needle: &str) -> String {
    let escaped = needle
        .replace('\\', "\\\\")
        .replace('%', "\\%")
        .replace('_', "\\_");
    format!("%{escaped}%")
}

fn active_statuses() -> Vec<&'static str> {
    ContractStatus::ACTIVE
        .iter()
        .map(|status| status.as_str())
        .collect()
}

fn decode<R, T>(rows: Vec<R>) -> Result<Vec<T>, WorkflowStoreError>
where
    T: TryFrom<R, Error = WorkflowStoreError>,
{
    rows.into_iter().map(T::try_from).collect()
}

fn expect_one(affected: usize, entity: &str, id: i64) -> Result<(), WorkflowStoreError> {
    if affected == 0 {
        Err(WorkflowStoreError::missing_record(entity, id))
    } else {
        Ok(())
    }
}

struct PgTransaction<'c> {
    conn: &'c mut AsyncPgConnection,
}

impl PgTransaction<'_> {
    fn conn(&mut self) -> &mut AsyncPgConnection {
        &mut *self.conn
    }
}

#[async_trait]
impl WorkflowTransaction for PgTransaction<'_> {
    async fn find_user(&mut self, id: UserId) -> Result<Option<User>, WorkflowStoreError> {
        let row = users::table
            .find(id.get())
            .select(UserRow::as_select())
            .first::<UserRow>(self.conn())
            .await
            .optional()
            .map_err(map_diesel_error)?;
        row.map(User::try_from).transpose()
    }

    async fn find_user_by_email(
        &mut self,
        email: &Email,
    ) -> Result<Option<User>, WorkflowStoreError> {
        let row = users::table
            .filter(users::email.eq(email.as_ref()))
            .select(UserRow::as_select())
            .first::<UserRow>(self.conn())
            .await
            .optional()
            .map_err(map_diesel_error)?;
        row.map(User::try_from).transpose()
    }

    async fn list_users(&mut self, query: &UserQuery) -> Result<Vec<User>, WorkflowStoreError> {
        let mut statement = users::table.select(UserRow::as_select()).into_boxed();
        if query.active_only {
            statement = statement.filter(users::active.eq(true));
        }
        if let Some(role) = query.role {
            statement = statement.filter(users::role.eq(role.as_str()));
        }
        statement = match query.order {
            UserOrder::Name => statement.order((users::name.asc(), users::id.asc())),
            UserOrder::Newest => statement.order((users::created_at.desc(), users::id.desc())),
        };
        let rows = statement
            .load::<UserRow>(self.conn())
            .await
            .map_err(map_diesel_error)?;
        decode(rows)
    }

    async fn count_users(&mut self) -> Result<u64, WorkflowStoreError> {
        let total = users::table
            .count()
            .get_result::<i64>(self.conn())
            .await
            .map_err(map_diesel_error)?;
        to_count(total)
    }

    async fn insert_user(&mut self, user: NewUser) -> Result<User, WorkflowStoreError> {
        let row = diesel::insert_into(users::table)
            .values(NewUserRow::from(&user))
            .returning(UserRow::as_returning())
            .get_result::<UserRow>(self.conn())
            .await
            .map_err(map_diesel_error)?;
        User::try_from(row)
    }

    async fn update_user(&mut self, user: &User) -> Result<(), WorkflowStoreError> {
        let affected = diesel::update(users::table.find(user.id.get()))
            .set(UserChanges::from(user))
            .execute(self.conn())
            .await
            .map_err(map_diesel_error)?;
        expect_one(affected, "user", user.id.get())
    }

    async fn find_contract(
        &mut self,
        id: ContractId,
    ) -> Result<Option<Contract>, WorkflowStoreError> {
        let row = contracts::table
            .find(id.get())
            .select(ContractRow::as_select())
            .first::<ContractRow>(self.conn())
            .await
            .optional()
            .map_err(map_diesel_error)?;
        row.map(Contract::try_from).transpose()
    }

    async fn list_contracts(
        &mut self,
        query: &ContractQuery,
    ) -> Result<Vec<Contract>, WorkflowStoreError> {
        let filter = &query.filter;
        let mut statement = contracts::table
            .select(ContractRow::as_select())
            .into_boxed();
        if let Some(status) = filter.status {
            statement = statement.filter(contracts::status.eq(status.as_str()));
        }
        if let Some(officer) = filter.officer_id {
            statement = statement.filter(contracts::officer_id.eq(officer.get()));
        }
        if let Some(needle) = filter.agency_contains.as_deref() {
            statement = statement.filter(contracts::agency.like(contains_pattern(needle)));
        }
        if let Some(naics) = filter.naics.clone() {
            statement = statement.filter(contracts::naics.eq(naics));
        }
        if query.active_only {
            statement = statement.filter(contracts::status.eq_any(active_statuses()));
        }
        statement = match query.order {
            ContractOrder::RecentlyUpdated => {
                statement.order((contracts::updated_at.desc(), contracts::id.desc()))
            }
            ContractOrder::DueDate => {
                statement.order((contracts::due_date.asc().nulls_last(), contracts::id.asc()))
            }
        };
        let rows = statement
            .load::<ContractRow>(self.conn())
            .await
            .map_err(map_diesel_error)?;
        decode(rows)
    }

    async fn count_contracts(&mut self, active_only: bool) -> Result<u64, WorkflowStoreError> {
        let mut statement = contracts::table.count().into_boxed();
        if active_only {
            statement = statement.filter(contracts::status.eq_any(active_statuses()));
        }
        let total = statement
            .get_result::<i64>(self.conn())
            .await
            .map_err(map_diesel_error)?;
        to_count(total)
    }

    async fn insert_contract(
        &mut self,
        contract: NewContract,
    ) -> Result<Contract, WorkflowStoreError> {
        let row = diesel::insert_into(contracts::table)
            .values(NewContractRow::from(&contract))
            .returning(ContractRow::as_returning())
            .get_result::<ContractRow>(self.conn())
            .await
            .map_err(map_diesel_error)?;
        Contract::try_from(row)
    }

    async fn update_contract(&mut self, contract: &Contract) -> Result<(), WorkflowStoreError> {
        let affected = diesel::update(contracts::table.find(contract.id.get()))
            .set(ContractChanges::from(contract))
            .execute(self.conn())
            .await
            .map_err(map_diesel_error)?;
        expect_one(affected, "contract", contract.id.get())
    }

    async fn delete_contract(&mut self, id: ContractId) -> Result<(), WorkflowStoreError> {
        let affected = diesel::delete(contracts::table.find(id.get()))
            .execute(self.conn())
            .await
            .map_err(map_diesel_error)?;
        expect_one(affected, "contract", id.get())
    }

    async fn find_task(&mut self, id: TaskId) -> Result<Option<Task>, WorkflowStoreError> {
        let row = tasks::table
            .find(id.get())
            .select(TaskRow::as_select())
            .first::<TaskRow>(self.conn())
            .await
            .optional()
            .map_err(map_diesel_error)?;
        row.map(Task::try_from).transpose()
    }

    async fn list_tasks(&mut self, query: &TaskQuery) -> Result<Vec<Task>, WorkflowStoreError> {
        let filter = &query.filter;
        let mut statement = tasks::table.select(TaskRow::as_select()).into_boxed();
        if let Some(status) = filter.status {
            statement = statement.filter(tasks::status.eq(status.as_str()));
        }
        if let Some(user) = filter.assigned_to {
            statement = statement.filter(tasks::assigned_to.eq(user.get()));
        }
        if let Some(limit) = filter.due_on_or_before {
            statement = statement.filter(tasks::due_date.le(limit));
        }
        if let Some(contract) = filter.contract_id {
            statement = statement.filter(tasks::contract_id.eq(contract.get()));
        }
        statement = match query.order {
            TaskOrder::RecentlyUpdated => {
                statement.order((tasks::updated_at.desc(), tasks::id.desc()))
            }
            TaskOrder::RecentlyCompleted => {
                statement.order((tasks::completed_at.desc().nulls_last(), tasks::id.desc()))
            }
        };
        let rows = statement
            .load::<TaskRow>(self.conn())
            .await
            .map_err(map_diesel_error)?;
        decode(rows)
    }

    async fn count_tasks(&mut self) -> Result<u64, WorkflowStoreError> {
        let total = tasks::table
            .count()
            .get_result::<i64>(self.conn())
            .await
            .map_err(map_diesel_error)?;
        to_count(total)
    }

    async fn insert_task(&mut self, task: NewTask) -> Result<Task, WorkflowStoreError> {
        let row = diesel::insert_into(tasks::table)
            .values(NewTaskRow::from(&task))
            .returning(TaskRow::as_returning())
            .get_result::<TaskRow>(self.conn())
            .await
            .map_err(map_diesel_error)?;
        Task::try_from(row)
    }

    async fn update_task(&mut self, task: &Task) -> Result<(), WorkflowStoreError> {
        let affected = diesel::update(tasks::table.find(task.id.get()))
            .set(TaskChanges::from(task))
            .execute(self.conn())
            .await
            .map_err(map_diesel_error)?;
        expect_one(affected, "task", task.id.get())
    }

    async fn delete_task(&mut self, id: TaskId) -> Result<(), WorkflowStoreError> {
        let affected = diesel::delete(tasks::table.find(id.get()))
            .execute(self.conn())
            .await
            .map_err(map_diesel_error)?;
        expect_one(affected, "task", id.get())
    }

    async fn append_audit(
        &mut self,
        entry: NewAuditEntry,
    ) -> Result<AuditEntry, WorkflowStoreError> {
        let row = diesel::insert_into(audit_log::table)
            .values(NewAuditEntryRow::from(&entry))
            .returning(AuditEntryRow::as_returning())
            .get_result::<AuditEntryRow>(self.conn())
            .await
            .map_err(map_diesel_error)?;
        AuditEntry::try_from(row)
    }

    async fn list_audit(&mut self, limit: u32) -> Result<Vec<AuditEntry>, WorkflowStoreError> {
        let rows = audit_log::table
            .select(AuditEntryRow::as_select())
            .order((audit_log::at.desc(), audit_log::id.desc()))
            .limit(i64::from(limit))
            .load::<AuditEntryRow>(self.conn())
            .await
            .map_err(map_diesel_error)?;
        decode(rows)
    }
}

#[async_trait]
impl WorkflowStore for DieselWorkflowStore {
    async fn transaction<T, E, F>(&self, work: F) -> Result<T, E>
    where
        F: for<'t> FnOnce(&'t mut dyn WorkflowTransaction) -> BoxFuture<'t, Result<T, E>>
            + Send
            + 'static,
        T: Send + 'static,
        E: From<WorkflowStoreError> + Send + 'static,
    {
        let mut pooled = self
            .pool
            .get()
            .await
            .map_err(|err| E::from(map_pool_error(err)))?;
        let conn: &mut AsyncPgConnection = &mut pooled;

        conn.transaction(|conn| {
            async move {
                let mut tx = PgTransaction { conn };
                work(&mut tx).await.map_err(Aborted::Work)
            }
            .scope_boxed()
        })
        .await
        .map_err(|aborted| match aborted {
            Aborted::Work(err) => err,
            Aborted::Store(err) => E::from(map_diesel_error(err)),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("DoD", "%DoD%")]
    #[case("50%_off", "%50\\%\\_off%")]
    #[case("a\\b", "%a\\\\b%")]
    fn agency_patterns_escape_wildcards(#[case] needle: &str, #[case] expected: &str) {
        assert_eq!(contains_pattern(needle), expected);
    }

    #[rstest]
    fn active_statuses_match_the_domain() {
        assert_eq!(
            active_statuses(),
            vec!["draft", "assigned", "in_progress", "submitted"]
        );
    }

    #[rstest]
    fn zero_affected_rows_is_a_missing_record() {
        assert_eq!(
            expect_one(0, "task", 9),
            Err(WorkflowStoreError::missing_record("task", 9_i64))
        );
        assert_eq!(expect_one(1, "task", 9), Ok(()));
    }
}
