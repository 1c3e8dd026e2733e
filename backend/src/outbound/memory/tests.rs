//! Tests for the in-memory workflow store.

use chrono::{DateTime, NaiveDate, TimeZone, Utc};
use futures_util::FutureExt;
use rstest::{fixture, rstest};

use super::*;
use crate::domain::{ContractFilter, ContractStatus, Error, ErrorCode, Role, TaskStatus};

fn at(secs: i64) -> DateTime<Utc> {
    Utc.timestamp_opt(secs, 0).single().expect("valid timestamp")
}

fn new_contract(number: &str, due: Option<NaiveDate>, secs: i64) -> NewContract {
    NewContract {
        number: number.to_owned(),
        title: format!("Pursuit {number}"),
        agency: Some("DoD".to_owned()),
        naics: None,
        set_aside: None,
        description: None,
        status: ContractStatus::Draft,
        officer_id: None,
        due_date: due,
        created_at: at(secs),
    }
}

fn new_user(email: &str, secs: i64) -> NewUser {
    NewUser {
        name: email.to_owned(),
        email: Email::new(email).expect("email"),
        role: Role::Officer,
        active: true,
        created_at: at(secs),
    }
}

#[fixture]
fn store() -> InMemoryWorkflowStore {
    InMemoryWorkflowStore::new()
}

#[rstest]
#[tokio::test]
async fn ok_commits_and_err_rolls_back(store: InMemoryWorkflowStore) {
    store
        .transaction(|tx| {
            async move {
                tx.insert_contract(new_contract("A", None, 1)).await?;
                Ok::<_, Error>(())
            }
            .boxed()
        })
        .await
        .expect("first transaction commits");

    let failed = store
        .transaction(|tx| {
            async move {
                tx.insert_contract(new_contract("B", None, 2)).await?;
                Err::<(), _>(Error::invalid_request("abort"))
            }
            .boxed()
        })
        .await;
    assert!(failed.is_err());

    let total = store
        .transaction(|tx| async move { Ok::<_, Error>(tx.count_contracts(false).await?) }.boxed())
        .await
        .expect("count");
    assert_eq!(total, 1);
}

#[rstest]
#[tokio::test]
async fn duplicate_email_is_a_conflict(store: InMemoryWorkflowStore) {
    let error = store
        .transaction(|tx| {
            async move {
                tx.insert_user(new_user("a@example.com", 1)).await?;
                tx.insert_user(new_user("a@example.com", 2)).await?;
                Ok::<_, Error>(())
            }
            .boxed()
        })
        .await
        .expect_err("duplicate rejected");
    assert_eq!(error.code(), ErrorCode::ServiceUnavailable);
}

#[rstest]
#[tokio::test]
async fn due_date_order_puts_undated_last(store: InMemoryWorkflowStore) {
    let numbers = store
        .transaction(|tx| {
            async move {
                tx.insert_contract(new_contract("undated", None, 1)).await?;
                tx.insert_contract(new_contract("late", NaiveDate::from_ymd_opt(2025, 9, 1), 2))
                    .await?;
                tx.insert_contract(new_contract("soon", NaiveDate::from_ymd_opt(2025, 6, 1), 3))
                    .await?;
                let query = ContractQuery {
                    filter: ContractFilter::default(),
                    active_only: true,
                    order: ContractOrder::DueDate,
                };
                let listed = tx.list_contracts(&query).await?;
                Ok::<_, Error>(listed.into_iter().map(|c| c.number).collect::<Vec<_>>())
            }
            .boxed()
        })
        .await
        .expect("listing");
    assert_eq!(numbers, ["soon", "late", "undated"]);
}

#[rstest]
#[tokio::test]
async fn completed_order_is_newest_first_with_open_tasks_last(store: InMemoryWorkflowStore) {
    let ids = store
        .transaction(|tx| {
            async move {
                for (secs, completed) in [(1, Some(10)), (2, None), (3, Some(20))] {
                    tx.insert_task(NewTask {
                        contract_id: ContractId::new(1),
                        description: format!("task {secs}"),
                        status: completed.map_or(TaskStatus::ToDo, |_| TaskStatus::Done),
                        assigned_to: None,
                        due_date: None,
                        completed_at: completed.map(at),
                        notes: None,
                        created_at: at(secs),
                    })
                    .await?;
                }
                let query = TaskQuery {
                    order: TaskOrder::RecentlyCompleted,
                    ..TaskQuery::default()
                };
                let listed = tx.list_tasks(&query).await?;
                Ok::<_, Error>(listed.into_iter().map(|t| t.id.get()).collect::<Vec<_>>())
            }
            .boxed()
        })
        .await
        .expect("listing");
    assert_eq!(ids, [3, 1, 2]);
}

#[rstest]
#[tokio::test]
async fn updating_missing_rows_reports_missing_record(store: InMemoryWorkflowStore) {
    let error = store
        .transaction(|tx| {
            async move {
                tx.delete_task(TaskId::new(99)).await?;
                Ok::<_, Error>(())
            }
            .boxed()
        })
        .await
        .expect_err("missing");
    assert_eq!(error.code(), ErrorCode::NotFound);
    assert_eq!(error.message(), "task 99 not found");
}

#[rstest]
#[tokio::test]
async fn armed_audit_failure_rejects_appends(store: InMemoryWorkflowStore) {
    store.fail_audit_appends(true);
    let result = store
        .transaction(|tx| {
            async move {
                let entry = NewAuditEntry {
                    at: at(1),
                    user_id: None,
                    actor: "system".to_owned(),
                    action: crate::domain::AuditAction::Create,
                    entity: crate::domain::EntityKind::User,
                    entity_id: 1,
                    before: None,
                    after: None,
                };
                tx.append_audit(entry).await?;
                Ok::<_, Error>(())
            }
            .boxed()
        })
        .await;
    assert_eq!(
        result.expect_err("append fails").code(),
        ErrorCode::ServiceUnavailable
    );
}

fn audit_entry(entity_id: i64, secs: i64) -> NewAuditEntry {
    NewAuditEntry {
        at: at(secs),
        user_id: None,
        actor: "system".to_owned(),
        action: crate::domain::AuditAction::Create,
        entity: crate::domain::EntityKind::Contract,
        entity_id,
        before: None,
        after: None,
    }
}

async fn audit_ids(store: &InMemoryWorkflowStore) -> Vec<i64> {
    store
        .transaction(|tx| {
            async move {
                let entries = tx.list_audit(50).await?;
                Ok::<_, Error>(entries.into_iter().map(|e| e.id.get()).collect::<Vec<_>>())
            }
            .boxed()
        })
        .await
        .expect("audit listing")
}

#[rstest]
#[tokio::test]
async fn audit_appends_are_buffered_until_commit(store: InMemoryWorkflowStore) {
    store
        .transaction(|tx| {
            async move {
                tx.append_audit(audit_entry(1, 1)).await?;
                Ok::<_, Error>(())
            }
            .boxed()
        })
        .await
        .expect("first append commits");

    let seen_inside = store
        .transaction(|tx| {
            async move {
                tx.append_audit(audit_entry(2, 2)).await?;
                let entries = tx.list_audit(50).await?;
                let ids: Vec<i64> = entries.into_iter().map(|e| e.id.get()).collect();
                Err::<Vec<i64>, _>(Error::invalid_request(format!("abort after {ids:?}")))
            }
            .boxed()
        })
        .await
        .expect_err("work aborts");
    assert_eq!(seen_inside.message(), "abort after [2, 1]");
    assert_eq!(audit_ids(&store).await, [1]);

    store
        .transaction(|tx| {
            async move {
                tx.append_audit(audit_entry(3, 3)).await?;
                tx.append_audit(audit_entry(4, 4)).await?;
                Ok::<_, Error>(())
            }
            .boxed()
        })
        .await
        .expect("second batch commits");
    assert_eq!(audit_ids(&store).await, [3, 2, 1]);
}

#[rstest]
#[tokio::test]
async fn emails_are_unique_regardless_of_case(store: InMemoryWorkflowStore) {
    let error = store
        .transaction(|tx| {
            async move {
                tx.insert_user(new_user("Officer@Example.com", 1)).await?;
                tx.insert_user(new_user("officer@example.COM", 2)).await?;
                Ok::<_, Error>(())
            }
            .boxed()
        })
        .await
        .expect_err("case-folded duplicate rejected");
    assert!(error.code().is_retryable());
}
