//! Demo data seeding.
//!
//! Seeds three accounts, one sample contract and two tasks into an empty
//! store. Every write goes through [`WorkflowService`] as the system
//! principal, so the seed shows up in the audit log like any other change.

use std::sync::Arc;

use futures_util::FutureExt;
use mockable::Clock;
use tracing::info;

use crate::domain::ports::WorkflowStore;
use crate::domain::{
    Actor, ContractStatus, CreateContract, CreateTask, CreateUser, Error, Role, TaskStatus,
    WorkflowService,
};

/// Result of a seeding attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DemoSeedOutcome {
    /// Records were written.
    Seeded {
        /// Accounts created.
        users: usize,
        /// Contracts created.
        contracts: usize,
        /// Tasks created.
        tasks: usize,
    },
    /// Users already existed, so nothing was written.
    AlreadyPopulated,
}

const DEMO_USERS: [(&str, &str, Role); 3] = [
    ("Admin", "admin@example.com", Role::Admin),
    ("Officer One", "officer1@example.com", Role::Officer),
    ("Viewer", "viewer@example.com", Role::Viewer),
];

const DEMO_TASKS: [(&str, TaskStatus); 2] = [
    ("Review solicitation and amendments", TaskStatus::InProgress),
    ("Draft technical volume", TaskStatus::ToDo),
];

/// Seed demo records when the store has no users.
pub async fn seed_demo_data<S: WorkflowStore>(
    store: Arc<S>,
    clock: Arc<dyn Clock>,
) -> Result<DemoSeedOutcome, Error> {
    let existing = store
        .transaction(|tx| async move { tx.count_users().await }.boxed())
        .await?;
    if existing > 0 {
        info!(existing, "demo data skipped; users already present");
        return Ok(DemoSeedOutcome::AlreadyPopulated);
    }

    let today = clock.utc().date_naive();
    let service = WorkflowService::new(store, clock);
    let system = Actor::System;

    let mut officer = None;
    for (name, email, role) in DEMO_USERS {
        let user = service
            .create_user_as(
                &system,
                CreateUser {
                    name: name.to_owned(),
                    email: email.to_owned(),
                    role,
                    active: true,
                },
            )
            .await?;
        if role == Role::Officer {
            officer = Some(user.id);
        }
    }

    let contract = service
        .create_contract_as(
            &system,
            CreateContract {
                number: "W56HZV-25-R-0001".to_owned(),
                title: "Vehicle Maintenance Support".to_owned(),
                agency: Some("DoD".to_owned()),
                naics: Some("811111".to_owned()),
                set_aside: Some("SDVOSB".to_owned()),
                description: Some("Preventative maintenance and on-demand repairs.".to_owned()),
                status: Some(ContractStatus::Assigned),
                officer_id: officer,
                due_date: Some(today),
            },
        )
        .await?;

    for (description, status) in DEMO_TASKS {
        service
            .create_task_as(
                &system,
                CreateTask {
                    contract_id: contract.id,
                    description: description.to_owned(),
                    status: Some(status),
                    assigned_to: officer,
                    due_date: None,
                    notes: None,
                },
            )
            .await?;
    }

    let outcome = DemoSeedOutcome::Seeded {
        users: DEMO_USERS.len(),
        contracts: 1,
        tasks: DEMO_TASKS.len(),
    };
    info!(?outcome, "demo data seeded");
    Ok(outcome)
}
