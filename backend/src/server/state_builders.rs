//! Construction of the HTTP adapter state from server configuration.
//!
//! The store is PostgreSQL when a pool is configured and process memory
//! otherwise. Demo seeding runs here, before the first request, so it sees the
//! same store the handlers will use.

use std::sync::Arc;

use actix_web::web;
use mockable::DefaultClock;
use tracing::{info, warn};

use contract_workflow::domain::ports::WorkflowStore;
use contract_workflow::domain::{
    DemoSeedOutcome, WorkflowQueryService, WorkflowService, seed_demo_data,
};
use contract_workflow::inbound::http::state::HttpState;
use contract_workflow::outbound::memory::InMemoryWorkflowStore;
use contract_workflow::outbound::persistence::DieselWorkflowStore;

use super::ServerConfig;

/// Build the shared handler state.
///
/// # Errors
/// Returns [`std::io::Error`] when demo seeding was requested and failed.
pub(super) async fn build_http_state(config: &ServerConfig) -> std::io::Result<web::Data<HttpState>> {
    let state = match &config.db_pool {
        Some(pool) => wire(Arc::new(DieselWorkflowStore::new(pool.clone())), config).await?,
        None => {
            warn!("no database configured; records are kept in memory and lost on restart");
            wire(Arc::new(InMemoryWorkflowStore::new()), config).await?
        }
    };
    Ok(web::Data::new(state.with_auto_provision(config.auto_provision)))
}

async fn wire<S>(store: Arc<S>, config: &ServerConfig) -> std::io::Result<HttpState>
where
    S: WorkflowStore + 'static,
{
    let clock = Arc::new(DefaultClock);
    if config.seed_demo_data {
        let outcome = seed_demo_data(store.clone(), clock.clone())
            .await
            .map_err(|err| std::io::Error::other(format!("demo data seeding failed: {err}")))?;
        match outcome {
            DemoSeedOutcome::Seeded {
                users,
                contracts,
                tasks,
            } => info!(users, contracts, tasks, "seeded demo data"),
            DemoSeedOutcome::AlreadyPopulated => {
                info!("store already has users; demo data skipped");
            }
        }
    }
    Ok(HttpState::new(
        Arc::new(WorkflowService::new(store.clone(), clock)),
        Arc::new(WorkflowQueryService::new(store)),
    ))
}
