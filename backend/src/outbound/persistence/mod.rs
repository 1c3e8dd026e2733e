//! PostgreSQL persistence adapter using Diesel.
//!
//! [`DieselWorkflowStore`] implements the `WorkflowStore` port over a `bb8`
//! pool of `diesel-async` connections. Row structs (`models.rs`) and table
//! definitions (`schema.rs`) stay private to this module; only domain records
//! cross the port.
//!
//! # Example
//!
//! ```no_run
//! use contract_workflow::outbound::persistence::{DbPool, DieselWorkflowStore, PoolConfig};
//!
//! # async fn connect() -> Result<(), Box<dyn std::error::Error>> {
//! let pool = DbPool::new(PoolConfig::new("postgres://localhost/workflow")).await?;
//! let store = DieselWorkflowStore::new(pool);
//! # let _ = store;
//! # Ok(())
//! # }
//! ```

mod diesel_workflow_store;
mod error_mapping;
mod migrations;
mod models;
mod pool;
mod schema;

pub use diesel_workflow_store::DieselWorkflowStore;
pub use migrations::{MIGRATIONS, MigrationError, run_pending_migrations};
pub use pool::{DbPool, PoolConfig, PoolError};
