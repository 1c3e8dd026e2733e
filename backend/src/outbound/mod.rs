//! Outbound adapters implementing the [`crate::domain::ports::WorkflowStore`]
//! port.
//!
//! - **persistence**: PostgreSQL via Diesel, used in deployments.
//! - **memory**: process-local store for development runs and tests.
//!
//! Adapters translate between storage rows and domain records. They contain
//! no business logic.

pub mod memory;
pub mod persistence;
