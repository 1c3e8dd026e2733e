//! Shared helpers for integration tests that need a real PostgreSQL.
//!
//! Integration tests compile as separate crates under `backend/tests/`, so
//! the cluster bootstrap and skip policy live here rather than being copied
//! into every suite.

pub mod cluster_skip;
pub mod embedded_postgres;

pub use cluster_skip::handle_cluster_setup_failure;
pub use embedded_postgres::{drop_audit_log_table, provision_template_database, shared_cluster};
