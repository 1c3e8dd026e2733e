//! Domain primitives, policy and services.
//!
//! Purpose: hold the workflow records, the role-based access policy, the
//! audited mutation engine and the read-side queries, independent of HTTP and
//! storage. Adapters reach the domain only through the traits in [`ports`].
//!
//! Public surface:
//! - Records: [`User`], [`Contract`], [`Task`], [`AuditEntry`] and their
//!   command/patch types.
//! - Policy: [`access::authorize`].
//! - Services: [`WorkflowService`] (mutations) and [`WorkflowQueryService`]
//!   (reads).
//! - Errors: [`Error`] and [`ErrorCode`], shared by every adapter.

pub mod access;
pub mod audit;
pub mod audit_recorder;
pub mod contract;
pub mod demo_data;
pub mod error;
mod fields;
pub mod ids;
pub mod ports;
pub mod task;
pub mod timestamps;
mod token;
pub mod trace_id;
pub mod user;
pub mod workflow_queries;
pub mod workflow_service;

pub use self::audit::{
    Actor, AuditAction, AuditEntry, EntityKind, NewAuditEntry, SYSTEM_ACTOR,
};
pub use self::audit_recorder::{AuditEvent, AuditRecorder};
pub use self::contract::{
    Contract, ContractFilter, ContractPatch, ContractStatus, CreateContract, NewContract,
};
pub use self::demo_data::{DemoSeedOutcome, seed_demo_data};
pub use self::error::{
    DomainError, DomainError as Error, ErrorCode, ErrorValidationError, TRACE_ID_HEADER,
};
pub use self::ids::{AuditEntryId, ContractId, TaskId, UserId};
pub use self::task::{CreateTask, NewTask, Task, TaskFilter, TaskPatch, TaskStatus};
pub use self::token::ParseTokenError;
pub use self::trace_id::TraceId;
pub use self::user::{CreateUser, Email, EmailValidationError, NewUser, Role, User, UserPatch};
pub use self::workflow_queries::WorkflowQueryService;
pub use self::workflow_service::WorkflowService;
