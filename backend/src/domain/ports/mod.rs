//! Domain ports and supporting types for the hexagonal boundary.

mod macros;
pub(crate) use macros::define_port_error;

mod workflow_command;
mod workflow_query;
mod workflow_store;

pub use workflow_command::WorkflowCommand;
pub use workflow_query::{AUDIT_LOG_MAX_LIMIT, Dashboard, Report, ReportSummary, WorkflowQuery};
pub use workflow_store::{
    ContractOrder, ContractQuery, TaskOrder, TaskQuery, UserOrder, UserQuery, WorkflowStore,
    WorkflowStoreError, WorkflowTransaction,
};

#[cfg(test)]
pub use workflow_command::MockWorkflowCommand;
#[cfg(test)]
pub use workflow_query::MockWorkflowQuery;
#[cfg(test)]
pub use workflow_store::MockWorkflowTransaction;
