//! Shared HTTP adapter state.
//!
//! Handlers receive this through `web::Data` and only ever see the driving
//! ports, so they can be exercised against mocks without a store.

use std::sync::Arc;

use crate::domain::ports::{WorkflowCommand, WorkflowQuery};

/// Dependency bundle for HTTP handlers.
#[derive(Clone)]
pub struct HttpState {
    /// Audited mutations.
    pub commands: Arc<dyn WorkflowCommand>,
    /// Authorized reads.
    pub queries: Arc<dyn WorkflowQuery>,
    /// Create an officer account on first login for unknown emails.
    pub auto_provision: bool,
}

impl HttpState {
    /// Bundle the driving ports with auto-provisioning disabled.
    ///
    /// # Examples
    /// ```
    /// use std::sync::Arc;
    ///
    /// use contract_workflow::domain::{WorkflowQueryService, WorkflowService};
    /// use contract_workflow::inbound::http::state::HttpState;
    /// use contract_workflow::outbound::memory::InMemoryWorkflowStore;
    /// use mockable::DefaultClock;
    ///
    /// let store = Arc::new(InMemoryWorkflowStore::new());
    /// let state = HttpState::new(
    ///     Arc::new(WorkflowService::new(Arc::clone(&store), Arc::new(DefaultClock))),
    ///     Arc::new(WorkflowQueryService::new(store)),
    /// )
    /// .with_auto_provision(true);
    /// assert!(state.auto_provision);
    /// ```
    #[must_use]
    pub const fn new(commands: Arc<dyn WorkflowCommand>, queries: Arc<dyn WorkflowQuery>) -> Self {
        Self {
            commands,
            queries,
            auto_provision: false,
        }
    }

    /// Toggle login auto-provisioning.
    #[must_use]
    pub const fn with_auto_provision(mut self, enabled: bool) -> Self {
        self.auto_provision = enabled;
        self
    }
}
