//! Builder para `Orchestrator`.
//!
//! El store y el lookup de operaciones son obligatorios; el reconciliador
//! (plantillas, prefijo, imagen) y los listeners son opcionales.
//!
//! ```ignore
//! let orchestrator = Orchestrator::builder(InMemoryWorkflowStore::new(), lookup)
//!     .reconciler(WorkflowReconciler::new(PhaseTaskBuilder::default().with_prefix("req")))
//!     .listener(Arc::new(LoggingListener))
//!     .build();
//! ```
use std::sync::Arc;

use super::listener::StatusListener;
use super::orchestrator::Orchestrator;
use super::reconciler::WorkflowReconciler;
use crate::factory::OperationOutcomeLookup;
use crate::repo::WorkflowStore;

pub struct OrchestratorBuilder<S: WorkflowStore> {
    store: S,
    lookup: Arc<dyn OperationOutcomeLookup>,
    reconciler: WorkflowReconciler,
    listeners: Vec<Arc<dyn StatusListener>>,
}

impl<S: WorkflowStore> OrchestratorBuilder<S> {
    pub fn new(store: S, lookup: Arc<dyn OperationOutcomeLookup>) -> Self {
        Self { store,
               lookup,
               reconciler: WorkflowReconciler::default(),
               listeners: Vec::new() }
    }

    #[inline]
    pub fn reconciler(mut self, reconciler: WorkflowReconciler) -> Self {
        self.reconciler = reconciler;
        self
    }

    /// Añade un listener; se notifican en orden de registro.
    #[inline]
    pub fn listener(mut self, listener: Arc<dyn StatusListener>) -> Self {
        self.listeners.push(listener);
        self
    }

    #[inline]
    pub fn build(self) -> Orchestrator<S> {
        Orchestrator::from_parts(self.store, self.lookup, self.reconciler, self.listeners)
    }
}
