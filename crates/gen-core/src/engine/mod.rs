//! Motor de reconciliación y orquestación de solicitudes de generación.

pub mod builder;
pub mod listener;
pub mod orchestrator;
pub mod reconciler;
pub mod substrate;

pub use builder::OrchestratorBuilder;
pub use listener::StatusListener;
pub use orchestrator::{HandleOutcome, Orchestrator};
pub use reconciler::{Observation, Reconciliation, WorkflowReconciler};
pub use substrate::ExecutionSubstrate;
