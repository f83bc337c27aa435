//! gen-core: orquestador de solicitudes de generación.
//!
//! Convierte notificaciones de builds y operaciones en exactamente una
//! solicitud seguida y la conduce por sus fases hasta un estado terminal.
pub mod constants;
pub mod engine;
pub mod errors;
pub mod event;
pub mod factory;
pub mod hashing;
pub mod phase;
pub mod repo;

pub use engine::{ExecutionSubstrate, HandleOutcome, Observation, Orchestrator, OrchestratorBuilder, Reconciliation,
                 StatusListener, WorkflowReconciler};
pub use errors::{classify_error, CoreEngineError, ErrorClass};
pub use event::{route, BuildEvent, EventStatus, ExternalEvent, OperationEvent, StatusUpdate};
pub use factory::{adjust, DropReason, FactoryDecision, OperationOutcomeLookup};
pub use phase::{EmbeddedTemplates, Phase, PhaseTaskBuilder, PhaseTaskDescriptor, ResourceSpec, TaskParam, TemplateSource};
pub use repo::{DeduplicationStore, InMemoryWorkflowStore, Projection, StatusProjector, WorkflowStore};
