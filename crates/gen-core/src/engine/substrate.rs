use uuid::Uuid;

use crate::errors::CoreEngineError;
use crate::phase::PhaseTaskDescriptor;

/// Sustrato externo que ejecuta las tareas de fase.
///
/// Las implementaciones son idempotentes por `descriptor.name`: reenviar la
/// misma tarea no debe lanzar una segunda ejecución.
pub trait ExecutionSubstrate: Send + Sync {
    /// Un fallo de infraestructura se reporta como `TransientInfrastructure`.
    fn submit(&self, descriptor: &PhaseTaskDescriptor) -> Result<(), CoreEngineError>;

    /// Libera los recursos de tareas de un workflow terminal.
    fn abandon(&self, workflow_id: Uuid) -> Result<(), CoreEngineError>;
}
