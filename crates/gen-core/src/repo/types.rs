//! Contratos de almacenamiento: deduplicación (lectura de activos) y
//! proyección de estado (único camino de escritura).
//!
//! Ambos backends (memoria y Postgres) comparten la regla de fusión
//! `merge_projection` para garantizar paridad exacta de semántica.
use gen_domain::{GenerationStatus, WorkflowKind, WorkflowRecord};
use uuid::Uuid;

use crate::errors::CoreEngineError;

/// Resultado de `StatusProjector::persist`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Projection {
    /// Registro tal como quedó almacenado.
    pub record: WorkflowRecord,
    /// Estado previo; `None` si el registro se insertó.
    pub previous_status: Option<GenerationStatus>,
}

impl Projection {
    pub fn inserted(&self) -> bool {
        self.previous_status.is_none()
    }

    pub fn status_changed(&self) -> bool {
        self.previous_status != Some(self.record.status)
    }
}

/// Lookup `(kind, identifier)` → registros.
///
/// La lectura es autoritativa al momento de la llamada pero no linealizable
/// frente a escritores concurrentes: la unicidad la garantiza `persist`.
pub trait DeduplicationStore: Send + Sync {
    /// Registros no terminales para la clave, del más antiguo al más nuevo.
    fn find_pending(&self, kind: WorkflowKind, identifier: &str) -> Result<Vec<WorkflowRecord>, CoreEngineError>;

    /// Registro más reciente para la clave en cualquier estado, terminales
    /// incluidos.
    fn find_latest(&self, kind: WorkflowKind, identifier: &str) -> Result<Option<WorkflowRecord>, CoreEngineError>;

    /// Registro activo (el más antiguo) para la clave, si existe.
    fn find_active(&self, kind: WorkflowKind, identifier: &str) -> Result<Option<WorkflowRecord>, CoreEngineError> {
        Ok(self.find_pending(kind, identifier)?.into_iter().next())
    }
}

/// Proyección atómica de estado y acceso de lectura.
pub trait StatusProjector: Send + Sync {
    /// Upsert atómico (read-modify-write). Inserta si no existe, verificando
    /// la unicidad de activos (`DuplicateCreate`); si existe, aplica
    /// `merge_projection`.
    fn persist(&self, record: &WorkflowRecord) -> Result<Projection, CoreEngineError>;

    fn read(&self, id: Uuid) -> Result<Option<WorkflowRecord>, CoreEngineError>;

    /// Listado para lectores externos, ordenado por `creation_time`.
    fn list(&self, kind: Option<WorkflowKind>, status: Option<GenerationStatus>)
            -> Result<Vec<WorkflowRecord>, CoreEngineError>;
}

/// Backend completo usado por el orquestador.
pub trait WorkflowStore: DeduplicationStore + StatusProjector {}

impl<T: DeduplicationStore + StatusProjector> WorkflowStore for T {}

/// Regla de fusión de `persist` sobre un registro existente.
///
/// - Un registro terminal es inmutable: se devuelve tal cual.
/// - `status` sólo avanza (`GenerationStatus::can_transition_to`).
/// - `status`, `result` y `reason` se sobrescriben (last-write-wins).
/// - `config` sólo se escribe mientras el almacenado está en `New`.
/// - `kind`, `identifier` y `creation_time` no cambian nunca.
pub fn merge_projection(stored: &WorkflowRecord, incoming: &WorkflowRecord) -> Result<WorkflowRecord, CoreEngineError> {
    if stored.kind != incoming.kind || stored.identifier != incoming.identifier {
        return Err(CoreEngineError::Validation(format!("record {} cannot change its key ({} '{}' -> {} '{}')",
                                                       stored.id,
                                                       stored.kind,
                                                       stored.identifier,
                                                       incoming.kind,
                                                       incoming.identifier)));
    }
    if stored.status.is_terminal() {
        return Ok(stored.clone());
    }
    if !stored.status.can_transition_to(incoming.status) {
        return Err(CoreEngineError::InvalidTransition { from: stored.status,
                                                        to: incoming.status });
    }
    let mut merged = stored.clone();
    merged.status = incoming.status;
    merged.result = incoming.result;
    merged.reason = incoming.reason.clone();
    if stored.status == GenerationStatus::New {
        merged.config = incoming.config.clone();
    }
    Ok(merged)
}
