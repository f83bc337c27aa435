use std::fmt;

use gen_domain::WorkflowRecord;
use uuid::Uuid;

/// Motivo por el que un evento no produce trabajo.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DropReason {
    MissingIdentifier,
    /// El build no cumple los criterios de aceptación.
    NotAccepted,
    /// Ya existe un registro activo que cubre el evento.
    AlreadyTracked,
    /// La operación todavía no terminó.
    InProgress,
    /// La operación falló en origen y ningún registro la sigue.
    UpstreamFailedUntracked,
}

impl DropReason {
    pub fn as_str(&self) -> &'static str {
        match self {
            DropReason::MissingIdentifier => "missing-identifier",
            DropReason::NotAccepted => "not-accepted",
            DropReason::AlreadyTracked => "already-tracked",
            DropReason::InProgress => "in-progress",
            DropReason::UpstreamFailedUntracked => "upstream-failed-untracked",
        }
    }
}

impl fmt::Display for DropReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Acción decidida por la fábrica para un evento.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FactoryDecision {
    /// Registro nuevo a insertar.
    Create(WorkflowRecord),
    /// Registro existente reanudado (mismo id, config y creation_time).
    Resume(WorkflowRecord),
    /// El registro `id` debe pasar a FAILED con `reason`.
    Fail { id: Uuid, reason: String },
    Drop(DropReason),
}
