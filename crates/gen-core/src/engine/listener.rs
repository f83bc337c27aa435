use gen_domain::{GenerationStatus, WorkflowRecord};

/// Colaborador notificado tras cada cambio de estado persistido.
///
/// Las notificaciones son best-effort: un listener no puede hacer fallar la
/// transición que ya se persistió.
pub trait StatusListener: Send + Sync {
    /// `previous` es `None` cuando el registro acaba de crearse.
    fn on_status_change(&self, record: &WorkflowRecord, previous: Option<GenerationStatus>);
}
