use gen_core::StatusListener;
use gen_domain::{GenerationStatus, WorkflowRecord};
use log::{info, warn};

/// Registra cada cambio de estado en el log.
#[derive(Debug, Default, Clone, Copy)]
pub struct LoggingListener;

impl StatusListener for LoggingListener {
    fn on_status_change(&self, record: &WorkflowRecord, previous: Option<GenerationStatus>) {
        let from = previous.map(|s| s.as_str()).unwrap_or("-");
        match record.status {
            GenerationStatus::Failed => warn!("{} {} '{}': {from} -> FAILED ({:?}: {})",
                                              record.id,
                                              record.kind,
                                              record.identifier,
                                              record.result,
                                              record.reason.as_deref().unwrap_or("")),
            status => info!("{} {} '{}': {from} -> {status}", record.id, record.kind, record.identifier),
        }
    }
}
