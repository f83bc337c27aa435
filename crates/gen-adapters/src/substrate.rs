//! Sustrato de ejecución en memoria: registra las tareas en vez de lanzarlas.
use std::sync::{Mutex, MutexGuard};

use gen_core::{CoreEngineError, ExecutionSubstrate, PhaseTaskDescriptor};
use log::{debug, info};
use uuid::Uuid;

#[derive(Debug, Default)]
struct State {
    submitted: Vec<PhaseTaskDescriptor>,
    abandoned: Vec<Uuid>,
    failures_left: u32,
}

/// Idempotente por `descriptor.name`: reenviar una tarea ya registrada no
/// la duplica.
#[derive(Debug, Default)]
pub struct RecordingSubstrate {
    state: Mutex<State>,
}

impl RecordingSubstrate {
    pub fn new() -> Self {
        Self::default()
    }

    /// Hace fallar las próximas `n` llamadas a `submit` con
    /// `TransientInfrastructure`.
    pub fn fail_next(&self, n: u32) {
        if let Ok(mut s) = self.state.lock() {
            s.failures_left = n;
        }
    }

    fn lock(&self) -> Result<MutexGuard<'_, State>, CoreEngineError> {
        self.state
            .lock()
            .map_err(|_| CoreEngineError::Internal("substrate lock poisoned".into()))
    }

    pub fn submitted(&self) -> Vec<PhaseTaskDescriptor> {
        self.lock().map(|s| s.submitted.clone()).unwrap_or_default()
    }

    pub fn abandoned(&self) -> Vec<Uuid> {
        self.lock().map(|s| s.abandoned.clone()).unwrap_or_default()
    }
}

impl ExecutionSubstrate for RecordingSubstrate {
    fn submit(&self, descriptor: &PhaseTaskDescriptor) -> Result<(), CoreEngineError> {
        let mut s = self.lock()?;
        if s.failures_left > 0 {
            s.failures_left -= 1;
            return Err(CoreEngineError::TransientInfrastructure(format!("substrate unavailable for {}", descriptor.name)));
        }
        if s.submitted.iter().any(|d| d.name == descriptor.name) {
            debug!("submit: {} already present", descriptor.name);
            return Ok(());
        }
        info!("submit: {} (image={})", descriptor.name, descriptor.image);
        s.submitted.push(descriptor.clone());
        Ok(())
    }

    fn abandon(&self, workflow_id: Uuid) -> Result<(), CoreEngineError> {
        let mut s = self.lock()?;
        if !s.abandoned.contains(&workflow_id) {
            info!("abandon: tasks of {workflow_id}");
            s.abandoned.push(workflow_id);
        }
        Ok(())
    }
}
