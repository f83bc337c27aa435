//! Máquina de estados pura de una solicitud de generación.
//!
//! `reconcile` no hace I/O, no espera tareas y no reintenta: recibe el
//! registro actual y una observación y devuelve el registro deseado y la
//! tarea deseada. El progreso se reanuda en la siguiente observación
//! (level-triggered), por eso reenviar la misma observación es seguro.
use gen_domain::{GenerationResult, GenerationStatus, RuntimeConfig, WorkflowRecord};
use log::{debug, warn};

use crate::constants::GENERATION_FINISHED_REASON;
use crate::errors::CoreEngineError;
use crate::event::{EventStatus, StatusUpdate};
use crate::phase::{Phase, PhaseTaskBuilder, PhaseTaskDescriptor};

/// Entrada del reconciliador.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Observation {
    /// Re-observación sin novedad.
    Pending,
    /// Configuración resuelta para un registro en NEW.
    ConfigResolved(RuntimeConfig),
    TaskSucceeded(Phase),
    TaskFailed { phase: Phase, reason: String },
    /// El sistema origen reportó un fallo sobre el trabajo seguido.
    UpstreamFailure { reason: String },
}

impl Observation {
    /// Traduce el payload de un ejecutor de `phase`.
    pub fn from_status_update(phase: Phase, update: &StatusUpdate) -> Self {
        match update.status {
            EventStatus::Success => Observation::TaskSucceeded(phase),
            EventStatus::Error | EventStatus::Failed => {
                let reason = if update.reason.trim().is_empty() {
                    format!("phase {phase} failed")
                } else {
                    update.reason.clone()
                };
                Observation::TaskFailed { phase, reason }
            }
            EventStatus::New | EventStatus::Processing => Observation::Pending,
        }
    }
}

/// Salida de `reconcile`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Reconciliation {
    /// Registro deseado; igual al de entrada si `changed == false`.
    pub record: WorkflowRecord,
    pub desired_task: Option<PhaseTaskDescriptor>,
    pub changed: bool,
}

#[derive(Debug, Clone, Default)]
pub struct WorkflowReconciler {
    builder: PhaseTaskBuilder,
}

impl WorkflowReconciler {
    pub fn new(builder: PhaseTaskBuilder) -> Self {
        Self { builder }
    }

    pub fn builder(&self) -> &PhaseTaskBuilder {
        &self.builder
    }

    pub fn reconcile(&self, record: &WorkflowRecord, observation: Observation) -> Reconciliation {
        if record.status.is_terminal() {
            debug!("reconcile: {} is {}, ignoring {:?}", record.id, record.status, observation);
            return unchanged(record, None);
        }

        match observation {
            Observation::TaskFailed { phase, reason } => {
                warn!("reconcile: {} phase {phase} failed: {reason}", record.id);
                changed(record.failed(GenerationResult::ErrGeneral, reason), None)
            }
            Observation::UpstreamFailure { reason } => {
                warn!("reconcile: {} upstream failure: {reason}", record.id);
                changed(record.failed(GenerationResult::ErrGeneral, reason), None)
            }
            Observation::ConfigResolved(config) if record.status == GenerationStatus::New => {
                let next = record.clone()
                                 .with_config(config)
                                 .with_status(GenerationStatus::Initialized);
                self.advance(next, Phase::Init)
            }
            Observation::TaskSucceeded(Phase::Init) if record.status == GenerationStatus::Initialized => {
                self.advance(record.clone().with_status(GenerationStatus::Generating), Phase::Generate)
            }
            Observation::TaskSucceeded(Phase::Generate) if record.status == GenerationStatus::Generating => {
                changed(record.finished(GENERATION_FINISHED_REASON), None)
            }
            other => {
                if !matches!(other, Observation::Pending) {
                    debug!("reconcile: stale {:?} for {} in {}", other, record.id, record.status);
                }
                self.hold(record)
            }
        }
    }

    /// Fase cuya tarea se desea mientras el registro está en `status`.
    fn desired_phase(status: GenerationStatus) -> Option<Phase> {
        match status {
            GenerationStatus::Initialized => Some(Phase::Init),
            GenerationStatus::Generating => Some(Phase::Generate),
            _ => None,
        }
    }

    /// Mantiene el estado y reemite la tarea de la fase actual.
    fn hold(&self, record: &WorkflowRecord) -> Reconciliation {
        let Some(phase) = Self::desired_phase(record.status) else {
            return unchanged(record, None);
        };
        match self.builder.build(record.id, phase, record.config.as_ref()) {
            Ok(task) => unchanged(record, Some(task)),
            Err(e) => changed(config_failure(record, &e), None),
        }
    }

    /// Aplica la transición y emite la tarea de `phase`.
    fn advance(&self, next: WorkflowRecord, phase: Phase) -> Reconciliation {
        match self.builder.build(next.id, phase, next.config.as_ref()) {
            Ok(task) => changed(next, Some(task)),
            Err(e) => changed(config_failure(&next, &e), None),
        }
    }
}

fn config_failure(record: &WorkflowRecord, err: &CoreEngineError) -> WorkflowRecord {
    warn!("reconcile: {} cannot describe its task: {err}", record.id);
    let reason = match err {
        CoreEngineError::Configuration(cause) => cause.clone(),
        other => other.to_string(),
    };
    record.failed(GenerationResult::ErrConfigMissing, reason)
}

fn unchanged(record: &WorkflowRecord, desired_task: Option<PhaseTaskDescriptor>) -> Reconciliation {
    Reconciliation { record: record.clone(),
                     desired_task,
                     changed: false }
}

fn changed(record: WorkflowRecord, desired_task: Option<PhaseTaskDescriptor>) -> Reconciliation {
    Reconciliation { record,
                     desired_task,
                     changed: true }
}

#[cfg(test)]
mod tests {
    use super::*;
    use gen_domain::{BuildConfig, WorkflowKind};

    fn cfg() -> RuntimeConfig {
        RuntimeConfig::Build(BuildConfig { api_version: "v1".into(),
                                           build_id: "B1".into(),
                                           products: vec![] })
    }

    fn new_build() -> WorkflowRecord {
        WorkflowRecord::new(WorkflowKind::Build, "B1", GenerationStatus::New)
    }

    #[test]
    fn new_waits_for_config() {
        let r = WorkflowReconciler::default().reconcile(&new_build(), Observation::Pending);
        assert!(!r.changed);
        assert!(r.desired_task.is_none());
    }

    #[test]
    fn config_resolved_moves_to_initialized_with_init_task() {
        let r = WorkflowReconciler::default().reconcile(&new_build(), Observation::ConfigResolved(cfg()));
        assert!(r.changed);
        assert_eq!(r.record.status, GenerationStatus::Initialized);
        assert_eq!(r.record.config, Some(cfg()));
        assert_eq!(r.desired_task.map(|t| t.phase), Some(Phase::Init));
    }

    #[test]
    fn initialized_without_config_fails_with_config_missing() {
        let rec = WorkflowRecord::new(WorkflowKind::Build, "B1", GenerationStatus::Initialized);
        let r = WorkflowReconciler::default().reconcile(&rec, Observation::Pending);
        assert!(r.changed);
        assert_eq!(r.record.status, GenerationStatus::Failed);
        assert_eq!(r.record.result, Some(GenerationResult::ErrConfigMissing));
        assert!(r.desired_task.is_none());
    }

    #[test]
    fn stale_generate_success_while_initialized_reemits_init() {
        let rec = new_build().with_config(cfg()).with_status(GenerationStatus::Initialized);
        let r = WorkflowReconciler::default().reconcile(&rec, Observation::TaskSucceeded(Phase::Generate));
        assert!(!r.changed);
        assert_eq!(r.record, rec);
        assert_eq!(r.desired_task.map(|t| t.phase), Some(Phase::Init));
    }

    #[test]
    fn status_update_mapping() {
        let ok = StatusUpdate::new(EventStatus::Success, "");
        assert_eq!(Observation::from_status_update(Phase::Init, &ok), Observation::TaskSucceeded(Phase::Init));
        let bad = StatusUpdate::new(EventStatus::Error, "");
        assert_eq!(Observation::from_status_update(Phase::Generate, &bad),
                   Observation::TaskFailed { phase: Phase::Generate,
                                             reason: "phase generate failed".into() });
        let running = StatusUpdate::new(EventStatus::Processing, "busy");
        assert_eq!(Observation::from_status_update(Phase::Init, &running), Observation::Pending);
    }
}
