//! Orquestador: conecta router, deduplicación, fábrica, reconciliador y
//! proyector de estado.
//!
//! Cada notificación es una unidad de trabajo independiente; el orquestador
//! es `Send + Sync` y se comparte detrás de un `Arc`. No reintenta: los
//! errores `TransientInfrastructure` se devuelven al llamador.
use std::sync::Arc;

use gen_domain::{GenerationStatus, RuntimeConfig, WorkflowKind, WorkflowRecord};
use log::{debug, info};
use uuid::Uuid;

use super::listener::StatusListener;
use super::reconciler::{Observation, Reconciliation, WorkflowReconciler};
use super::OrchestratorBuilder;
use crate::errors::CoreEngineError;
use crate::event::route;
use crate::factory::{self, adjust, DropReason, FactoryDecision, OperationOutcomeLookup};
use crate::phase::PhaseTaskDescriptor;
use crate::repo::{Projection, WorkflowStore};

/// Resultado de `Orchestrator::handle`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HandleOutcome {
    /// Registro nuevo; `task` es la tarea deseada, si la hay.
    Created { record: WorkflowRecord, task: Option<PhaseTaskDescriptor> },
    Resumed { record: WorkflowRecord, task: Option<PhaseTaskDescriptor> },
    /// Registro existente marcado FAILED por un fallo en origen.
    Failed { record: WorkflowRecord },
    /// Otra entrega concurrente ganó la creación.
    Duplicate { kind: WorkflowKind, identifier: String },
    Dropped(DropReason),
}

impl HandleOutcome {
    pub fn record(&self) -> Option<&WorkflowRecord> {
        match self {
            HandleOutcome::Created { record, .. } | HandleOutcome::Resumed { record, .. } | HandleOutcome::Failed { record } => {
                Some(record)
            }
            HandleOutcome::Duplicate { .. } | HandleOutcome::Dropped(_) => None,
        }
    }

    pub fn task(&self) -> Option<&PhaseTaskDescriptor> {
        match self {
            HandleOutcome::Created { task, .. } | HandleOutcome::Resumed { task, .. } => task.as_ref(),
            _ => None,
        }
    }
}

pub struct Orchestrator<S: WorkflowStore> {
    store: S,
    lookup: Arc<dyn OperationOutcomeLookup>,
    reconciler: WorkflowReconciler,
    listeners: Vec<Arc<dyn StatusListener>>,
}

impl<S: WorkflowStore> Orchestrator<S> {
    #[inline]
    pub fn builder(store: S, lookup: Arc<dyn OperationOutcomeLookup>) -> OrchestratorBuilder<S> {
        OrchestratorBuilder::new(store, lookup)
    }

    pub(crate) fn from_parts(store: S,
                             lookup: Arc<dyn OperationOutcomeLookup>,
                             reconciler: WorkflowReconciler,
                             listeners: Vec<Arc<dyn StatusListener>>)
                             -> Self {
        Self { store,
               lookup,
               reconciler,
               listeners }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn reconciler(&self) -> &WorkflowReconciler {
        &self.reconciler
    }

    /// Procesa una notificación cruda de tipo `kind`.
    pub fn handle(&self, raw: &str, kind: WorkflowKind) -> Result<HandleOutcome, CoreEngineError> {
        let event = route(raw, kind)?;
        // Un build se sigue una sola vez aunque su registro ya sea terminal;
        // una operación sólo se reanuda mientras su registro está activo.
        let existing = match kind {
            _ if event.identifier().trim().is_empty() => None,
            WorkflowKind::Build => self.store.find_latest(kind, event.identifier())?,
            WorkflowKind::Operation => self.store.find_active(kind, event.identifier())?,
        };

        match factory::create(&event, existing.as_ref(), self.lookup.as_ref())? {
            FactoryDecision::Create(record) => match self.store.persist(&record) {
                Ok(projection) => {
                    info!("handle: created {} for {} '{}' in {}",
                          projection.record.id, kind, projection.record.identifier, projection.record.status);
                    self.notify(&projection);
                    let rec = self.apply(&projection.record, Observation::Pending)?;
                    Ok(HandleOutcome::Created { record: rec.record,
                                                task: rec.desired_task })
                }
                Err(CoreEngineError::DuplicateCreate { .. }) => {
                    info!("handle: concurrent delivery already created {} '{}', skipping",
                          kind, event.identifier());
                    Ok(HandleOutcome::Duplicate { kind,
                                                  identifier: event.identifier().to_string() })
                }
                Err(e) => Err(e),
            },
            FactoryDecision::Resume(record) => match self.store.persist(&record) {
                Ok(projection) => {
                    info!("handle: resumed {} for {} '{}'", projection.record.id, kind, projection.record.identifier);
                    self.notify(&projection);
                    let rec = self.apply(&projection.record, Observation::Pending)?;
                    Ok(HandleOutcome::Resumed { record: rec.record,
                                                task: rec.desired_task })
                }
                Err(CoreEngineError::InvalidTransition { from, .. }) => {
                    info!("handle: {} advanced to {from} before resume, skipping", record.id);
                    Ok(HandleOutcome::Dropped(DropReason::AlreadyTracked))
                }
                Err(e) => Err(e),
            },
            FactoryDecision::Fail { id, reason } => {
                let rec = self.observe(id, Observation::UpstreamFailure { reason })?;
                Ok(HandleOutcome::Failed { record: rec.record })
            }
            FactoryDecision::Drop(reason) => {
                debug!("handle: {} '{}' dropped ({reason})", kind, event.identifier());
                Ok(HandleOutcome::Dropped(reason))
            }
        }
    }

    /// Entrega la configuración resuelta de un registro en NEW. Se le
    /// aplican los valores por defecto antes de reconciliar.
    pub fn resolve_config(&self, id: Uuid, mut config: RuntimeConfig) -> Result<Reconciliation, CoreEngineError> {
        let record = self.load(id)?;
        let config_kind = match config {
            RuntimeConfig::Build(_) => WorkflowKind::Build,
            RuntimeConfig::Operation(_) => WorkflowKind::Operation,
        };
        if config_kind != record.kind || config.identifier() != record.identifier {
            return Err(CoreEngineError::Validation(format!("config for {config_kind} '{}' does not belong to {} ({} '{}')",
                                                           config.identifier(),
                                                           record.id,
                                                           record.kind,
                                                           record.identifier)));
        }
        adjust(&mut config);
        self.apply(&record, Observation::ConfigResolved(config))
    }

    /// Aplica una observación al registro `id` y persiste el resultado.
    pub fn observe(&self, id: Uuid, observation: Observation) -> Result<Reconciliation, CoreEngineError> {
        let record = self.load(id)?;
        self.apply(&record, observation)
    }

    pub fn read(&self, id: Uuid) -> Result<Option<WorkflowRecord>, CoreEngineError> {
        self.store.read(id)
    }

    pub fn list(&self, kind: Option<WorkflowKind>, status: Option<GenerationStatus>)
                -> Result<Vec<WorkflowRecord>, CoreEngineError> {
        self.store.list(kind, status)
    }

    fn load(&self, id: Uuid) -> Result<WorkflowRecord, CoreEngineError> {
        self.store
            .read(id)?
            .ok_or_else(|| CoreEngineError::NotFound(id.to_string()))
    }

    fn apply(&self, record: &WorkflowRecord, observation: Observation) -> Result<Reconciliation, CoreEngineError> {
        let mut rec = self.reconciler.reconcile(record, observation);
        if rec.changed {
            let projection = self.store.persist(&rec.record)?;
            if projection.status_changed() {
                info!("workflow {}: {} -> {}",
                      projection.record.id,
                      projection.previous_status.map(|s| s.as_str()).unwrap_or("-"),
                      projection.record.status);
            }
            self.notify(&projection);
            // Otra unidad pudo cerrar el registro entre la lectura y la escritura.
            if projection.record.status.is_terminal() && !rec.record.status.is_terminal() {
                rec.desired_task = None;
            }
            rec.record = projection.record;
        }
        Ok(rec)
    }

    fn notify(&self, projection: &Projection) {
        if !projection.status_changed() {
            return;
        }
        for l in &self.listeners {
            l.on_status_change(&projection.record, projection.previous_status);
        }
    }
}
