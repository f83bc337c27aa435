//! Fábrica de workflows: decide qué hacer con un evento decodificado.
//!
//! Funciones libres y sin estado. La única dependencia externa es el lookup
//! del resultado de operaciones, que se inyecta.

mod adjust;
mod decision;

pub use adjust::adjust;
pub use decision::{DropReason, FactoryDecision};

use gen_domain::{BuildStatus, GenerationStatus, GeneratorConfig, GeneratorType, OperationConfig, OperationResult, ProcessorConfig,
                 ProductConfig, ProgressStatus, RuntimeConfig, WorkflowKind, WorkflowRecord, CONFIG_API_VERSION};
use log::{debug, info, warn};

use crate::constants::OPERATION_FAILED_REASON;
use crate::errors::CoreEngineError;
use crate::event::{BuildEvent, ExternalEvent, OperationEvent};

/// Consulta del resultado de una operación del analizador de entregables.
///
/// El resultado no viaja en la notificación; se obtiene del sistema origen.
pub trait OperationOutcomeLookup: Send + Sync {
    fn outcome(&self, operation_id: &str) -> Result<OperationResult, CoreEngineError>;
}

/// Decide la acción para `event` dado el registro `existing` para la misma
/// clave: para un build, el último en cualquier estado; para una operación,
/// el activo.
///
/// Un fallo del lookup se devuelve como `TransientInfrastructure` para que
/// el llamador reintente.
pub fn create(event: &ExternalEvent,
              existing: Option<&WorkflowRecord>,
              lookup: &dyn OperationOutcomeLookup)
              -> Result<FactoryDecision, CoreEngineError> {
    if event.identifier().trim().is_empty() {
        warn!("factory: {} notification without identifier, dropping", event.kind());
        return Ok(FactoryDecision::Drop(DropReason::MissingIdentifier));
    }
    match event {
        ExternalEvent::Build(b) => Ok(from_build(b, existing)),
        ExternalEvent::Operation(o) => from_operation(o, existing, lookup),
    }
}

fn is_accepted_build(b: &BuildEvent) -> bool {
    matches!(b.outcome, BuildStatus::Success | BuildStatus::NoRebuildRequired)
    && b.progress == ProgressStatus::Finished
    && !b.is_temporary
    && b.build_kind.is_supported()
}

fn from_build(b: &BuildEvent, existing: Option<&WorkflowRecord>) -> FactoryDecision {
    if !is_accepted_build(b) {
        debug!("factory: build '{}' not accepted (outcome={:?} progress={:?} temporary={} type={:?})",
               b.external_id, b.outcome, b.progress, b.is_temporary, b.build_kind);
        return FactoryDecision::Drop(DropReason::NotAccepted);
    }
    if let Some(rec) = existing {
        info!("factory: build '{}' already tracked by {} ({})", b.external_id, rec.id, rec.status);
        return FactoryDecision::Drop(DropReason::AlreadyTracked);
    }
    FactoryDecision::Create(WorkflowRecord::new(WorkflowKind::Build,
                                                b.external_id.clone(),
                                                GenerationStatus::New))
}

fn from_operation(o: &OperationEvent,
                  existing: Option<&WorkflowRecord>,
                  lookup: &dyn OperationOutcomeLookup)
                  -> Result<FactoryDecision, CoreEngineError> {
    if o.progress != ProgressStatus::Finished {
        debug!("factory: operation '{}' still {:?}", o.operation_id, o.progress);
        return Ok(FactoryDecision::Drop(DropReason::InProgress));
    }
    let outcome = lookup.outcome(&o.operation_id).map_err(|e| lookup_failure(&o.operation_id, e))?;

    if !outcome.is_successful() {
        return Ok(match existing {
            Some(rec) => {
                warn!("factory: operation '{}' finished with {:?}, failing {}", o.operation_id, outcome, rec.id);
                FactoryDecision::Fail { id: rec.id,
                                        reason: OPERATION_FAILED_REASON.to_string() }
            }
            None => {
                warn!("factory: operation '{}' finished with {:?} and nothing tracks it, dropping",
                      o.operation_id, outcome);
                FactoryDecision::Drop(DropReason::UpstreamFailedUntracked)
            }
        });
    }

    match existing {
        None => {
            let record = WorkflowRecord::new(WorkflowKind::Operation,
                                             o.operation_id.clone(),
                                             GenerationStatus::Initialized).with_config(operation_config(o));
            Ok(FactoryDecision::Create(record))
        }
        Some(rec) if rec.status == GenerationStatus::New || rec.status == GenerationStatus::Initialized => {
            let mut resumed = rec.clone().with_status(GenerationStatus::Initialized);
            if resumed.config.is_none() {
                resumed.config = Some(operation_config(o));
            }
            Ok(FactoryDecision::Resume(resumed))
        }
        Some(rec) => {
            info!("factory: operation '{}' already {} in {}", o.operation_id, rec.status, rec.id);
            Ok(FactoryDecision::Drop(DropReason::AlreadyTracked))
        }
    }
}

fn lookup_failure(operation_id: &str, err: CoreEngineError) -> CoreEngineError {
    match err {
        CoreEngineError::TransientInfrastructure(_) => err,
        other => CoreEngineError::TransientInfrastructure(format!("outcome lookup for operation '{operation_id}' failed: {other}")),
    }
}

/// Configuración sintetizada para una operación sin solicitud previa.
fn operation_config(o: &OperationEvent) -> RuntimeConfig {
    let product = ProductConfig { processors: vec![ProcessorConfig::Default],
                                  generator: GeneratorConfig::of(GeneratorType::CyclonedxOperation) };
    let mut cfg = RuntimeConfig::Operation(OperationConfig { api_version: CONFIG_API_VERSION.to_string(),
                                                             operation_id: o.operation_id.clone(),
                                                             deliverable_urls: o.deliverable_urls.clone(),
                                                             product });
    adjust(&mut cfg);
    cfg
}

#[cfg(test)]
mod tests {
    use super::*;
    use gen_domain::BuildType;

    struct Fixed(Result<OperationResult, CoreEngineError>);

    impl OperationOutcomeLookup for Fixed {
        fn outcome(&self, _operation_id: &str) -> Result<OperationResult, CoreEngineError> {
            self.0.clone()
        }
    }

    fn build(id: &str) -> ExternalEvent {
        ExternalEvent::Build(BuildEvent { external_id: id.into(),
                                          outcome: BuildStatus::Success,
                                          progress: ProgressStatus::Finished,
                                          build_kind: BuildType::Mvn,
                                          is_temporary: false })
    }

    fn operation(id: &str) -> ExternalEvent {
        ExternalEvent::Operation(OperationEvent { operation_id: id.into(),
                                                  progress: ProgressStatus::Finished,
                                                  deliverable_urls: vec!["http://x/a.zip".into()] })
    }

    fn ok() -> Fixed {
        Fixed(Ok(OperationResult::Successful))
    }

    #[test]
    fn accepted_build_creates_new_record() {
        match create(&build("B1"), None, &ok()).unwrap() {
            FactoryDecision::Create(r) => {
                assert_eq!(r.status, GenerationStatus::New);
                assert_eq!(r.kind, WorkflowKind::Build);
                assert!(r.config.is_none());
            }
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn build_with_terminal_record_is_not_tracked_again() {
        let done = WorkflowRecord::new(WorkflowKind::Build, "B1", GenerationStatus::Generating).finished("done");
        assert_eq!(create(&build("B1"), Some(&done), &ok()).unwrap(),
                   FactoryDecision::Drop(DropReason::AlreadyTracked));
    }

    #[test]
    fn unsupported_build_type_is_dropped() {
        let ev = ExternalEvent::Build(BuildEvent { external_id: "B2".into(),
                                                   outcome: BuildStatus::Success,
                                                   progress: ProgressStatus::Finished,
                                                   build_kind: BuildType::Sbt,
                                                   is_temporary: false });
        assert_eq!(create(&ev, None, &ok()).unwrap(), FactoryDecision::Drop(DropReason::NotAccepted));
    }

    #[test]
    fn empty_identifier_is_dropped() {
        assert_eq!(create(&build(""), None, &ok()).unwrap(), FactoryDecision::Drop(DropReason::MissingIdentifier));
    }

    #[test]
    fn lookup_error_becomes_transient() {
        let lookup = Fixed(Err(CoreEngineError::NotFound("O1".into())));
        let err = create(&operation("O1"), None, &lookup).unwrap_err();
        assert!(err.is_retryable());
    }

    #[test]
    fn in_progress_operation_is_dropped_without_lookup() {
        let ev = ExternalEvent::Operation(OperationEvent { operation_id: "O1".into(),
                                                           progress: ProgressStatus::InProgress,
                                                           deliverable_urls: vec![] });
        let lookup = Fixed(Err(CoreEngineError::Internal("must not be called".into())));
        assert_eq!(create(&ev, None, &lookup).unwrap(), FactoryDecision::Drop(DropReason::InProgress));
    }

    #[test]
    fn resume_keeps_identity_and_config() {
        let existing = WorkflowRecord::new(WorkflowKind::Operation, "O1", GenerationStatus::New);
        let existing = existing.with_config(operation_config(&OperationEvent { operation_id: "O1".into(),
                                                                               progress: ProgressStatus::Finished,
                                                                               deliverable_urls: vec!["http://old".into()] }));
        match create(&operation("O1"), Some(&existing), &ok()).unwrap() {
            FactoryDecision::Resume(r) => {
                assert_eq!(r.id, existing.id);
                assert_eq!(r.creation_time, existing.creation_time);
                assert_eq!(r.config, existing.config);
                assert_eq!(r.status, GenerationStatus::Initialized);
            }
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn generating_operation_is_not_resumed() {
        let existing = WorkflowRecord::new(WorkflowKind::Operation, "O1", GenerationStatus::Generating);
        assert_eq!(create(&operation("O1"), Some(&existing), &ok()).unwrap(),
                   FactoryDecision::Drop(DropReason::AlreadyTracked));
    }
}
