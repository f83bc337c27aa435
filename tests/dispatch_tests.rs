//! Despachador sobre tokio: reintentos, orden de lote y abandono de tareas.
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Arc;
use std::time::Duration;

use gen_adapters::{RecordingSubstrate, StaticOutcomeLookup};
use gen_core::{CoreEngineError, HandleOutcome, InMemoryWorkflowStore, Observation, OperationOutcomeLookup, Orchestrator,
               Phase};
use gen_domain::{GenerationResult, GenerationStatus, OperationResult, WorkflowKind};
use genflow_rust::{CoreError, Dispatcher, Inbound, RetryPolicy};
use tokio_test::assert_ok;

const OPERATION: &str = r#"{"operationId":"O1","status":"FINISHED","deliverablesUrls":["http://x/a.zip"]}"#;
const BUILD: &str = r#"{"build":{"id":"B1","status":"SUCCESS","progress":"FINISHED","temporaryBuild":false,
                       "buildConfigRevision":{"buildType":"MVN"}}}"#;

fn fast(max_attempts: u32) -> RetryPolicy {
    RetryPolicy::new(max_attempts, Duration::from_millis(1))
}

fn dispatcher(lookup: Arc<dyn OperationOutcomeLookup>,
              substrate: Arc<RecordingSubstrate>,
              policy: RetryPolicy)
              -> Dispatcher<InMemoryWorkflowStore> {
    let orchestrator = Orchestrator::builder(InMemoryWorkflowStore::new(), lookup).build();
    Dispatcher::new(Arc::new(orchestrator), substrate, policy)
}

fn successful_o1() -> Arc<dyn OperationOutcomeLookup> {
    Arc::new(StaticOutcomeLookup::new().with("O1", OperationResult::Successful))
}

/// Falla `failures` veces con error transitorio y luego responde `Successful`.
struct FlakyLookup {
    failures: AtomicU32,
    calls: AtomicU32,
}

impl OperationOutcomeLookup for FlakyLookup {
    fn outcome(&self, operation_id: &str) -> Result<OperationResult, CoreEngineError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if self.failures.load(Ordering::SeqCst) > 0 {
            self.failures.fetch_sub(1, Ordering::SeqCst);
            return Err(CoreEngineError::TransientInfrastructure(format!("lookup down for {operation_id}")));
        }
        Ok(OperationResult::Successful)
    }
}

#[tokio::test]
async fn transient_submit_failures_are_retried() {
    let substrate = Arc::new(RecordingSubstrate::new());
    substrate.fail_next(2);
    let d = dispatcher(successful_o1(), substrate.clone(), fast(5));

    let outcome = assert_ok!(d.handle(Inbound::new(WorkflowKind::Operation, OPERATION)).await);
    assert!(matches!(outcome, HandleOutcome::Created { .. }));
    let submitted = substrate.submitted();
    assert_eq!(submitted.len(), 1);
    assert_eq!(submitted[0].phase, Phase::Init);
}

#[tokio::test]
async fn transient_lookup_failures_are_retried() {
    let lookup = Arc::new(FlakyLookup { failures: AtomicU32::new(2),
                                        calls: AtomicU32::new(0) });
    let substrate = Arc::new(RecordingSubstrate::new());
    let d = dispatcher(lookup.clone(), substrate, fast(5));

    let outcome = assert_ok!(d.handle(Inbound::new(WorkflowKind::Operation, OPERATION)).await);
    assert_eq!(outcome.record().map(|r| r.status), Some(GenerationStatus::Initialized));
    assert_eq!(lookup.calls.load(Ordering::SeqCst), 3);
}

#[tokio::test]
async fn exhausted_submit_is_recovered_by_redelivery() {
    let substrate = Arc::new(RecordingSubstrate::new());
    substrate.fail_next(10);
    let d = dispatcher(successful_o1(), substrate.clone(), fast(2));

    let err = d.handle(Inbound::new(WorkflowKind::Operation, OPERATION)).await.unwrap_err();
    assert!(err.is_retryable());
    assert!(substrate.submitted().is_empty());
    // el registro quedó guardado; la reentrega reanuda y reemite INIT
    assert_eq!(d.orchestrator().list(None, None).unwrap().len(), 1);

    substrate.fail_next(0);
    let outcome = assert_ok!(d.handle(Inbound::new(WorkflowKind::Operation, OPERATION)).await);
    assert!(matches!(outcome, HandleOutcome::Resumed { .. }));
    assert_eq!(substrate.submitted().len(), 1);
    assert_eq!(d.orchestrator().list(None, None).unwrap().len(), 1);
}

#[tokio::test]
async fn batch_results_keep_input_order() {
    let substrate = Arc::new(RecordingSubstrate::new());
    let d = dispatcher(successful_o1(), substrate, fast(3));

    let results = d.handle_batch(vec![Inbound::new(WorkflowKind::Build, "{oops"),
                                      Inbound::new(WorkflowKind::Build, BUILD),
                                      Inbound::new(WorkflowKind::Operation, OPERATION)])
                   .await;
    assert_eq!(results.len(), 3);
    assert!(matches!(results[0], Err(CoreError::Engine(CoreEngineError::Decode { .. }))));
    assert!(matches!(results[1], Ok(HandleOutcome::Created { .. })));
    assert!(matches!(results[2], Ok(HandleOutcome::Created { .. })));
}

#[tokio::test]
async fn operation_runs_to_finished_and_tasks_are_abandoned() {
    let substrate = Arc::new(RecordingSubstrate::new());
    let d = dispatcher(successful_o1(), substrate.clone(), fast(3));
    let id = d.handle(Inbound::new(WorkflowKind::Operation, OPERATION)).await.unwrap().record().unwrap().id;

    let r = assert_ok!(d.observe(id, Observation::TaskSucceeded(Phase::Init)).await);
    assert_eq!(r.record.status, GenerationStatus::Generating);
    let r = assert_ok!(d.observe(id, Observation::TaskSucceeded(Phase::Generate)).await);
    assert_eq!(r.record.status, GenerationStatus::Finished);

    let phases: Vec<Phase> = substrate.submitted().iter().map(|t| t.phase).collect();
    assert_eq!(phases, vec![Phase::Init, Phase::Generate]);
    assert_eq!(substrate.abandoned(), vec![id]);
}

#[tokio::test]
async fn failed_phase_abandons_tasks_once() {
    let substrate = Arc::new(RecordingSubstrate::new());
    let d = dispatcher(successful_o1(), substrate.clone(), fast(3));
    let id = d.handle(Inbound::new(WorkflowKind::Operation, OPERATION)).await.unwrap().record().unwrap().id;

    let r = assert_ok!(d.observe(id, Observation::TaskFailed { phase: Phase::Init,
                                                               reason: "exit 2".into() })
                        .await);
    assert_eq!(r.record.status, GenerationStatus::Failed);
    assert_eq!(r.record.result, Some(GenerationResult::ErrGeneral));

    // señal tardía sobre un registro terminal: sin cambios ni nuevo abandono
    let r = assert_ok!(d.observe(id, Observation::TaskSucceeded(Phase::Init)).await);
    assert!(!r.changed);
    assert_eq!(substrate.abandoned(), vec![id]);
}

#[tokio::test]
async fn unknown_id_is_not_retried() {
    let substrate = Arc::new(RecordingSubstrate::new());
    let d = dispatcher(successful_o1(), substrate, fast(5));
    let err = d.observe(uuid::Uuid::new_v4(), Observation::Pending).await.unwrap_err();
    assert!(matches!(err, CoreError::Engine(CoreEngineError::NotFound(_))));
}
