//! Propiedades del reconciliador: idempotencia, monotonicidad de fases e
//! inmutabilidad de registros terminales.
use gen_core::{Observation, Phase, WorkflowReconciler};
use gen_domain::{GenerationResult, GenerationStatus, OperationConfig, ProductConfig, GeneratorConfig, GeneratorType,
                 RuntimeConfig, WorkflowKind, WorkflowRecord};

fn config() -> RuntimeConfig {
    RuntimeConfig::Operation(OperationConfig { api_version: "v1".into(),
                                               operation_id: "O1".into(),
                                               deliverable_urls: vec!["http://x/a.zip".into()],
                                               product: ProductConfig { processors: vec![],
                                                                        generator: GeneratorConfig::of(GeneratorType::CyclonedxOperation) } })
}

fn record(status: GenerationStatus) -> WorkflowRecord {
    WorkflowRecord::new(WorkflowKind::Operation, "O1", status).with_config(config())
}

fn observations() -> Vec<Observation> {
    vec![Observation::Pending,
         Observation::ConfigResolved(config()),
         Observation::TaskSucceeded(Phase::Init),
         Observation::TaskSucceeded(Phase::Generate),
         Observation::TaskFailed { phase: Phase::Init,
                                   reason: "exit 1".into() },
         Observation::UpstreamFailure { reason: "upstream".into() }]
}

fn rank(s: GenerationStatus) -> u8 {
    match s {
        GenerationStatus::New => 0,
        GenerationStatus::Initialized => 1,
        GenerationStatus::Generating => 2,
        GenerationStatus::Finished | GenerationStatus::Failed => 3,
    }
}

#[test]
fn same_input_same_output() {
    let r = WorkflowReconciler::default();
    for status in GenerationStatus::ALL {
        let rec = record(status);
        for obs in observations() {
            assert_eq!(r.reconcile(&rec, obs.clone()), r.reconcile(&rec, obs));
        }
    }
}

#[test]
fn status_never_moves_backwards() {
    let r = WorkflowReconciler::default();
    for status in GenerationStatus::ALL {
        let rec = record(status);
        for obs in observations() {
            let out = r.reconcile(&rec, obs.clone());
            assert!(rank(out.record.status) >= rank(status), "{status} -> {} on {obs:?}", out.record.status);
            assert!(status.can_transition_to(out.record.status) || status.is_terminal());
            assert_eq!(out.changed, out.record != rec);
        }
    }
}

#[test]
fn terminal_records_are_left_alone() {
    let r = WorkflowReconciler::default();
    let finished = record(GenerationStatus::Generating).finished("done");
    let failed = record(GenerationStatus::Initialized).failed(GenerationResult::ErrGeneral, "boom");
    for rec in [finished, failed] {
        for obs in observations() {
            let out = r.reconcile(&rec, obs);
            assert!(!out.changed);
            assert!(out.desired_task.is_none());
            assert_eq!(out.record, rec);
        }
    }
}

#[test]
fn replaying_a_success_does_not_skip_phases() {
    let r = WorkflowReconciler::default();
    let initialized = record(GenerationStatus::Initialized);
    let generating = r.reconcile(&initialized, Observation::TaskSucceeded(Phase::Init)).record;
    assert_eq!(generating.status, GenerationStatus::Generating);
    // INIT redelivered while GENERATING: stays, re-emits GENERATE
    let again = r.reconcile(&generating, Observation::TaskSucceeded(Phase::Init));
    assert!(!again.changed);
    assert_eq!(again.desired_task.map(|t| t.phase), Some(Phase::Generate));
}

#[test]
fn config_is_not_replaced_after_new() {
    let r = WorkflowReconciler::default();
    let rec = record(GenerationStatus::Initialized);
    let mut other = config();
    if let RuntimeConfig::Operation(ref mut c) = other {
        c.deliverable_urls.push("http://x/other.zip".into());
    }
    let out = r.reconcile(&rec, Observation::ConfigResolved(other));
    assert_eq!(out.record.config, Some(config()));
    assert!(!out.changed);
}
