use std::sync::Arc;

use gen_adapters::{DirTemplateSource, LoggingListener, RecordingSubstrate, StaticOutcomeLookup};
use gen_core::{CoreEngineError, ExecutionSubstrate, HandleOutcome, InMemoryWorkflowStore, Orchestrator, Phase,
               PhaseTaskBuilder, TemplateSource, WorkflowReconciler};
use gen_domain::{OperationResult, WorkflowKind};

fn temp_dir(name: &str) -> std::path::PathBuf {
    let dir = std::env::temp_dir().join(format!("gen-adapters-{name}-{}", uuid::Uuid::new_v4()));
    std::fs::create_dir_all(&dir).unwrap();
    dir
}

#[test]
fn dir_templates_are_read_per_phase() {
    let dir = temp_dir("templates");
    std::fs::write(dir.join("init.sh"), "echo init").unwrap();
    let src = DirTemplateSource::new(&dir);
    assert_eq!(src.load(Phase::Init).unwrap(), "echo init");
    assert!(matches!(src.load(Phase::Generate), Err(CoreEngineError::Configuration(_))));
    std::fs::remove_dir_all(&dir).ok();
}

#[test]
fn missing_generate_template_fails_the_workflow() {
    let dir = temp_dir("partial");
    std::fs::write(dir.join("init.sh"), "echo init").unwrap();
    let builder = PhaseTaskBuilder::new(Arc::new(DirTemplateSource::new(&dir)));
    let lookup = StaticOutcomeLookup::new().with("O1", OperationResult::Successful);
    let o = Orchestrator::builder(InMemoryWorkflowStore::new(), Arc::new(lookup)).reconciler(WorkflowReconciler::new(builder))
                                                                              .listener(Arc::new(LoggingListener))
                                                                              .build();
    let raw = r#"{"operationId":"O1","status":"FINISHED","deliverablesUrls":["http://x/a.zip"]}"#;
    let outcome = o.handle(raw, WorkflowKind::Operation).unwrap();
    let id = outcome.record().unwrap().id;
    assert_eq!(outcome.task().map(|t| t.phase), Some(Phase::Init));

    let r = o.observe(id, gen_core::Observation::TaskSucceeded(Phase::Init)).unwrap();
    assert_eq!(r.record.status, gen_domain::GenerationStatus::Failed);
    assert_eq!(r.record.result, Some(gen_domain::GenerationResult::ErrConfigMissing));
    assert!(r.desired_task.is_none());
    assert!(matches!(outcome, HandleOutcome::Created { .. }));
    std::fs::remove_dir_all(&dir).ok();
}

#[test]
fn recording_substrate_is_idempotent_and_can_fail() {
    let substrate = RecordingSubstrate::new();
    let task = PhaseTaskBuilder::default().build(uuid::Uuid::new_v4(),
                                                 Phase::Init,
                                                 Some(&gen_domain::RuntimeConfig::Build(gen_domain::BuildConfig {
                                                     api_version: "v1".into(),
                                                     build_id: "B1".into(),
                                                     products: vec![],
                                                 })))
                                          .unwrap();
    substrate.fail_next(1);
    assert!(substrate.submit(&task).unwrap_err().is_retryable());
    substrate.submit(&task).unwrap();
    substrate.submit(&task).unwrap();
    assert_eq!(substrate.submitted().len(), 1);
    substrate.abandon(task.workflow_id).unwrap();
    substrate.abandon(task.workflow_id).unwrap();
    assert_eq!(substrate.abandoned(), vec![task.workflow_id]);
}
