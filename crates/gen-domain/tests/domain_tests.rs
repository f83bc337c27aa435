use gen_domain::{GenerationResult, GenerationStatus, WorkflowKind, WorkflowRecord};
use serde_json::json;

#[test]
fn test_record_serializes_external_fields() {
    // Los lectores externos ven id, identifier, kind, status, result, reason,
    // config y creationTime
    let rec = WorkflowRecord::new(WorkflowKind::Build, "B1", GenerationStatus::New);
    let v = serde_json::to_value(&rec).unwrap();
    assert_eq!(v["identifier"], json!("B1"));
    assert_eq!(v["kind"], json!("BUILD"));
    assert_eq!(v["status"], json!("NEW"));
    assert!(v.get("creationTime").is_some());
    assert!(v.get("result").is_none());
}

#[test]
fn test_failed_copy_keeps_identity() {
    let rec = WorkflowRecord::new(WorkflowKind::Operation, "O1", GenerationStatus::Initialized);
    let failed = rec.failed(GenerationResult::ErrGeneral, "boom");
    assert_eq!(failed.id, rec.id);
    assert_eq!(failed.creation_time, rec.creation_time);
    assert_eq!(failed.status, GenerationStatus::Failed);
    assert_eq!(failed.result, Some(GenerationResult::ErrGeneral));
    assert_eq!(failed.reason.as_deref(), Some("boom"));
    assert!(!failed.is_active());
    // el original no se modifica
    assert_eq!(rec.status, GenerationStatus::Initialized);
}

#[test]
fn test_finished_sets_success() {
    let rec = WorkflowRecord::new(WorkflowKind::Build, "B2", GenerationStatus::Generating);
    let done = rec.finished("Generation finished successfully");
    assert_eq!(done.status, GenerationStatus::Finished);
    assert_eq!(done.result, Some(GenerationResult::Success));
}

#[test]
fn test_kind_parses_case_insensitive() {
    assert_eq!("build".parse::<WorkflowKind>().unwrap(), WorkflowKind::Build);
    assert_eq!("OPERATION".parse::<WorkflowKind>().unwrap(), WorkflowKind::Operation);
    assert!("container".parse::<WorkflowKind>().is_err());
}

#[test]
fn test_result_round_trips_through_text() {
    for r in GenerationResult::ALL {
        assert_eq!(r.as_str().parse::<GenerationResult>().unwrap(), r);
    }
}
