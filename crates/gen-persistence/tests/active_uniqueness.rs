//! Carrera de creaciones concurrentes contra el índice parcial.
use std::sync::{Arc, Barrier};
use std::thread;

use gen_core::{CoreEngineError, DeduplicationStore, StatusProjector};
use gen_domain::{GenerationStatus, WorkflowKind, WorkflowRecord};

use test_support::{store, unique_identifier};

#[test]
fn concurrent_inserts_leave_one_active_record() {
    let Some(pg) = store() else {
        eprintln!("skip (no DATABASE_URL)");
        return;
    };
    let pg = Arc::new(pg);
    let identifier = unique_identifier("race");
    let workers = 8;
    let barrier = Arc::new(Barrier::new(workers));

    let handles: Vec<_> = (0..workers).map(|_| {
                                          let pg = Arc::clone(&pg);
                                          let barrier = Arc::clone(&barrier);
                                          let identifier = identifier.clone();
                                          thread::spawn(move || {
                                              let rec = WorkflowRecord::new(WorkflowKind::Build, identifier, GenerationStatus::New);
                                              barrier.wait();
                                              pg.persist(&rec).map(|_| ())
                                          })
                                      })
                                      .collect();
    let results: Vec<Result<(), CoreEngineError>> = handles.into_iter().map(|h| h.join().expect("join")).collect();

    assert_eq!(results.iter().filter(|r| r.is_ok()).count(), 1);
    assert!(results.iter()
                   .filter_map(|r| r.as_ref().err())
                   .all(|e| matches!(e, CoreEngineError::DuplicateCreate { .. })));
    assert_eq!(pg.find_pending(WorkflowKind::Build, &identifier).expect("pending").len(), 1);
}
