use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard};

use gen_domain::{GenerationStatus, WorkflowKind, WorkflowRecord};
use log::debug;
use uuid::Uuid;

use super::types::{merge_projection, DeduplicationStore, Projection, StatusProjector};
use crate::errors::CoreEngineError;

/// Backend en memoria. El `Mutex` serializa `persist`, que emula la
/// restricción de unicidad de activos del backend Postgres.
#[derive(Default)]
pub struct InMemoryWorkflowStore {
    inner: Mutex<HashMap<Uuid, WorkflowRecord>>,
}

impl InMemoryWorkflowStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> Result<MutexGuard<'_, HashMap<Uuid, WorkflowRecord>>, CoreEngineError> {
        self.inner
            .lock()
            .map_err(|_| CoreEngineError::Internal("in-memory workflow store lock poisoned".into()))
    }

    /// Cantidad total de registros (activos y terminales).
    pub fn len(&self) -> usize {
        self.lock().map(|m| m.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

fn sorted_by_creation(mut records: Vec<WorkflowRecord>) -> Vec<WorkflowRecord> {
    records.sort_by(|a, b| a.creation_time.cmp(&b.creation_time).then_with(|| a.id.cmp(&b.id)));
    records
}

impl DeduplicationStore for InMemoryWorkflowStore {
    fn find_pending(&self, kind: WorkflowKind, identifier: &str) -> Result<Vec<WorkflowRecord>, CoreEngineError> {
        let map = self.lock()?;
        let pending = map.values()
                         .filter(|r| r.kind == kind && r.identifier == identifier && r.is_active())
                         .cloned()
                         .collect();
        Ok(sorted_by_creation(pending))
    }

    fn find_latest(&self, kind: WorkflowKind, identifier: &str) -> Result<Option<WorkflowRecord>, CoreEngineError> {
        let map = self.lock()?;
        let matching = map.values()
                          .filter(|r| r.kind == kind && r.identifier == identifier)
                          .cloned()
                          .collect();
        Ok(sorted_by_creation(matching).pop())
    }
}

impl StatusProjector for InMemoryWorkflowStore {
    fn persist(&self, record: &WorkflowRecord) -> Result<Projection, CoreEngineError> {
        let mut map = self.lock()?;
        match map.get(&record.id) {
            Some(stored) => {
                let previous = stored.status;
                let merged = merge_projection(stored, record)?;
                map.insert(merged.id, merged.clone());
                Ok(Projection { record: merged,
                                previous_status: Some(previous) })
            }
            None => {
                if record.is_active() {
                    let conflict = map.values().any(|r| {
                                                   r.kind == record.kind
                                                   && r.identifier == record.identifier
                                                   && r.is_active()
                                               });
                    if conflict {
                        debug!("persist: active {} '{}' already present, rejecting {}",
                               record.kind, record.identifier, record.id);
                        return Err(CoreEngineError::DuplicateCreate { kind: record.kind.to_string(),
                                                                      identifier: record.identifier.clone() });
                    }
                }
                map.insert(record.id, record.clone());
                Ok(Projection { record: record.clone(),
                                previous_status: None })
            }
        }
    }

    fn read(&self, id: Uuid) -> Result<Option<WorkflowRecord>, CoreEngineError> {
        Ok(self.lock()?.get(&id).cloned())
    }

    fn list(&self, kind: Option<WorkflowKind>, status: Option<GenerationStatus>)
            -> Result<Vec<WorkflowRecord>, CoreEngineError> {
        let map = self.lock()?;
        let records = map.values()
                         .filter(|r| kind.map_or(true, |k| r.kind == k))
                         .filter(|r| status.map_or(true, |s| r.status == s))
                         .cloned()
                         .collect();
        Ok(sorted_by_creation(records))
    }
}
