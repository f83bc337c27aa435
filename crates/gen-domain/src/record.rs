//! Registro persistido de una solicitud de generación.
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{GenerationResult, GenerationStatus, RuntimeConfig, WorkflowKind};

/// Unidad de trabajo persistida.
///
/// Los registros son valores: los componentes producen copias modificadas y
/// las entregan al proyector de estado, que es el único camino de escritura.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WorkflowRecord {
    pub id: Uuid,
    pub identifier: String,
    pub kind: WorkflowKind,
    pub status: GenerationStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub result: Option<GenerationResult>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub config: Option<RuntimeConfig>,
    pub creation_time: DateTime<Utc>,
}

impl WorkflowRecord {
    /// Crea un registro nuevo con id generado y `creation_time = now`.
    pub fn new(kind: WorkflowKind, identifier: impl Into<String>, status: GenerationStatus) -> Self {
        Self { id: Uuid::new_v4(),
               identifier: identifier.into(),
               kind,
               status,
               result: None,
               reason: None,
               config: None,
               creation_time: Utc::now() }
    }

    pub fn with_config(mut self, config: RuntimeConfig) -> Self {
        self.config = Some(config);
        self
    }

    pub fn with_status(mut self, status: GenerationStatus) -> Self {
        self.status = status;
        self
    }

    /// Copia en estado `Failed` con resultado y motivo.
    pub fn failed(&self, result: GenerationResult, reason: impl Into<String>) -> Self {
        let mut next = self.clone();
        next.status = GenerationStatus::Failed;
        next.result = Some(result);
        next.reason = Some(reason.into());
        next
    }

    /// Copia en estado `Finished` con resultado `Success`.
    pub fn finished(&self, reason: impl Into<String>) -> Self {
        let mut next = self.clone();
        next.status = GenerationStatus::Finished;
        next.result = Some(GenerationResult::Success);
        next.reason = Some(reason.into());
        next
    }

    pub fn is_active(&self) -> bool {
        !self.status.is_terminal()
    }
}
