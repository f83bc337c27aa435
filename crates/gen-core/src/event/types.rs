//! Eventos externos decodificados y la forma de sus payloads en el bus.
//!
//! Rol en el flujo:
//! - El router decodifica un mensaje crudo en un `ExternalEvent` según el
//!   tipo declarado por el canal.
//! - La fábrica de workflows hace `match` exhaustivo sobre la unión; agregar
//!   un tipo nuevo implica extender el enum.
use gen_domain::{BuildStatus, BuildType, ProgressStatus, WorkflowKind};
use serde::{Deserialize, Serialize};

/// Notificación de fin de build.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BuildEvent {
    pub external_id: String,
    pub outcome: BuildStatus,
    pub progress: ProgressStatus,
    pub build_kind: BuildType,
    pub is_temporary: bool,
}

/// Notificación de cambio de estado de una operación del analizador de
/// entregables. El resultado de la operación no viaja en el mensaje.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OperationEvent {
    pub operation_id: String,
    pub progress: ProgressStatus,
    pub deliverable_urls: Vec<String>,
}

/// Unión cerrada de eventos externos.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExternalEvent {
    Build(BuildEvent),
    Operation(OperationEvent),
}

impl ExternalEvent {
    pub fn kind(&self) -> WorkflowKind {
        match self {
            ExternalEvent::Build(_) => WorkflowKind::Build,
            ExternalEvent::Operation(_) => WorkflowKind::Operation,
        }
    }

    pub fn identifier(&self) -> &str {
        match self {
            ExternalEvent::Build(b) => &b.external_id,
            ExternalEvent::Operation(o) => &o.operation_id,
        }
    }
}

// Formas de payload en el bus (camelCase, como las publica PNC).

#[derive(Debug, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct BuildConfigRevisionPayload {
    pub build_type: BuildType,
}

#[derive(Debug, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct BuildPayload {
    #[serde(default)]
    pub id: String,
    pub status: BuildStatus,
    pub progress: ProgressStatus,
    #[serde(default)]
    pub temporary_build: bool,
    pub build_config_revision: BuildConfigRevisionPayload,
}

#[derive(Debug, Deserialize, Serialize)]
pub(crate) struct BuildNotificationPayload {
    pub build: BuildPayload,
}

#[derive(Debug, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct OperationNotificationPayload {
    #[serde(default)]
    pub operation_id: String,
    pub status: ProgressStatus,
    #[serde(default)]
    pub deliverables_urls: Vec<String>,
}

impl From<BuildNotificationPayload> for ExternalEvent {
    fn from(p: BuildNotificationPayload) -> Self {
        ExternalEvent::Build(BuildEvent { external_id: p.build.id,
                                          outcome: p.build.status,
                                          progress: p.build.progress,
                                          build_kind: p.build.build_config_revision.build_type,
                                          is_temporary: p.build.temporary_build })
    }
}

impl From<OperationNotificationPayload> for ExternalEvent {
    fn from(p: OperationNotificationPayload) -> Self {
        ExternalEvent::Operation(OperationEvent { operation_id: p.operation_id,
                                                  progress: p.status,
                                                  deliverable_urls: p.deliverables_urls })
    }
}
