//! Enumeraciones publicadas por el sistema de builds (PNC) en sus
//! notificaciones. Valores desconocidos se decodifican como `Other` para que
//! el filtro de aceptación los descarte sin fallar la decodificación.
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum BuildStatus {
    Success,
    Failed,
    NoRebuildRequired,
    Cancelled,
    SystemError,
    Rejected,
    #[serde(other)]
    Other,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ProgressStatus {
    Pending,
    InProgress,
    Finished,
    #[serde(other)]
    Other,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum BuildType {
    Mvn,
    Gradle,
    Npm,
    Sbt,
    MvnRpm,
    #[serde(other)]
    Other,
}

impl BuildType {
    /// Tipos de build para los que existe un generador.
    pub fn is_supported(&self) -> bool {
        matches!(self, BuildType::Mvn | BuildType::Gradle | BuildType::Npm)
    }
}

/// Resultado de una operación del analizador de entregables, consultado por
/// separado (no viaja en la notificación).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum OperationResult {
    Successful,
    Failed,
    Rejected,
    Cancelled,
    SystemError,
    Timeout,
}

impl OperationResult {
    pub fn is_successful(&self) -> bool {
        matches!(self, OperationResult::Successful)
    }
}
