//! Tipos de estado de una solicitud de generación.
//!
//! Las transiciones válidas de `GenerationStatus` son:
//! - `New` -> `Initialized` -> `Generating` -> `Finished`
//! - cualquier estado no terminal -> `Failed`
//!
//! Reaplicar el mismo estado es un no-op. No se permiten retrocesos.
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::DomainError;

/// Origen de la solicitud: un build de PNC o una operación del analizador de
/// entregables.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum WorkflowKind {
    Build,
    Operation,
}

impl WorkflowKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            WorkflowKind::Build => "BUILD",
            WorkflowKind::Operation => "OPERATION",
        }
    }
}

impl fmt::Display for WorkflowKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for WorkflowKind {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_uppercase().as_str() {
            "BUILD" => Ok(WorkflowKind::Build),
            "OPERATION" => Ok(WorkflowKind::Operation),
            other => Err(DomainError::UnknownValue { kind: "workflow kind",
                                                     value: other.to_string() }),
        }
    }
}

/// Estado de una solicitud de generación.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum GenerationStatus {
    /// Recién creada, sin configuración resuelta.
    New,
    /// Configuración resuelta; la fase INIT está pendiente o en curso.
    Initialized,
    /// La fase GENERATE está pendiente o en curso.
    Generating,
    /// Terminal: generación completada.
    Finished,
    /// Terminal: la solicitud falló.
    Failed,
}

impl GenerationStatus {
    pub const ALL: [GenerationStatus; 5] = [GenerationStatus::New,
                                            GenerationStatus::Initialized,
                                            GenerationStatus::Generating,
                                            GenerationStatus::Finished,
                                            GenerationStatus::Failed];

    pub fn is_terminal(&self) -> bool {
        matches!(self, GenerationStatus::Finished | GenerationStatus::Failed)
    }

    fn rank(&self) -> u8 {
        match self {
            GenerationStatus::New => 0,
            GenerationStatus::Initialized => 1,
            GenerationStatus::Generating => 2,
            GenerationStatus::Finished | GenerationStatus::Failed => 3,
        }
    }

    /// Indica si `next` es alcanzable desde `self`.
    ///
    /// Se avanza de a una fase: NEW → INITIALIZED → GENERATING → FINISHED,
    /// sin saltos. `Finished` sólo es alcanzable desde `Generating`; `Failed` desde
    /// cualquier estado no terminal. Un estado terminal sólo acepta su propio
    /// valor (idempotencia).
    pub fn can_transition_to(&self, next: GenerationStatus) -> bool {
        if *self == next {
            return true;
        }
        if self.is_terminal() {
            return false;
        }
        match next {
            GenerationStatus::Failed => true,
            GenerationStatus::Finished => *self == GenerationStatus::Generating,
            _ => next.rank() == self.rank() + 1,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            GenerationStatus::New => "NEW",
            GenerationStatus::Initialized => "INITIALIZED",
            GenerationStatus::Generating => "GENERATING",
            GenerationStatus::Finished => "FINISHED",
            GenerationStatus::Failed => "FAILED",
        }
    }
}

impl fmt::Display for GenerationStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for GenerationStatus {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        GenerationStatus::ALL.iter()
                             .copied()
                             .find(|st| st.as_str().eq_ignore_ascii_case(s))
                             .ok_or_else(|| DomainError::UnknownValue { kind: "generation status",
                                                                        value: s.to_string() })
    }
}

/// Resultado final de una solicitud. Sólo se asigna en estado terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum GenerationResult {
    Success,
    ErrGeneral,
    ErrConfigInvalid,
    ErrConfigMissing,
    ErrSystem,
}

impl GenerationResult {
    pub const ALL: [GenerationResult; 5] = [GenerationResult::Success,
                                            GenerationResult::ErrGeneral,
                                            GenerationResult::ErrConfigInvalid,
                                            GenerationResult::ErrConfigMissing,
                                            GenerationResult::ErrSystem];

    pub fn as_str(&self) -> &'static str {
        match self {
            GenerationResult::Success => "SUCCESS",
            GenerationResult::ErrGeneral => "ERR_GENERAL",
            GenerationResult::ErrConfigInvalid => "ERR_CONFIG_INVALID",
            GenerationResult::ErrConfigMissing => "ERR_CONFIG_MISSING",
            GenerationResult::ErrSystem => "ERR_SYSTEM",
        }
    }
}

impl fmt::Display for GenerationResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for GenerationResult {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        GenerationResult::ALL.iter()
                             .copied()
                             .find(|r| r.as_str().eq_ignore_ascii_case(s))
                             .ok_or_else(|| DomainError::UnknownValue { kind: "generation result",
                                                                        value: s.to_string() })
    }
}
