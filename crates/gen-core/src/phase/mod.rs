//! Fases de una solicitud y su descripción declarativa como tarea externa.
//!
//! El core nunca ejecuta una fase: describe la tarea deseada
//! (`PhaseTaskDescriptor`) y observa su resultado.

mod builder;
mod template;

pub use builder::PhaseTaskBuilder;
pub use template::{template_file_name, EmbeddedTemplates, TemplateSource};

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::errors::CoreEngineError;

/// Fase de ejecución externa.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Phase {
    /// Resuelve la configuración efectiva.
    Init,
    /// Genera el SBOM.
    Generate,
}

impl Phase {
    pub const ALL: [Phase; 2] = [Phase::Init, Phase::Generate];

    /// Posición 1-based de la fase, usada en el nombre de la tarea.
    pub fn index(&self) -> u8 {
        match self {
            Phase::Init => 1,
            Phase::Generate => 2,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Phase::Init => "init",
            Phase::Generate => "generate",
        }
    }

    /// Nombre del resultado que deja la tarea al terminar.
    pub fn result_name(&self) -> &'static str {
        match self {
            Phase::Init => "config",
            Phase::Generate => "sbom",
        }
    }

    pub fn requests(&self) -> ResourceSpec {
        match self {
            Phase::Init => ResourceSpec::new("200m", "300Mi"),
            Phase::Generate => ResourceSpec::new("500m", "1024Mi"),
        }
    }

    pub fn limits(&self) -> ResourceSpec {
        match self {
            Phase::Init => ResourceSpec::new("500m", "1024Mi"),
            Phase::Generate => ResourceSpec::new("2000m", "3072Mi"),
        }
    }
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Phase {
    type Err = CoreEngineError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "init" => Ok(Phase::Init),
            "generate" => Ok(Phase::Generate),
            other => Err(CoreEngineError::Validation(format!("unknown phase '{other}'"))),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaskParam {
    pub name: String,
    pub value: String,
}

impl TaskParam {
    pub fn new(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self { name: name.into(),
               value: value.into() }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResourceSpec {
    pub cpu: String,
    pub memory: String,
}

impl ResourceSpec {
    pub fn new(cpu: &str, memory: &str) -> Self {
        Self { cpu: cpu.to_string(),
               memory: memory.to_string() }
    }
}

/// Tarea deseada para una fase. Derivada, nunca se persiste.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PhaseTaskDescriptor {
    pub name: String,
    pub phase: Phase,
    pub workflow_id: Uuid,
    pub image: String,
    pub parameters: Vec<TaskParam>,
    pub resource_requests: ResourceSpec,
    pub resource_limits: ResourceSpec,
    pub labels: BTreeMap<String, String>,
    pub result_name: String,
    pub init_payload: String,
}

impl PhaseTaskDescriptor {
    pub fn param(&self, name: &str) -> Option<&str> {
        self.parameters.iter().find(|p| p.name == name).map(|p| p.value.as_str())
    }
}
