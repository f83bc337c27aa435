//! Errores del core y su clasificación para la política de reintentos.

use gen_domain::GenerationStatus;
use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq, Clone, Serialize, Deserialize)]
pub enum CoreEngineError {
    /// Payload entrante mal formado. Lleva un extracto del payload.
    #[error("decode error: {message} (payload: {excerpt})")] Decode { message: String, excerpt: String },
    /// Payload bien formado que viola las reglas de aceptación.
    #[error("validation: {0}")] Validation(String),
    /// Se perdió una carrera de creación contra otro registro activo.
    #[error("an active workflow already exists for {kind} '{identifier}'")] DuplicateCreate { kind: String, identifier: String },
    /// No se pudo resolver un recurso requerido por una fase.
    #[error("configuration error: {0}")] Configuration(String),
    /// Substrato/lookup/DB no disponible; reintentable por el llamador.
    #[error("transient infrastructure error: {0}")] TransientInfrastructure(String),
    #[error("invalid status transition {from} -> {to}")] InvalidTransition { from: GenerationStatus, to: GenerationStatus },
    #[error("workflow not found: {0}")] NotFound(String),
    #[error("storage: {0}")] Storage(String),
    #[error("internal: {0}")] Internal(String),
}

/// Clase de error usada para decidir reintentos.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorClass {
    Validation,
    Runtime,
    Transient,
    Permanent,
}

/// Clasifica un error. Sólo `Transient` se reintenta.
pub fn classify_error(err: &CoreEngineError) -> ErrorClass {
    match err {
        CoreEngineError::Decode { .. } | CoreEngineError::Validation(_) | CoreEngineError::InvalidTransition { .. } => {
            ErrorClass::Validation
        }
        CoreEngineError::TransientInfrastructure(_) => ErrorClass::Transient,
        CoreEngineError::DuplicateCreate { .. } | CoreEngineError::Configuration(_) | CoreEngineError::NotFound(_) => {
            ErrorClass::Permanent
        }
        CoreEngineError::Storage(_) | CoreEngineError::Internal(_) => ErrorClass::Runtime,
    }
}

impl CoreEngineError {
    pub fn is_retryable(&self) -> bool {
        classify_error(self) == ErrorClass::Transient
    }

    /// Construye un `Decode` recortando el payload a un extracto legible.
    pub fn decode(message: impl Into<String>, payload: &str) -> Self {
        CoreEngineError::Decode { message: message.into(),
                                  excerpt: excerpt(payload, crate::constants::PAYLOAD_EXCERPT_LEN) }
    }
}

fn excerpt(payload: &str, max: usize) -> String {
    if payload.chars().count() <= max {
        return payload.to_string();
    }
    let cut: String = payload.chars().take(max).collect();
    format!("{cut}...")
}
