use thiserror::Error;

/// Errores del dominio de solicitudes de generación.
#[derive(Debug, Error)]
pub enum DomainError {
    #[error("unknown {kind} value: {value}")]
    UnknownValue { kind: &'static str, value: String },
}
