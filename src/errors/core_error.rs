use gen_core::CoreEngineError;
use gen_persistence::PersistenceError;
use thiserror::Error;

use super::DomainError;

#[derive(Debug, Error)]
pub enum CoreError {
    #[error("Error interno: {0}")]
    Internal(String),
    #[error("Error en IO: {0}")]
    Io(#[from] std::io::Error),
    #[error("Error de configuración: {0}")]
    Config(String),
    #[error("Error del orquestador: {0}")]
    Engine(#[from] CoreEngineError),
    #[error("Error de persistencia: {0}")]
    Persistence(#[from] PersistenceError),
    #[error(transparent)]
    Domain(#[from] DomainError),
}

impl CoreError {
    /// `true` si reintentar la misma unidad de trabajo puede tener éxito.
    pub fn is_retryable(&self) -> bool {
        matches!(self, CoreError::Engine(e) if e.is_retryable())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    #[test]
    fn test_internal_variant_format() {
        let err = CoreError::Internal("algo malo".into());
        assert_eq!(err.to_string(), "Error interno: algo malo");
    }

    #[test]
    fn test_io_variant_from() {
        let io_err = std::io::Error::other("falló IO");
        let err: CoreError = io_err.into();
        assert_eq!(err.to_string(), "Error en IO: falló IO");
    }

    #[test]
    fn test_engine_variant_keeps_retryability() {
        let err: CoreError = CoreEngineError::TransientInfrastructure("pool".into()).into();
        assert!(err.is_retryable());
        let err: CoreError = CoreEngineError::Configuration("no template".into()).into();
        assert!(!err.is_retryable());
    }
}
