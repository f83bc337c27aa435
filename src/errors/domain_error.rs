use thiserror::Error;

/// Errores de entrada de la aplicación (argumentos, archivos, ids).
#[derive(Debug, Error)]
pub enum DomainError {
    #[error("Entidad no encontrada: {0}")]
    NotFound(String),
    #[error("Validación fallida: {0}")]
    Validation(String),
}

impl From<gen_domain::DomainError> for DomainError {
    fn from(e: gen_domain::DomainError) -> Self {
        DomainError::Validation(e.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_not_found_variant_format() {
        let err = DomainError::NotFound("RecursoX".into());
        assert_eq!(err.to_string(), "Entidad no encontrada: RecursoX");
    }

    #[test]
    fn test_from_model_error() {
        let err: DomainError = "SOMETHING".parse::<gen_domain::WorkflowKind>().unwrap_err().into();
        assert!(err.to_string().starts_with("Validación fallida: "));
    }
}
