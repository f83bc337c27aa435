//! Errores de persistencia.
//! Mapea errores de Diesel / conexión a variantes semánticas y de ahí a
//! `CoreEngineError` en el borde del crate.

use diesel::result::{DatabaseErrorKind, Error as DieselError};
use gen_core::CoreEngineError;
use thiserror::Error;

/// Índice parcial que garantiza un único registro activo por clave.
pub const ACTIVE_UNIQUE_INDEX: &str = "generation_requests_active_uq";

#[derive(Debug, Error)]
pub enum PersistenceError {
    /// El índice parcial de activos rechazó la inserción.
    #[error("active request already exists for {kind} '{identifier}'")]
    ActiveConflict { kind: String, identifier: String },
    /// `ACTIVE_UNIQUE_INDEX` rechazó la fila; `persist` le agrega la clave.
    #[error("active-uniqueness index violation: {0}")]
    ActiveIndexViolation(String),
    /// Cualquier otra restricción única (p. ej. la clave primaria).
    #[error("unique violation on {}: {message}", constraint.as_deref().unwrap_or("unknown constraint"))]
    UniqueViolation { constraint: Option<String>, message: String },
    #[error("check violation: {0}")]
    CheckViolation(String),
    #[error("not found")]
    NotFound,
    #[error("serialization conflict (retryable)")]
    SerializationConflict,
    #[error("transient IO / connection pool error: {0}")]
    TransientIo(String),
    /// Fila que no se puede mapear al dominio.
    #[error("corrupt row: {0}")]
    Corrupt(String),
    #[error("configuration: {0}")]
    Config(String),
    /// Regla del core violada dentro de la transacción.
    #[error(transparent)]
    Rejected(CoreEngineError),
    #[error("unknown database error: {0}")]
    Unknown(String),
}

impl From<DieselError> for PersistenceError {
    fn from(err: DieselError) -> Self {
        match err {
            DieselError::NotFound => Self::NotFound,
            DieselError::DatabaseError(kind, info) => match kind {
                DatabaseErrorKind::UniqueViolation => match info.constraint_name() {
                    Some(ACTIVE_UNIQUE_INDEX) => Self::ActiveIndexViolation(info.message().to_string()),
                    constraint => Self::UniqueViolation { constraint: constraint.map(str::to_string),
                                                          message: info.message().to_string() },
                },
                DatabaseErrorKind::CheckViolation => Self::CheckViolation(info.message().to_string()),
                DatabaseErrorKind::SerializationFailure => Self::SerializationConflict,
                DatabaseErrorKind::ClosedConnection => Self::TransientIo(info.message().to_string()),
                other => Self::Unknown(format!("db error kind {:?}: {}", other, info.message())),
            },
            DieselError::DeserializationError(e) => Self::Corrupt(format!("deser: {e}")),
            DieselError::SerializationError(e) => Self::Unknown(format!("ser: {e}")),
            DieselError::BrokenTransactionManager => Self::TransientIo("broken transaction manager".into()),
            DieselError::RollbackErrorOnCommit { rollback_error, commit_error } => {
                Self::Unknown(format!("rollback={rollback_error}; commit={commit_error}"))
            }
            other => Self::Unknown(format!("unhandled diesel error: {other:?}")),
        }
    }
}

impl From<PersistenceError> for CoreEngineError {
    fn from(err: PersistenceError) -> Self {
        match err {
            PersistenceError::ActiveConflict { kind, identifier } => CoreEngineError::DuplicateCreate { kind, identifier },
            PersistenceError::Rejected(e) => e,
            PersistenceError::NotFound => CoreEngineError::NotFound("generation request".into()),
            PersistenceError::SerializationConflict | PersistenceError::TransientIo(_) => {
                CoreEngineError::TransientInfrastructure(err.to_string())
            }
            PersistenceError::Config(m) => CoreEngineError::Configuration(m),
            other => CoreEngineError::Storage(other.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use diesel::result::DatabaseErrorInformation;

    use super::*;

    struct Info {
        constraint: Option<&'static str>,
    }

    impl DatabaseErrorInformation for Info {
        fn message(&self) -> &str {
            "duplicate key value violates unique constraint"
        }
        fn details(&self) -> Option<&str> {
            None
        }
        fn hint(&self) -> Option<&str> {
            None
        }
        fn table_name(&self) -> Option<&str> {
            Some("generation_requests")
        }
        fn column_name(&self) -> Option<&str> {
            None
        }
        fn constraint_name(&self) -> Option<&str> {
            self.constraint
        }
        fn statement_position(&self) -> Option<i32> {
            None
        }
    }

    fn unique_violation(constraint: Option<&'static str>) -> PersistenceError {
        DieselError::DatabaseError(DatabaseErrorKind::UniqueViolation, Box::new(Info { constraint })).into()
    }

    #[test]
    fn only_the_active_index_is_an_active_conflict() {
        assert!(matches!(unique_violation(Some(ACTIVE_UNIQUE_INDEX)), PersistenceError::ActiveIndexViolation(_)));

        let pk = unique_violation(Some("generation_requests_pkey"));
        assert!(matches!(pk, PersistenceError::UniqueViolation { constraint: Some(ref c), .. } if c == "generation_requests_pkey"));
        assert!(matches!(CoreEngineError::from(pk), CoreEngineError::Storage(_)));

        let unnamed: CoreEngineError = unique_violation(None).into();
        assert!(matches!(unnamed, CoreEngineError::Storage(_)));
    }

    #[test]
    fn active_conflict_maps_to_duplicate_create() {
        let e: CoreEngineError = PersistenceError::ActiveConflict { kind: "BUILD".into(),
                                                                   identifier: "B1".into() }.into();
        assert_eq!(e,
                   CoreEngineError::DuplicateCreate { kind: "BUILD".into(),
                                                      identifier: "B1".into() });
    }

    #[test]
    fn transient_errors_stay_retryable() {
        let e: CoreEngineError = PersistenceError::TransientIo("pool timeout".into()).into();
        assert!(e.is_retryable());
        let e: CoreEngineError = PersistenceError::SerializationConflict.into();
        assert!(e.is_retryable());
        let e: CoreEngineError = PersistenceError::Corrupt("bad status".into()).into();
        assert!(!e.is_retryable());
    }
}
