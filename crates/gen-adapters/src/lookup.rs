//! Resultados de operaciones conocidos de antemano.
use std::collections::HashMap;
use std::path::Path;
use std::sync::RwLock;

use gen_core::{CoreEngineError, OperationOutcomeLookup};
use gen_domain::OperationResult;

/// Tabla `operation_id -> OperationResult` en memoria.
///
/// Acepta el formato JSON `{"<operation_id>": "SUCCESSFUL", ...}`.
#[derive(Debug, Default)]
pub struct StaticOutcomeLookup {
    outcomes: RwLock<HashMap<String, OperationResult>>,
}

impl StaticOutcomeLookup {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(self, operation_id: impl Into<String>, result: OperationResult) -> Self {
        self.insert(operation_id, result);
        self
    }

    pub fn insert(&self, operation_id: impl Into<String>, result: OperationResult) {
        if let Ok(mut map) = self.outcomes.write() {
            map.insert(operation_id.into(), result);
        }
    }

    pub fn from_json_str(raw: &str) -> Result<Self, CoreEngineError> {
        let outcomes: HashMap<String, OperationResult> =
            serde_json::from_str(raw).map_err(|e| CoreEngineError::Configuration(format!("invalid outcome table: {e}")))?;
        Ok(Self { outcomes: RwLock::new(outcomes) })
    }

    pub fn from_json_file(path: &Path) -> Result<Self, CoreEngineError> {
        let raw = std::fs::read_to_string(path).map_err(|e| {
                                                   CoreEngineError::Configuration(format!("cannot read {}: {e}", path.display()))
                                               })?;
        Self::from_json_str(&raw)
    }
}

impl OperationOutcomeLookup for StaticOutcomeLookup {
    fn outcome(&self, operation_id: &str) -> Result<OperationResult, CoreEngineError> {
        let map = self.outcomes
                      .read()
                      .map_err(|_| CoreEngineError::Internal("outcome table lock poisoned".into()))?;
        map.get(operation_id)
           .copied()
           .ok_or_else(|| CoreEngineError::NotFound(format!("operation '{operation_id}'")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_outcome_table() {
        let l = StaticOutcomeLookup::from_json_str(r#"{"O1":"SUCCESSFUL","O2":"FAILED"}"#).unwrap();
        assert_eq!(l.outcome("O1").unwrap(), OperationResult::Successful);
        assert_eq!(l.outcome("O2").unwrap(), OperationResult::Failed);
        assert!(matches!(l.outcome("O3"), Err(CoreEngineError::NotFound(_))));
    }

    #[test]
    fn rejects_unknown_result_values() {
        assert!(StaticOutcomeLookup::from_json_str(r#"{"O1":"MAYBE"}"#).is_err());
    }
}
