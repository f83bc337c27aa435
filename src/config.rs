//! Configuración central de la aplicación.
//! Carga variables de entorno (.env) una sola vez y expone `AppConfig`, que
//! decide plantillas, prefijo de tareas, imagen del generador y la política
//! de reintentos del despachador.
use std::env;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use gen_adapters::DirTemplateSource;
use gen_core::constants::{DEFAULT_GENERATOR_IMAGE, DEFAULT_TASK_PREFIX};
use gen_core::{EmbeddedTemplates, PhaseTaskBuilder, TemplateSource, WorkflowReconciler};
use once_cell::sync::Lazy;

use crate::dispatch::RetryPolicy;
use crate::errors::CoreError;

pub const ENV_TEMPLATE_DIR: &str = "GENFLOW_TEMPLATE_DIR";
pub const ENV_TASK_PREFIX: &str = "GENFLOW_TASK_PREFIX";
pub const ENV_EMIT_MAX_ATTEMPTS: &str = "GENFLOW_EMIT_MAX_ATTEMPTS";
pub const ENV_EMIT_BACKOFF_MS: &str = "GENFLOW_EMIT_BACKOFF_MS";
pub const ENV_GENERATOR_IMAGE: &str = "GENFLOW_GENERATOR_IMAGE";

pub const DEFAULT_EMIT_MAX_ATTEMPTS: u32 = 5;
pub const DEFAULT_EMIT_BACKOFF_MS: u64 = 200;

static DOTENV: Lazy<()> = Lazy::new(|| {
    let _ = dotenvy::dotenv();
});

/// Configuración global de la aplicación.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppConfig {
    /// Directorio con `init.sh` / `generate.sh`; `None` usa las embebidas.
    pub template_dir: Option<PathBuf>,
    pub task_prefix: String,
    pub generator_image: String,
    pub emit_max_attempts: u32,
    pub emit_backoff: Duration,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self { template_dir: None,
               task_prefix: DEFAULT_TASK_PREFIX.to_string(),
               generator_image: DEFAULT_GENERATOR_IMAGE.to_string(),
               emit_max_attempts: DEFAULT_EMIT_MAX_ATTEMPTS,
               emit_backoff: Duration::from_millis(DEFAULT_EMIT_BACKOFF_MS) }
    }
}

impl AppConfig {
    pub fn from_env() -> Result<Self, CoreError> {
        Lazy::force(&DOTENV);
        Self::from_vars(|key| env::var(key).ok())
    }

    /// Igual que `from_env` pero leyendo de una función arbitraria.
    pub fn from_vars<F>(var: F) -> Result<Self, CoreError>
        where F: Fn(&str) -> Option<String>
    {
        let non_empty = |key: &str| var(key).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());
        let defaults = Self::default();

        let emit_max_attempts = match non_empty(ENV_EMIT_MAX_ATTEMPTS) {
            Some(raw) => parse_number::<u32>(ENV_EMIT_MAX_ATTEMPTS, &raw)?,
            None => defaults.emit_max_attempts,
        };
        if emit_max_attempts == 0 {
            return Err(CoreError::Config(format!("{ENV_EMIT_MAX_ATTEMPTS} must be at least 1")));
        }
        let emit_backoff = match non_empty(ENV_EMIT_BACKOFF_MS) {
            Some(raw) => Duration::from_millis(parse_number::<u64>(ENV_EMIT_BACKOFF_MS, &raw)?),
            None => defaults.emit_backoff,
        };

        Ok(Self { template_dir: non_empty(ENV_TEMPLATE_DIR).map(PathBuf::from),
                  task_prefix: non_empty(ENV_TASK_PREFIX).unwrap_or(defaults.task_prefix),
                  generator_image: non_empty(ENV_GENERATOR_IMAGE).unwrap_or(defaults.generator_image),
                  emit_max_attempts,
                  emit_backoff })
    }

    pub fn template_source(&self) -> Arc<dyn TemplateSource> {
        match &self.template_dir {
            Some(dir) => Arc::new(DirTemplateSource::new(dir.clone())),
            None => Arc::new(EmbeddedTemplates),
        }
    }

    pub fn reconciler(&self) -> WorkflowReconciler {
        let builder = PhaseTaskBuilder::new(self.template_source()).with_prefix(self.task_prefix.clone())
                                                                  .with_image(self.generator_image.clone());
        WorkflowReconciler::new(builder)
    }

    pub fn retry_policy(&self) -> RetryPolicy {
        RetryPolicy::new(self.emit_max_attempts, self.emit_backoff)
    }
}

fn parse_number<T: std::str::FromStr>(key: &str, raw: &str) -> Result<T, CoreError> {
    raw.parse::<T>()
       .map_err(|_| CoreError::Config(format!("{key} is not a valid number: '{raw}'")))
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use gen_core::Phase;
    use uuid::Uuid;

    use super::*;

    fn vars(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn defaults_when_nothing_is_set() {
        let cfg = AppConfig::from_vars(vars(&[])).unwrap();
        assert_eq!(cfg, AppConfig::default());
        assert_eq!(cfg.retry_policy().max_attempts(), 5);
    }

    #[test]
    fn overrides_are_read() {
        let cfg = AppConfig::from_vars(vars(&[(ENV_TASK_PREFIX, "req"),
                                              (ENV_EMIT_MAX_ATTEMPTS, "3"),
                                              (ENV_EMIT_BACKOFF_MS, "10"),
                                              (ENV_GENERATOR_IMAGE, "quay.io/x/gen:1")])).unwrap();
        assert_eq!(cfg.task_prefix, "req");
        assert_eq!(cfg.emit_max_attempts, 3);
        assert_eq!(cfg.emit_backoff, Duration::from_millis(10));
        let id = Uuid::new_v4();
        assert_eq!(cfg.reconciler().builder().task_name(id, Phase::Init), format!("req-{id}-1-init"));
    }

    #[test]
    fn invalid_numbers_are_config_errors() {
        let err = AppConfig::from_vars(vars(&[(ENV_EMIT_BACKOFF_MS, "soon")])).unwrap_err();
        assert!(matches!(err, CoreError::Config(_)));
        let err = AppConfig::from_vars(vars(&[(ENV_EMIT_MAX_ATTEMPTS, "0")])).unwrap_err();
        assert!(matches!(err, CoreError::Config(_)));
    }
}
