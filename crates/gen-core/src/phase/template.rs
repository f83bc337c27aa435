use super::Phase;
use crate::errors::CoreEngineError;

/// Origen de los scripts de cada fase.
pub trait TemplateSource: Send + Sync {
    /// Contenido del script de `phase`. Un script ausente o ilegible es un
    /// `CoreEngineError::Configuration`.
    fn load(&self, phase: Phase) -> Result<String, CoreEngineError>;
}

/// Scripts incluidos en el binario.
#[derive(Debug, Default, Clone, Copy)]
pub struct EmbeddedTemplates;

const INIT_SH: &str = include_str!("../../templates/init.sh");
const GENERATE_SH: &str = include_str!("../../templates/generate.sh");

impl TemplateSource for EmbeddedTemplates {
    fn load(&self, phase: Phase) -> Result<String, CoreEngineError> {
        let body = match phase {
            Phase::Init => INIT_SH,
            Phase::Generate => GENERATE_SH,
        };
        Ok(body.to_string())
    }
}

/// Nombre de archivo del script de una fase.
pub fn template_file_name(phase: Phase) -> String {
    format!("{}.sh", phase.as_str())
}
