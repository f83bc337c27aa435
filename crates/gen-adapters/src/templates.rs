//! Scripts de fase leídos desde disco (`<dir>/init.sh`, `<dir>/generate.sh`).
use std::path::PathBuf;

use gen_core::phase::{template_file_name, Phase, TemplateSource};
use gen_core::CoreEngineError;

#[derive(Debug, Clone)]
pub struct DirTemplateSource {
    dir: PathBuf,
}

impl DirTemplateSource {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn path_for(&self, phase: Phase) -> PathBuf {
        self.dir.join(template_file_name(phase))
    }
}

impl TemplateSource for DirTemplateSource {
    fn load(&self, phase: Phase) -> Result<String, CoreEngineError> {
        let path = self.path_for(phase);
        std::fs::read_to_string(&path).map_err(|e| {
                                          CoreEngineError::Configuration(format!("template for phase {phase} not readable at {}: {e}",
                                                                                 path.display()))
                                      })
    }
}
