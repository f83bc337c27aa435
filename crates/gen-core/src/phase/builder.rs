use std::collections::BTreeMap;
use std::sync::Arc;

use gen_domain::RuntimeConfig;
use uuid::Uuid;

use super::{EmbeddedTemplates, Phase, PhaseTaskDescriptor, TaskParam, TemplateSource};
use crate::constants::{DEFAULT_GENERATOR_IMAGE, DEFAULT_TASK_PREFIX, LABEL_PART_OF, LABEL_PART_OF_VALUE, LABEL_PHASE,
                       LABEL_WORKFLOW_ID, PARAM_CONFIG, PARAM_CONFIG_DIGEST, PARAM_IDENTIFIER, PARAM_WORKFLOW_ID};
use crate::errors::CoreEngineError;
use crate::hashing::{hash_value, to_canonical_json};

/// Renderiza una fase como `PhaseTaskDescriptor`.
///
/// Determinista: mismos `(workflow_id, phase, config)` y mismas plantillas
/// producen el mismo descriptor.
#[derive(Clone)]
pub struct PhaseTaskBuilder {
    prefix: String,
    image: String,
    templates: Arc<dyn TemplateSource>,
}

impl std::fmt::Debug for PhaseTaskBuilder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PhaseTaskBuilder")
         .field("prefix", &self.prefix)
         .field("image", &self.image)
         .finish_non_exhaustive()
    }
}

impl Default for PhaseTaskBuilder {
    fn default() -> Self {
        Self::new(Arc::new(EmbeddedTemplates))
    }
}

impl PhaseTaskBuilder {
    pub fn new(templates: Arc<dyn TemplateSource>) -> Self {
        Self { prefix: DEFAULT_TASK_PREFIX.to_string(),
               image: DEFAULT_GENERATOR_IMAGE.to_string(),
               templates }
    }

    pub fn with_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.prefix = prefix.into();
        self
    }

    pub fn with_image(mut self, image: impl Into<String>) -> Self {
        self.image = image.into();
        self
    }

    /// `{prefix}-{workflow_id}-{phase_index}-{phase}`
    pub fn task_name(&self, workflow_id: Uuid, phase: Phase) -> String {
        format!("{}-{}-{}-{}", self.prefix, workflow_id, phase.index(), phase)
    }

    pub fn build(&self,
                 workflow_id: Uuid,
                 phase: Phase,
                 config: Option<&RuntimeConfig>)
                 -> Result<PhaseTaskDescriptor, CoreEngineError> {
        let config = config.ok_or_else(|| {
                               CoreEngineError::Configuration(format!("workflow {workflow_id} has no resolved config for phase {phase}"))
                           })?;
        let init_payload = self.templates.load(phase)?;
        let value = serde_json::to_value(config).map_err(|e| {
                                                    CoreEngineError::Configuration(format!("config of workflow {workflow_id} cannot be serialized: {e}"))
                                                })?;
        let canonical = to_canonical_json(&value);
        let digest = hash_value(&value);

        let parameters = vec![TaskParam::new(PARAM_WORKFLOW_ID, workflow_id.to_string()),
                              TaskParam::new(PARAM_IDENTIFIER, config.identifier()),
                              TaskParam::new(PARAM_CONFIG, canonical),
                              TaskParam::new(PARAM_CONFIG_DIGEST, digest)];

        let mut labels = BTreeMap::new();
        labels.insert(LABEL_PART_OF.to_string(), LABEL_PART_OF_VALUE.to_string());
        labels.insert(LABEL_WORKFLOW_ID.to_string(), workflow_id.to_string());
        labels.insert(LABEL_PHASE.to_string(), phase.to_string());

        Ok(PhaseTaskDescriptor { name: self.task_name(workflow_id, phase),
                                 phase,
                                 workflow_id,
                                 image: self.image.clone(),
                                 parameters,
                                 resource_requests: phase.requests(),
                                 resource_limits: phase.limits(),
                                 labels,
                                 result_name: phase.result_name().to_string(),
                                 init_payload })
    }
}
