//! Constantes del orquestador.
//!
//! Los motivos (`reason`) son visibles para los lectores externos del
//! registro; cambiarlos cambia el contrato observable.

/// Motivo fijo cuando el sistema origen reporta la operación como fallida.
pub const OPERATION_FAILED_REASON: &str = "Deliverable analyzer operation failed in PNC";

/// Motivo registrado al completar la fase de generación.
pub const GENERATION_FINISHED_REASON: &str = "Generation finished successfully";

/// Longitud máxima del extracto de payload incluido en errores de decodificación.
pub const PAYLOAD_EXCERPT_LEN: usize = 256;

/// Prefijo por defecto de los nombres de tareas de fase.
pub const DEFAULT_TASK_PREFIX: &str = "sbom-request";

/// Imagen por defecto del ejecutor de fases.
pub const DEFAULT_GENERATOR_IMAGE: &str = "localhost/sbomer-generator:latest";

/// Nombres de parámetros de las tareas de fase.
pub const PARAM_WORKFLOW_ID: &str = "workflow-id";
pub const PARAM_IDENTIFIER: &str = "identifier";
pub const PARAM_CONFIG: &str = "config";
pub const PARAM_CONFIG_DIGEST: &str = "config-digest";

/// Etiquetas aplicadas a las tareas de fase.
pub const LABEL_PART_OF: &str = "app.kubernetes.io/part-of";
pub const LABEL_PART_OF_VALUE: &str = "sbomer";
pub const LABEL_WORKFLOW_ID: &str = "sbomer.jboss.org/workflow-id";
pub const LABEL_PHASE: &str = "sbomer.jboss.org/phase";
