//! Configuración resuelta de una solicitud de generación.
//!
//! El core la trata como un blob opaco: se serializa a JSON para persistirla
//! y sólo la inspecciona para rellenar valores por defecto (`adjust`) y para
//! renderizar los parámetros de las fases.
use serde::{Deserialize, Serialize};

/// Versión del formato de configuración.
pub const CONFIG_API_VERSION: &str = "sbomer.jboss.org/v1alpha1";

/// Generadores soportados.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum GeneratorType {
    MavenCyclonedx,
    MavenDomino,
    GradleCyclonedx,
    NodejsCyclonedx,
    CyclonedxOperation,
}

impl GeneratorType {
    /// Versión del generador usada cuando la configuración no la fija.
    pub fn default_version(&self) -> &'static str {
        match self {
            GeneratorType::MavenCyclonedx => "2.7.9",
            GeneratorType::MavenDomino => "0.0.107",
            GeneratorType::GradleCyclonedx => "1.7.4",
            GeneratorType::NodejsCyclonedx => "1.12.0",
            GeneratorType::CyclonedxOperation => "1.0.0",
        }
    }

    /// Argumentos del generador usados cuando la configuración no los fija.
    pub fn default_args(&self) -> &'static str {
        match self {
            GeneratorType::MavenCyclonedx => "--batch-mode",
            GeneratorType::MavenDomino => "--include-non-managed --warn-on-missing-scm",
            GeneratorType::GradleCyclonedx => "--info",
            GeneratorType::NodejsCyclonedx => "",
            GeneratorType::CyclonedxOperation => "",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GeneratorConfig {
    #[serde(rename = "type")]
    pub generator_type: GeneratorType,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub args: Option<String>,
}

impl GeneratorConfig {
    pub fn of(generator_type: GeneratorType) -> Self {
        Self { generator_type,
               version: None,
               args: None }
    }
}

/// Post-procesadores aplicados al SBOM generado.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "kebab-case")]
pub enum ProcessorConfig {
    Default,
    #[serde(rename_all = "camelCase")]
    Redhat {
        product_name: String,
        product_version: String,
        product_variant: String,
    },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductConfig {
    #[serde(default)]
    pub processors: Vec<ProcessorConfig>,
    pub generator: GeneratorConfig,
}

/// Configuración de una solicitud originada por un build.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BuildConfig {
    pub api_version: String,
    pub build_id: String,
    #[serde(default)]
    pub products: Vec<ProductConfig>,
}

/// Configuración de una solicitud originada por una operación del analizador
/// de entregables.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OperationConfig {
    pub api_version: String,
    pub operation_id: String,
    #[serde(default)]
    pub deliverable_urls: Vec<String>,
    pub product: ProductConfig,
}

/// Configuración resuelta, etiquetada por tipo de solicitud.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum RuntimeConfig {
    Build(BuildConfig),
    Operation(OperationConfig),
}

impl RuntimeConfig {
    /// Identificador externo referenciado por la configuración.
    pub fn identifier(&self) -> &str {
        match self {
            RuntimeConfig::Build(c) => &c.build_id,
            RuntimeConfig::Operation(c) => &c.operation_id,
        }
    }

    /// Productos configurados, en orden.
    pub fn products(&self) -> Vec<&ProductConfig> {
        match self {
            RuntimeConfig::Build(c) => c.products.iter().collect(),
            RuntimeConfig::Operation(c) => vec![&c.product],
        }
    }

    pub fn products_mut(&mut self) -> Vec<&mut ProductConfig> {
        match self {
            RuntimeConfig::Build(c) => c.products.iter_mut().collect(),
            RuntimeConfig::Operation(c) => vec![&mut c.product],
        }
    }
}
