//! gen-domain: registros, estados y configuración de las solicitudes de
//! generación.
pub mod config;
pub mod error;
pub mod pnc;
pub mod record;
pub mod status;
pub use config::{BuildConfig, GeneratorConfig, GeneratorType, OperationConfig, ProcessorConfig, ProductConfig, RuntimeConfig,
                 CONFIG_API_VERSION};
pub use error::DomainError;
pub use pnc::{BuildStatus, BuildType, OperationResult, ProgressStatus};
pub use record::WorkflowRecord;
pub use status::{GenerationResult, GenerationStatus, WorkflowKind};
