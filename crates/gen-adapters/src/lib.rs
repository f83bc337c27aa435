//! gen-adapters: implementaciones de los colaboradores externos del core.
//!
//! - `templates`: scripts de fase leídos desde un directorio.
//! - `lookup`: resultados de operaciones en memoria o desde un archivo JSON.
//! - `substrate`: sustrato de ejecución que registra tareas (demo y tests).
//! - `listener`: listener de cambios de estado que sólo registra en el log.

pub mod listener;
pub mod lookup;
pub mod substrate;
pub mod templates;

pub use listener::LoggingListener;
pub use lookup::StaticOutcomeLookup;
pub use substrate::RecordingSubstrate;
pub use templates::DirTemplateSource;
