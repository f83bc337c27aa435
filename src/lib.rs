//! genflow: librería de aplicación.
//!
//! - `config` lee el entorno y arma reconciliador y política de reintentos.
//! - `dispatch` ejecuta el orquestador sobre tokio y habla con el sustrato.
//! - `errors` agrupa errores de aplicación y de entrada.
//!
//! Puede usarse desde `main.rs` o desde `gen-cli`.

pub mod config;
pub mod dispatch;
pub mod errors;

pub use config::AppConfig;
pub use dispatch::{Dispatcher, Inbound, RetryPolicy};
pub use errors::{CoreError, DomainError};
