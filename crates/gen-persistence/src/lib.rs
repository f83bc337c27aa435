//! gen-persistence
//!
//! Backend Postgres (Diesel + r2d2) de `DeduplicationStore` y
//! `StatusProjector`, con la misma semántica que el store en memoria.
//!
//! Módulos:
//! - `pg`: `PgWorkflowStore` sobre la tabla `generation_requests`.
//! - `migrations`: runner embebido de migraciones Diesel.
//! - `config`: carga de configuración desde .env.
//! - `schema`: tablas Diesel declaradas para compilar queries.

pub mod config;
pub mod error;
pub mod migrations;
pub mod pg;
pub mod schema;

pub use config::{init_dotenv, DbConfig};
pub use error::PersistenceError;
pub use pg::{build_dev_pool_from_env, build_pool, store_from_env, ConnectionProvider, PgPool, PgWorkflowStore, PoolProvider};
