//! Implementación Postgres (Diesel) de los traits de almacenamiento del core.
//!
//! - Paridad 1:1 con `InMemoryWorkflowStore`: la fusión de `persist` delega
//!   en `gen_core::repo::merge_projection`.
//! - `persist` es una única transacción read-write con `SELECT ... FOR
//!   UPDATE` sobre la fila.
//! - La unicidad de activos por `(kind, identifier)` la garantiza el índice
//!   parcial `generation_requests_active_uq`; perder la carrera produce
//!   `CoreEngineError::DuplicateCreate`.
//! - Errores transitorios (pool, conflictos de serialización) se reintentan
//!   con backoff en `with_retry`.

use std::str::FromStr;

use chrono::{DateTime, Utc};
use diesel::prelude::*;
use diesel::r2d2::{self, ConnectionManager};
use gen_core::repo::{merge_projection, DeduplicationStore, Projection, StatusProjector};
use gen_core::CoreEngineError;
use gen_domain::{GenerationResult, GenerationStatus, RuntimeConfig, WorkflowKind, WorkflowRecord};
use log::{debug, error, warn};
use serde_json::Value;
use uuid::Uuid;

use crate::error::PersistenceError;
use crate::migrations::run_pending_migrations;
use crate::schema::generation_requests;

/// Pool r2d2 de conexiones Postgres.
///
/// Se construye con `min_idle` y `max_size`; al construirlo se corren las
/// migraciones pendientes (una sola vez).
pub type PgPool = r2d2::Pool<ConnectionManager<PgConnection>>;

/// Proveedor abstracto de conexiones.
///
/// Contrato: devuelve una conexión válida o `PersistenceError::TransientIo`.
pub trait ConnectionProvider: Send + Sync + 'static {
    fn connection(&self) -> Result<r2d2::PooledConnection<ConnectionManager<PgConnection>>, PersistenceError>;
}

/// `ConnectionProvider` respaldado por un `PgPool`.
pub struct PoolProvider {
    pub pool: PgPool,
}

impl ConnectionProvider for PoolProvider {
    fn connection(&self) -> Result<r2d2::PooledConnection<ConnectionManager<PgConnection>>, PersistenceError> {
        self.pool
            .get()
            .map_err(|e| PersistenceError::TransientIo(format!("pool error: {e}")))
    }
}

/// Fila de `generation_requests` para lecturas.
#[derive(Queryable, Debug)]
pub struct RequestRow {
    pub id: Uuid,
    pub identifier: String,
    pub kind: String,
    pub status: String,
    pub result: Option<String>,
    pub reason: Option<String>,
    pub config: Option<Value>,
    pub creation_time: DateTime<Utc>,
}

impl RequestRow {
    pub fn into_record(self) -> Result<WorkflowRecord, PersistenceError> {
        let corrupt = |e: gen_domain::DomainError| PersistenceError::Corrupt(format!("row {}: {e}", self.id));
        let kind = WorkflowKind::from_str(&self.kind).map_err(corrupt)?;
        let status = GenerationStatus::from_str(&self.status).map_err(corrupt)?;
        let result = self.result
                         .as_deref()
                         .map(GenerationResult::from_str)
                         .transpose()
                         .map_err(corrupt)?;
        let config = match self.config {
            Some(v) => Some(serde_json::from_value::<RuntimeConfig>(v).map_err(|e| {
                                                                          PersistenceError::Corrupt(format!("row {} config: {e}", self.id))
                                                                      })?),
            None => None,
        };
        Ok(WorkflowRecord { id: self.id,
                            identifier: self.identifier,
                            kind,
                            status,
                            result,
                            reason: self.reason,
                            config,
                            creation_time: self.creation_time })
    }
}

/// Fila para insertar en `generation_requests`.
#[derive(Insertable, Debug)]
#[diesel(table_name = generation_requests)]
pub struct NewRequestRow<'a> {
    pub id: Uuid,
    pub identifier: &'a str,
    pub kind: &'static str,
    pub status: &'static str,
    pub result: Option<&'static str>,
    pub reason: Option<&'a str>,
    pub config: Option<Value>,
    pub creation_time: DateTime<Utc>,
}

impl<'a> NewRequestRow<'a> {
    pub fn from_record(record: &'a WorkflowRecord) -> Result<Self, PersistenceError> {
        Ok(Self { id: record.id,
                  identifier: &record.identifier,
                  kind: record.kind.as_str(),
                  status: record.status.as_str(),
                  result: record.result.map(|r| r.as_str()),
                  reason: record.reason.as_deref(),
                  config: config_value(record)?,
                  creation_time: record.creation_time })
    }
}

fn config_value(record: &WorkflowRecord) -> Result<Option<Value>, PersistenceError> {
    record.config
          .as_ref()
          .map(serde_json::to_value)
          .transpose()
          .map_err(|e| PersistenceError::Unknown(format!("serialize config of {}: {e}", record.id)))
}

/// Determina si un error es transitorio (recomendado reintentar con backoff).
fn is_retryable(e: &PersistenceError) -> bool {
    match e {
        PersistenceError::SerializationConflict => true,
        PersistenceError::TransientIo(_) => true,
        // Algunos errores del driver llegan como Unknown con texto; best-effort
        // sin acoplar a SQLSTATE.
        PersistenceError::Unknown(msg) => {
            let m = msg.to_lowercase();
            m.contains("deadlock detected")
            || m.contains("could not serialize access due to concurrent update")
            || m.contains("terminating connection due to administrator command")
            || m.contains("connection closed")
            || m.contains("connection refused")
            || m.contains("timeout")
        }
        _ => false,
    }
}

const RETRY_ATTEMPTS: u32 = 3;

/// Retry con backoff lineal corto (15ms, 30ms, 45ms). Sólo repite la
/// unidad de trabajo provista por `f`.
fn with_retry<F, T>(mut f: F) -> Result<T, PersistenceError>
    where F: FnMut() -> Result<T, PersistenceError>
{
    let mut attempts = 0;
    loop {
        match f() {
            Err(e) if is_retryable(&e) && attempts < RETRY_ATTEMPTS => {
                let delay_ms = 15 * u64::from(attempts + 1);
                warn!("retryable error (attempt {}): {:?} -> sleeping {}ms", attempts + 1, e, delay_ms);
                std::thread::sleep(std::time::Duration::from_millis(delay_ms));
                attempts += 1;
            }
            r => return r,
        }
    }
}

const TERMINAL: [&str; 2] = ["FINISHED", "FAILED"];

/// Store Postgres de solicitudes de generación.
pub struct PgWorkflowStore<P: ConnectionProvider> {
    pub provider: P,
}

impl<P: ConnectionProvider> PgWorkflowStore<P> {
    pub fn new(provider: P) -> Self {
        Self { provider }
    }

    fn persist_once(&self, record: &WorkflowRecord) -> Result<Projection, PersistenceError> {
        let mut conn = self.provider.connection()?;
        conn.build_transaction()
            .read_write()
            .run::<_, PersistenceError, _>(|tx| {
                let stored: Option<RequestRow> = generation_requests::table.find(record.id)
                                                                           .for_update()
                                                                           .first(tx)
                                                                           .optional()?;
                match stored {
                    Some(row) => {
                        let stored = row.into_record()?;
                        let merged = merge_projection(&stored, record).map_err(PersistenceError::Rejected)?;
                        if merged != stored {
                            diesel::update(generation_requests::table.find(record.id))
                                .set((generation_requests::status.eq(merged.status.as_str()),
                                      generation_requests::result.eq(merged.result.map(|r| r.as_str())),
                                      generation_requests::reason.eq(merged.reason.as_deref()),
                                      generation_requests::config.eq(config_value(&merged)?)))
                                .execute(tx)?;
                        }
                        Ok(Projection { previous_status: Some(stored.status),
                                        record: merged })
                    }
                    None => {
                        let row = NewRequestRow::from_record(record)?;
                        diesel::insert_into(generation_requests::table).values(&row)
                                                                       .execute(tx)?;
                        Ok(Projection { record: record.clone(),
                                        previous_status: None })
                    }
                }
            })
    }
}

impl<P: ConnectionProvider> DeduplicationStore for PgWorkflowStore<P> {
    fn find_pending(&self, kind: WorkflowKind, identifier: &str) -> Result<Vec<WorkflowRecord>, CoreEngineError> {
        debug!("find_pending:start kind={kind} identifier={identifier}");
        let rows: Vec<RequestRow> = with_retry(|| {
                                        let mut conn = self.provider.connection()?;
                                        generation_requests::table.filter(generation_requests::kind.eq(kind.as_str()))
                                                                  .filter(generation_requests::identifier.eq(identifier))
                                                                  .filter(generation_requests::status.ne_all(TERMINAL))
                                                                  .order((generation_requests::creation_time.asc(),
                                                                          generation_requests::id.asc()))
                                                                  .load(&mut conn)
                                                                  .map_err(PersistenceError::from)
                                    })?;
        let records = rows.into_iter()
                          .map(RequestRow::into_record)
                          .collect::<Result<Vec<_>, _>>()?;
        debug!("find_pending:done kind={kind} identifier={identifier} count={}", records.len());
        Ok(records)
    }

    fn find_latest(&self, kind: WorkflowKind, identifier: &str) -> Result<Option<WorkflowRecord>, CoreEngineError> {
        let row: Option<RequestRow> = with_retry(|| {
                                          let mut conn = self.provider.connection()?;
                                          generation_requests::table.filter(generation_requests::kind.eq(kind.as_str()))
                                                                    .filter(generation_requests::identifier.eq(identifier))
                                                                    .order((generation_requests::creation_time.desc(),
                                                                            generation_requests::id.desc()))
                                                                    .first(&mut conn)
                                                                    .optional()
                                                                    .map_err(PersistenceError::from)
                                      })?;
        Ok(row.map(RequestRow::into_record).transpose()?)
    }
}

impl<P: ConnectionProvider> StatusProjector for PgWorkflowStore<P> {
    fn persist(&self, record: &WorkflowRecord) -> Result<Projection, CoreEngineError> {
        debug!("persist:start id={} status={}", record.id, record.status);
        let projection = with_retry(|| self.persist_once(record)).map_err(|e| match e {
                                                                     PersistenceError::ActiveIndexViolation(msg) => {
                                                                         debug!("persist: id={} lost active-uniqueness race: {msg}",
                                                                                record.id);
                                                                         PersistenceError::ActiveConflict { kind: record.kind.to_string(),
                                                                                                            identifier: record.identifier.clone() }
                                                                     }
                                                                     other => other,
                                                                 });
        match projection {
            Ok(p) => {
                debug!("persist:done id={} {:?} -> {}", record.id, p.previous_status, p.record.status);
                Ok(p)
            }
            Err(e @ (PersistenceError::ActiveConflict { .. } | PersistenceError::Rejected(_))) => Err(e.into()),
            Err(e) => {
                error!("persist:error id={} err={e}", record.id);
                Err(e.into())
            }
        }
    }

    fn read(&self, id: Uuid) -> Result<Option<WorkflowRecord>, CoreEngineError> {
        let row: Option<RequestRow> = with_retry(|| {
                                          let mut conn = self.provider.connection()?;
                                          generation_requests::table.find(id)
                                                                    .first(&mut conn)
                                                                    .optional()
                                                                    .map_err(PersistenceError::from)
                                      })?;
        Ok(row.map(RequestRow::into_record).transpose()?)
    }

    fn list(&self, kind: Option<WorkflowKind>, status: Option<GenerationStatus>)
            -> Result<Vec<WorkflowRecord>, CoreEngineError> {
        let rows: Vec<RequestRow> = with_retry(|| {
                                        let mut conn = self.provider.connection()?;
                                        let mut query = generation_requests::table.into_boxed();
                                        if let Some(k) = kind {
                                            query = query.filter(generation_requests::kind.eq(k.as_str()));
                                        }
                                        if let Some(s) = status {
                                            query = query.filter(generation_requests::status.eq(s.as_str()));
                                        }
                                        query.order((generation_requests::creation_time.asc(), generation_requests::id.asc()))
                                             .load(&mut conn)
                                             .map_err(PersistenceError::from)
                                    })?;
        Ok(rows.into_iter()
               .map(RequestRow::into_record)
               .collect::<Result<Vec<_>, _>>()?)
    }
}

/// Construye un pool Postgres r2d2 a partir de URL y corre las migraciones.
///
/// Si `min_size > max_size` se usa `min_size = max_size`. Errores del
/// pool/manager se devuelven como `PersistenceError::TransientIo`.
pub fn build_pool(database_url: &str, min_size: u32, max_size: u32) -> Result<PgPool, PersistenceError> {
    let validated_min = min_size.max(1);
    let validated_max = max_size.max(1);
    if validated_min > validated_max {
        warn!("min_size > max_size ({validated_min} > {validated_max}), ajustando min=max");
    }
    let manager = ConnectionManager::<PgConnection>::new(database_url);
    let pool = r2d2::Pool::builder().min_idle(Some(validated_min.min(validated_max)))
                                    .max_size(validated_max)
                                    .build(manager)
                                    .map_err(|e| PersistenceError::TransientIo(format!("pool build: {e}")))?;
    {
        let mut conn = pool.get()
                           .map_err(|e| PersistenceError::TransientIo(format!("pool get for migrations: {e}")))?;
        run_pending_migrations(&mut conn)?;
    }
    Ok(pool)
}

/// Carga `.env`, lee `DbConfig` y construye un pool ya migrado.
pub fn build_dev_pool_from_env() -> Result<PgPool, PersistenceError> {
    crate::config::init_dotenv();
    let cfg = crate::config::DbConfig::from_env()?;
    build_pool(&cfg.url, cfg.min_connections, cfg.max_connections)
}

/// Store listo para usar a partir del entorno.
pub fn store_from_env() -> Result<PgWorkflowStore<PoolProvider>, PersistenceError> {
    let pool = build_dev_pool_from_env()?;
    Ok(PgWorkflowStore::new(PoolProvider { pool }))
}
