//! Despachador asíncrono sobre el orquestador.
//!
//! Cada mensaje se procesa como una unidad bloqueante independiente
//! (`spawn_blocking`); los errores `TransientInfrastructure` se reintentan con
//! backoff exponencial. Las tareas deseadas se envían al sustrato y las de
//! registros terminales se abandonan.
use std::sync::Arc;
use std::time::Duration;

use gen_core::{CoreEngineError, ExecutionSubstrate, HandleOutcome, Observation, Orchestrator, PhaseTaskDescriptor,
               Reconciliation, WorkflowStore};
use gen_domain::{RuntimeConfig, WorkflowKind};
use log::{debug, warn};
use uuid::Uuid;

use crate::errors::CoreError;

const MAX_BACKOFF: Duration = Duration::from_secs(30);

/// Intentos totales y espera base; la espera se duplica en cada reintento.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    max_attempts: u32,
    base_backoff: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::new(5, Duration::from_millis(200))
    }
}

impl RetryPolicy {
    pub fn new(max_attempts: u32, base_backoff: Duration) -> Self {
        Self { max_attempts: max_attempts.max(1),
               base_backoff }
    }

    pub fn max_attempts(&self) -> u32 {
        self.max_attempts
    }

    /// Espera tras el intento fallido número `attempt` (empieza en 1).
    pub fn backoff(&self, attempt: u32) -> Duration {
        let factor = 2u32.saturating_pow(attempt.saturating_sub(1));
        self.base_backoff.saturating_mul(factor).min(MAX_BACKOFF)
    }
}

/// Mensaje entrante sin decodificar.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Inbound {
    pub kind: WorkflowKind,
    pub payload: String,
}

impl Inbound {
    pub fn new(kind: WorkflowKind, payload: impl Into<String>) -> Self {
        Self { kind,
               payload: payload.into() }
    }
}

pub struct Dispatcher<S: WorkflowStore + 'static> {
    orchestrator: Arc<Orchestrator<S>>,
    substrate: Arc<dyn ExecutionSubstrate>,
    policy: RetryPolicy,
}

impl<S: WorkflowStore + 'static> Clone for Dispatcher<S> {
    fn clone(&self) -> Self {
        Self { orchestrator: Arc::clone(&self.orchestrator),
               substrate: Arc::clone(&self.substrate),
               policy: self.policy }
    }
}

impl<S: WorkflowStore + 'static> Dispatcher<S> {
    pub fn new(orchestrator: Arc<Orchestrator<S>>, substrate: Arc<dyn ExecutionSubstrate>, policy: RetryPolicy) -> Self {
        Self { orchestrator,
               substrate,
               policy }
    }

    pub fn orchestrator(&self) -> &Arc<Orchestrator<S>> {
        &self.orchestrator
    }

    /// Procesa los mensajes en paralelo; los resultados conservan el orden
    /// de entrada y el fallo de uno no afecta a los demás.
    pub async fn handle_batch(&self, messages: Vec<Inbound>) -> Vec<Result<HandleOutcome, CoreError>> {
        let handles: Vec<_> = messages.into_iter()
                                      .map(|message| {
                                          let this = self.clone();
                                          tokio::spawn(async move { this.handle(message).await })
                                      })
                                      .collect();
        let mut results = Vec::with_capacity(handles.len());
        for handle in handles {
            results.push(match handle.await {
                             Ok(result) => result,
                             Err(e) => Err(CoreError::Internal(format!("dispatch task failed: {e}"))),
                         });
        }
        results
    }

    pub async fn handle(&self, message: Inbound) -> Result<HandleOutcome, CoreError> {
        let orchestrator = Arc::clone(&self.orchestrator);
        let Inbound { kind, payload } = message;
        let outcome = self.retrying("handle", move || orchestrator.handle(&payload, kind)).await?;
        if let Some(task) = outcome.task() {
            self.submit(task.clone()).await?;
        }
        if let HandleOutcome::Failed { record } = &outcome {
            self.abandon(record.id).await;
        }
        Ok(outcome)
    }

    pub async fn resolve_config(&self, id: Uuid, config: RuntimeConfig) -> Result<Reconciliation, CoreError> {
        let orchestrator = Arc::clone(&self.orchestrator);
        let reconciliation = self.retrying("resolve_config", move || orchestrator.resolve_config(id, config.clone()))
                                 .await?;
        self.follow_up(reconciliation).await
    }

    /// Aplica una señal de finalización de fase (u otra observación).
    pub async fn observe(&self, id: Uuid, observation: Observation) -> Result<Reconciliation, CoreError> {
        let orchestrator = Arc::clone(&self.orchestrator);
        let reconciliation = self.retrying("observe", move || orchestrator.observe(id, observation.clone()))
                                 .await?;
        self.follow_up(reconciliation).await
    }

    async fn follow_up(&self, reconciliation: Reconciliation) -> Result<Reconciliation, CoreError> {
        if let Some(task) = &reconciliation.desired_task {
            self.submit(task.clone()).await?;
        }
        if reconciliation.changed && reconciliation.record.status.is_terminal() {
            self.abandon(reconciliation.record.id).await;
        }
        Ok(reconciliation)
    }

    async fn submit(&self, task: PhaseTaskDescriptor) -> Result<(), CoreError> {
        let substrate = Arc::clone(&self.substrate);
        let task = Arc::new(task);
        self.retrying("submit", move || substrate.submit(&task)).await?;
        Ok(())
    }

    async fn abandon(&self, workflow_id: Uuid) {
        let substrate = Arc::clone(&self.substrate);
        if let Err(e) = self.retrying("abandon", move || substrate.abandon(workflow_id)).await {
            warn!("abandon: tasks of {workflow_id} left behind: {e}");
        }
    }

    async fn retrying<T, F>(&self, what: &'static str, op: F) -> Result<T, CoreEngineError>
        where T: Send + 'static,
              F: Fn() -> Result<T, CoreEngineError> + Clone + Send + 'static
    {
        let mut attempt = 1;
        loop {
            let result = tokio::task::spawn_blocking(op.clone())
                .await
                .map_err(|e| CoreEngineError::Internal(format!("{what}: blocking task failed: {e}")))?;
            match result {
                Err(e) if e.is_retryable() && attempt < self.policy.max_attempts() => {
                    let delay = self.policy.backoff(attempt);
                    warn!("{what}: attempt {attempt}/{} failed ({e}); retrying in {delay:?}",
                          self.policy.max_attempts());
                    tokio::time::sleep(delay).await;
                    attempt += 1;
                }
                Err(e) => {
                    debug!("{what}: giving up after {attempt} attempt(s)");
                    return Err(e);
                }
                ok => return ok,
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn backoff_doubles_and_is_capped() {
        let p = RetryPolicy::new(10, Duration::from_millis(100));
        assert_eq!(p.backoff(1), Duration::from_millis(100));
        assert_eq!(p.backoff(2), Duration::from_millis(200));
        assert_eq!(p.backoff(4), Duration::from_millis(800));
        assert_eq!(p.backoff(40), MAX_BACKOFF);
    }

    #[test]
    fn at_least_one_attempt() {
        assert_eq!(RetryPolicy::new(0, Duration::ZERO).max_attempts(), 1);
    }
}
