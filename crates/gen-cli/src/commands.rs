//! Implementación de los subcomandos sobre `genflow_rust::Dispatcher`.
use std::path::Path;
use std::sync::Arc;

use gen_adapters::{LoggingListener, RecordingSubstrate, StaticOutcomeLookup};
use gen_core::{HandleOutcome, InMemoryWorkflowStore, Observation, Orchestrator, PhaseTaskDescriptor, Reconciliation,
               StatusUpdate, WorkflowStore};
use gen_domain::{RuntimeConfig, WorkflowRecord};
use gen_persistence::DbConfig;
use genflow_rust::{AppConfig, CoreError, Dispatcher, DomainError, Inbound};
use serde::Serialize;

use crate::Commands;

/// Salida de los subcomandos que mueven un registro.
#[derive(Serialize)]
struct Report<'a> {
    outcome: String,
    record: Option<&'a WorkflowRecord>,
    submitted: Vec<PhaseTaskDescriptor>,
}

pub(crate) async fn run(outcomes: Option<&Path>, command: Commands) -> Result<(), CoreError> {
    let config = AppConfig::from_env()?;
    let lookup = match outcomes {
        Some(path) => StaticOutcomeLookup::from_json_file(path)?,
        None => StaticOutcomeLookup::new(),
    };
    if DbConfig::is_configured() {
        let store = tokio::task::spawn_blocking(gen_persistence::store_from_env)
            .await
            .map_err(|e| CoreError::Internal(format!("store setup failed: {e}")))??;
        execute(store, lookup, &config, command).await
    } else {
        tracing::info!("DATABASE_URL not set; using an in-memory store");
        execute(InMemoryWorkflowStore::new(), lookup, &config, command).await
    }
}

async fn execute<S: WorkflowStore + 'static>(store: S,
                                             lookup: StaticOutcomeLookup,
                                             config: &AppConfig,
                                             command: Commands)
                                             -> Result<(), CoreError> {
    let substrate = Arc::new(RecordingSubstrate::new());
    let orchestrator = Orchestrator::builder(store, Arc::new(lookup)).reconciler(config.reconciler())
                                                                     .listener(Arc::new(LoggingListener))
                                                                     .build();
    let dispatcher = Dispatcher::new(Arc::new(orchestrator), substrate.clone(), config.retry_policy());

    match command {
        Commands::Handle { kind, file } => {
            let payload = read_file(&file)?;
            let outcome = dispatcher.handle(Inbound::new(kind, payload)).await?;
            print_report(describe(&outcome), outcome.record(), &substrate)
        }
        Commands::Resolve { id, file } => {
            let raw = read_file(&file)?;
            let runtime: RuntimeConfig = serde_json::from_str(&raw)
                .map_err(|e| DomainError::Validation(format!("{}: {e}", file.display())))?;
            let r = dispatcher.resolve_config(id, runtime).await?;
            print_report(transition(&r), Some(&r.record), &substrate)
        }
        Commands::Observe { id, phase, status, reason } => {
            let update = StatusUpdate::new(status.into(), reason);
            let r = dispatcher.observe(id, Observation::from_status_update(phase, &update)).await?;
            print_report(transition(&r), Some(&r.record), &substrate)
        }
        Commands::Show { id } => {
            let record = dispatcher.orchestrator()
                                   .read(id)?
                                   .ok_or_else(|| DomainError::NotFound(format!("workflow {id}")))?;
            print_json(&record)
        }
        Commands::List { kind, status } => print_json(&dispatcher.orchestrator().list(kind, status)?),
    }
}

fn read_file(path: &Path) -> Result<String, CoreError> {
    Ok(std::fs::read_to_string(path)?)
}

fn describe(outcome: &HandleOutcome) -> String {
    match outcome {
        HandleOutcome::Created { .. } => "created".into(),
        HandleOutcome::Resumed { .. } => "resumed".into(),
        HandleOutcome::Failed { .. } => "failed".into(),
        HandleOutcome::Duplicate { kind, identifier } => format!("duplicate of active {kind} '{identifier}'"),
        HandleOutcome::Dropped(reason) => format!("dropped: {reason}"),
    }
}

fn transition(r: &Reconciliation) -> String {
    if r.changed {
        format!("moved to {}", r.record.status)
    } else {
        format!("unchanged ({})", r.record.status)
    }
}

fn print_report(outcome: String, record: Option<&WorkflowRecord>, substrate: &RecordingSubstrate) -> Result<(), CoreError> {
    print_json(&Report { outcome,
                         record,
                         submitted: substrate.submitted() })
}

fn print_json<T: Serialize + ?Sized>(value: &T) -> Result<(), CoreError> {
    let rendered = serde_json::to_string_pretty(value).map_err(|e| CoreError::Internal(e.to_string()))?;
    println!("{rendered}");
    Ok(())
}
