//! Demo en memoria: recibe un lote de notificaciones, resuelve la
//! configuración del build y conduce ambos flujos hasta FINISHED.
use std::sync::Arc;

use gen_adapters::{LoggingListener, RecordingSubstrate, StaticOutcomeLookup};
use gen_core::{HandleOutcome, InMemoryWorkflowStore, Observation, Orchestrator, Phase};
use gen_domain::{BuildConfig, GeneratorConfig, GeneratorType, OperationResult, ProductConfig, RuntimeConfig,
                 WorkflowKind, CONFIG_API_VERSION};
use genflow_rust::{AppConfig, CoreError, Dispatcher, Inbound};
use tracing_subscriber::EnvFilter;

const BUILD: &str = r#"{"build":{"id":"B1","status":"SUCCESS","progress":"FINISHED","temporaryBuild":false,
                       "buildConfigRevision":{"buildType":"MVN"}}}"#;
const TEMPORARY_BUILD: &str = r#"{"build":{"id":"B2","status":"SUCCESS","progress":"FINISHED","temporaryBuild":true,
                                 "buildConfigRevision":{"buildType":"MVN"}}}"#;
const OPERATION: &str = r#"{"operationId":"O1","status":"FINISHED","deliverablesUrls":["http://x/a.zip"]}"#;
const FAILED_OPERATION: &str = r#"{"operationId":"O2","status":"FINISHED","deliverablesUrls":[]}"#;

#[tokio::main]
async fn main() -> Result<(), CoreError> {
    tracing_subscriber::fmt().with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
                             .init();

    let config = AppConfig::from_env()?;
    let lookup = StaticOutcomeLookup::new().with("O1", OperationResult::Successful)
                                           .with("O2", OperationResult::Failed);
    let orchestrator = Orchestrator::builder(InMemoryWorkflowStore::new(), Arc::new(lookup)).reconciler(config.reconciler())
                                                                                            .listener(Arc::new(LoggingListener))
                                                                                            .build();
    let substrate = Arc::new(RecordingSubstrate::new());
    let dispatcher = Dispatcher::new(Arc::new(orchestrator), substrate.clone(), config.retry_policy());

    let batch = vec![Inbound::new(WorkflowKind::Build, BUILD),
                     Inbound::new(WorkflowKind::Build, BUILD),
                     Inbound::new(WorkflowKind::Build, TEMPORARY_BUILD),
                     Inbound::new(WorkflowKind::Operation, OPERATION),
                     Inbound::new(WorkflowKind::Operation, FAILED_OPERATION)];
    let mut tracked = Vec::new();
    for result in dispatcher.handle_batch(batch).await {
        match result {
            Ok(HandleOutcome::Created { record, .. }) => tracked.push(record),
            Ok(other) => tracing::info!("message not tracked: {other:?}"),
            Err(e) => tracing::warn!("message rejected: {e}"),
        }
    }

    for record in &tracked {
        if record.kind == WorkflowKind::Build {
            let build = BuildConfig { api_version: CONFIG_API_VERSION.to_string(),
                                      build_id: record.identifier.clone(),
                                      products: vec![ProductConfig { processors: vec![],
                                                                     generator: GeneratorConfig::of(GeneratorType::MavenCyclonedx) }] };
            dispatcher.resolve_config(record.id, RuntimeConfig::Build(build)).await?;
        }
        for phase in Phase::ALL {
            dispatcher.observe(record.id, Observation::TaskSucceeded(phase)).await?;
        }
    }

    let records = dispatcher.orchestrator().list(None, None)?;
    let rendered = serde_json::to_string_pretty(&records).map_err(|e| CoreError::Internal(e.to_string()))?;
    println!("{rendered}");
    tracing::info!("tasks submitted: {}, abandoned: {}",
                   substrate.submitted().len(),
                   substrate.abandoned().len());
    Ok(())
}
