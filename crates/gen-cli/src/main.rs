//! genflow CLI: alimenta el orquestador a mano desde la terminal.
//!
//! Usa Postgres cuando `DATABASE_URL` está definida y un store en memoria
//! en otro caso (útil sólo para `handle`).

mod commands;

use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};
use gen_core::{EventStatus, Phase};
use gen_domain::{GenerationStatus, WorkflowKind};
use uuid::Uuid;

/// genflow CLI: solicitudes de generación de SBOM
#[derive(Parser)]
#[command(name = "genflow", version, about = "genflow CLI: solicitudes de generación de SBOM")]
pub struct Cli {
    /// JSON `{ "<operationId>": "SUCCESSFUL" | "FAILED" | ... }` con los
    /// resultados de operaciones conocidos
    #[arg(long, env = "GENFLOW_OUTCOMES_FILE")]
    outcomes: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
pub(crate) enum Commands {
    /// Procesa una notificación de build u operación
    Handle {
        #[arg(long)]
        kind: WorkflowKind,
        /// Archivo con el payload JSON
        #[arg(long)]
        file: PathBuf,
    },

    /// Entrega la configuración resuelta de un build
    Resolve {
        #[arg(long)]
        id: Uuid,
        /// Archivo con la configuración JSON (`type: "build"`)
        #[arg(long)]
        file: PathBuf,
    },

    /// Reporta el estado de una fase
    Observe {
        #[arg(long)]
        id: Uuid,
        #[arg(long)]
        phase: Phase,
        #[arg(long, value_enum)]
        status: StatusArg,
        #[arg(long, default_value = "")]
        reason: String,
    },

    /// Muestra un registro
    Show {
        #[arg(long)]
        id: Uuid,
    },

    /// Lista registros, opcionalmente filtrados
    List {
        #[arg(long)]
        kind: Option<WorkflowKind>,
        #[arg(long)]
        status: Option<GenerationStatus>,
    },
}

#[derive(Clone, Copy, ValueEnum)]
pub(crate) enum StatusArg {
    New,
    Processing,
    Success,
    Error,
    Failed,
}

impl From<StatusArg> for EventStatus {
    fn from(s: StatusArg) -> Self {
        match s {
            StatusArg::New => EventStatus::New,
            StatusArg::Processing => EventStatus::Processing,
            StatusArg::Success => EventStatus::Success,
            StatusArg::Error => EventStatus::Error,
            StatusArg::Failed => EventStatus::Failed,
        }
    }
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "gen_core=info,gen_persistence=warn,genflow_rust=info,gen_cli=info".into()),
        )
        .with_writer(std::io::stderr)
        .init();

    if let Err(e) = commands::run(cli.outcomes.as_deref(), cli.command).await {
        tracing::error!("{e}");
        std::process::exit(1);
    }
}
