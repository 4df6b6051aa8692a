use super::context::TerminalContext;
use super::status::TerminalStatus;
use crate::domain::{BatchSummary, ComposeProject, ContainerEngine, StatusSink, UpdateError};
use crate::infra::compose_file::DEFAULT_COMPOSE_FILE;
use crate::infra::{ComposeCli, ComposeFile, DockerCli};
use crate::services::{BatchDriver, BatchOptions, RegistryInspector, Updater};
use anyhow::{Context, Result};
use clap::Args;
use std::sync::Arc;
use tracing::{debug, info};

#[derive(Args, Debug, Clone)]
pub struct UpdateArgs {
    /// Serviços a atualizar (padrão: todos os serviços do arquivo compose)
    #[arg(value_name = "SERVICE")]
    pub services: Vec<String>,

    /// Caminho do arquivo docker-compose
    #[arg(short, long, env = "DC_UPDATE_FILE", default_value = DEFAULT_COMPOSE_FILE)]
    pub file: String,

    /// Serviço a construir antes de atualizar (pode repetir)
    #[arg(short, long = "build", value_name = "SERVICE")]
    pub build: Vec<String>,

    /// Mostra avisos para serviços que não estão rodando
    #[arg(long, env = "DC_UPDATE_SHOW_WARNINGS")]
    pub show_warnings: bool,

    /// Desativa spinners e usa saída em texto simples
    #[arg(short, long, env = "DC_UPDATE_NON_INTERACTIVE")]
    pub non_interactive: bool,
}

impl UpdateArgs {
    fn batch_options(&self) -> BatchOptions {
        BatchOptions {
            services: self.services.clone(),
            build: self.build.clone(),
        }
    }
}

/// Runs one update pass with the real Docker CLI.
///
/// Individual service failures are reported and do not make this fail; only
/// problems that prevent the run from starting do.
pub fn run(args: &UpdateArgs) -> Result<BatchSummary> {
    let cwd = std::env::current_dir().context("lendo diretório atual")?;
    let file = ComposeFile::resolve(&args.file, &cwd)?;
    info!(file = ?file.path(), "usando arquivo compose");

    let engine = Arc::new(DockerCli::new());
    engine.ping().map_err(UpdateError::Unavailable)?;

    let compose = Arc::new(ComposeCli::new(file));
    let context = TerminalContext::detect(args.non_interactive);
    debug!(%context, "contexto do terminal");
    let sink = TerminalStatus::new(context, args.show_warnings);

    run_with(compose, engine, &args.batch_options(), &sink)
}

/// Wires the services together over the given project and engine.
pub fn run_with(
    compose: Arc<dyn ComposeProject>,
    engine: Arc<dyn ContainerEngine>,
    options: &BatchOptions,
    sink: &dyn StatusSink,
) -> Result<BatchSummary> {
    let registry = RegistryInspector::new(engine);
    let updater = Updater::new(compose.clone(), registry);
    let driver = BatchDriver::new(compose, updater);

    Ok(driver.run(options, sink)?)
}
