use crate::{commands::Commands, error::CliError};
use clap::Parser;
use engine_config::{env::EnvManager, settings::Settings};
use engine_runtime::execution::executor::{self, MigrationExecutor};
use planner::query::generator::QueryGenerator;
use std::{
    fs::OpenOptions,
    path::{Path, PathBuf},
    process::ExitCode,
    sync::Mutex,
};
use tracing::{error, info};
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

mod commands;
mod conn;
mod error;
mod output;

#[derive(Parser)]
#[command(
    name = "cardtok",
    version = "0.1.0",
    about = "Replaces stored card numbers with tokens, batch by batch"
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    if let Err(err) = init_tracing(cli.command.log_file().map(PathBuf::as_path)) {
        eprintln!("{err}");
        return ExitCode::FAILURE;
    }

    match run(cli.command).await {
        Ok(code) => code,
        Err(err) => {
            error!(error = %err, "Command failed");
            ExitCode::FAILURE
        }
    }
}

async fn run(command: Commands) -> Result<ExitCode, CliError> {
    match command {
        Commands::Migrate {
            config,
            env_file,
            start_offset,
            report,
            log_file: _,
        } => {
            let settings = load_settings(&config, env_file.as_deref())?;
            let orchestrator = MigrationExecutor::new(settings)
                .with_start_offset(start_offset)
                .prepare()
                .await?;

            let (run_report, code) = match orchestrator.run().await {
                Ok(run_report) => (run_report, ExitCode::SUCCESS),
                Err(failed) => (failed.report, ExitCode::FAILURE),
            };

            output::print_report(&run_report);
            if let Some(path) = report {
                output::write_report(&run_report, &path)?;
                info!(path = %path.display(), "Run report written");
            }
            Ok(code)
        }
        Commands::Validate {
            config,
            env_file,
            json,
        } => {
            let settings = load_settings(&config, env_file.as_deref())?;
            let kind = settings.database.kind()?;
            let target = settings.target()?;
            let queries = QueryGenerator::new(kind.dialect());

            println!("{settings:#?}");
            let statements = [
                ("count", queries.count(target.table())?),
                ("select", queries.select_page(&target, 0, target.batch_size())?),
                ("update", queries.update_target(&target)?),
            ];
            output::print_statements(&statements, json)?;
            info!(kind = %kind, table = target.table(), "Configuration is valid");
            Ok(ExitCode::SUCCESS)
        }
        Commands::TestConn { format, conn_str } => {
            conn::ping(&format, &conn_str).await?;
            Ok(ExitCode::SUCCESS)
        }
        Commands::Count { config, env_file } => {
            let settings = load_settings(&config, env_file.as_deref())?;
            let count = executor::count_rows(&settings).await?;
            println!("{count}");
            Ok(ExitCode::SUCCESS)
        }
    }
}

fn load_settings(config: &Path, env_file: Option<&Path>) -> Result<Settings, CliError> {
    let mut env = EnvManager::from_system();
    if let Some(path) = env_file {
        env.load_from_file(path)?;
    }
    Ok(Settings::load(config, &env)?)
}

/// Logs go to stderr, and to `log_file` in append mode when given.
/// `RUST_LOG` overrides the default `info` level.
fn init_tracing(log_file: Option<&Path>) -> Result<(), CliError> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    let file_layer = match log_file {
        Some(path) => {
            let file = OpenOptions::new()
                .create(true)
                .append(true)
                .open(path)
                .map_err(|source| CliError::LogFile {
                    path: path.to_path_buf(),
                    source,
                })?;
            Some(fmt::layer().with_ansi(false).with_writer(Mutex::new(file)))
        }
        None => None,
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(file_layer)
        .init();
    Ok(())
}
