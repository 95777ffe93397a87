use clap::Subcommand;
use std::path::PathBuf;

#[derive(Subcommand)]
pub enum Commands {
    /// Tokenize the configured column, one transaction per batch
    Migrate {
        #[arg(long, help = "Config file path")]
        config: PathBuf,

        #[arg(long, help = "Optional .env file read before expanding ${VAR} references")]
        env_file: Option<PathBuf>,

        #[arg(
            long,
            help = "Row offset to start from, overriding migration.start_offset"
        )]
        start_offset: Option<u64>,

        #[arg(long, help = "If specified, writes the JSON run report to this file")]
        report: Option<PathBuf>,

        #[arg(long, help = "Also append log output to this file")]
        log_file: Option<PathBuf>,
    },
    /// Load and validate the config, then print it and the SQL it produces
    Validate {
        #[arg(long, help = "Config file path")]
        config: PathBuf,

        #[arg(long, help = "Optional .env file read before expanding ${VAR} references")]
        env_file: Option<PathBuf>,

        #[arg(long, help = "Print the statements as JSON")]
        json: bool,
    },
    /// Test a connection string against a given format
    TestConn {
        /// Database type: "postgres", "mysql", "mssql", …
        #[arg(long)]
        format: String,

        /// Connection string or address
        #[arg(long)]
        conn_str: String,
    },
    /// Print the number of rows in the configured table
    Count {
        #[arg(long, help = "Config file path")]
        config: PathBuf,

        #[arg(long, help = "Optional .env file read before expanding ${VAR} references")]
        env_file: Option<PathBuf>,
    },
}

impl Commands {
    pub fn log_file(&self) -> Option<&PathBuf> {
        match self {
            Commands::Migrate { log_file, .. } => log_file.as_ref(),
            _ => None,
        }
    }
}
