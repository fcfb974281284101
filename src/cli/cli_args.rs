use clap::{Parser, Subcommand, ValueEnum};

/// frame-dispatch CLI - inspect backends and move tabular data between them
#[derive(Parser, Debug)]
#[command(name = "frame-dispatch")]
#[command(about = "Backend-scoped dispatch for DataFrame and Series objects")]
#[command(version = "0.1.0")]
pub struct CliArgs {
    #[command(subcommand)]
    pub command: Commands,
}

/// Available CLI commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// List registered backends
    Backends {
        /// Show storage format, engine and factory of each backend
        #[arg(short, long)]
        detailed: bool,

        /// Runtime configuration file (JSON)
        #[arg(short, long)]
        config: Option<String>,
    },

    /// List attribute names that cannot be extended
    Reserved,

    /// Load a CSV file into a DataFrame and print it
    Show {
        /// CSV file with a header row
        #[arg(value_name = "FILE")]
        file: String,

        /// Backend to move the frame to before printing
        #[arg(short, long)]
        backend: Option<String>,

        /// Output format
        #[arg(short, long, default_value = "table")]
        format: OutputFormat,

        /// Runtime configuration file (JSON)
        #[arg(short, long)]
        config: Option<String>,
    },
}

/// Output format options
#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    /// Formatted table output
    Table,
    /// JSON output
    Json,
    /// CSV output
    Csv,
}

impl std::fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            OutputFormat::Table => write!(f, "table"),
            OutputFormat::Json => write!(f, "json"),
            OutputFormat::Csv => write!(f, "csv"),
        }
    }
}
