use clap::Parser;
use colored::*;
use std::io::Read;
use std::path::Path;
use std::sync::Arc;
use tracing::debug;
use tracing_subscriber::EnvFilter;
use crate::backends::factory_key;
use crate::cli::{CliArgs, Commands, OutputFormat, OutputFormatter};
use crate::engine::{Frame, Runtime, RESERVED_NAMES};
use crate::utils::{
    config::RuntimeConfig,
    types::{Label, Table, Value},
    error::FrameResult,
};

/// Main CLI runner that handles command execution
pub struct CliRunner {
    runtime: Arc<Runtime>,
}

impl CliRunner {
    /// Create a runner from an optional configuration file, honouring
    /// `FRAME_DISPATCH_BACKEND`
    pub fn new(config_path: Option<&str>) -> FrameResult<Self> {
        let config = match config_path {
            Some(path) => RuntimeConfig::from_file(path)?,
            None => RuntimeConfig::default(),
        };
        Ok(Self::from_runtime(Runtime::with_config(config.with_env_overrides())?))
    }

    pub fn from_runtime(runtime: Arc<Runtime>) -> Self {
        Self { runtime }
    }

    pub fn runtime(&self) -> &Arc<Runtime> {
        &self.runtime
    }

    /// List registered backends
    pub fn list_backends(&self, detailed: bool) -> String {
        let backends = self.runtime.backends();
        let choices = backends.choices();

        if choices.is_empty() {
            return OutputFormatter::format_info("No backends are currently registered.");
        }

        let mut output = String::new();
        output.push_str(&format!("{}\n", "Available Backends:".bold()));

        for name in &choices {
            let marker = if name == self.runtime.default_backend() { " (default)" } else { "" };
            output.push_str(&format!("  {} {}{}\n", "•".green(), name.cyan().bold(), marker.dimmed()));

            if !detailed {
                continue;
            }
            match backends.execution_for(name) {
                Some(execution) => {
                    let key = factory_key(&execution);
                    let registered = self.runtime.factories().contains(&execution);
                    output.push_str(&format!("    Storage Format: {}\n", execution.storage_format));
                    output.push_str(&format!("    Engine: {}\n", execution.engine));
                    output.push_str(&format!(
                        "    Factory: {} {}\n",
                        key,
                        if registered { "(registered)".green() } else { "(missing)".red() }
                    ));
                }
                None => output.push_str(&format!("    {}\n", "unbound".red())),
            }
        }

        output
    }

    /// List attribute names that cannot be extended
    pub fn list_reserved(&self) -> String {
        let mut output = String::new();
        output.push_str(&format!("{}\n", "Reserved Names:".bold()));
        for name in RESERVED_NAMES {
            output.push_str(&format!("  {} {}\n", "•".yellow(), name));
        }
        output
    }

    /// Load a CSV file as a DataFrame on the default backend
    pub fn load_csv(&self, path: impl AsRef<Path>) -> FrameResult<Frame> {
        let path = path.as_ref();
        debug!(path = %path.display(), "loading CSV");
        let file = std::fs::File::open(path)?;
        self.runtime.dataframe(read_csv_table(file)?)
    }

    /// Load a CSV file, optionally move it to `backend`, and format it
    pub fn show(&self, path: impl AsRef<Path>, backend: Option<&str>, format: OutputFormat) -> FrameResult<String> {
        let frame = self.load_csv(path)?;
        let frame = match backend {
            Some(backend) => frame.set_backend(backend)?,
            None => frame,
        };
        OutputFormatter::format_frame(&frame, format)
    }
}

/// Parse CSV with a header row into a table. Cells are typed as integer,
/// float or boolean when they parse as one; empty cells become null.
pub fn read_csv_table(reader: impl Read) -> FrameResult<Table> {
    let mut csv_reader = csv::ReaderBuilder::new().has_headers(true).from_reader(reader);
    let columns: Vec<Label> = csv_reader.headers()?.iter().map(Label::from).collect();

    let mut rows: Vec<Vec<Value>> = Vec::new();
    for record in csv_reader.records() {
        rows.push(record?.iter().map(parse_field).collect());
    }
    Table::from_rows(columns, rows)
}

fn parse_field(field: &str) -> Value {
    let trimmed = field.trim();
    if trimmed.is_empty() {
        Value::Null
    } else if let Ok(i) = trimmed.parse::<i64>() {
        Value::Integer(i)
    } else if let Ok(f) = trimmed.parse::<f64>() {
        Value::Float(f)
    } else if let Ok(b) = trimmed.parse::<bool>() {
        Value::Boolean(b)
    } else {
        Value::Text(field.to_string())
    }
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

fn build_runner(config: Option<&str>) -> CliRunner {
    match CliRunner::new(config) {
        Ok(runner) => runner,
        Err(e) => {
            eprintln!("{}", OutputFormatter::format_error(&e));
            std::process::exit(1);
        }
    }
}

/// Main entry point for CLI execution
pub fn run_cli() -> anyhow::Result<()> {
    let args = CliArgs::parse();
    init_tracing();

    match args.command {
        Commands::Backends { detailed, config } => {
            let runner = build_runner(config.as_deref());
            println!("{}", runner.list_backends(detailed));
        }

        Commands::Reserved => {
            let runner = CliRunner::from_runtime(Runtime::new());
            println!("{}", runner.list_reserved());
        }

        Commands::Show { file, backend, format, config } => {
            let runner = build_runner(config.as_deref());
            match runner.show(&file, backend.as_deref(), format) {
                Ok(output) => println!("{}", output),
                Err(e) => {
                    eprintln!("{}", OutputFormatter::format_error(&e));
                    std::process::exit(1);
                }
            }
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_field_types() {
        assert_eq!(parse_field("42"), Value::Integer(42));
        assert_eq!(parse_field("1.5"), Value::Float(1.5));
        assert_eq!(parse_field("true"), Value::Boolean(true));
        assert_eq!(parse_field(""), Value::Null);
        assert_eq!(parse_field("abc"), Value::from("abc"));
    }

    #[test]
    fn test_read_csv_table() {
        let data = "a,b\n1,x\n2,\n";
        let table = read_csv_table(data.as_bytes()).unwrap();

        assert_eq!(table.columns, vec![Label::from("a"), Label::from("b")]);
        assert_eq!(table.num_rows(), 2);
        assert_eq!(table.row(1), vec![Value::Integer(2), Value::Null]);
    }

    #[test]
    fn test_read_csv_ragged_rows_fail() {
        assert!(read_csv_table("a,b\n1\n".as_bytes()).is_err());
    }

    #[test]
    fn test_list_backends_marks_default() {
        let runner = CliRunner::from_runtime(Runtime::new());
        let output = runner.list_backends(true);

        assert!(output.contains("Columnar"));
        assert!(output.contains("Native"));
        assert!(output.contains("(default)"));
        assert!(output.contains("ColumnsOnNativeFactory"));
        assert!(output.contains("RowsOnNativeFactory"));
    }

    #[test]
    fn test_list_reserved() {
        let runner = CliRunner::from_runtime(Runtime::new());
        let output = runner.list_reserved();
        for name in RESERVED_NAMES {
            assert!(output.contains(name));
        }
    }
}
