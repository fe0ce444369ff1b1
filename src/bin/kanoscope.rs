//! Kanoscope CLI: review text in, Kano report out.
//!
//! Usage:
//!   kanoscope analyze <file> [--config path] [--format json|table] [--workers N]
//!   kanoscope check-config <path>
//!   kanoscope default-config

use clap::{Parser, Subcommand, ValueEnum};
use kanoscope::ingest::source_for_path;
use kanoscope::{write_table_csv, CancellationToken, ConfigError, Pipeline, PipelineConfig};
use std::path::{Path, PathBuf};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(
    name = "kanoscope",
    version,
    about = "Feedback-to-Kano insight pipeline"
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Analyze a file of reviews (.json array of records, or one review per line)
    Analyze {
        /// Path to the review file
        file: PathBuf,
        /// YAML configuration file
        #[arg(long)]
        config: Option<PathBuf>,
        /// Output format
        #[arg(long, value_enum, default_value_t = OutputFormat::Json)]
        format: OutputFormat,
        /// Extraction worker threads
        #[arg(long, default_value_t = 1)]
        workers: usize,
    },
    /// Validate a YAML configuration file
    CheckConfig {
        /// Path to the configuration file
        path: PathBuf,
    },
    /// Print the default configuration as YAML
    DefaultConfig,
}

#[derive(Clone, Copy, ValueEnum)]
enum OutputFormat {
    /// Full report as pretty JSON
    Json,
    /// Fixed-width table and recommendations
    Table,
    /// Kano table only, as CSV
    Csv,
}

fn init_logging() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

/// `--config`, else the per-user config file when present, else defaults
fn load_config(explicit: Option<&Path>) -> Result<PipelineConfig, ConfigError> {
    if let Some(path) = explicit {
        return PipelineConfig::load(path);
    }
    match PipelineConfig::default_path() {
        Some(path) if path.exists() => PipelineConfig::load(&path),
        _ => Ok(PipelineConfig::default()),
    }
}

fn print_config_error(e: &ConfigError) {
    match e {
        ConfigError::Invalid(errors) => {
            for error in errors {
                eprintln!("Error: {}", error);
            }
        }
        other => eprintln!("Error: {}", other),
    }
}

fn cmd_analyze(file: &Path, config: Option<&Path>, format: OutputFormat, workers: usize) -> i32 {
    let config = match load_config(config) {
        Ok(c) => c,
        Err(e) => {
            print_config_error(&e);
            return 1;
        }
    };
    let pipeline = match Pipeline::new(config) {
        Ok(p) => p,
        Err(e) => {
            eprintln!("Error: {}", e);
            return 1;
        }
    };
    let runtime = match tokio::runtime::Runtime::new() {
        Ok(r) => r,
        Err(e) => {
            eprintln!("Error: failed to start runtime: {}", e);
            return 1;
        }
    };

    let source = source_for_path(file);
    let comments = match runtime.block_on(source.load()) {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Error: {}", e);
            return 1;
        }
    };

    let cancel = CancellationToken::new();
    let on_interrupt = cancel.clone();
    runtime.spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            on_interrupt.cancel();
        }
    });

    let result = if workers > 1 {
        runtime.block_on(pipeline.run_parallel(&comments, workers, &cancel, None))
    } else {
        pipeline.run_with(&comments, None, &cancel)
    };
    let report = match result {
        Ok(r) => r,
        Err(e) => {
            eprintln!("Error: {}", e);
            return 1;
        }
    };

    if !report.status.is_completed() {
        eprintln!("Warning: {}", report.status);
    }

    match format {
        OutputFormat::Json => match serde_json::to_string_pretty(&report) {
            Ok(json) => println!("{}", json),
            Err(e) => {
                eprintln!("Error: failed to serialize report: {}", e);
                return 1;
            }
        },
        OutputFormat::Table => print!("{}", report.to_text()),
        OutputFormat::Csv => {
            if let Err(e) = write_table_csv(&report.table, std::io::stdout().lock()) {
                eprintln!("Error: failed to write CSV: {}", e);
                return 1;
            }
        }
    }
    0
}

fn cmd_check_config(path: &Path) -> i32 {
    match PipelineConfig::load(path) {
        Ok(_) => {
            println!("Configuration '{}' is valid", path.display());
            0
        }
        Err(e) => {
            print_config_error(&e);
            1
        }
    }
}

fn cmd_default_config() -> i32 {
    match PipelineConfig::default().to_yaml_string() {
        Ok(yaml) => {
            print!("{}", yaml);
            0
        }
        Err(e) => {
            eprintln!("Error: {}", e);
            1
        }
    }
}

fn main() {
    init_logging();
    let cli = Cli::parse();
    let code = match cli.command {
        Commands::Analyze {
            file,
            config,
            format,
            workers,
        } => cmd_analyze(&file, config.as_deref(), format, workers),
        Commands::CheckConfig { path } => cmd_check_config(&path),
        Commands::DefaultConfig => cmd_default_config(),
    };
    std::process::exit(code);
}
