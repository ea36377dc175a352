use anyhow::Context;
use anyhow::Result;
use barcode_ranges::BarcodeError;
use barcode_ranges::BarcodeService;
use barcode_ranges::Config;
use barcode_ranges::ErrorResponse;
use barcode_ranges::StorageConfig;
use barcode_ranges::ValidateRequest;
use clap::Parser;
use clap::Subcommand;
use serde::Serialize;
use std::path::PathBuf;
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;

#[derive(Debug, Parser)]
#[command(name = "barcode-ranges")]
#[command(about = "Import barcode range spreadsheets and validate scanned serial numbers.")]
struct Cli {
    /// JSON configuration file. Without it, `BARCODE_*` environment variables are read.
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Range database: a DuckDB file path, `:memory:` for in-memory DuckDB, or `memory`.
    #[arg(long, global = true)]
    database: Option<String>,

    /// Glob selecting the sheet to import (first sheet by default).
    #[arg(long, global = true)]
    sheet: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Replace the range table with the rows of a workbook.
    Import {
        /// Local path or remote URL of an `.xlsx` workbook
        file: String,
    },
    /// Check a serial number against the imported ranges.
    Validate {
        #[arg(long)]
        customer_id: String,
        #[arg(long)]
        po_number: String,
        #[arg(long)]
        item_code: String,
        #[arg(long)]
        serial_number: String,
    },
    /// Print every stored range record.
    List,
}

fn main() -> Result<ExitCode> {
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let cli = Cli::parse();
    let config = load_config(&cli)?;
    let service = match BarcodeService::from_config(&config) {
        Ok(service) => service,
        Err(e) => return report(&e),
    };

    let outcome = run(&service, cli.command);
    let closed = service.close();
    match outcome.and(closed) {
        Ok(()) => Ok(ExitCode::SUCCESS),
        Err(e) => report(&e),
    }
}

fn load_config(cli: &Cli) -> Result<Config> {
    let mut config = match &cli.config {
        Some(path) => Config::from_file(path).with_context(|| format!("failed to load {}", path.display()))?,
        None => Config::from_env().context("failed to read BARCODE_* environment")?,
    };
    if let Some(database) = &cli.database {
        config.storage = StorageConfig::parse(database);
    }
    if let Some(sheet) = &cli.sheet {
        config.sheet = Some(sheet.to_owned());
    }
    Ok(config)
}

fn run(service: &BarcodeService, command: Command) -> Result<(), BarcodeError> {
    match command {
        Command::Import { file } => print_json(&service.import_file(&file)?),
        Command::Validate {
            customer_id,
            po_number,
            item_code,
            serial_number,
        } => {
            let request = ValidateRequest::new(&customer_id, &po_number, &item_code, &serial_number);
            print_json(&service.validate(&request)?)
        }
        Command::List => print_json(&service.barcodes()?),
    }
}

fn print_json<T: Serialize>(value: &T) -> Result<(), BarcodeError> {
    let json = serde_json::to_string_pretty(value).map_err(std::io::Error::from)?;
    println!("{json}");
    Ok(())
}

/// Prints the client-facing failure on stderr.
fn report(error: &BarcodeError) -> Result<ExitCode> {
    let response = ErrorResponse::from(error);
    eprintln!("{}", serde_json::to_string(&response)?);
    Ok(ExitCode::FAILURE)
}
