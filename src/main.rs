use anyhow::{Context, Result};
use clap::Parser;
use flightsort::{
    config::{self, FilterOptions},
    export, pipeline,
};
use std::{fs, path::PathBuf};
use tracing::{info, warn};
use tracing_subscriber::{fmt, EnvFilter};

#[derive(Parser)]
#[command(name = "flightsort")]
#[command(about = "Merge flight-billing CSV/ZIP exports, drop excluded rows, export as xlsx")]
struct Args {
    /// Input files (.csv or .zip), processed in the order given
    inputs: Vec<PathBuf>,

    /// Comma-separated codes; rows whose 'MSG Flight' contains any of them are dropped
    #[arg(long, default_value = config::DEFAULT_EXCLUDE_CODES)]
    exclude_codes: String,

    /// Rows whose 'Comment' contains this text are dropped
    #[arg(long, default_value = config::DEFAULT_COMMENT_FILTER)]
    exclude_comment: String,

    /// Abort the run on the first unreadable file instead of skipping it
    #[arg(long)]
    strict: bool,

    /// Output workbook path
    #[arg(short, long, default_value = "filtered_data.xlsx")]
    output: PathBuf,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,
}

fn main() -> Result<()> {
    let args = Args::parse();

    let default_level = if args.verbose { "debug" } else { "info" };
    let env = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("flightsort={}", default_level)));
    fmt::Subscriber::builder().with_env_filter(env).init();

    if args.inputs.is_empty() {
        warn!("no input files given; nothing to do");
        return Ok(());
    }

    let mut sources = Vec::with_capacity(args.inputs.len());
    for path in &args.inputs {
        let data =
            fs::read(path).with_context(|| format!("failed to read {}", path.display()))?;
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_else(|| path.display().to_string());
        sources.push(pipeline::FileSource::new(name, data));
    }

    let opts = FilterOptions {
        exclude_codes: config::parse_code_list(&args.exclude_codes),
        exclude_comment: args.exclude_comment.clone(),
        strict_parsing: args.strict,
    };

    // per-file warnings are logged by the pipeline as they occur
    let outcome = pipeline::process_files(&sources, &opts)?;
    if !outcome.warnings.is_empty() {
        warn!("{} file(s) skipped or unsupported", outcome.warnings.len());
    }

    match outcome.table {
        Some(table) if !table.is_empty() => {
            info!("found {} flights", table.num_rows());
            export::write_xlsx(&table, &args.output)?;
            println!(
                "{} flights written to {}",
                table.num_rows(),
                args.output.display()
            );
        }
        _ => {
            info!("no data found after processing");
            println!("No data found after processing.");
        }
    }

    Ok(())
}
