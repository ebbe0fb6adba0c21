use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};
use rayon::prelude::*;
use std::io::Read;
use std::path::{Path, PathBuf};

use crate::filter::Engine;
use crate::sinks::{CsvSink, DataSink, DocumentRecord, JsonSink, JsonlSink, TableSink};
use crate::utils::ProgressCounter;

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Input HTML files ("-" reads stdin)
    #[arg(required = true)]
    pub inputs: Vec<PathBuf>,

    /// Filter configuration file (YAML or JSON)
    #[arg(short, long, env = "HTMLSIEVE_FILTERS")]
    pub filters: PathBuf,

    /// Output file (.json, .jsonl, .txt, .csv); stdout if omitted or "-"
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Output format (auto-detected from the output extension if omitted)
    #[arg(long, value_enum)]
    pub format: Option<OutputFormat>,

    /// Number of threads (default: all cores)
    #[arg(short, long)]
    pub threads: Option<usize>,

    /// Fail when a document is missing any declared output
    #[arg(long)]
    pub strict: bool,

    /// Enable verbose output
    #[arg(short, long)]
    pub verbose: bool,
}

#[derive(Copy, Clone, PartialEq, Eq, PartialOrd, Ord, ValueEnum, Debug)]
pub enum OutputFormat {
    #[value(name = "json")]
    Json,
    #[value(name = "jsonl", alias = "ndjson")]
    Jsonl,
    #[value(name = "table", alias = "txt")]
    Table,
    #[value(name = "csv")]
    Csv,
}

pub fn output_format_label(format: OutputFormat) -> &'static str {
    match format {
        OutputFormat::Json => "json",
        OutputFormat::Jsonl => "jsonl",
        OutputFormat::Table => "table",
        OutputFormat::Csv => "csv",
    }
}

fn is_stdout(output: Option<&Path>) -> bool {
    output.is_none_or(|path| path == Path::new("-"))
}

/// Explicit `--format`, else the output extension, else JSON Lines.
pub fn resolve_format(format: Option<OutputFormat>, output: Option<&Path>) -> OutputFormat {
    format
        .or_else(|| {
            let ext = output?.extension()?.to_str()?;
            match ext.to_lowercase().as_str() {
                "json" => Some(OutputFormat::Json),
                "jsonl" | "ndjson" => Some(OutputFormat::Jsonl),
                "txt" | "table" => Some(OutputFormat::Table),
                "csv" => Some(OutputFormat::Csv),
                _ => None,
            }
        })
        .unwrap_or(OutputFormat::Jsonl)
}

pub fn init_sink(format: OutputFormat, output: Option<&Path>) -> Result<Box<dyn DataSink>> {
    let label = output_format_label(format);
    if is_stdout(output) {
        tracing::info!("Sink: {} -> stdout", label);
        return Ok(match format {
            OutputFormat::Json => Box::new(JsonSink::stdout()?),
            OutputFormat::Jsonl => Box::new(JsonlSink::stdout()),
            OutputFormat::Table => Box::new(TableSink::stdout()),
            OutputFormat::Csv => Box::new(CsvSink::stdout()),
        });
    }

    let path = output.context("CLI: Missing output path")?;
    tracing::info!("Sink: {} -> {:?}", label, path);
    let sink: Box<dyn DataSink> = match format {
        OutputFormat::Json => Box::new(JsonSink::new(path)?),
        OutputFormat::Jsonl => Box::new(JsonlSink::new(path)?),
        OutputFormat::Table => Box::new(TableSink::new(path)?),
        OutputFormat::Csv => Box::new(CsvSink::new(path)?),
    };
    Ok(sink)
}

/// Read a document as UTF-8, replacing invalid sequences.
pub fn read_input(path: &Path) -> Result<String> {
    let mut bytes = Vec::new();
    if path == Path::new("-") {
        std::io::stdin()
            .lock()
            .read_to_end(&mut bytes)
            .context("Extract: Failed to read stdin")?;
    } else {
        bytes = std::fs::read(path)
            .with_context(|| format!("Extract: Failed to read {}", path.display()))?;
    }
    Ok(String::from_utf8_lossy(&bytes).into_owned())
}

pub fn extract_document(engine: &mut Engine, path: &Path) -> Result<DocumentRecord> {
    let html = read_input(path)?;
    let source = path.display().to_string();

    let captures = engine
        .extract(&html)
        .with_context(|| format!("Extract: Failed on {source}"))?;
    let complete = engine.is_complete();

    if complete {
        tracing::debug!("{}: {} outputs captured", source, captures.len());
    } else {
        tracing::warn!(
            "{}: incomplete, missing {}",
            source,
            engine.missing_outputs().join(", ")
        );
    }

    Ok(DocumentRecord {
        source,
        complete,
        captures,
    })
}

/// Extract every input in parallel. Records come back in input order.
pub fn extract_documents(
    engine: &Engine,
    inputs: &[PathBuf],
    show_progress: bool,
) -> Result<Vec<DocumentRecord>> {
    let progress = show_progress
        .then(|| ProgressCounter::new("Documents", inputs.len() as u64, 1));

    let records = inputs
        .par_iter()
        .map_init(
            || engine.clone(),
            |engine, path| {
                let record = extract_document(engine, path);
                if let Some(progress) = &progress {
                    progress.inc(1);
                }
                record
            },
        )
        .collect::<Result<Vec<_>>>()?;

    if let Some(progress) = &progress {
        progress.finish();
    }
    Ok(records)
}

pub fn write_records(sink: &mut dyn DataSink, records: &[DocumentRecord]) -> Result<()> {
    for record in records {
        sink.add_record(record)?;
    }
    sink.finish().context("Sink: Failed to finalize output")
}
