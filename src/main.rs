use anyhow::{Context, Result};
use clap::Parser;

use htmlsieve::app::{Cli, extract_documents, init_sink, resolve_format, write_records};
use htmlsieve::config::FiltersConfig;

fn main() -> Result<()> {
    let cli = Cli::parse();

    let level = if cli.verbose {
        tracing::Level::INFO
    } else {
        tracing::Level::WARN
    };

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::builder()
                .with_default_directive(level.into())
                .from_env_lossy(),
        )
        .with_writer(std::io::stderr)
        .init();

    if let Some(threads) = cli.threads {
        rayon::ThreadPoolBuilder::new()
            .num_threads(threads)
            .build_global()
            .context("CLI: Failed to initialize thread pool")?;
    }

    let filters = FiltersConfig::load(&cli.filters)
        .with_context(|| format!("Config: Failed to load {}", cli.filters.display()))?;
    let engine = filters
        .compile()
        .with_context(|| format!("Config: Failed to compile {}", cli.filters.display()))?;

    tracing::info!(
        "Filters: {} element filters, {} text filters, outputs: {}",
        engine.program().element_count(),
        engine.program().text_count(),
        engine.program().outputs().join(", ")
    );

    let format = resolve_format(cli.format, cli.output.as_deref());
    let mut sink = init_sink(format, cli.output.as_deref())?;

    let start = std::time::Instant::now();
    let records = extract_documents(&engine, &cli.inputs, cli.verbose)?;
    write_records(sink.as_mut(), &records)?;

    let incomplete = records.iter().filter(|r| !r.complete).count();
    tracing::info!(
        "Done! Extracted {} documents ({} incomplete) in {:.2}s",
        records.len(),
        incomplete,
        start.elapsed().as_secs_f64()
    );

    if cli.strict && incomplete > 0 {
        anyhow::bail!("Extract: {} of {} documents are incomplete", incomplete, records.len());
    }

    Ok(())
}
