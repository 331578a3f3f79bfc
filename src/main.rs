//! Incident report pipeline: CSV records in, chart + PDF report out.
//!
//! The run is strictly sequential: load, aggregate, render the chart,
//! then compose the document (the chart is a hard dependency of the
//! document's appendix, so it is always rendered first). Any stage
//! failure aborts the whole run; no partial document is ever left at the
//! report destination.
//!
//! Exit codes:
//!   0 - Success (both artifacts written)
//!   1 - Runtime error (malformed record, render or compose failure)
//!   2 - Usage error
mod aggregate;
mod chart;
mod cli;
mod compose;
mod error;
mod loader;
mod output;
mod pdf;
mod types;
mod util;

use anyhow::{Context, Result};
use cli::Args;
use tracing::{debug, error, info};
use tracing_subscriber::FmtSubscriber;
use util::format_int;

fn main() {
    let args = Args::parse_args();
    if let Err(e) = args.validate() {
        eprintln!("Error: {}", e);
        std::process::exit(2);
    }

    init_logging(&args);
    debug!("arguments: {:?}", args);

    if let Err(e) = run(&args) {
        error!("pipeline failed: {:#}", e);
        eprintln!("Error: {:#}", e);
        std::process::exit(1);
    }
}

fn init_logging(args: &Args) {
    let subscriber = FmtSubscriber::builder()
        .with_max_level(args.log_level())
        .with_target(false)
        .compact()
        .finish();
    tracing::subscriber::set_global_default(subscriber)
        .expect("failed to set tracing subscriber");
}

fn run(args: &Args) -> Result<()> {
    if args.sample && !args.input.exists() {
        loader::write_sample_csv(&args.input)
            .with_context(|| format!("failed to write sample dataset to '{}'", args.input.display()))?;
        println!("{} created.", args.input.display());
    }

    let (header, records) = loader::read_records(&args.input)?;
    info!(
        "loaded {} rows ({} categories, entity column '{}')",
        format_int(records.len() as u64),
        format_int(header.categories.len() as u64),
        header.entity_column
    );

    let agg = aggregate::aggregate(&header, &records)?;
    info!("aggregated {} entities", format_int(agg.entity_count() as u64));

    if !args.quiet {
        output::preview_aggregate(&header, &agg, 10);
        output::print_totals(&agg);
    }

    // The chart must exist before composition: the appendix embeds it.
    chart::render_chart(&agg, &args.chart)?;
    println!("Graph generated: {}", args.chart.display());

    let mut renderer = pdf::PdfRenderer::new()?;
    compose::compose(&agg, &args.chart, &args.report, &mut renderer)?;
    println!("Report generated: {}", args.report.display());

    Ok(())
}
