//! Recalculate every case in a JSON file
//!
//! Outputs one summary line per case, and optionally the updated cases

use std::fs::File;
use std::io::BufWriter;
use std::path::PathBuf;
use std::time::Instant;

use anyhow::{Context, Result};
use benefit_calculator::application::load_cases;
use benefit_calculator::calculator::{BatchRunner, BatchSummary};
use clap::Parser;

#[derive(Parser, Debug)]
#[command(name = "run_batch", about = "Recalculate a batch of benefit cases", version)]
struct Cli {
    /// JSON array of cases
    cases: PathBuf,
    /// Summary CSV output
    #[arg(long, default_value = "batch_results.csv")]
    output: PathBuf,
    /// Write the recalculated cases back out as JSON
    #[arg(long)]
    cases_out: Option<PathBuf>,
    /// Directory with rule CSV files (built-in rules if omitted)
    #[arg(long)]
    rules: Option<PathBuf>,
    /// Run on a single thread
    #[arg(long)]
    sequential: bool,
}

fn main() -> Result<()> {
    env_logger::init();
    let cli = Cli::parse();

    let start = Instant::now();
    println!("Loading cases from {}...", cli.cases.display());
    let mut cases = load_cases(&cli.cases)
        .with_context(|| format!("failed to load cases from {}", cli.cases.display()))?;
    println!("Loaded {} cases in {:?}", cases.len(), start.elapsed());

    let runner = match &cli.rules {
        Some(dir) => BatchRunner::from_csv_path(dir)
            .with_context(|| format!("failed to load rules from {}", dir.display()))?,
        None => BatchRunner::new(),
    };

    println!("Running calculations...");
    let run_start = Instant::now();
    let results = if cli.sequential {
        runner.run_batch(&mut cases)
    } else {
        runner.run_parallel(&mut cases)
    };
    println!("Calculations complete in {:?}", run_start.elapsed());

    let mut writer = csv::Writer::from_path(&cli.output)
        .with_context(|| format!("failed to create {}", cli.output.display()))?;
    for result in &results {
        writer.serialize(result)?;
    }
    writer.flush()?;
    println!("Output written to {}", cli.output.display());

    if let Some(path) = &cli.cases_out {
        let file = File::create(path).with_context(|| format!("failed to create {}", path.display()))?;
        serde_json::to_writer_pretty(BufWriter::new(file), &cases)?;
        println!("Cases written to {}", path.display());
    }

    let summary = BatchSummary::from_results(&results);
    println!("\nBatch Summary:");
    println!("  Calculated: {}", summary.calculated);
    println!("  Incomplete: {}", summary.incomplete);
    println!("  Locked:     {}", summary.locked);
    println!("  Failed:     {}", summary.failed);
    println!("  Total benefit: {:.2} EUR", summary.total_benefit);

    for failed in results.iter().filter(|r| r.is_error()) {
        log::error!(
            "calculation {} ({}): {}",
            failed.calculation_id,
            failed.strategy,
            failed.error.as_deref().unwrap_or_default()
        );
    }

    println!("\nTotal time: {:?}", start.elapsed());
    Ok(())
}
