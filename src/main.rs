//! Benefit Calculator CLI
//!
//! Command-line interface for calculating a single benefit case

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use benefit_calculator::application::{load_case, load_pay_subsidies, BenefitCase};
use benefit_calculator::ledger::export::write_rows_csv_file;
use benefit_calculator::periods::{format_fi, partition};
use benefit_calculator::{CalculationEngine, CalculationOutcome, CalculationStrategy, RuleSet};
use clap::{Args, Parser, Subcommand};

#[derive(Parser, Debug)]
#[command(
    name = "benefit_calculator",
    about = "Calculate Helsinki benefit amounts from case files",
    version
)]
struct Cli {
    /// Directory with pay_subsidy_caps.csv and benefit_limits.csv (built-in rules if omitted)
    #[arg(long, global = true)]
    rules: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Regenerate the ledger of a case and print it
    Calculate(CalculateArgs),
    /// Show how the calculation period splits into sub-ranges
    Partition(PartitionArgs),
}

#[derive(Args, Debug)]
struct CalculateArgs {
    /// Write the ledger rows to this CSV file
    #[arg(long)]
    csv: Option<PathBuf>,
    /// Print the updated case as JSON instead of a table
    #[arg(long)]
    json: bool,
    #[command(flatten)]
    source: CaseSource,
}

#[derive(Args, Debug)]
struct PartitionArgs {
    #[command(flatten)]
    source: CaseSource,
}

#[derive(Args, Debug)]
struct CaseSource {
    /// Case file (JSON with "application" and "calculation")
    case: PathBuf,
    /// Replace the case's pay subsidies with decisions from this CSV file
    #[arg(long)]
    pay_subsidies: Option<PathBuf>,
}

impl CaseSource {
    fn load(&self) -> Result<BenefitCase> {
        let mut case = load_case(&self.case)
            .with_context(|| format!("failed to load case {}", self.case.display()))?;
        if let Some(path) = &self.pay_subsidies {
            case.application.pay_subsidies = load_pay_subsidies(path)
                .with_context(|| format!("failed to load pay subsidies from {}", path.display()))?;
        }
        Ok(case)
    }
}

fn load_rules(path: Option<&Path>) -> Result<RuleSet> {
    match path {
        Some(dir) => RuleSet::from_csv_path(dir)
            .with_context(|| format!("failed to load rules from {}", dir.display())),
        None => Ok(RuleSet::default_2023()),
    }
}

fn calculate(rules: RuleSet, args: CalculateArgs) -> Result<()> {
    let mut case = args.source.load()?;

    let engine = CalculationEngine::with_rules(rules);
    let strategy = CalculationStrategy::select(&case.application, &case.calculation);
    let outcome = engine
        .calculate(&case.application, &mut case.calculation)
        .with_context(|| format!("calculation {} failed", case.calculation.id))?;

    if args.json {
        println!("{}", serde_json::to_string_pretty(&case)?);
    } else {
        println!("Application {} / calculation {}", case.application.id, case.calculation.id);
        println!("  Status:   {}", case.application.status.as_str());
        println!("  Strategy: {}", strategy.name());
        println!();

        match outcome {
            CalculationOutcome::Locked(status) => {
                println!("Calculation locked (status {}); ledger unchanged", status.as_str());
            }
            CalculationOutcome::Incomplete => {
                println!("Calculation incomplete; benefit amount cleared");
            }
            CalculationOutcome::Calculated(_) => {}
        }

        if !case.calculation.rows.is_empty() {
            println!("{:>3} {:<34} {:>12}  {}", "#", "Row type", "Amount", "Description");
            println!("{}", "-".repeat(90));
            for row in &case.calculation.rows {
                let amount = row.amount.map(|a| format!("{:.2}", a)).unwrap_or_default();
                println!(
                    "{:>3} {:<34} {:>12}  {}",
                    row.ordering,
                    row.row_type.as_str(),
                    amount,
                    row.description_fi
                );
            }
            println!();
        }

        match case.calculation.calculated_benefit_amount {
            Some(amount) => println!("Benefit amount: {:.2} EUR", amount),
            None => println!("Benefit amount: -"),
        }
    }

    if let Some(path) = &args.csv {
        write_rows_csv_file(path, &case.calculation.rows)
            .with_context(|| format!("failed to write {}", path.display()))?;
        println!("Ledger written to {}", path.display());
    }
    Ok(())
}

fn show_partition(args: PartitionArgs) -> Result<()> {
    let case = args.source.load()?;
    let (start, end) = case
        .calculation
        .period()
        .context("calculation has no valid start and end date")?;

    let sub_ranges = partition(
        start,
        end,
        &case.application.pay_subsidies,
        &case.application.training_compensations,
    )?;

    println!("{:<10} {:<10} {:>12} {:>14}", "Start", "End", "Subsidy %", "Training EUR");
    println!("{}", "-".repeat(50));
    for range in &sub_ranges {
        let subsidy = range
            .pay_subsidy
            .as_ref()
            .map(|p| p.pay_subsidy_percent.to_string())
            .unwrap_or_else(|| "-".to_string());
        let training = range
            .training_compensation
            .as_ref()
            .map(|t| format!("{:.2}", t.monthly_amount))
            .unwrap_or_else(|| "-".to_string());
        println!(
            "{:<10} {:<10} {:>12} {:>14}",
            format_fi(range.start_date),
            format_fi(range.end_date),
            subsidy,
            training
        );
    }
    Ok(())
}

fn main() -> Result<()> {
    env_logger::init();

    let cli = Cli::parse();
    let rules = load_rules(cli.rules.as_deref())?;

    match cli.command {
        Command::Calculate(args) => calculate(rules, args),
        Command::Partition(args) => show_partition(args),
    }
}
