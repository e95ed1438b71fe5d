mod commands;
mod input;
mod output;

use clap::{Parser, Subcommand, ValueEnum};
use colored::Colorize;
use std::process;

use commands::effective_cost::{AnnualArgs, ComputeArgs, MonthlyArgs};

/// Effective total cost (CET) of fixed-installment loans
#[derive(Parser)]
#[command(
    name = "ecost",
    version,
    about = "Effective total cost (CET) of fixed-installment loans",
    long_about = "Computes the effective total cost of a loan: the rate that discounts \
                  a stream of fixed installments back to the principal actually released \
                  to the borrower. Supports the periodic (monthly) rate and the annual \
                  rate over actual calendar days (ACT/365)."
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Output format
    #[arg(long, default_value = "json", global = true)]
    output: OutputFormat,
}

#[derive(Subcommand)]
enum Commands {
    /// Monthly effective cost from principal, installment and count
    Monthly(MonthlyArgs),
    /// Annual effective cost over actual days (ACT/365)
    Annual(AnnualArgs),
    /// Full report: monthly and annual rates, schedule and warnings
    Compute(ComputeArgs),
    /// Print version information
    Version,
}

#[derive(Debug, Clone, ValueEnum)]
pub enum OutputFormat {
    Json,
    Table,
    Csv,
    Minimal,
}

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();
    let cli = Cli::parse();

    let result: Result<serde_json::Value, Box<dyn std::error::Error>> = match cli.command {
        Commands::Monthly(args) => commands::effective_cost::run_monthly(args),
        Commands::Annual(args) => commands::effective_cost::run_annual(args),
        Commands::Compute(args) => commands::effective_cost::run_compute(args),
        Commands::Version => {
            println!("ecost {}", env!("CARGO_PKG_VERSION"));
            return;
        }
    };

    match result {
        Ok(value) => {
            output::format_output(&cli.output, &value);
            process::exit(0);
        }
        Err(e) => {
            eprintln!("{}: {}", "error".red().bold(), e);
            process::exit(1);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_monthly() {
        let cli = Cli::try_parse_from([
            "ecost", "monthly", "--principal", "9000", "--installment", "1000", "--count", "10",
        ])
        .unwrap();
        let Commands::Monthly(args) = cli.command else {
            panic!("expected monthly");
        };
        let value = commands::effective_cost::run_monthly(args).unwrap();
        assert_eq!(value["result"]["rate"], serde_json::json!("1.963"));
    }

    #[test]
    fn test_run_rejects_degenerate_inputs() {
        let huge = Cli::try_parse_from([
            "ecost", "annual", "--principal", "9000", "--installment", "1000", "--count",
            "4294967295", "--contract-date", "2024-01-01", "--first-installment-date", "2024-01-31",
        ])
        .unwrap();
        let Commands::Annual(args) = huge.command else {
            panic!("expected annual");
        };
        let err = commands::effective_cost::run_annual(args).unwrap_err();
        assert!(err.to_string().contains("installment_count"), "{err}");

        let zero_step = Cli::try_parse_from([
            "ecost", "monthly", "--principal", "9000", "--installment", "1000", "--count", "10",
            "--step", "0",
        ])
        .unwrap();
        let Commands::Monthly(args) = zero_step.command else {
            panic!("expected monthly");
        };
        let err = commands::effective_cost::run_monthly(args).unwrap_err();
        assert!(err.to_string().contains("solver.step"), "{err}");
    }

    #[test]
    fn test_parse_annual_dates() {
        let cli = Cli::try_parse_from([
            "ecost",
            "annual",
            "--principal",
            "9000",
            "--installment",
            "1000",
            "--count",
            "10",
            "--contract-date",
            "2024-01-01",
            "--first-installment-date",
            "2024-02-15",
            "--output",
            "minimal",
        ])
        .unwrap();
        assert!(matches!(cli.output, OutputFormat::Minimal));
        let Commands::Annual(args) = cli.command else {
            panic!("expected annual");
        };
        let value = commands::effective_cost::run_annual(args).unwrap();
        assert_eq!(value["result"]["rate"], serde_json::json!("23.960"));
    }

    #[test]
    fn test_compute_requires_both_dates() {
        let parsed = Cli::try_parse_from([
            "ecost",
            "compute",
            "--principal",
            "9000",
            "--contract-date",
            "2024-01-01",
        ]);
        assert!(parsed.is_err());
    }

    #[test]
    fn test_monthly_rejects_zero_count() {
        let cli = Cli::try_parse_from([
            "ecost", "monthly", "--principal", "9000", "--installment", "1000", "--count", "0",
        ])
        .unwrap();
        let Commands::Monthly(args) = cli.command else {
            panic!("expected monthly");
        };
        let err = commands::effective_cost::run_monthly(args).unwrap_err();
        assert!(err.to_string().contains("installment_count"));
    }
}
