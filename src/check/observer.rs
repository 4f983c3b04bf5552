use std::time::Duration;

use colored::Colorize;
use rust_decimal::Decimal;

use crate::{check::accumulator::StatsSummary, storage::models::ResultRow, utils};

/// Receives progress events from a batch run
#[cfg_attr(test, mockall::automock)]
pub trait ProgressObserver: Send + Sync {
    /// A record is about to be checked; `index` is 0-based
    fn on_progress(&self, index: usize, total: usize, address: &str);

    fn on_pacing(&self, delay: Duration);

    fn on_outcome(&self, index: usize, row: &ResultRow);

    fn on_summary(&self, summary: &StatsSummary);
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, clap::ValueEnum)]
pub enum SummaryFormat {
    #[default]
    Table,
    Json,
}

/// Prints progress lines and the final summary to stdout
pub struct ConsoleObserver {
    token_symbol: String,
    format: SummaryFormat,
}

impl ConsoleObserver {
    pub fn new(token_symbol: impl Into<String>, format: SummaryFormat) -> Self {
        Self {
            token_symbol: token_symbol.into(),
            format,
        }
    }

    // JSON output keeps stdout machine-readable.
    fn verbose(&self) -> bool {
        self.format == SummaryFormat::Table
    }

    fn print_table(&self, summary: &StatsSummary) {
        let amount = |value: &Decimal| utils::format_amount(value, &self.token_symbol);

        println!("\n{}", "=== Airdrop Check Summary ===".cyan().bold());
        println!("{}", utils::rule(40));
        println!("{}", utils::labeled("Total Addresses", summary.total_addresses));
        println!(
            "{}",
            utils::labeled("Successful", format!("{} ✓", summary.success_count.to_string().green()))
        );
        println!(
            "{}",
            utils::labeled("Failed", format!("{} ✗", summary.fail_count.to_string().red()))
        );
        println!(
            "{}",
            utils::labeled("Success Rate", format!("{:.2}%", summary.success_rate))
        );
        println!("{}", utils::rule(40));
        println!("{}", utils::labeled("Total Amount", amount(&summary.total_amount)));
        println!("{}", utils::labeled("Minimum Amount", amount(&summary.min_amount)));
        println!("{}", utils::labeled("Maximum Amount", amount(&summary.max_amount)));
        println!("{}", utils::labeled("Average Amount", amount(&summary.avg_amount)));
        println!("{}", utils::rule(40));
        println!(
            "{}",
            utils::labeled(
                "Elapsed",
                format!("{:.1}s", summary.elapsed_ms as f64 / 1000.0)
            )
        );
    }
}

impl ProgressObserver for ConsoleObserver {
    fn on_progress(&self, index: usize, total: usize, address: &str) {
        if self.verbose() {
            println!("\n🔍 [{}/{}] Checking address: {}", index + 1, total, address.cyan());
        }
    }

    fn on_pacing(&self, delay: Duration) {
        if self.verbose() {
            println!("⏱️  Waiting {:.1}s...", delay.as_secs_f64());
        }
    }

    fn on_outcome(&self, _index: usize, row: &ResultRow) {
        if !self.verbose() {
            return;
        }

        if row.is_success() {
            println!(
                "{} {} {}",
                "✓".green(),
                "Allocation:".green(),
                utils::format_amount(
                    &row.amount.parse::<Decimal>().unwrap_or_default(),
                    &self.token_symbol
                )
            );
        } else {
            println!("{} {}", "✗ Query failed:".red(), row.error);
        }
    }

    fn on_summary(&self, summary: &StatsSummary) {
        match self.format {
            SummaryFormat::Table => self.print_table(summary),
            SummaryFormat::Json => match serde_json::to_string_pretty(summary) {
                Ok(json) => println!("{}", json),
                Err(e) => tracing::error!("Failed to render summary as JSON: {}", e),
            },
        }
    }
}
