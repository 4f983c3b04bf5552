use airdrop_checker::check::SummaryFormat;
use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(name = "airdrop-check")]
#[command(about = "Batch airdrop allocation checker with per-address proxies")]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Path to configuration file
    #[arg(short, long, global = true, default_value = "config/default.toml")]
    pub config: String,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Check allocations for every address in the input sheet
    Check {
        /// Input CSV with num,pk,add,proxy columns
        #[arg(short, long)]
        input: Option<String>,

        /// Output CSV for per-address results
        #[arg(short, long)]
        output: Option<String>,

        /// Upper bound of the random delay between requests
        #[arg(long)]
        max_delay_ms: Option<u64>,

        /// Send requests back to back
        #[arg(long)]
        no_pacing: bool,

        /// Only check the first N records
        #[arg(short, long)]
        limit: Option<usize>,

        /// Summary output format
        #[arg(short, long, value_enum, default_value_t = SummaryFormat::Table)]
        format: SummaryFormat,
    },

    /// Normalize a single address and report its width
    Normalize {
        address: String,
    },

    /// Print the resolved configuration
    Config,
}
