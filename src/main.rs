mod cli;

use airdrop_checker::{
    airdrop::{AddressNormalizer, AirdropQueryService},
    check::{BatchChecker, ConsoleObserver, PacingController, SummaryFormat},
    config::{Config, LoggingConfig},
    error::{self, CheckerError},
    storage,
    transport::ReqwestBinder,
    utils,
};
use clap::Parser;
use cli::{Cli, Commands};
use colored::*;
use tracing::{error, warn, Subscriber};
use tracing_subscriber::{fmt, fmt::MakeWriter, util::SubscriberInitExt, EnvFilter};

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    let config = match Config::load(&cli.config) {
        Ok(cfg) => cfg,
        Err(e) => {
            init_tracing(&LoggingConfig::default());
            error!("Failed to load configuration: {}", e);
            std::process::exit(1);
        }
    };

    init_tracing(&config.logging);

    let result = match cli.command {
        Commands::Check {
            input,
            output,
            max_delay_ms,
            no_pacing,
            limit,
            format,
        } => {
            let options = CheckOptions {
                input,
                output,
                max_delay_ms,
                no_pacing,
                limit,
                format,
            };
            run_check(&config, options).await
        }

        Commands::Normalize { address } => normalize_address(&config, &address),

        Commands::Config => show_config(&config),
    };

    if let Err(e) = result {
        error!("{}", format!("Error: {}", e).red());
        std::process::exit(e.exit_code());
    }
}

/// Logs go to stderr so stdout only carries command output
fn init_tracing(config: &LoggingConfig) {
    if let Err(e) = log_subscriber(config, std::io::stderr).try_init() {
        eprintln!("Failed to initialize logging: {}", e);
    }
}

fn log_subscriber<W>(config: &LoggingConfig, writer: W) -> Box<dyn Subscriber + Send + Sync>
where
    W: for<'w> MakeWriter<'w> + Send + Sync + 'static,
{
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&config.level))
        .unwrap_or_else(|_| EnvFilter::new("info"));

    if config.json {
        Box::new(
            fmt()
                .with_env_filter(filter)
                .with_writer(writer)
                .json()
                .with_current_span(false)
                .with_span_list(false)
                .finish(),
        )
    } else {
        Box::new(fmt().with_env_filter(filter).with_writer(writer).finish())
    }
}

struct CheckOptions {
    input: Option<String>,
    output: Option<String>,
    max_delay_ms: Option<u64>,
    no_pacing: bool,
    limit: Option<usize>,
    format: SummaryFormat,
}

async fn run_check(config: &Config, options: CheckOptions) -> error::Result<()> {
    let input = options
        .input
        .unwrap_or_else(|| config.io.input_path.clone());
    let output = options
        .output
        .unwrap_or_else(|| config.io.output_path.clone());
    let verbose = options.format == SummaryFormat::Table;

    if verbose {
        println!("{}", "🚀 Starting airdrop allocation check...".cyan());
    }

    let records = storage::load_records(&input)?;
    let records = storage::limit_records(records, options.limit, &input)?;

    if verbose {
        println!("📊 Loaded {} records from {}", records.len(), input);
    }

    let pacing = if options.no_pacing {
        PacingController::disabled()
    } else {
        PacingController::new(
            options.max_delay_ms.unwrap_or(config.pacing.max_delay_ms),
            config.pacing.pace_first,
        )
    };
    if !pacing.is_enabled() {
        warn!("Request pacing disabled; the service may throttle this run");
    }

    let checker = BatchChecker::new(
        ReqwestBinder::new(&config.transport),
        AddressNormalizer::from_config(&config.chain),
        pacing,
        AirdropQueryService::new(&config.airdrop)?,
        Box::new(ConsoleObserver::new(
            config.chain.token_symbol.clone(),
            options.format,
        )),
    )
    .with_passthrough_fields(config.airdrop.passthrough_fields.clone())
    .with_amount_scale(config.chain.amount_scale);

    let report = checker.run_and_report(&records, &output).await?;

    if verbose {
        if let Some(path) = &report.saved_to {
            println!("{} {}", "✅ Results saved to".green(), path.display());
        }
    }

    Ok(())
}

fn normalize_address(config: &Config, address: &str) -> error::Result<()> {
    let normalizer = AddressNormalizer::from_config(&config.chain);
    let normalized = normalizer.normalize(address);

    let width = if normalizer.has_expected_length(&normalized) {
        "ok".green().to_string()
    } else {
        format!("expected {}", normalizer.expected_length())
            .yellow()
            .to_string()
    };

    let length = format!("{} ({})", normalized.len(), width);

    println!("{}", utils::rule(70));
    println!("{}", utils::labeled("Input", address));
    println!("{}", utils::labeled("Normalized", &normalized));
    println!("{}", utils::labeled("Length", length));
    println!("{}", utils::rule(70));

    Ok(())
}

fn show_config(config: &Config) -> error::Result<()> {
    let rendered = toml::to_string_pretty(config)
        .map_err(|e| CheckerError::Config(format!("cannot render configuration: {}", e)))?;

    println!("{}", "=== Resolved Configuration ===".cyan().bold());
    println!("{}", rendered);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use std::sync::{Arc, Mutex};

    #[derive(Clone, Default)]
    struct Captured(Arc<Mutex<Vec<u8>>>);

    impl Write for Captured {
        fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
            self.0.lock().unwrap().extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> std::io::Result<()> {
            Ok(())
        }
    }

    impl<'a> MakeWriter<'a> for Captured {
        type Writer = Captured;

        fn make_writer(&'a self) -> Self::Writer {
            self.clone()
        }
    }

    #[test]
    fn test_json_logs_use_given_writer() {
        let captured = Captured::default();
        let config = LoggingConfig {
            level: "info".to_string(),
            json: true,
        };

        tracing::subscriber::with_default(log_subscriber(&config, captured.clone()), || {
            tracing::info!("Batch complete");
        });

        let output = String::from_utf8(captured.0.lock().unwrap().clone()).unwrap();
        let line: serde_json::Value = serde_json::from_str(output.trim()).unwrap();
        assert_eq!(line["fields"]["message"], "Batch complete");
    }
}
