use clap::Parser;
use prime_oracle::utils::monitor::SystemMonitor;
use prime_oracle::utils::{logger, validation::Validate};
use prime_oracle::{CliConfig, OracleError, PrimalityOracle, PrimeChecker, TomlConfig};
use tokio::io::BufReader;

fn fail(context: &str, e: &OracleError) -> ! {
    tracing::error!(
        "{}: {} (Category: {:?}, Severity: {:?})",
        context,
        e,
        e.category(),
        e.severity()
    );
    tracing::error!("Suggestion: {}", e.recovery_suggestion());
    eprintln!("{}", e.user_friendly_message());
    std::process::exit(e.exit_code().max(1));
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = CliConfig::parse();

    let file_config = match cli.load_file_config() {
        Ok(config) => config,
        Err(e) => {
            logger::init_cli_logger(cli.verbose, None);
            fail("Failed to load configuration", &e);
        }
    };

    let log_level = file_config.as_ref().and_then(TomlConfig::log_level);
    if cli.json_logs || file_config.as_ref().is_some_and(TomlConfig::json_logs) {
        logger::init_json_logger(cli.verbose, log_level);
    } else {
        logger::init_cli_logger(cli.verbose, log_level);
    }

    tracing::debug!("CLI config: {:?}", cli);

    if let Err(e) = cli.validate() {
        fail("Configuration validation failed", &e);
    }
    if let Some(file) = &file_config {
        if let Err(e) = file.validate() {
            fail("Configuration validation failed", &e);
        }
    }

    let settings = cli.resolve_settings(file_config.as_ref());
    let oracle = match PrimalityOracle::new(settings) {
        Ok(oracle) => oracle,
        Err(e) => fail("Configuration validation failed", &e),
    };
    tracing::info!(
        small_prime_limit = oracle.settings().small_prime_limit,
        witness_rounds = oracle.settings().witness_rounds,
        max_digits = oracle.settings().max_digits,
        "Starting prime-oracle"
    );

    let monitor_enabled = cli.monitor || file_config.as_ref().is_some_and(TomlConfig::monitoring_enabled);
    let monitor = SystemMonitor::new(monitor_enabled);
    if monitor.is_enabled() {
        tracing::info!("System monitoring enabled");
    }

    let checker = PrimeChecker::new(oracle);

    if cli.numbers.is_empty() {
        let mut stdout = tokio::io::stdout();
        checker
            .serve_lines(BufReader::new(tokio::io::stdin()), &mut stdout, cli.json)
            .await?;
    } else {
        let lines = if cli.json {
            checker.report_all(&cli.numbers, cli.concurrency()).await
        } else {
            checker.check_all(&cli.numbers, cli.concurrency()).await
        };
        monitor.log_stats("Batch complete");
        for line in lines {
            println!("{}", line);
        }
    }

    monitor.log_final_stats();
    Ok(())
}
