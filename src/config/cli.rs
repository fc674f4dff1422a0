use crate::config::toml_config::TomlConfig;
use crate::config::{OracleSettings, DEFAULT_MAX_DIGITS, DEFAULT_SMALL_PRIME_LIMIT, DEFAULT_WITNESS_ROUNDS};
use crate::domain::ports::ConfigProvider;
use crate::utils::error::Result;
use crate::utils::validation::{self, Validate};
use clap::Parser;

#[derive(Debug, Clone, Default, Parser)]
#[command(name = "prime-oracle")]
#[command(about = "Check whether numbers are prime")]
#[command(allow_negative_numbers = true)]
pub struct CliConfig {
    /// Numbers to check. Reads one number per line from stdin when omitted.
    pub numbers: Vec<String>,

    /// Path to a TOML configuration file
    #[arg(short, long)]
    pub config: Option<String>,

    /// Trial-divide by every prime below this value
    #[arg(long)]
    pub small_prime_limit: Option<u32>,

    /// Miller-Rabin rounds for numbers past the deterministic bound
    #[arg(long)]
    pub witness_rounds: Option<u32>,

    /// Reject numbers with more significant digits than this
    #[arg(long)]
    pub max_digits: Option<usize>,

    /// Accept '_' or ',' between digit groups
    #[arg(long)]
    pub allow_separators: bool,

    /// Skip the strong Lucas test after the witness rounds
    #[arg(long)]
    pub no_lucas: bool,

    /// Maximum numbers checked at once
    #[arg(long)]
    pub concurrency: Option<usize>,

    /// Print one JSON object per number
    #[arg(long)]
    pub json: bool,

    /// Emit logs as JSON
    #[arg(long)]
    pub json_logs: bool,

    #[arg(short, long, help = "Enable verbose output")]
    pub verbose: bool,

    #[arg(long, help = "Log CPU and memory usage")]
    pub monitor: bool,
}

impl CliConfig {
    pub fn load_file_config(&self) -> Result<Option<TomlConfig>> {
        match &self.config {
            Some(path) => {
                tracing::debug!("Loading configuration from: {}", path);
                Ok(Some(TomlConfig::from_file(path)?))
            }
            None => Ok(None),
        }
    }

    /// Flags win over the file, the file wins over built-in defaults.
    pub fn resolve_settings(&self, file: Option<&TomlConfig>) -> OracleSettings {
        let base = file.map(TomlConfig::settings).unwrap_or_default();
        OracleSettings {
            small_prime_limit: self.small_prime_limit.unwrap_or(base.small_prime_limit),
            witness_rounds: self.witness_rounds.unwrap_or(base.witness_rounds),
            max_digits: self.max_digits.unwrap_or(base.max_digits),
            allow_separators: self.allow_separators || base.allow_separators,
            strong_lucas: !self.no_lucas && base.strong_lucas,
        }
    }

    pub fn concurrency(&self) -> usize {
        self.concurrency.unwrap_or_else(|| {
            std::thread::available_parallelism()
                .map(|n| n.get())
                .unwrap_or(1)
        })
    }
}

impl ConfigProvider for CliConfig {
    fn small_prime_limit(&self) -> u32 {
        self.small_prime_limit.unwrap_or(DEFAULT_SMALL_PRIME_LIMIT)
    }

    fn witness_rounds(&self) -> u32 {
        self.witness_rounds.unwrap_or(DEFAULT_WITNESS_ROUNDS)
    }

    fn max_digits(&self) -> usize {
        self.max_digits.unwrap_or(DEFAULT_MAX_DIGITS)
    }

    fn allow_separators(&self) -> bool {
        self.allow_separators
    }

    fn strong_lucas(&self) -> bool {
        !self.no_lucas
    }
}

impl Validate for CliConfig {
    fn validate(&self) -> Result<()> {
        if let Some(path) = &self.config {
            validation::validate_path("config", path)?;
        }
        if let Some(concurrency) = self.concurrency {
            validation::validate_positive_number("concurrency", concurrency, 1)?;
        }
        OracleSettings::from_provider(self).validate()
    }
}
