#[cfg(feature = "cli")]
pub mod cli;
pub mod toml_config;

use crate::domain::ports::ConfigProvider;
use crate::utils::error::Result;
use crate::utils::validation::{validate_range, Validate};
use serde::{Deserialize, Serialize};

pub const DEFAULT_SMALL_PRIME_LIMIT: u32 = 10_000;
pub const DEFAULT_WITNESS_ROUNDS: u32 = 64;
pub const DEFAULT_MAX_DIGITS: usize = 10_000;

pub const SMALL_PRIME_LIMIT_RANGE: (u32, u32) = (3, 10_000_000);
pub const WITNESS_ROUNDS_RANGE: (u32, u32) = (1, 256);
pub const MAX_DIGITS_RANGE: (usize, usize) = (1, 1_000_000);

/// Resolved oracle tuning. Every field has a default, so an empty file or no flags is valid.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OracleSettings {
    /// Trial division uses every prime strictly below this value.
    pub small_prime_limit: u32,
    /// Miller-Rabin rounds for candidates past the deterministic bound.
    pub witness_rounds: u32,
    /// Candidates with more significant digits are reported as too large.
    pub max_digits: usize,
    /// Accept `_` or `,` between digit groups.
    pub allow_separators: bool,
    /// Follow the witness rounds with a strong Lucas test.
    pub strong_lucas: bool,
}

impl Default for OracleSettings {
    fn default() -> Self {
        Self {
            small_prime_limit: DEFAULT_SMALL_PRIME_LIMIT,
            witness_rounds: DEFAULT_WITNESS_ROUNDS,
            max_digits: DEFAULT_MAX_DIGITS,
            allow_separators: false,
            strong_lucas: true,
        }
    }
}

impl OracleSettings {
    pub fn from_provider<C: ConfigProvider + ?Sized>(provider: &C) -> Self {
        Self {
            small_prime_limit: provider.small_prime_limit(),
            witness_rounds: provider.witness_rounds(),
            max_digits: provider.max_digits(),
            allow_separators: provider.allow_separators(),
            strong_lucas: provider.strong_lucas(),
        }
    }

    pub fn with_max_digits(mut self, max_digits: usize) -> Self {
        self.max_digits = max_digits;
        self
    }

    pub fn with_witness_rounds(mut self, witness_rounds: u32) -> Self {
        self.witness_rounds = witness_rounds;
        self
    }

    pub fn with_small_prime_limit(mut self, small_prime_limit: u32) -> Self {
        self.small_prime_limit = small_prime_limit;
        self
    }

    pub fn with_separators(mut self, allow_separators: bool) -> Self {
        self.allow_separators = allow_separators;
        self
    }

    pub fn with_strong_lucas(mut self, strong_lucas: bool) -> Self {
        self.strong_lucas = strong_lucas;
        self
    }
}

impl ConfigProvider for OracleSettings {
    fn small_prime_limit(&self) -> u32 {
        self.small_prime_limit
    }

    fn witness_rounds(&self) -> u32 {
        self.witness_rounds
    }

    fn max_digits(&self) -> usize {
        self.max_digits
    }

    fn allow_separators(&self) -> bool {
        self.allow_separators
    }

    fn strong_lucas(&self) -> bool {
        self.strong_lucas
    }
}

impl Validate for OracleSettings {
    fn validate(&self) -> Result<()> {
        validate_range(
            "oracle.small_prime_limit",
            self.small_prime_limit,
            SMALL_PRIME_LIMIT_RANGE.0,
            SMALL_PRIME_LIMIT_RANGE.1,
        )?;
        validate_range(
            "oracle.witness_rounds",
            self.witness_rounds,
            WITNESS_ROUNDS_RANGE.0,
            WITNESS_ROUNDS_RANGE.1,
        )?;
        validate_range(
            "oracle.max_digits",
            self.max_digits,
            MAX_DIGITS_RANGE.0,
            MAX_DIGITS_RANGE.1,
        )?;
        Ok(())
    }
}
