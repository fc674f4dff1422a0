pub mod config;
pub mod core;
pub mod domain;
pub mod utils;

#[cfg(feature = "cli")]
pub use config::cli::CliConfig;

pub use config::{toml_config::TomlConfig, OracleSettings};
pub use crate::core::{cancel::CancellationToken, checker::PrimeChecker, oracle::PrimalityOracle};
pub use domain::model::{
    CandidateNumber, Certainty, Classification, DomainReason, PrimalityVerdict, VerdictReport,
};
pub use domain::ports::{ConfigProvider, PrimeService};
pub use utils::error::{OracleError, Result};
