#![cfg(feature = "cli")]

use anyhow::Result;
use prime_oracle::utils::validation::Validate;
use prime_oracle::{CliConfig, OracleError, PrimalityOracle, PrimalityVerdict, TomlConfig};
use clap::Parser;
use std::io::Write;
use tempfile::NamedTempFile;

fn write_config(content: &str) -> Result<NamedTempFile> {
    let mut file = NamedTempFile::new()?;
    file.write_all(content.as_bytes())?;
    Ok(file)
}

#[test]
fn test_file_settings_drive_the_oracle() -> Result<()> {
    let file = write_config(
        r#"
[oracle]
max_digits = 3
allow_separators = true
"#,
    )?;

    let path = file.path().to_str().unwrap().to_string();
    let cli = CliConfig::parse_from(["prime-oracle", "--config", &path]);
    let file_config = cli.load_file_config()?.expect("config file given");
    file_config.validate()?;

    let oracle = PrimalityOracle::new(cli.resolve_settings(Some(&file_config)))?;
    assert_eq!(oracle.classify("1_009"), PrimalityVerdict::TooLarge);
    assert!(oracle.classify("9_97").is_prime());
    Ok(())
}

#[test]
fn test_cli_flags_override_file_settings() -> Result<()> {
    let file = write_config("[oracle]\nmax_digits = 3\n")?;
    let path = file.path().to_str().unwrap().to_string();
    let cli = CliConfig::parse_from(["prime-oracle", "--config", &path, "--max-digits", "10"]);

    let file_config = cli.load_file_config()?;
    let oracle = PrimalityOracle::new(cli.resolve_settings(file_config.as_ref()))?;
    assert!(oracle.classify("1009").is_prime());
    Ok(())
}

#[test]
fn test_invalid_file_values_are_reported() -> Result<()> {
    let file = write_config("[oracle]\nsmall_prime_limit = 1\n")?;
    let config = TomlConfig::from_file(file.path())?;

    match config.validate() {
        Err(OracleError::InvalidConfigValueError { field, .. }) => {
            assert_eq!(field, "oracle.small_prime_limit");
        }
        other => panic!("expected invalid value error, got {:?}", other),
    }
    assert!(PrimalityOracle::from_config(&config).is_err());
    Ok(())
}

#[test]
fn test_malformed_toml_is_a_config_error() -> Result<()> {
    let file = write_config("[oracle\nmax_digits = ")?;
    let err = TomlConfig::from_file(file.path()).unwrap_err();
    assert!(matches!(err, OracleError::ConfigValidationError { .. }));
    assert_eq!(err.exit_code(), 1);
    Ok(())
}
