use crate::config::{
    OracleSettings, DEFAULT_MAX_DIGITS, DEFAULT_SMALL_PRIME_LIMIT, DEFAULT_WITNESS_ROUNDS,
};
use crate::domain::ports::ConfigProvider;
use crate::utils::error::{OracleError, Result};
use crate::utils::validation::{self, Validate};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::sync::LazyLock;

static ENV_VAR: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\$\{([^}]+)\}").expect("valid env var pattern"));

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct TomlConfig {
    pub oracle: OracleSection,
    pub logging: Option<LoggingConfig>,
    pub monitoring: Option<MonitoringConfig>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct OracleSection {
    pub small_prime_limit: Option<u32>,
    pub witness_rounds: Option<u32>,
    pub max_digits: Option<usize>,
    pub allow_separators: Option<bool>,
    pub strong_lucas: Option<bool>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    pub level: Option<String>,
    pub json: Option<bool>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MonitoringConfig {
    pub enabled: bool,
}

impl TomlConfig {
    /// 從 TOML 檔案載入配置
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(&path).map_err(OracleError::IoError)?;
        Self::from_toml_str(&content)
    }

    /// 從 TOML 字串解析配置
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let processed_content = Self::substitute_env_vars(content);

        toml::from_str(&processed_content).map_err(|e| OracleError::ConfigValidationError {
            field: "toml_parsing".to_string(),
            message: format!("TOML parsing error: {}", e),
        })
    }

    /// 替換環境變數 (例如 ${PRIME_MAX_DIGITS})，未設定的變數保留原文
    fn substitute_env_vars(content: &str) -> String {
        ENV_VAR
            .replace_all(content, |caps: &regex::Captures| {
                let var_name = &caps[1];
                std::env::var(var_name).unwrap_or_else(|_| format!("${{{}}}", var_name))
            })
            .into_owned()
    }

    pub fn settings(&self) -> OracleSettings {
        OracleSettings::from_provider(self)
    }

    pub fn validate_config(&self) -> Result<()> {
        self.settings().validate()?;

        if let Some(level) = self.log_level() {
            validation::validate_log_level("logging.level", level)?;
        }

        Ok(())
    }

    pub fn log_level(&self) -> Option<&str> {
        self.logging.as_ref().and_then(|l| l.level.as_deref())
    }

    pub fn json_logs(&self) -> bool {
        self.logging.as_ref().and_then(|l| l.json).unwrap_or(false)
    }

    pub fn monitoring_enabled(&self) -> bool {
        self.monitoring.as_ref().map(|m| m.enabled).unwrap_or(false)
    }
}

impl ConfigProvider for TomlConfig {
    fn small_prime_limit(&self) -> u32 {
        self.oracle
            .small_prime_limit
            .unwrap_or(DEFAULT_SMALL_PRIME_LIMIT)
    }

    fn witness_rounds(&self) -> u32 {
        self.oracle.witness_rounds.unwrap_or(DEFAULT_WITNESS_ROUNDS)
    }

    fn max_digits(&self) -> usize {
        self.oracle.max_digits.unwrap_or(DEFAULT_MAX_DIGITS)
    }

    fn allow_separators(&self) -> bool {
        self.oracle.allow_separators.unwrap_or(false)
    }

    fn strong_lucas(&self) -> bool {
        self.oracle.strong_lucas.unwrap_or(true)
    }
}

impl Validate for TomlConfig {
    fn validate(&self) -> Result<()> {
        self.validate_config()
    }
}
