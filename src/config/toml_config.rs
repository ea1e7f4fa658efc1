use crate::adapters::TransportSettings;
use crate::core::request::DEFAULT_PREFIX;
use crate::utils::error::ConfigError;
use crate::utils::validation::{self, Validate};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;
use std::time::Duration;

type Result<T> = std::result::Result<T, ConfigError>;

pub const DEFAULT_HOST: &str = "localhost";
pub const DEFAULT_SCHEME: &str = "https";
pub const DEFAULT_LOG_LEVEL: &str = "info";

const VALID_SCHEMES: [&str; 2] = ["http", "https"];
const VALID_LOG_LEVELS: [&str; 5] = ["trace", "debug", "info", "warn", "error"];

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TomlConfig {
    #[serde(default)]
    pub connector: ConnectorConfig,
    pub transport: Option<TransportConfig>,
    pub logging: Option<LoggingConfig>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConnectorConfig {
    pub host: Option<String>,
    pub scheme: Option<String>,
    pub prefix: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransportConfig {
    pub timeout_seconds: Option<u64>,
    pub user_agent: Option<String>,
    pub headers: Option<BTreeMap<String, String>>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoggingConfig {
    pub level: Option<String>,
    pub json: Option<bool>,
}

impl TomlConfig {
    /// 從 TOML 檔案載入配置
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(&path)?;
        Self::from_toml_str(&content)
    }

    /// 從 TOML 字串解析配置
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let processed_content = Self::substitute_env_vars(content)?;

        toml::from_str(&processed_content).map_err(|e| ConfigError::Parse {
            message: format!("TOML parsing error: {}", e),
        })
    }

    /// 替換環境變數 (例如 ${API_HOST})，找不到的保留原樣
    fn substitute_env_vars(content: &str) -> Result<String> {
        use regex::Regex;
        let re = Regex::new(r"\$\{([^}]+)\}").map_err(|e| ConfigError::Parse {
            message: e.to_string(),
        })?;

        let result = re.replace_all(content, |caps: &regex::Captures| {
            let var_name = &caps[1];
            std::env::var(var_name).unwrap_or_else(|_| format!("${{{}}}", var_name))
        });

        Ok(result.to_string())
    }

    pub fn host(&self) -> &str {
        self.connector.host.as_deref().unwrap_or(DEFAULT_HOST)
    }

    pub fn scheme(&self) -> &str {
        self.connector.scheme.as_deref().unwrap_or(DEFAULT_SCHEME)
    }

    pub fn prefix(&self) -> &str {
        self.connector.prefix.as_deref().unwrap_or(DEFAULT_PREFIX)
    }

    pub fn timeout(&self) -> Option<Duration> {
        self.transport
            .as_ref()
            .and_then(|t| t.timeout_seconds)
            .map(Duration::from_secs)
    }

    pub fn log_level(&self) -> &str {
        self.logging
            .as_ref()
            .and_then(|l| l.level.as_deref())
            .unwrap_or(DEFAULT_LOG_LEVEL)
    }

    pub fn json_logs(&self) -> bool {
        self.logging.as_ref().and_then(|l| l.json).unwrap_or(false)
    }

    pub fn transport_settings(&self) -> TransportSettings {
        let transport = self.transport.clone().unwrap_or_default();
        TransportSettings {
            timeout: self.timeout(),
            user_agent: transport.user_agent,
            headers: transport.headers.unwrap_or_default().into_iter().collect(),
        }
    }

    /// 驗證配置的合理性
    pub fn validate_config(&self) -> Result<()> {
        validation::validate_one_of("connector.scheme", self.scheme(), &VALID_SCHEMES)?;
        validation::validate_host("connector.host", self.host())?;

        if let Some(timeout) = self.transport.as_ref().and_then(|t| t.timeout_seconds) {
            validation::validate_range("transport.timeout_seconds", timeout, 1, 3600)?;
        }

        if let Some(user_agent) = self.transport.as_ref().and_then(|t| t.user_agent.as_deref()) {
            validation::validate_non_empty_string("transport.user_agent", user_agent)?;
        }

        validation::validate_one_of("logging.level", self.log_level(), &VALID_LOG_LEVELS)?;

        Ok(())
    }
}

impl Validate for TomlConfig {
    fn validate(&self) -> Result<()> {
        self.validate_config()
    }
}
