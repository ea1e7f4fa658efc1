use crate::config::toml_config::TomlConfig;
use crate::utils::error::ConfigError;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Debug, Clone, Parser)]
#[command(name = "api-connector")]
#[command(about = "Issue a single request against an HTTP API")]
pub struct CliConfig {
    #[arg(long, help = "Path to a TOML configuration file")]
    pub config: Option<PathBuf>,

    #[arg(long, help = "Override the API host (name[:port])")]
    pub host: Option<String>,

    #[arg(long, help = "http or https")]
    pub scheme: Option<String>,

    #[arg(long, help = "Path prefix; pass an empty string to disable")]
    pub prefix: Option<String>,

    #[arg(long, help = "Request timeout in seconds")]
    pub timeout: Option<u64>,

    #[arg(long, help = "Enable verbose output")]
    pub verbose: bool,

    #[arg(long, help = "Emit logs as JSON")]
    pub json_logs: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Clone, PartialEq, Eq, Subcommand)]
pub enum Command {
    /// GET and pretty-print the JSON response
    Fetch { path: String },
    /// GET and print the raw response text
    Get { path: String },
    /// HEAD; prints whether the resource responded with a non-2xx status
    Head { path: String },
    /// GET and write the raw bytes to a file
    Download {
        path: String,
        #[arg(long, short)]
        output: PathBuf,
    },
    Post {
        path: String,
        #[arg(long)]
        body: Option<String>,
    },
    Patch {
        path: String,
        #[arg(long)]
        body: Option<String>,
    },
    Delete { path: String },
}

impl CliConfig {
    /// 讀取設定檔（若有），再套用命令列覆寫
    pub fn load_config(&self) -> Result<TomlConfig, ConfigError> {
        let mut config = match &self.config {
            Some(path) => TomlConfig::from_file(path)?,
            None => TomlConfig::default(),
        };
        self.apply_overrides(&mut config);
        Ok(config)
    }

    pub fn apply_overrides(&self, config: &mut TomlConfig) {
        if let Some(host) = &self.host {
            config.connector.host = Some(host.clone());
        }
        if let Some(scheme) = &self.scheme {
            config.connector.scheme = Some(scheme.clone());
        }
        if let Some(prefix) = &self.prefix {
            config.connector.prefix = Some(prefix.clone());
        }
        if let Some(timeout) = self.timeout {
            config
                .transport
                .get_or_insert_with(Default::default)
                .timeout_seconds = Some(timeout);
        }
        if self.json_logs {
            config.logging.get_or_insert_with(Default::default).json = Some(true);
        }
    }
}
