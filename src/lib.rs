pub mod adapters;
pub mod config;
pub mod core;
pub mod domain;
pub mod utils;

#[cfg(feature = "cli")]
pub use config::cli::{CliConfig, Command};

pub use adapters::{ReqwestTransport, StaticHost, TransportSettings};
pub use config::TomlConfig;
pub use core::connector::{ApiBody, ApiConnector};
pub use core::request::{Credentials, HttpMethod, RequestConfig};
pub use domain::model::{Model, Paginated};
pub use utils::error::{ApiError, ConfigError, Result, TransportError};
