pub mod resolve;
pub mod settings;

pub use resolve::{resolve_config, resolve_config_with_overrides, ResolvedConfig};
pub use settings::{DeptreeConfig, GraphConfig, OutputConfig, OutputFormat};

use std::path::PathBuf;

use thiserror::Error;

pub const CONFIG_DIR: &str = ".deptree";
pub const CONFIG_FILE: &str = "config.toml";
pub const DEFAULT_GRAPH_FILE: &str = "deps.json";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("config file not found: {0}")]
    ConfigNotFound(PathBuf),
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("failed to parse config at {path}: {source}")]
    Toml {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },
    #[error("unknown output format '{0}' (expected 'text' or 'json')")]
    UnknownFormat(String),
}

pub type Result<T> = std::result::Result<T, ConfigError>;
