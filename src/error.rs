use thiserror::Error;

use crate::config::ConfigError;
use crate::graph::GraphError;
use crate::loader::LoadError;

#[derive(Debug, Error)]
pub enum DeptreeError {
    #[error("config error: {0}")]
    Config(#[from] ConfigError),
    #[error(transparent)]
    Load(#[from] LoadError),
    #[error(transparent)]
    Graph(#[from] GraphError),
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("{0}")]
    Other(#[from] anyhow::Error),
}

pub type Result<T> = std::result::Result<T, DeptreeError>;
