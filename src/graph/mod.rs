use thiserror::Error;

pub mod resolver;
pub mod store;

pub use resolver::DependencyResolver;
pub use store::{DependencyGraph, GraphSnapshot};

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GraphError {
    #[error("invalid argument: {0}")]
    InvalidArgument(String),
    #[error(
        "adding dependencies for node '{node}' introduces a circular dependency: {}",
        .path.join(" -> ")
    )]
    CycleDetected { node: String, path: Vec<String> },
}

pub type Result<T> = std::result::Result<T, GraphError>;
