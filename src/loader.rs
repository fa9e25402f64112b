use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use thiserror::Error;
use tracing::debug;

use crate::graph::{DependencyGraph, GraphError};

#[derive(Debug, Error)]
pub enum LoadError {
    #[error("failed to read dependency graph from {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse dependency graph from {path}: {source}")]
    Json {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
    #[error("failed to parse dependency graph from {path}: {source}")]
    Yaml {
        path: PathBuf,
        #[source]
        source: serde_yaml::Error,
    },
    #[error(transparent)]
    Graph(#[from] GraphError),
}

pub type Result<T> = std::result::Result<T, LoadError>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GraphFormat {
    Json,
    Yaml,
}

impl GraphFormat {
    pub fn from_path(path: &Path) -> Self {
        match path
            .extension()
            .and_then(|ext| ext.to_str())
            .map(str::to_ascii_lowercase)
            .as_deref()
        {
            Some("yaml") | Some("yml") => GraphFormat::Yaml,
            _ => GraphFormat::Json,
        }
    }
}

// `None` marks an explicit null list, which is rejected below rather than
// failing inside the deserializer.
type RawGraph = BTreeMap<String, Option<Vec<String>>>;

pub fn load_from_file(path: impl AsRef<Path>) -> Result<DependencyGraph> {
    let path = path.as_ref();
    let contents = std::fs::read_to_string(path).map_err(|source| LoadError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let raw = parse(&contents, GraphFormat::from_path(path), path)?;
    debug!(path = %path.display(), entries = raw.len(), "loaded dependency graph");
    build(raw)
}

pub fn load_from_str(contents: &str, format: GraphFormat) -> Result<DependencyGraph> {
    let raw = parse(contents, format, Path::new("<input>"))?;
    build(raw)
}

fn parse(contents: &str, format: GraphFormat, path: &Path) -> Result<RawGraph> {
    match format {
        GraphFormat::Json => serde_json::from_str(contents).map_err(|source| LoadError::Json {
            path: path.to_path_buf(),
            source,
        }),
        GraphFormat::Yaml => {
            if contents.trim().is_empty() {
                return Ok(RawGraph::new());
            }
            serde_yaml::from_str(contents).map_err(|source| LoadError::Yaml {
                path: path.to_path_buf(),
                source,
            })
        }
    }
}

fn build(raw: RawGraph) -> Result<DependencyGraph> {
    let mut graph = DependencyGraph::new();
    for (name, dependencies) in raw {
        let dependencies = dependencies.ok_or_else(|| {
            GraphError::InvalidArgument(format!("dependencies of node '{}' cannot be null", name))
        })?;
        graph.set_dependencies(name, dependencies)?;
    }
    Ok(graph)
}
