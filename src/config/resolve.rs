use std::env;
use std::path::{Path, PathBuf};

use crate::config::{ConfigError, DeptreeConfig, CONFIG_DIR, CONFIG_FILE, DEFAULT_GRAPH_FILE};

#[derive(Debug, Clone)]
pub struct ResolvedConfig {
    pub root: PathBuf,
    pub config_path: Option<PathBuf>,
    pub config: DeptreeConfig,
}

impl ResolvedConfig {
    /// Graph file to load: explicit argument, then `DEPTREE_GRAPH`, then the
    /// config file, then `deps.json` under the root.
    pub fn graph_file(&self, explicit: Option<PathBuf>) -> PathBuf {
        self.graph_file_with(explicit, env::var_os("DEPTREE_GRAPH").map(PathBuf::from))
    }

    pub fn graph_file_with(&self, explicit: Option<PathBuf>, from_env: Option<PathBuf>) -> PathBuf {
        if let Some(path) = explicit.or(from_env) {
            return path;
        }
        match self.config.graph.file.as_ref() {
            Some(file) => {
                let path = PathBuf::from(file);
                if path.is_absolute() {
                    path
                } else {
                    self.root.join(path)
                }
            }
            None => self.root.join(DEFAULT_GRAPH_FILE),
        }
    }
}

pub fn resolve_config(
    start: impl AsRef<Path>,
    config_path: Option<PathBuf>,
) -> Result<ResolvedConfig, ConfigError> {
    let from_env = env::var_os("DEPTREE_CONFIG").map(PathBuf::from);
    resolve_config_with_overrides(start, config_path, from_env)
}

pub fn resolve_config_with_overrides(
    start: impl AsRef<Path>,
    config_path: Option<PathBuf>,
    env_config_path: Option<PathBuf>,
) -> Result<ResolvedConfig, ConfigError> {
    if let Some(config) = config_path.or(env_config_path) {
        return resolve_with_config(config);
    }

    let start = start.as_ref();
    for ancestor in start.ancestors() {
        let config_path = ancestor.join(CONFIG_DIR).join(CONFIG_FILE);
        if config_path.is_file() {
            let config = load_config(&config_path)?;
            return Ok(ResolvedConfig {
                root: ancestor.to_path_buf(),
                config_path: Some(config_path),
                config,
            });
        }
    }

    Ok(ResolvedConfig {
        root: start.to_path_buf(),
        config_path: None,
        config: DeptreeConfig::default(),
    })
}

pub fn load_config(path: &Path) -> Result<DeptreeConfig, ConfigError> {
    if !path.is_file() {
        return Err(ConfigError::ConfigNotFound(path.to_path_buf()));
    }

    let contents = std::fs::read_to_string(path)?;
    toml::from_str(&contents).map_err(|source| ConfigError::Toml {
        path: path.to_path_buf(),
        source,
    })
}

fn resolve_with_config(config_path: PathBuf) -> Result<ResolvedConfig, ConfigError> {
    let config = load_config(&config_path)?;
    let root = infer_root_from_config(&config_path).unwrap_or_else(|| PathBuf::from("."));
    Ok(ResolvedConfig {
        root,
        config_path: Some(config_path),
        config,
    })
}

fn infer_root_from_config(config_path: &Path) -> Option<PathBuf> {
    let parent = config_path.parent()?;
    if parent.file_name()? == CONFIG_DIR {
        return parent.parent().map(|p| p.to_path_buf());
    }

    Some(parent.to_path_buf())
}
