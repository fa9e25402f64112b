use serde::Deserialize;

use crate::config::ConfigError;

#[derive(Debug, Clone, Default, Deserialize)]
pub struct DeptreeConfig {
    #[serde(default)]
    pub graph: GraphConfig,
    #[serde(default)]
    pub output: OutputConfig,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct GraphConfig {
    #[serde(default)]
    pub file: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct OutputConfig {
    #[serde(default)]
    pub color: Option<bool>,
    #[serde(default)]
    pub format: Option<String>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum OutputFormat {
    #[default]
    Text,
    Json,
}

impl OutputFormat {
    pub fn parse(input: &str) -> Result<Self, ConfigError> {
        match input.to_ascii_lowercase().as_str() {
            "text" => Ok(OutputFormat::Text),
            "json" => Ok(OutputFormat::Json),
            _ => Err(ConfigError::UnknownFormat(input.to_string())),
        }
    }
}

impl OutputConfig {
    pub fn format(&self) -> Result<OutputFormat, ConfigError> {
        self.format
            .as_deref()
            .map(OutputFormat::parse)
            .transpose()
            .map(Option::unwrap_or_default)
    }

    pub fn color_enabled(&self) -> bool {
        self.color.unwrap_or(true)
    }
}
