use anyhow::Result;
use clap::ValueEnum;
use std::path::Path;

use super::MonohookConfig;

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum ConfigFormat {
    Json,
    Toml,
    Yaml,
}

impl ConfigFormat {
    /// Guess a format from a file extension, defaulting to TOML
    pub fn from_path<P: AsRef<Path>>(path: P) -> Self {
        let extension = path
            .as_ref()
            .extension()
            .and_then(|ext| ext.to_str())
            .unwrap_or("")
            .to_lowercase();

        match extension.as_str() {
            "json" => ConfigFormat::Json,
            "yaml" | "yml" => ConfigFormat::Yaml,
            _ => ConfigFormat::Toml,
        }
    }
}

impl MonohookConfig {
    /// Export the effective configuration in the given format
    pub fn export(&self, format: ConfigFormat) -> Result<String> {
        let output = match format {
            ConfigFormat::Json => serde_json::to_string_pretty(self)?,
            ConfigFormat::Toml => toml::to_string_pretty(self)?,
            ConfigFormat::Yaml => serde_yml::to_string(self)?,
        };

        Ok(output)
    }
}
