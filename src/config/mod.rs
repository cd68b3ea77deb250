//! Configuration management for monohook
//!
//! Configuration is layered with figment, lowest priority first:
//!
//! 1. the defaults embedded from `default-config.toml`
//! 2. the user config at `~/.config/monohook/config.toml`
//! 3. `monohook.toml` / `monohook.json` / `monohook.yaml` / `monohook.yml` at the workspace root
//! 4. a file passed with `--config`
//! 5. `MONOHOOK_*` environment variables (`__` separates nested keys)

use anyhow::{Context, Result};
use figment::Figment;
use figment::providers::{Env, Format, Json, Toml, Yaml};
use serde::{Deserialize, Serialize};
use std::path::Path;

mod formats;

pub use formats::ConfigFormat;

// Embed the default config at compile time
const DEFAULT_CONFIG: &str = include_str!("../../default-config.toml");

/// Fully resolved monohook configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MonohookConfig {
    pub python: PythonConfig,
    pub hooks: HooksConfig,
    pub repair: RepairConfig,
    pub runner: RunnerConfig,
}

/// Python virtual environment settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PythonConfig {
    /// Virtual environment directory, relative to the workspace root
    pub venv_dir: String,

    /// Interpreter used to create the virtual environment
    pub interpreter: String,

    /// Variable handed to child processes with the venv binary directory
    pub env_var: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HooksConfig {
    pub pre_commit: PreCommitConfig,
    pub post_merge: PostMergeConfig,
    pub pre_push: PrePushConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PreCommitConfig {
    /// Unified linter/formatter run over every staged file
    pub staged_check: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PostMergeConfig {
    /// Run workspace repair (without tool verification) before installing
    #[serde(default = "default_true")]
    pub repair: bool,

    pub dotnet_restore: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PrePushConfig {
    pub node_test: Vec<String>,
    pub python_test: Vec<String>,
    pub dotnet_test: Vec<String>,
}

/// Nx workspace repair settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RepairConfig {
    /// Plugins that must be present in `nx.json`
    #[serde(default)]
    pub required_plugins: Vec<PluginDescriptor>,

    /// Command proving the Nx CLI is usable
    pub version_check: Vec<String>,

    /// Command run once when the version check fails
    pub reinstall: Vec<String>,
}

/// A required `nx.json` plugin, identified by its name
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PluginDescriptor {
    pub plugin: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub options: Option<serde_json::Value>,
}

/// Safe command runner settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunnerConfig {
    /// Bulk task command the forwarded arguments are appended to
    pub command: Vec<String>,

    /// Regexes identifying "no projects matched" output
    #[serde(default)]
    pub no_projects_patterns: Vec<String>,
}

fn default_true() -> bool {
    true
}

impl MonohookConfig {
    /// Load configuration for the workspace rooted at `root`
    pub fn load(root: &Path, custom_config: Option<&str>) -> Result<Self> {
        tracing::trace!("CONFIG LOAD: root = {}", root.display());

        Self::figment(root, custom_config)
            .extract()
            .context("Failed to load monohook configuration")
    }

    /// Build the provider chain without extracting
    pub fn figment(root: &Path, custom_config: Option<&str>) -> Figment {
        let mut figment = Figment::new()
            .merge(Toml::string(DEFAULT_CONFIG))
            .merge(Toml::file(Self::user_config_path()))
            .merge(Toml::file(root.join("monohook.toml")))
            .merge(Json::file(root.join("monohook.json")))
            .merge(Yaml::file(root.join("monohook.yaml")))
            .merge(Yaml::file(root.join("monohook.yml")));

        if let Some(path) = custom_config {
            figment = match ConfigFormat::from_path(path) {
                ConfigFormat::Json => figment.merge(Json::file(path)),
                ConfigFormat::Yaml => figment.merge(Yaml::file(path)),
                ConfigFormat::Toml => figment.merge(Toml::file(path)),
            };
        }

        figment.merge(Env::prefixed("MONOHOOK_").split("__"))
    }

    fn user_config_path() -> String {
        match std::env::var("HOME") {
            Ok(home) => format!("{home}/.config/monohook/config.toml"),
            Err(_) => "~/.config/monohook/config.toml".to_string(),
        }
    }
}
