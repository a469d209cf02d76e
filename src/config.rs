//! Configuration management with layered loading
//!
//! Precedence (lowest to highest):
//! 1. Compiled defaults
//! 2. Global config: `$XDG_CONFIG_HOME/emdtree/emdtree.toml`
//! 3. Explicit config file (`--config`)
//! 4. Environment variables: `EMDTREE_*` prefix

use std::path::{Path, PathBuf};

use config::{Config, ConfigError, Environment, File};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};

use crate::application::ApplicationError;
use crate::domain::{MergeMode, DEFAULT_ROOT_NAME};

/// How trees are drawn by `show`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum RenderStyle {
    /// Box-drawing branches, one label per node with class and bundles
    #[default]
    Unicode,
    /// `|` and `--` connectors, names only
    Connectors,
}

/// Unified configuration for emdtree.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct Settings {
    /// Metadata merge mode used by cut and graft when none is given
    pub merge_mode: MergeMode,
    /// Name given to roots created by `init`
    pub root_name: String,
    /// Tree drawing style
    pub render: RenderStyle,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            merge_mode: MergeMode::Keep,
            root_name: DEFAULT_ROOT_NAME.to_string(),
            render: RenderStyle::Unicode,
        }
    }
}

/// Get the XDG config directory for emdtree.
pub fn global_config_dir() -> Option<PathBuf> {
    ProjectDirs::from("", "", "emdtree").map(|dirs| dirs.config_dir().to_path_buf())
}

/// Get the path to the global config file.
pub fn global_config_path() -> Option<PathBuf> {
    global_config_dir().map(|dir| dir.join("emdtree.toml"))
}

fn config_err(e: ConfigError) -> ApplicationError {
    ApplicationError::Config {
        message: e.to_string(),
    }
}

impl Settings {
    /// Load settings with layered precedence.
    ///
    /// # Arguments
    /// * `explicit` - Optional config file given on the command line; it
    ///   must exist when given
    pub fn load(explicit: Option<&Path>) -> Result<Self, ApplicationError> {
        let global = global_config_path().filter(|p| p.exists());
        Self::load_from(global.as_deref(), explicit)
    }

    /// Load settings from the given files instead of the XDG location.
    pub fn load_from(global: Option<&Path>, explicit: Option<&Path>) -> Result<Self, ApplicationError> {
        let defaults = Settings::default();
        let mut builder = Config::builder()
            .set_default("merge_mode", defaults.merge_mode.to_string())
            .map_err(config_err)?
            .set_default("root_name", defaults.root_name.clone())
            .map_err(config_err)?
            .set_default("render", "unicode")
            .map_err(config_err)?;

        // 2. Global config (optional)
        if let Some(path) = global {
            builder = builder.add_source(File::from(path).required(false));
        }

        // 3. Explicit config (must exist)
        if let Some(path) = explicit {
            builder = builder.add_source(File::from(path).required(true));
        }

        // 4. Environment overrides
        builder = builder.add_source(
            Environment::with_prefix("EMDTREE")
                .prefix_separator("_")
                .separator("__"),
        );

        let config = builder.build().map_err(config_err)?;
        config.try_deserialize().map_err(config_err)
    }

    /// Show the effective configuration as TOML.
    pub fn to_toml(&self) -> Result<String, ApplicationError> {
        toml::to_string_pretty(self).map_err(|e| ApplicationError::Config {
            message: format!("serialize config: {e}"),
        })
    }

    /// Generate a template config file.
    pub fn template() -> String {
        r#"# emdtree configuration
#
# Locations (by precedence, lowest to highest):
#   Global:   ~/.config/emdtree/emdtree.toml
#   Explicit: --config <file>
#   Env:      EMDTREE_* environment variables (e.g. EMDTREE_MERGE_MODE=copy)

# What cut and graft do with the old root's metadata bundles:
#   keep    - attach the same bundles to the new root
#   discard - carry nothing over
#   copy    - attach independent copies
# merge_mode = "keep"

# Name of the root created by `emdtree init`
# root_name = "root"

# Tree drawing style for `emdtree show`: "unicode" or "connectors"
# render = "unicode"
"#
        .to_string()
    }
}
