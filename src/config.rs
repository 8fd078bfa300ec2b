//! Configuration management with layered loading
//!
//! Precedence (lowest to highest):
//! 1. Compiled defaults
//! 2. Global config: `$XDG_CONFIG_HOME/fractree/fractree.toml`
//! 3. Explicit config file (`--config`)
//! 4. Environment variables: `FRACTREE_*` prefix, `__` between nested keys

use std::path::{Path, PathBuf};

use config::{Config, ConfigError, Environment};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};

use crate::application::{ApplicationError, IoResultExt};
use crate::domain::DisplayType;

/// How the CLI prints trees.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    #[default]
    Tree,
    Json,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    pub format: OutputFormat,
}

/// Raw output config for intermediate parsing (`None` = not specified, inherit).
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct RawOutputConfig {
    pub format: Option<OutputFormat>,
}

/// Raw settings for intermediate parsing.
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct RawSettings {
    pub default_display_type: Option<DisplayType>,
    pub precision: Option<usize>,
    pub recalculate_on_load: Option<bool>,
    pub output: RawOutputConfig,
}

/// Unified configuration for fractree.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct Settings {
    /// Display type for nodes whose descriptor does not name one
    pub default_display_type: DisplayType,
    /// Decimal places for plain values
    pub precision: usize,
    /// Refresh every parent from its children right after loading
    pub recalculate_on_load: bool,
    pub output: OutputConfig,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            default_display_type: DisplayType::Plain,
            precision: 3,
            recalculate_on_load: false,
            output: OutputConfig::default(),
        }
    }
}

/// Get the XDG config directory for fractree.
pub fn global_config_dir() -> Option<PathBuf> {
    ProjectDirs::from("", "", "fractree").map(|dirs| dirs.config_dir().to_path_buf())
}

/// Get the path to the global config file.
pub fn global_config_path() -> Option<PathBuf> {
    global_config_dir().map(|dir| dir.join("fractree.toml"))
}

/// Load a TOML file into RawSettings for manual merging.
fn load_raw_settings(path: &Path) -> Result<RawSettings, ApplicationError> {
    let content = std::fs::read_to_string(path).with_path_context("read config", path)?;
    toml::from_str(&content).map_err(|e| ApplicationError::Config {
        message: format!("parse {}: {}", path.display(), e),
    })
}

impl Settings {
    /// Overlay wins where it specifies a value.
    fn merge_with(&self, overlay: &RawSettings) -> Self {
        Self {
            default_display_type: overlay
                .default_display_type
                .unwrap_or(self.default_display_type),
            precision: overlay.precision.unwrap_or(self.precision),
            recalculate_on_load: overlay
                .recalculate_on_load
                .unwrap_or(self.recalculate_on_load),
            output: OutputConfig {
                format: overlay.output.format.unwrap_or(self.output.format),
            },
        }
    }

    /// Load settings with layered precedence.
    ///
    /// # Arguments
    /// * `explicit` - Optional config file given on the command line; must exist
    pub fn load(explicit: Option<&Path>) -> Result<Self, ApplicationError> {
        let global = global_config_path().filter(|path| path.exists());
        Self::load_from(global.as_deref(), explicit)
    }

    /// Same as [`Settings::load`] with the global config location supplied by the caller.
    pub fn load_from(global: Option<&Path>, explicit: Option<&Path>) -> Result<Self, ApplicationError> {
        let mut current = Self::default();

        if let Some(global_path) = global {
            let raw = load_raw_settings(global_path)?;
            current = current.merge_with(&raw);
        }

        if let Some(path) = explicit {
            let raw = load_raw_settings(path)?;
            current = current.merge_with(&raw);
        }

        Self::apply_env_overrides(current)
    }

    /// Apply FRACTREE_* environment variables as explicit overrides.
    fn apply_env_overrides(mut settings: Self) -> Result<Self, ApplicationError> {
        let builder = Config::builder().add_source(
            Environment::with_prefix("FRACTREE")
                .prefix_separator("_")
                .separator("__")
                .try_parsing(true),
        );

        let config = builder.build().map_err(config_err)?;

        if let Ok(val) = config.get::<DisplayType>("default_display_type") {
            settings.default_display_type = val;
        }
        if let Ok(val) = config.get::<usize>("precision") {
            settings.precision = val;
        }
        if let Ok(val) = config.get::<bool>("recalculate_on_load") {
            settings.recalculate_on_load = val;
        }
        if let Ok(val) = config.get::<OutputFormat>("output.format") {
            settings.output.format = val;
        }

        Ok(settings)
    }

    /// Show the effective configuration as TOML.
    pub fn to_toml(&self) -> Result<String, ApplicationError> {
        toml::to_string_pretty(self).map_err(|e| ApplicationError::Config {
            message: format!("serialize config: {e}"),
        })
    }

    /// Generate a template config file.
    pub fn template() -> String {
        r#"# fractree configuration
#
# Locations (by precedence, lowest to highest):
#   Global: ~/.config/fractree/fractree.toml
#   File:   --config <path>
#   Env:    FRACTREE_* environment variables (FRACTREE_OUTPUT__FORMAT=json)

# Display type for nodes without one: "plain", "fraction" or "exp"
# default_display_type = "plain"

# Decimal places when printing plain values
# precision = 3

# Recompute every parent from its children right after loading a tree
# recalculate_on_load = false

[output]
# "tree" or "json"
# format = "tree"
"#
        .to_string()
    }
}

fn config_err(e: ConfigError) -> ApplicationError {
    ApplicationError::Config {
        message: e.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_merge_overlay_wins_where_set() {
        let base = Settings::default();
        let overlay = RawSettings {
            precision: Some(1),
            output: RawOutputConfig {
                format: Some(OutputFormat::Json),
            },
            ..Default::default()
        };

        let merged = base.merge_with(&overlay);

        assert_eq!(merged.precision, 1);
        assert_eq!(merged.output.format, OutputFormat::Json);
        assert_eq!(merged.default_display_type, DisplayType::Plain);
        assert!(!merged.recalculate_on_load);
    }

    #[test]
    fn test_template_parses_as_raw_settings() {
        let raw: RawSettings = toml::from_str(&Settings::template()).unwrap();
        assert!(raw.precision.is_none());
    }

    #[test]
    fn test_to_toml_round_trips() {
        let settings = Settings::default();
        let back: Settings = toml::from_str(&settings.to_toml().unwrap()).unwrap();
        assert_eq!(back, settings);
    }
}
