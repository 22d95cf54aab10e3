//! Configuration management with layered loading
//!
//! Precedence (lowest to highest):
//! 1. Compiled defaults
//! 2. Global config: `$XDG_CONFIG_HOME/allotree/allotree.toml`
//! 3. Local config: `<dir>/.allotree.toml` (usually the working directory)
//! 4. Environment variables: `ALLOTREE_*` prefix, `__` between nested keys

use std::path::{Path, PathBuf};

use config::{Config, ConfigError, Environment};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};

use crate::application::ApplicationError;
use crate::domain::AllocationMode;
use crate::util::path::expand_env_vars;

/// How tables are rendered.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct DisplayConfig {
    /// Shown in the variance column for rows with a zero base value
    pub na_sentinel: String,
    /// Decimal digits for effective values
    pub value_precision: usize,
    /// Spaces per nesting level in the label column
    pub indent: usize,
}

impl Default for DisplayConfig {
    fn default() -> Self {
        Self {
            na_sentinel: "N/A".into(),
            value_precision: 2,
            indent: 2,
        }
    }
}

/// Raw display config for intermediate parsing (`None` means "not specified").
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct RawDisplayConfig {
    pub na_sentinel: Option<String>,
    pub value_precision: Option<usize>,
    pub indent: Option<usize>,
}

impl DisplayConfig {
    /// Overlay wins where it specifies a value.
    pub fn merge(&self, overlay: &RawDisplayConfig) -> Self {
        Self {
            na_sentinel: overlay
                .na_sentinel
                .clone()
                .unwrap_or_else(|| self.na_sentinel.clone()),
            value_precision: overlay.value_precision.unwrap_or(self.value_precision),
            indent: overlay.indent.unwrap_or(self.indent),
        }
    }
}

/// Raw settings for intermediate parsing.
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct RawSettings {
    pub data_file: Option<PathBuf>,
    pub default_mode: Option<AllocationMode>,
    #[serde(default)]
    pub display: RawDisplayConfig,
}

/// Unified configuration for allotree.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(default)]
pub struct Settings {
    /// Table document used when no `--file` is given
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data_file: Option<PathBuf>,
    /// Mode used by `allocate` when `--mode` is omitted
    pub default_mode: AllocationMode,
    /// Rendering options
    pub display: DisplayConfig,
}

/// Get the XDG config directory for allotree.
pub fn global_config_dir() -> Option<PathBuf> {
    ProjectDirs::from("", "", "allotree").map(|dirs| dirs.config_dir().to_path_buf())
}

/// Get the path to the global config file.
pub fn global_config_path() -> Option<PathBuf> {
    global_config_dir().map(|dir| dir.join("allotree.toml"))
}

/// Get the path to the local config file in a directory.
pub fn local_config_path(dir: &Path) -> PathBuf {
    dir.join(".allotree.toml")
}

/// Load a TOML file into RawSettings for manual merging.
fn load_raw_settings(path: &Path) -> Result<RawSettings, ApplicationError> {
    let content = std::fs::read_to_string(path).map_err(|e| ApplicationError::Config {
        message: format!("read {}: {}", path.display(), e),
    })?;
    toml::from_str(&content).map_err(|e| ApplicationError::Config {
        message: format!("parse {}: {}", path.display(), e),
    })
}

impl Settings {
    /// Expand shell variables and tilde in path-like fields.
    ///
    /// Handles `~`, `$VAR`, and `${VAR}` syntax.
    fn expand_paths(&mut self) {
        if let Some(data_file) = &self.data_file {
            let expanded = expand_env_vars(data_file.to_string_lossy().as_ref());
            self.data_file = Some(PathBuf::from(expanded));
        }
    }

    /// Merge overlay config onto self (base): scalars from the overlay win if set.
    fn merge_with(&self, overlay: &RawSettings) -> Self {
        Self {
            data_file: overlay
                .data_file
                .clone()
                .or_else(|| self.data_file.clone()),
            default_mode: overlay.default_mode.unwrap_or(self.default_mode),
            display: self.display.merge(&overlay.display),
        }
    }

    /// Load settings with layered precedence.
    ///
    /// # Arguments
    /// * `local_dir` - Optional directory holding a `.allotree.toml`
    pub fn load(local_dir: Option<&Path>) -> Result<Self, ApplicationError> {
        Self::load_layers(global_config_path().as_deref(), local_dir)
    }

    /// Like [`Settings::load`], with an explicit global config file.
    pub fn load_layers(
        global_path: Option<&Path>,
        local_dir: Option<&Path>,
    ) -> Result<Self, ApplicationError> {
        // 1. Start with defaults
        let mut current = Self::default();

        // 2. Global config
        if let Some(global_path) = global_path {
            if global_path.exists() {
                let raw = load_raw_settings(global_path)?;
                current = current.merge_with(&raw);
            }
        }

        // 3. Local config
        if let Some(dir) = local_dir {
            let local_path = local_config_path(dir);
            if local_path.exists() {
                let raw = load_raw_settings(&local_path)?;
                current = current.merge_with(&raw);
            }
        }

        // 4. Environment variables (explicit override)
        current = Self::apply_env_overrides(current)?;

        current.expand_paths();

        Ok(current)
    }

    /// Apply ALLOTREE_* environment variables as explicit overrides.
    fn apply_env_overrides(mut settings: Self) -> Result<Self, ApplicationError> {
        // Use config crate just for env var parsing
        let builder = Config::builder().add_source(
            Environment::with_prefix("ALLOTREE")
                .prefix_separator("_")
                .separator("__")
                .try_parsing(true),
        );

        let config = builder.build().map_err(config_err)?;

        if let Ok(val) = config.get_string("data_file") {
            settings.data_file = Some(PathBuf::from(val));
        }
        if let Ok(val) = config.get_string("default_mode") {
            settings.default_mode = parse_mode(&val)?;
        }
        if let Ok(val) = config.get_string("display.na_sentinel") {
            settings.display.na_sentinel = val;
        }
        if let Ok(val) = config.get::<usize>("display.value_precision") {
            settings.display.value_precision = val;
        }
        if let Ok(val) = config.get::<usize>("display.indent") {
            settings.display.indent = val;
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
        r#"# allotree configuration
#
# Locations (by precedence, lowest to highest):
#   Global: ~/.config/allotree/allotree.toml
#   Local:  ./.allotree.toml
#   Env:    ALLOTREE_* environment variables (ALLOTREE_DISPLAY__INDENT=4)

# Table document used when --file is not given
# data_file = "~/budgets/table.json"

# Mode for `allocate` without --mode: "percentage" or "absolute"
# default_mode = "percentage"

[display]
# Variance shown for rows whose base value is 0
# na_sentinel = "N/A"

# Decimal digits for values
# value_precision = 2

# Spaces per nesting level
# indent = 2
"#
        .to_string()
    }
}

fn parse_mode(raw: &str) -> Result<AllocationMode, ApplicationError> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "percentage" | "percent" => Ok(AllocationMode::Percentage),
        "absolute" | "value" => Ok(AllocationMode::Absolute),
        other => Err(ApplicationError::Config {
            message: format!("unknown allocation mode: {other}"),
        }),
    }
}

fn config_err(e: ConfigError) -> ApplicationError {
    ApplicationError::Config {
        message: e.to_string(),
    }
}
