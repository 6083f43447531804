//! Configuration management with layered loading
//!
//! Precedence (lowest to highest):
//! 1. Compiled defaults
//! 2. Global config: `$XDG_CONFIG_HOME/exprtree/exprtree.toml`
//! 3. Local config: `<dir>/.exprtree.toml` (usually the working directory)
//! 4. Environment variables: `EXPRTREE_*` prefix

use std::path::{Path, PathBuf};
use std::time::Duration;

use config::{Config, ConfigError, Environment};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::application::ApplicationError;
use crate::domain::Mode;

/// Pause before each node visit of a step-by-step playback.
pub const DEFAULT_STEP_DELAY_MS: u64 = 800;

pub const DEFAULT_EXPRESSION: &str = "(3+5)*(2-8)";

/// Unified configuration for exprtree.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct Settings {
    /// Expression used when a command is given none
    pub default_expression: String,
    /// Playback delay per visited node, in milliseconds
    pub step_delay_ms: u64,
    /// Reject unbalanced brackets, unknown characters and leftover operands
    pub strict: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            default_expression: DEFAULT_EXPRESSION.to_string(),
            step_delay_ms: DEFAULT_STEP_DELAY_MS,
            strict: false,
        }
    }
}

/// Raw settings for intermediate parsing (`None` → not specified, inherit).
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct RawSettings {
    pub default_expression: Option<String>,
    pub step_delay_ms: Option<u64>,
    pub strict: Option<bool>,
}

/// Get the XDG config directory for exprtree.
pub fn global_config_dir() -> Option<PathBuf> {
    ProjectDirs::from("", "", "exprtree").map(|dirs| dirs.config_dir().to_path_buf())
}

/// Get the path to the global config file.
pub fn global_config_path() -> Option<PathBuf> {
    global_config_dir().map(|dir| dir.join("exprtree.toml"))
}

/// Get the path to the local config file in a directory.
pub fn local_config_path(dir: &Path) -> PathBuf {
    dir.join(".exprtree.toml")
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
    pub fn mode(&self) -> Mode {
        if self.strict {
            Mode::Strict
        } else {
            Mode::Permissive
        }
    }

    pub fn step_delay(&self) -> Duration {
        Duration::from_millis(self.step_delay_ms)
    }

    /// Overlay wins wherever it specifies a value.
    fn merge_with(&self, overlay: &RawSettings) -> Self {
        Self {
            default_expression: overlay
                .default_expression
                .clone()
                .unwrap_or_else(|| self.default_expression.clone()),
            step_delay_ms: overlay.step_delay_ms.unwrap_or(self.step_delay_ms),
            strict: overlay.strict.unwrap_or(self.strict),
        }
    }

    /// Load settings with layered precedence.
    ///
    /// # Arguments
    /// * `local_dir` - Optional directory holding a `.exprtree.toml`
    pub fn load(local_dir: Option<&Path>) -> Result<Self, ApplicationError> {
        let global = global_config_path();
        let local = local_dir.map(local_config_path);
        Self::load_from(global.as_deref(), local.as_deref())
    }

    /// Load settings from explicit config file locations.
    ///
    /// Missing files are skipped; unreadable or invalid ones are errors.
    pub fn load_from(global: Option<&Path>, local: Option<&Path>) -> Result<Self, ApplicationError> {
        let mut current = Self::default();

        for path in [global, local].into_iter().flatten() {
            if path.exists() {
                debug!("loading config: {}", path.display());
                let raw = load_raw_settings(path)?;
                current = current.merge_with(&raw);
            }
        }

        Self::apply_env_overrides(current)
    }

    /// Apply EXPRTREE_* environment variables as explicit overrides.
    fn apply_env_overrides(mut settings: Self) -> Result<Self, ApplicationError> {
        let config = Config::builder()
            .add_source(Environment::with_prefix("EXPRTREE").separator("__"))
            .build()
            .map_err(config_err)?;

        if let Ok(val) = config.get_string("default_expression") {
            settings.default_expression = val;
        }
        match config.get::<u64>("step_delay_ms") {
            Ok(val) => settings.step_delay_ms = val,
            Err(ConfigError::NotFound(_)) => {}
            Err(e) => return Err(config_err(e)),
        }
        match config.get_bool("strict") {
            Ok(val) => settings.strict = val,
            Err(ConfigError::NotFound(_)) => {}
            Err(e) => return Err(config_err(e)),
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
        format!(
            r#"# exprtree configuration
#
# Locations (by precedence, lowest to highest):
#   Global: ~/.config/exprtree/exprtree.toml
#   Local:  ./.exprtree.toml
#   Env:    EXPRTREE_* environment variables

# Expression used when none is given on the command line
# default_expression = "{DEFAULT_EXPRESSION}"

# Pause before each node visit of `exprtree steps`, in milliseconds
# step_delay_ms = {DEFAULT_STEP_DELAY_MS}

# Reject unbalanced brackets, unknown characters and leftover operands
# strict = false
"#
        )
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
    fn given_defaults_when_created_then_permissive_with_default_pacing() {
        let settings = Settings::default();
        assert_eq!(settings.mode(), Mode::Permissive);
        assert_eq!(settings.step_delay(), Duration::from_millis(800));
        assert_eq!(settings.default_expression, "(3+5)*(2-8)");
    }

    #[test]
    fn given_partial_overlay_when_merging_then_unspecified_fields_kept() {
        let base = Settings::default();
        let overlay = RawSettings {
            step_delay_ms: Some(10),
            ..Default::default()
        };

        let merged = base.merge_with(&overlay);

        assert_eq!(merged.step_delay_ms, 10);
        assert_eq!(merged.default_expression, base.default_expression);
        assert!(!merged.strict);
    }

    #[test]
    fn given_env_vars_when_loading_then_override_files() {
        std::env::set_var("EXPRTREE_STEP_DELAY_MS", "25");
        std::env::set_var("EXPRTREE_STRICT", "true");

        let settings = Settings::load_from(None, None).expect("load settings");

        std::env::remove_var("EXPRTREE_STEP_DELAY_MS");
        std::env::remove_var("EXPRTREE_STRICT");
        assert_eq!(settings.step_delay_ms, 25);
        assert_eq!(settings.mode(), Mode::Strict);
    }

    #[test]
    fn given_template_when_parsed_then_is_valid_toml() {
        let raw: RawSettings = toml::from_str(&Settings::template()).expect("parse template");
        assert!(raw.step_delay_ms.is_none());
    }
}
