//! Configuration management with layered loading
//!
//! Precedence (lowest to highest):
//! 1. Compiled defaults
//! 2. Global config: `$XDG_CONFIG_HOME/rstree/rstree.toml`
//! 3. Local config: a file passed by the caller
//! 4. Environment variables: `RSTREE_*` prefix

use std::path::{Path, PathBuf};

use config::{Config, ConfigError, Environment};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};

use crate::application::ApplicationError;
use crate::domain::BuildOptions;

/// Record field names the builder reads.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct TreeKeys {
    pub id_key: String,
    pub title_key: String,
    pub children_key: String,
    /// Depth handed to the initializer for top-level records
    pub initial_depth: i32,
}

impl Default for TreeKeys {
    fn default() -> Self {
        Self {
            id_key: "id".into(),
            title_key: "title".into(),
            children_key: "children".into(),
            initial_depth: -1,
        }
    }
}

impl TreeKeys {
    /// Builder options using these keys and the default initializer.
    pub fn build_options<R>(&self) -> BuildOptions<R> {
        BuildOptions::new(&self.id_key, &self.title_key, &self.children_key)
            .with_initial_depth(self.initial_depth)
    }
}

/// Raw keys for intermediate parsing (`None` means "inherit").
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct RawTreeKeys {
    pub id_key: Option<String>,
    pub title_key: Option<String>,
    pub children_key: Option<String>,
    pub initial_depth: Option<i32>,
}

/// Raw settings for intermediate parsing.
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct RawSettings {
    pub keys: RawTreeKeys,
}

/// Unified configuration for rstree.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct Settings {
    pub keys: TreeKeys,
}

/// Get the XDG config directory for rstree.
pub fn global_config_dir() -> Option<PathBuf> {
    ProjectDirs::from("", "", "rstree").map(|dirs| dirs.config_dir().to_path_buf())
}

/// Get the path to the global config file.
pub fn global_config_path() -> Option<PathBuf> {
    global_config_dir().map(|dir| dir.join("rstree.toml"))
}

/// The `RSTREE_*` override source read from the process environment.
///
/// Callers can pin the variables with [`Environment::source`].
pub fn env_source() -> Environment {
    Environment::with_prefix("RSTREE")
        .prefix_separator("_")
        .separator("__")
}

/// Load a TOML file into RawSettings for manual merging.
fn load_raw_settings(path: &Path) -> Result<RawSettings, ApplicationError> {
    let content = std::fs::read_to_string(path).map_err(|source| ApplicationError::ConfigRead {
        path: path.to_path_buf(),
        source,
    })?;
    toml::from_str(&content).map_err(|e| ApplicationError::Config {
        message: format!("parse {}: {}", path.display(), e),
    })
}

impl Settings {
    /// Overlay wins for every field it sets.
    fn merge_with(&self, overlay: &RawSettings) -> Self {
        let keys = &overlay.keys;
        Self {
            keys: TreeKeys {
                id_key: keys.id_key.clone().unwrap_or_else(|| self.keys.id_key.clone()),
                title_key: keys
                    .title_key
                    .clone()
                    .unwrap_or_else(|| self.keys.title_key.clone()),
                children_key: keys
                    .children_key
                    .clone()
                    .unwrap_or_else(|| self.keys.children_key.clone()),
                initial_depth: keys.initial_depth.unwrap_or(self.keys.initial_depth),
            },
        }
    }

    /// Load settings with layered precedence.
    ///
    /// # Arguments
    /// * `local` - Optional config file layered on top of the global one.
    ///   A missing local file is an error; a missing global file is not.
    pub fn load(local: Option<&Path>) -> Result<Self, ApplicationError> {
        Self::load_layers(global_config_path().as_deref(), local, env_source())
    }

    /// Load settings from explicit layers.
    ///
    /// `global` is skipped when the file does not exist. `env` is the
    /// override source, normally [`env_source`].
    pub fn load_layers(
        global: Option<&Path>,
        local: Option<&Path>,
        env: Environment,
    ) -> Result<Self, ApplicationError> {
        let mut current = Self::default();

        if let Some(global_path) = global {
            if global_path.exists() {
                current = current.merge_with(&load_raw_settings(global_path)?);
            }
        }

        if let Some(local_path) = local {
            current = current.merge_with(&load_raw_settings(local_path)?);
        }

        Self::apply_env_overrides(current, env)
    }

    /// Load defaults plus one file, ignoring global config and environment.
    pub fn load_from(path: &Path) -> Result<Self, ApplicationError> {
        Ok(Self::default().merge_with(&load_raw_settings(path)?))
    }

    /// Apply RSTREE_* environment variables as explicit overrides.
    ///
    /// e.g. `RSTREE_KEYS__CHILDREN_KEY=employees`
    fn apply_env_overrides(mut settings: Self, env: Environment) -> Result<Self, ApplicationError> {
        let config = Config::builder()
            .add_source(env)
            .build()
            .map_err(config_err)?;

        if let Ok(val) = config.get_string("keys.id_key") {
            settings.keys.id_key = val;
        }
        if let Ok(val) = config.get_string("keys.title_key") {
            settings.keys.title_key = val;
        }
        if let Ok(val) = config.get_string("keys.children_key") {
            settings.keys.children_key = val;
        }
        if let Ok(val) = config.get_int("keys.initial_depth") {
            settings.keys.initial_depth = i32::try_from(val).map_err(|_| ApplicationError::Config {
                message: format!("keys.initial_depth out of range: {val}"),
            })?;
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
        r#"# rstree configuration
#
# Locations (by precedence, lowest to highest):
#   Global: ~/.config/rstree/rstree.toml
#   Local:  any file passed to Settings::load
#   Env:    RSTREE_* environment variables, e.g. RSTREE_KEYS__ID_KEY=uuid

[keys]
# Record field holding the node id (integer or string)
# id_key = "id"

# Record field holding the display title
# title_key = "title"

# Record field holding nested records
# children_key = "children"

# Depth passed for top-level records (-1 puts roots at level 0)
# initial_depth = -1
"#
        .to_string()
    }
}

fn config_err(e: ConfigError) -> ApplicationError {
    ApplicationError::Config {
        message: e.to_string(),
    }
}
