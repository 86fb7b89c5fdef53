//! Configuration management with layered loading
//!
//! Precedence (lowest to highest):
//! 1. Compiled defaults
//! 2. Global config: `$XDG_CONFIG_HOME/christree/christree.toml`
//! 3. Local config: `<dir>/.christree.toml` (working directory or `-C <dir>`)
//! 4. Environment variables: `CHRISTREE_*` prefix

use std::path::{Path, PathBuf};

use config::{Config, ConfigError, Environment};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::application::ApplicationError;
use crate::domain::{ChrisTree, MismatchPolicy, SelectOptions, TreeResult, CANDIDATE_CAP};

/// Unified configuration for christree.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct Settings {
    /// Key length in bytes (number of tree layers)
    pub depth: usize,
    /// Default output limit for `select`
    pub select_limit: usize,
    /// Layer candidates considered per selection
    pub candidate_cap: usize,
    /// Handling of candidates that miss the rest of a mask
    pub mismatch_policy: MismatchPolicy,
    /// Upper bound on structural nodes (unbounded when absent)
    pub node_budget: Option<usize>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            depth: 4,
            select_limit: 64,
            candidate_cap: CANDIDATE_CAP,
            mismatch_policy: MismatchPolicy::Skip,
            node_budget: None,
        }
    }
}

/// Raw settings for intermediate parsing (`None` → not specified, inherit).
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct RawSettings {
    pub depth: Option<usize>,
    pub select_limit: Option<usize>,
    pub candidate_cap: Option<usize>,
    pub mismatch_policy: Option<MismatchPolicy>,
    pub node_budget: Option<usize>,
}

/// Get the XDG config directory for christree.
pub fn global_config_dir() -> Option<PathBuf> {
    ProjectDirs::from("", "", "christree").map(|dirs| dirs.config_dir().to_path_buf())
}

/// Get the path to the global config file.
pub fn global_config_path() -> Option<PathBuf> {
    global_config_dir().map(|dir| dir.join("christree.toml"))
}

/// Get the path to the local config file in a directory.
pub fn local_config_path(dir: &Path) -> PathBuf {
    dir.join(".christree.toml")
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
    /// Overlay wins wherever it specifies a value.
    fn merge_with(&self, overlay: &RawSettings) -> Self {
        Self {
            depth: overlay.depth.unwrap_or(self.depth),
            select_limit: overlay.select_limit.unwrap_or(self.select_limit),
            candidate_cap: overlay.candidate_cap.unwrap_or(self.candidate_cap),
            mismatch_policy: overlay.mismatch_policy.unwrap_or(self.mismatch_policy),
            node_budget: overlay.node_budget.or(self.node_budget),
        }
    }

    /// Load settings with layered precedence.
    ///
    /// # Arguments
    /// * `local_dir` - Optional directory holding a `.christree.toml`
    pub fn load(local_dir: Option<&Path>) -> Result<Self, ApplicationError> {
        let mut current = Self::default();

        if let Some(global_path) = global_config_path() {
            if global_path.exists() {
                debug!("global config: {}", global_path.display());
                current = current.merge_with(&load_raw_settings(&global_path)?);
            }
        }

        if let Some(dir) = local_dir {
            let local_path = local_config_path(dir);
            if local_path.exists() {
                debug!("local config: {}", local_path.display());
                current = current.merge_with(&load_raw_settings(&local_path)?);
            }
        }

        current = Self::apply_env_overrides(current)?;
        current.validate()?;
        Ok(current)
    }

    /// Apply CHRISTREE_* environment variables as explicit overrides.
    fn apply_env_overrides(mut settings: Self) -> Result<Self, ApplicationError> {
        let config = Config::builder()
            .add_source(Environment::with_prefix("CHRISTREE").try_parsing(true))
            .build()
            .map_err(config_err)?;

        if let Ok(val) = config.get::<usize>("depth") {
            settings.depth = val;
        }
        if let Ok(val) = config.get::<usize>("select_limit") {
            settings.select_limit = val;
        }
        if let Ok(val) = config.get::<usize>("candidate_cap") {
            settings.candidate_cap = val;
        }
        if let Ok(val) = config.get_string("mismatch_policy") {
            settings.mismatch_policy = val.parse().map_err(|e| ApplicationError::Config {
                message: format!("CHRISTREE_MISMATCH_POLICY: {e}"),
            })?;
        }
        if let Ok(val) = config.get::<usize>("node_budget") {
            settings.node_budget = Some(val);
        }

        Ok(settings)
    }

    /// Reject values the tree cannot work with.
    pub fn validate(&self) -> Result<(), ApplicationError> {
        let problem = if self.depth < 1 {
            Some("depth must be at least 1")
        } else if self.select_limit < 1 {
            Some("select_limit must be at least 1")
        } else if self.candidate_cap < 1 {
            Some("candidate_cap must be at least 1")
        } else {
            None
        };
        match problem {
            Some(message) => Err(ApplicationError::Config {
                message: message.to_string(),
            }),
            None => Ok(()),
        }
    }

    /// Selection options derived from these settings.
    pub fn select_options(&self) -> SelectOptions {
        SelectOptions {
            limit: self.select_limit,
            candidate_cap: self.candidate_cap,
            on_mismatch: self.mismatch_policy,
        }
    }

    /// Create an empty tree shaped by these settings.
    pub fn build_tree<T>(&self) -> TreeResult<ChrisTree<T>> {
        match self.node_budget {
            Some(budget) => ChrisTree::with_node_budget(self.depth, budget),
            None => ChrisTree::init(self.depth),
        }
    }

    /// Show the effective configuration as TOML.
    pub fn to_toml(&self) -> Result<String, ApplicationError> {
        toml::to_string_pretty(self).map_err(|e| ApplicationError::Config {
            message: format!("serialize config: {e}"),
        })
    }

    /// Generate a template config file.
    pub fn template() -> String {
        r#"# christree configuration
#
# Locations (by precedence, lowest to highest):
#   Global: ~/.config/christree/christree.toml
#   Local:  <dir>/.christree.toml   (working directory or -C <dir>)
#   Env:    CHRISTREE_* environment variables

# Key length in bytes; every key must have exactly this many bytes
# depth = 4

# Default maximum number of payloads returned by select
# select_limit = 64

# Layer candidates considered per selection (extra ones are dropped)
# candidate_cap = 64

# Candidate missing the rest of a mask: "skip" it, or "abort" the whole query
# mismatch_policy = "skip"

# Upper bound on structural nodes; unbounded when unset
# node_budget = 100000
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
    fn given_defaults_when_validating_then_ok() {
        let settings = Settings::default();
        assert!(settings.validate().is_ok());
        assert_eq!(settings.depth, 4);
        assert_eq!(settings.candidate_cap, CANDIDATE_CAP);
    }

    #[test]
    fn given_overlay_when_merging_then_specified_fields_win() {
        let base = Settings::default();
        let overlay = RawSettings {
            depth: Some(6),
            mismatch_policy: Some(MismatchPolicy::Abort),
            ..RawSettings::default()
        };

        let merged = base.merge_with(&overlay);

        assert_eq!(merged.depth, 6);
        assert_eq!(merged.mismatch_policy, MismatchPolicy::Abort);
        assert_eq!(merged.select_limit, base.select_limit);
        assert_eq!(merged.node_budget, None);
    }

    #[test]
    fn given_zero_limit_when_validating_then_config_error() {
        let settings = Settings {
            select_limit: 0,
            ..Settings::default()
        };
        assert!(matches!(
            settings.validate(),
            Err(ApplicationError::Config { .. })
        ));
    }

    #[test]
    fn given_settings_when_building_tree_then_shape_follows() {
        let settings = Settings {
            depth: 3,
            node_budget: Some(10),
            ..Settings::default()
        };

        let tree = settings.build_tree::<String>().unwrap();

        assert_eq!(tree.depth(), 3);
        assert_eq!(tree.node_budget(), Some(10));
    }

    #[test]
    fn given_template_when_parsing_then_all_defaults() {
        let raw: RawSettings = toml::from_str(&Settings::template()).unwrap();
        assert!(raw.depth.is_none());
        assert!(raw.mismatch_policy.is_none());
    }

    #[test]
    fn given_settings_when_serialized_then_parses_back() {
        let settings = Settings {
            mismatch_policy: MismatchPolicy::Abort,
            ..Settings::default()
        };
        let text = settings.to_toml().unwrap();

        assert!(text.contains("mismatch_policy = \"abort\""));
        let raw: RawSettings = toml::from_str(&text).unwrap();
        assert_eq!(Settings::default().merge_with(&raw), settings);
    }
}
