//! Engine configuration, persisted as TOML.
//!
//! Every field carries a serde default so partial config files are valid.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

pub type ConfigResult<T> = std::result::Result<T, ConfigError>;

/// Longest evolution look-back accepted by [`EngineConfig::validate`].
pub const MAX_EVOLUTION_WINDOW_DAYS: i64 = 3650;

/// Tunable thresholds and locations for a processing run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EngineConfig {
    /// Data directory for persistence. `None` for memory-only mode.
    #[serde(default)]
    pub data_dir: Option<PathBuf>,
    /// Minimum entity-set Jaccard similarity for two same-day news items to share a cluster.
    #[serde(default = "default_cluster_threshold")]
    pub cluster_threshold: f64,
    /// Minimum combined similarity for an evolution link.
    #[serde(default = "default_evolution_threshold")]
    pub evolution_threshold: f64,
    /// How far back (in days) the evolution linker looks for predecessors.
    #[serde(default = "default_evolution_window_days")]
    pub evolution_window_days: i64,
    /// Weight of entity overlap in event similarity; the remainder goes to type equality.
    #[serde(default = "default_evolution_entity_weight")]
    pub evolution_entity_weight: f64,
    /// Share of the earlier event's entities that must recur for `continues`/`evolves_into`.
    #[serde(default = "default_continuation_overlap")]
    pub continuation_overlap: f64,
    /// Minimum indicator matches before a risk category spawns a risk.
    #[serde(default = "default_min_risk_matches")]
    pub min_risk_matches: usize,
    /// Default hop bound for path search.
    #[serde(default = "default_max_path_length")]
    pub max_path_length: usize,
    /// Seed for label-propagation visiting order.
    #[serde(default = "default_label_propagation_seed")]
    pub label_propagation_seed: u64,
    /// Iteration cap for eigenvector power iteration.
    #[serde(default = "default_max_power_iterations")]
    pub max_power_iterations: usize,
}

fn default_cluster_threshold() -> f64 {
    0.3
}
fn default_evolution_threshold() -> f64 {
    0.3
}
fn default_evolution_window_days() -> i64 {
    7
}
fn default_evolution_entity_weight() -> f64 {
    0.7
}
fn default_continuation_overlap() -> f64 {
    0.7
}
fn default_min_risk_matches() -> usize {
    2
}
fn default_max_path_length() -> usize {
    4
}
fn default_label_propagation_seed() -> u64 {
    42
}
fn default_max_power_iterations() -> usize {
    100
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            data_dir: None,
            cluster_threshold: default_cluster_threshold(),
            evolution_threshold: default_evolution_threshold(),
            evolution_window_days: default_evolution_window_days(),
            evolution_entity_weight: default_evolution_entity_weight(),
            continuation_overlap: default_continuation_overlap(),
            min_risk_matches: default_min_risk_matches(),
            max_path_length: default_max_path_length(),
            label_propagation_seed: default_label_propagation_seed(),
            max_power_iterations: default_max_power_iterations(),
        }
    }
}

impl EngineConfig {
    /// Load a config from a TOML file and validate it.
    pub fn load(path: &Path) -> ConfigResult<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::Read {
            path: path.display().to_string(),
            source: e,
        })?;
        let config: Self = toml::from_str(&content).map_err(|e| ConfigError::Parse {
            path: path.display().to_string(),
            message: e.to_string(),
        })?;
        config.validate()?;
        Ok(config)
    }

    /// Write this config as pretty TOML.
    pub fn save(&self, path: &Path) -> ConfigResult<()> {
        let content = toml::to_string_pretty(self).map_err(|e| ConfigError::Parse {
            path: path.display().to_string(),
            message: e.to_string(),
        })?;
        std::fs::write(path, content).map_err(|e| ConfigError::Write {
            path: path.display().to_string(),
            source: e,
        })
    }

    /// Reject thresholds outside [0, 1], non-positive counts, and an
    /// evolution window beyond [`MAX_EVOLUTION_WINDOW_DAYS`].
    pub fn validate(&self) -> ConfigResult<()> {
        let unit = [
            ("cluster_threshold", self.cluster_threshold),
            ("evolution_threshold", self.evolution_threshold),
            ("evolution_entity_weight", self.evolution_entity_weight),
            ("continuation_overlap", self.continuation_overlap),
        ];
        for (name, value) in unit {
            if !(0.0..=1.0).contains(&value) {
                return Err(ConfigError::Invalid {
                    message: format!("{name} must be within [0, 1], got {value}"),
                });
            }
        }
        if !(1..=MAX_EVOLUTION_WINDOW_DAYS).contains(&self.evolution_window_days) {
            return Err(ConfigError::Invalid {
                message: format!(
                    "evolution_window_days must be within 1..={MAX_EVOLUTION_WINDOW_DAYS}, got {}",
                    self.evolution_window_days
                ),
            });
        }
        if self.min_risk_matches == 0 || self.max_power_iterations == 0 {
            return Err(ConfigError::Invalid {
                message: "min_risk_matches and max_power_iterations must be > 0".into(),
            });
        }
        Ok(())
    }
}
