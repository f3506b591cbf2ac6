//! Engine configuration

use perfscan_findings::AggregateSettings;
use perfscan_isg::Budget;
use perfscan_rules::{RuleRegistry, RuleSettings};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Settings shared by every request an analyzer serves
///
/// Every field has a default, so an empty TOML document is a valid config.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct EngineConfig {
    /// Rule ids skipped for every request
    pub disabled_rules: Vec<String>,
    pub thresholds: Thresholds,
    /// Default per-request time budget
    pub budget_ms: Option<u64>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Thresholds {
    /// Call sites naming a function at which it counts as hot
    pub hot_fan_in: usize,
    /// Loop depth at which a match is raised one severity level
    pub escalation_depth: usize,
}

impl Default for Thresholds {
    fn default() -> Self {
        Self {
            hot_fan_in: 3,
            escalation_depth: 2,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    #[error("invalid configuration: {0}")]
    Parse(String),

    #[error("unknown rule `{id}` in disabled_rules")]
    UnknownRule { id: String },

    #[error("threshold `{name}` must be at least 1")]
    InvalidThreshold { name: &'static str },
}

impl ConfigError {
    pub fn code(&self) -> &'static str {
        match self {
            ConfigError::Parse(_) => "E-CONFIG-001",
            ConfigError::UnknownRule { .. } => "E-CONFIG-002",
            ConfigError::InvalidThreshold { .. } => "E-CONFIG-003",
        }
    }
}

impl EngineConfig {
    /// Parse a TOML document and validate it against the built-in catalog
    pub fn from_toml(text: &str) -> Result<Self, ConfigError> {
        let config: EngineConfig = toml::from_str(text).map_err(|e| ConfigError::Parse(e.to_string()))?;
        config.validate(RuleRegistry::builtin())?;
        Ok(config)
    }

    pub fn validate(&self, registry: &RuleRegistry) -> Result<(), ConfigError> {
        if let Some(id) = self.disabled_rules.iter().find(|id| !registry.contains(id)) {
            return Err(ConfigError::UnknownRule { id: id.clone() });
        }
        if self.thresholds.hot_fan_in == 0 {
            return Err(ConfigError::InvalidThreshold { name: "hot_fan_in" });
        }
        if self.thresholds.escalation_depth == 0 {
            return Err(ConfigError::InvalidThreshold {
                name: "escalation_depth",
            });
        }
        Ok(())
    }

    pub fn rule_settings(&self) -> RuleSettings {
        RuleSettings {
            hot_fan_in: self.thresholds.hot_fan_in,
            disabled: self.disabled_rules.iter().cloned().collect(),
        }
    }

    pub fn aggregate_settings(&self) -> AggregateSettings {
        AggregateSettings {
            escalation_depth: self.thresholds.escalation_depth,
        }
    }

    /// Budget for one request; `override_ms` wins over the configured default
    pub fn budget(&self, override_ms: Option<u64>) -> Budget {
        override_ms
            .or(self.budget_ms)
            .map_or_else(Budget::unlimited, Budget::from_millis)
    }
}
