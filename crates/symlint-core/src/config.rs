//! Configuration types for symlint.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::PathBuf;

use crate::types::Severity;

/// Top-level configuration for symlint.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// Preset to use (e.g., "recommended", "strict", "minimal").
    #[serde(default)]
    pub preset: Option<String>,

    /// Severity threshold for a failing run (default: "error").
    #[serde(default)]
    pub fail_on: Option<String>,

    /// Analyzer configuration.
    #[serde(default)]
    pub analyzer: AnalyzerConfig,

    /// Per-rule configurations.
    #[serde(default)]
    pub rules: HashMap<String, RuleConfig>,
}

impl Config {
    /// Creates a new default configuration.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Loads configuration from a TOML file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed.
    pub fn from_file(path: &std::path::Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::Io {
            path: path.to_path_buf(),
            source: e,
        })?;
        Self::parse(&content)
    }

    /// Parses configuration from a TOML string.
    ///
    /// Declarative `[[invocation-rule]]` tables are ignored here; they are
    /// read by [`crate::declarative::load_rules_from_toml`].
    ///
    /// # Errors
    ///
    /// Returns an error if the TOML is invalid.
    pub fn parse(content: &str) -> Result<Self, ConfigError> {
        toml::from_str(content).map_err(|e| ConfigError::Parse {
            message: e.to_string(),
        })
    }

    /// Checks if a rule is enabled.
    #[must_use]
    pub fn is_rule_enabled(&self, rule_name: &str) -> bool {
        self.rules
            .get(rule_name)
            .map_or(true, |c| c.enabled.unwrap_or(true))
    }

    /// Gets the severity override for a rule.
    #[must_use]
    pub fn rule_severity(&self, rule_name: &str) -> Option<Severity> {
        self.rules.get(rule_name).and_then(|c| c.severity)
    }

    /// Gets the configuration block of a rule.
    #[must_use]
    pub fn rule(&self, rule_name: &str) -> Option<&RuleConfig> {
        self.rules.get(rule_name)
    }

    /// Returns the failing severity threshold.
    ///
    /// # Errors
    ///
    /// Returns an error if `fail_on` names an unknown severity.
    pub fn fail_threshold(&self) -> Result<Severity, ConfigError> {
        match self.fail_on.as_deref() {
            None => Ok(Severity::Error),
            Some(value) => Severity::parse(value).ok_or_else(|| ConfigError::UnknownSeverity {
                value: value.to_string(),
            }),
        }
    }
}

/// Analyzer-level configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AnalyzerConfig {
    /// Glob patterns matched against unit file paths to skip.
    #[serde(default)]
    pub exclude: Vec<String>,

    /// Maximum number of units analyzed in parallel (default: rayon's).
    #[serde(default)]
    pub parallelism: Option<usize>,
}

/// Per-rule configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RuleConfig {
    /// Whether this rule is enabled.
    #[serde(default)]
    pub enabled: Option<bool>,

    /// Severity override for this rule.
    #[serde(default)]
    pub severity: Option<Severity>,

    /// Rule-specific options as key-value pairs.
    #[serde(flatten)]
    pub options: HashMap<String, toml::Value>,
}

impl RuleConfig {
    /// Gets an option value as a specific type.
    #[must_use]
    pub fn get_option<T: serde::de::DeserializeOwned>(&self, key: &str) -> Option<T> {
        self.options
            .get(key)
            .and_then(|v| v.clone().try_into().ok())
    }

    /// Gets a boolean option with a default value.
    #[must_use]
    pub fn get_bool(&self, key: &str, default: bool) -> bool {
        self.options
            .get(key)
            .and_then(toml::Value::as_bool)
            .unwrap_or(default)
    }

    /// Gets a string array option.
    #[must_use]
    pub fn get_str_array(&self, key: &str) -> Vec<String> {
        self.options
            .get(key)
            .and_then(|v| v.as_array())
            .map(|arr| {
                arr.iter()
                    .filter_map(|v| v.as_str().map(String::from))
                    .collect()
            })
            .unwrap_or_default()
    }

    /// Deserializes all options into `T`.
    ///
    /// # Errors
    ///
    /// Returns an error if the options do not fit `T`.
    pub fn options_as<T: serde::de::DeserializeOwned>(&self) -> Result<T, ConfigError> {
        let table: toml::Table = self
            .options
            .iter()
            .map(|(k, v)| (k.clone(), v.clone()))
            .collect();
        toml::Value::Table(table)
            .try_into()
            .map_err(|e: toml::de::Error| ConfigError::Parse {
                message: e.to_string(),
            })
    }
}

/// Configuration errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// IO error reading config file.
    #[error("Failed to read config file {path}: {source}")]
    Io {
        /// Path that failed to read.
        path: PathBuf,
        /// Underlying IO error.
        source: std::io::Error,
    },

    /// Parse error in config file.
    #[error("Failed to parse config: {message}")]
    Parse {
        /// Parse error message.
        message: String,
    },

    /// `fail_on` names no known severity.
    #[error("unknown severity `{value}`, expected: error, warning, info")]
    UnknownSeverity {
        /// The invalid value.
        value: String,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config() {
        let config = Config::default();
        assert!(config.analyzer.exclude.is_empty());
        assert!(config.rules.is_empty());
        assert_eq!(config.fail_threshold().unwrap(), Severity::Error);
    }

    #[test]
    fn parse_config() {
        let toml = r#"
preset = "strict"
fail_on = "warning"

[analyzer]
exclude = ["**/Generated/**"]
parallelism = 2

[rules.no-local-clock]
enabled = true
severity = "error"
members = ["Now", "UtcNow"]

[rules.require-public-docs]
enabled = false

[[invocation-rule]]
name = "ignored-here"
code = "X"
type = "A.B"
names = ["C"]
message = "m"
"#;

        let config = Config::parse(toml).expect("Failed to parse");
        assert_eq!(config.preset.as_deref(), Some("strict"));
        assert_eq!(config.fail_threshold().unwrap(), Severity::Warning);
        assert_eq!(config.analyzer.parallelism, Some(2));
        assert!(config.is_rule_enabled("no-local-clock"));
        assert!(!config.is_rule_enabled("require-public-docs"));
        assert!(config.is_rule_enabled("unconfigured"));
        assert_eq!(config.rule_severity("no-local-clock"), Some(Severity::Error));

        let rule = config.rule("no-local-clock").unwrap();
        assert_eq!(rule.get_str_array("members"), vec!["Now", "UtcNow"]);
        assert!(rule.get_bool("missing", true));
    }

    #[test]
    fn unknown_fail_on_is_rejected() {
        let config = Config::parse(r#"fail_on = "fatal""#).unwrap();
        assert!(matches!(
            config.fail_threshold(),
            Err(ConfigError::UnknownSeverity { .. })
        ));
    }

    #[test]
    fn options_deserialize_into_struct() {
        #[derive(Deserialize)]
        struct Opts {
            members: Vec<String>,
        }
        let config = Config::parse(
            r#"
[rules.x]
members = ["A"]
"#,
        )
        .unwrap();
        let opts: Opts = config.rule("x").unwrap().options_as().unwrap();
        assert_eq!(opts.members, vec!["A"]);
    }
}
