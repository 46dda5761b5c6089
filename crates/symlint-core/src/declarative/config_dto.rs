//! TOML deserialization types (DTO layer).
//!
//! These types exist solely for serde deserialization.
//! They are converted to domain model types via the loader.

use serde::Deserialize;

/// Raw TOML representation of declarative rules.
///
/// Extends the base `Config` with `[[invocation-rule]]` sections.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct DeclarativeConfigDto {
    /// Invocation rule tables.
    #[serde(rename = "invocation-rule", default)]
    pub invocation_rule: Vec<InvocationRuleDto>,
}

/// TOML representation of one invocation rule.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct InvocationRuleDto {
    /// Rule name (e.g., "no-thread-sleep").
    pub name: String,
    /// Diagnostic code (default: "SLD001").
    #[serde(default)]
    pub code: Option<String>,
    /// Fully-qualified target type (e.g., "System.Threading.Thread").
    #[serde(rename = "type")]
    pub target_type: String,
    /// Exact member names.
    #[serde(default)]
    pub names: Vec<String>,
    /// Whole-name regular expressions.
    #[serde(default)]
    pub patterns: Vec<String>,
    /// "deny" (default) or "allow".
    #[serde(default = "default_mode_str")]
    pub mode: String,
    /// Violation message.
    pub message: String,
    /// Severity (default: "warning").
    #[serde(default = "default_severity_str")]
    pub severity: String,
    /// Remediation-cost estimate (e.g., "10min").
    #[serde(default)]
    pub remediation: Option<String>,
}

fn default_mode_str() -> String {
    "deny".to_string()
}

fn default_severity_str() -> String {
    "warning".to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn deserialize_empty() {
        let dto: DeclarativeConfigDto = toml::from_str("").unwrap();
        assert!(dto.invocation_rule.is_empty());
    }

    #[test]
    fn deserialize_full_rule() {
        let toml_str = r#"
preset = "recommended"

[rules.no-local-clock]
enabled = false

[[invocation-rule]]
name = "no-thread-sleep"
code = "ACME001"
type = "System.Threading.Thread"
names = ["Sleep"]
patterns = ["Spin.*"]
message = "Blocking the thread"
severity = "error"
remediation = "10min"

[[invocation-rule]]
name = "only-logger-log"
type = "Acme.Logging.Logger"
names = ["Log"]
mode = "allow"
message = "Use Logger.Log"
"#;
        let dto: DeclarativeConfigDto = toml::from_str(toml_str).unwrap();
        assert_eq!(dto.invocation_rule.len(), 2);
        let first = &dto.invocation_rule[0];
        assert_eq!(first.target_type, "System.Threading.Thread");
        assert_eq!(first.patterns, vec!["Spin.*"]);
        assert_eq!(first.code.as_deref(), Some("ACME001"));
        let second = &dto.invocation_rule[1];
        assert_eq!(second.mode, "allow");
        assert_eq!(second.severity, "warning");
        assert!(second.remediation.is_none());
    }

    #[test]
    fn unknown_fields_are_rejected() {
        let toml_str = r#"
[[invocation-rule]]
name = "typo"
type = "A.B"
name_patterns = ["C"]
message = "m"
"#;
        assert!(toml::from_str::<DeclarativeConfigDto>(toml_str).is_err());
    }
}
