//! DTO → Domain model conversion with validation.

use crate::matcher::{InvocationRule, NamePattern, RuleMode};
use crate::types::Severity;

use super::config_dto::{DeclarativeConfigDto, InvocationRuleDto};
use super::model::{DeclarativeConfig, DeclaredRule, ModelError, RuleCode, RuleName};

/// Errors during DTO → Domain conversion.
#[derive(Debug, thiserror::Error)]
pub enum LoadError {
    /// A field-level validation error.
    #[error("{context}: {source}")]
    Validation {
        /// Where the error occurred (e.g., "invocation-rule[0].names[1]").
        context: String,
        /// The underlying model error.
        source: ModelError,
    },

    /// Unknown severity string.
    #[error("{context}: unknown severity `{value}`, expected: error, warning, info")]
    UnknownSeverity {
        /// Where the error occurred.
        context: String,
        /// The invalid value.
        value: String,
    },

    /// Cross-reference errors from aggregate root construction.
    #[error("configuration validation errors:\n{}", format_errors(.0))]
    CrossRef(Vec<ModelError>),
}

fn format_errors(errors: &[ModelError]) -> String {
    errors
        .iter()
        .map(|e| format!("  - {e}"))
        .collect::<Vec<_>>()
        .join("\n")
}

/// Converts a `DeclarativeConfigDto` to a validated `DeclarativeConfig`.
///
/// # Errors
///
/// Returns the first error encountered during conversion.
pub fn load(dto: DeclarativeConfigDto) -> Result<DeclarativeConfig, LoadError> {
    let rules = dto
        .invocation_rule
        .into_iter()
        .enumerate()
        .map(|(i, r)| convert_rule(r, i))
        .collect::<Result<Vec<_>, _>>()?;

    tracing::debug!("Loaded {} declarative invocation rules", rules.len());
    DeclarativeConfig::new(rules).map_err(LoadError::CrossRef)
}

fn convert_rule(dto: InvocationRuleDto, index: usize) -> Result<DeclaredRule, LoadError> {
    let ctx = format!("invocation-rule[{index}]");
    let invalid = |field: String| move |source: ModelError| LoadError::Validation {
        context: field,
        source,
    };

    let name = RuleName::new(&dto.name).map_err(invalid(format!("{ctx}.name")))?;
    let ctx = format!("invocation-rule '{name}'");

    let code = match dto.code.as_deref() {
        Some(code) => RuleCode::new(code).map_err(invalid(format!("{ctx}.code")))?,
        None => RuleCode::default(),
    };

    let exact = dto.names.iter().enumerate().map(|(i, n)| {
        NamePattern::exact(n)
            .map_err(ModelError::from)
            .map_err(invalid(format!("{ctx}.names[{i}]")))
    });
    let regexes = dto.patterns.iter().enumerate().map(|(i, p)| {
        NamePattern::regex(p)
            .map_err(ModelError::from)
            .map_err(invalid(format!("{ctx}.patterns[{i}]")))
    });
    let patterns = exact.chain(regexes).collect::<Result<Vec<_>, _>>()?;

    let mode = match dto.mode.as_str() {
        "deny" => RuleMode::Deny,
        "allow" => RuleMode::Allow,
        other => {
            return Err(LoadError::Validation {
                context: format!("{ctx}.mode"),
                source: ModelError::UnknownMode {
                    value: other.to_string(),
                },
            })
        }
    };

    let rule = InvocationRule::new(&dto.target_type, patterns, mode)
        .map_err(ModelError::from)
        .map_err(invalid(ctx.clone()))?;

    if dto.message.trim().is_empty() {
        return Err(LoadError::Validation {
            context: format!("{ctx}.message"),
            source: ModelError::EmptyMessage,
        });
    }

    let severity = parse_severity(&dto.severity, &ctx)?;

    Ok(DeclaredRule::new(
        name,
        code,
        rule,
        dto.message,
        severity,
        dto.remediation,
    ))
}

fn parse_severity(value: &str, context: &str) -> Result<Severity, LoadError> {
    Severity::parse(value).ok_or_else(|| LoadError::UnknownSeverity {
        context: context.to_string(),
        value: value.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse_and_load(toml_str: &str) -> Result<DeclarativeConfig, LoadError> {
        let dto: DeclarativeConfigDto = toml::from_str(toml_str).unwrap();
        load(dto)
    }

    // -- Happy path --

    #[test]
    fn load_empty_config() {
        let config = parse_and_load("").unwrap();
        assert!(config.is_empty());
    }

    #[test]
    fn load_full_config() {
        let config = parse_and_load(
            r#"
[[invocation-rule]]
name = "no-thread-sleep"
type = "System.Threading.Thread"
names = ["Sleep"]
patterns = ["Spin.*"]
message = "Blocking the thread"
severity = "error"
remediation = "10min"

[[invocation-rule]]
name = "only-logger-log"
code = "ACME7"
type = "Acme.Logging.Logger<T>"
names = ["Log"]
mode = "allow"
message = "Use Logger.Log"
"#,
        )
        .unwrap();

        let rules = config.rules();
        assert_eq!(rules.len(), 2);
        assert_eq!(rules[0].code(), "SLD001");
        assert_eq!(rules[0].severity(), Severity::Error);
        assert_eq!(rules[0].remediation(), Some("10min"));
        assert!(!rules[0].rule().verify("System.Threading.Thread", "SpinWait"));
        assert_eq!(rules[1].code(), "ACME7");
        assert_eq!(rules[1].rule().target_type(), "Acme.Logging.Logger");
        assert_eq!(rules[1].rule().mode(), RuleMode::Allow);
    }

    // -- Error cases --

    #[test]
    fn load_rejects_empty_pattern_set() {
        let result = parse_and_load(
            r#"
[[invocation-rule]]
name = "nothing"
type = "A.B"
message = "m"
"#,
        );
        assert!(matches!(
            result,
            Err(LoadError::Validation {
                source: ModelError::Rule(_),
                ..
            })
        ));
    }

    #[test]
    fn load_rejects_invalid_regex() {
        let err = parse_and_load(
            r#"
[[invocation-rule]]
name = "bad-regex"
type = "A.B"
patterns = ["(unclosed"]
message = "m"
"#,
        )
        .unwrap_err();
        assert!(err.to_string().starts_with("invocation-rule 'bad-regex'.patterns[0]"));
    }

    #[test]
    fn load_rejects_invalid_name() {
        let result = parse_and_load(
            r#"
[[invocation-rule]]
name = "Bad Name"
type = "A.B"
names = ["C"]
message = "m"
"#,
        );
        assert!(matches!(result, Err(LoadError::Validation { .. })));
    }

    #[test]
    fn load_rejects_unknown_mode_and_severity() {
        let mode = parse_and_load(
            r#"
[[invocation-rule]]
name = "x"
type = "A.B"
names = ["C"]
mode = "maybe"
message = "m"
"#,
        );
        assert!(matches!(
            mode,
            Err(LoadError::Validation {
                source: ModelError::UnknownMode { .. },
                ..
            })
        ));

        let severity = parse_and_load(
            r#"
[[invocation-rule]]
name = "x"
type = "A.B"
names = ["C"]
message = "m"
severity = "critical"
"#,
        );
        assert!(matches!(severity, Err(LoadError::UnknownSeverity { .. })));
    }

    #[test]
    fn load_rejects_duplicate_names() {
        let result = parse_and_load(
            r#"
[[invocation-rule]]
name = "x"
type = "A.B"
names = ["C"]
message = "m"

[[invocation-rule]]
name = "x"
type = "A.D"
names = ["E"]
message = "m"
"#,
        );
        assert!(matches!(result, Err(LoadError::CrossRef(errs)) if errs.len() == 1));
    }
}
