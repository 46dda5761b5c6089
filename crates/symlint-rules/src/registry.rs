//! Building checks from `symlint.toml`.

use symlint_core::{CheckBox, Config, ConfigError, GeneratedModelPolicy, RuleConfig, RuleError};

use crate::presets::Preset;
use crate::prefer_async_alternative::AwaitabilityMode;
use crate::{
    no_blocking_task_wait, no_console_logging, no_generated_models_in_controllers,
    no_local_clock, prefer_async_alternative, require_public_docs,
    restricted_http_client_surface, NoBlockingTaskWait, NoConsoleLogging,
    NoGeneratedModelsInControllers, NoLocalClock, PreferAsyncAlternative, RequirePublicDocs,
    RestrictedHttpClientSurface,
};

/// Errors raised while turning configuration into checks.
#[derive(Debug, thiserror::Error)]
pub enum RuleBuildError {
    /// `preset` names no known preset.
    #[error("unknown preset `{0}`, expected: recommended, strict, minimal")]
    UnknownPreset(String),

    /// A `[rules.<name>]` table names no built-in check.
    #[error("unknown rule `{0}`")]
    UnknownRule(String),

    /// A rule option failed validation.
    #[error("rules.{rule}: {source}")]
    InvalidOption {
        /// Rule whose options are invalid.
        rule: String,
        /// The underlying validation error.
        source: RuleError,
    },

    /// A rule option table has the wrong shape.
    #[error("rules.{rule}: {source}")]
    Options {
        /// Rule whose options are invalid.
        rule: String,
        /// The underlying deserialization error.
        source: ConfigError,
    },

    /// `awaitability` names no known mode.
    #[error("rules.{rule}.awaitability: unknown mode `{value}`, expected: model, task-like")]
    UnknownAwaitability {
        /// Rule whose option is invalid.
        rule: String,
        /// The invalid value.
        value: String,
    },
}

/// Names of every built-in check.
pub const RULE_NAMES: &[&str] = &[
    no_local_clock::NAME,
    prefer_async_alternative::NAME,
    no_generated_models_in_controllers::NAME,
    no_console_logging::NAME,
    no_blocking_task_wait::NAME,
    restricted_http_client_surface::NAME,
    require_public_docs::NAME,
];

/// Builds one built-in check by name, applying its options.
///
/// # Errors
///
/// Returns an error for an unknown name or invalid options.
pub fn build_rule(name: &str, options: Option<&RuleConfig>) -> Result<CheckBox, RuleBuildError> {
    let invalid = |source| RuleBuildError::InvalidOption {
        rule: name.to_string(),
        source,
    };
    let members = options
        .map(|o| o.get_str_array("members"))
        .filter(|m| !m.is_empty());

    let rule: CheckBox = match name {
        no_local_clock::NAME => match members {
            Some(m) => Box::new(NoLocalClock::new().members(&m).map_err(invalid)?),
            None => Box::new(NoLocalClock::new()),
        },
        no_console_logging::NAME => match members {
            Some(m) => Box::new(NoConsoleLogging::new().members(&m).map_err(invalid)?),
            None => Box::new(NoConsoleLogging::new()),
        },
        no_blocking_task_wait::NAME => match members {
            Some(m) => Box::new(NoBlockingTaskWait::new().members(&m).map_err(invalid)?),
            None => Box::new(NoBlockingTaskWait::new()),
        },
        restricted_http_client_surface::NAME => {
            let allow = options.map(|o| o.get_str_array("allow")).unwrap_or_default();
            let patterns = options
                .map(|o| o.get_str_array("allow-patterns"))
                .unwrap_or_default();
            Box::new(
                RestrictedHttpClientSurface::new()
                    .allow(&allow, &patterns)
                    .map_err(invalid)?,
            )
        }
        prefer_async_alternative::NAME => {
            let mut rule = PreferAsyncAlternative::new();
            if let Some(value) = options.and_then(|o| o.get_option::<String>("awaitability")) {
                let mode = AwaitabilityMode::parse(&value).ok_or_else(|| {
                    RuleBuildError::UnknownAwaitability {
                        rule: name.to_string(),
                        value,
                    }
                })?;
                rule = rule.awaitability(mode);
            }
            Box::new(rule)
        }
        no_generated_models_in_controllers::NAME => {
            let policy = match options {
                Some(o) => policy_options(o).map_err(|source| RuleBuildError::Options {
                    rule: name.to_string(),
                    source,
                })?,
                None => GeneratedModelPolicy::default(),
            };
            Box::new(NoGeneratedModelsInControllers::new().policy(policy))
        }
        require_public_docs::NAME => {
            let mut rule = RequirePublicDocs::new();
            if let Some(o) = options {
                rule = rule
                    .require_type_docs(o.get_bool("types", true))
                    .require_method_docs(o.get_bool("methods", true))
                    .require_property_docs(o.get_bool("properties", true));
                if let Some(attrs) = o.get_option::<Vec<String>>("exempt-attributes") {
                    rule = rule.exempt_attributes(attrs);
                }
            }
            Box::new(rule)
        }
        other => return Err(RuleBuildError::UnknownRule(other.to_string())),
    };
    Ok(rule)
}

/// `enabled` and `severity` never reach the options map.
fn policy_options(options: &RuleConfig) -> Result<GeneratedModelPolicy, ConfigError> {
    options.options_as()
}

/// Builds the checks selected by `config`: the preset's checks plus any
/// check explicitly enabled outside it.
///
/// Disabled checks are still returned; the engine filters them so that
/// severity overrides and disabling follow one code path.
///
/// # Errors
///
/// Returns an error for an unknown preset or rule, or invalid options.
pub fn configured_rules(config: &Config) -> Result<Vec<CheckBox>, RuleBuildError> {
    let preset = match config.preset.as_deref() {
        Some(name) => Preset::parse(name)
            .ok_or_else(|| RuleBuildError::UnknownPreset(name.to_string()))?,
        None => Preset::default(),
    };

    for name in config.rules.keys() {
        if !RULE_NAMES.contains(&name.as_str()) {
            return Err(RuleBuildError::UnknownRule(name.clone()));
        }
    }

    let selected = RULE_NAMES.iter().copied().filter(|name| {
        preset.rule_names().contains(name)
            || config
                .rule(name)
                .is_some_and(|r| r.enabled == Some(true))
    });

    let rules = selected
        .map(|name| build_rule(name, config.rule(name)))
        .collect::<Result<Vec<_>, _>>()?;
    tracing::debug!("Configured {} built-in checks ({preset:?} preset)", rules.len());
    Ok(rules)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{reference_unit, run};
    use symlint_core::model::InMemoryModel;
    use symlint_core::{Severity, TypeKind};

    fn names(rules: &[CheckBox]) -> Vec<&'static str> {
        rules.iter().map(|r| r.name()).collect()
    }

    #[test]
    fn default_config_uses_recommended() {
        let rules = configured_rules(&Config::default()).unwrap();
        assert_eq!(names(&rules), Preset::Recommended.rule_names());
    }

    #[test]
    fn explicitly_enabled_rules_join_the_preset() {
        let config = Config::parse(
            r#"
preset = "minimal"

[rules.require-public-docs]
enabled = true
types = false
"#,
        )
        .unwrap();
        let rules = configured_rules(&config).unwrap();
        assert_eq!(
            names(&rules),
            vec!["prefer-async-alternative", "require-public-docs"]
        );
    }

    #[test]
    fn members_option_reconfigures_matcher_rules() {
        let config = Config::parse(
            r#"
[rules.no-local-clock]
members = ["UtcNow"]
"#,
        )
        .unwrap();
        let rule = build_rule("no-local-clock", config.rule("no-local-clock")).unwrap();

        let mut b = InMemoryModel::builder();
        let date_time = b.add_type("System", "DateTime", TypeKind::Struct);
        let now = b.add_property(date_time, "Now", date_time);
        let utc_now = b.add_property(date_time, "UtcNow", date_time);
        let unit = reference_unit(&mut b, &[now, utc_now]);
        let model = b.build();

        let diags = run(rule.as_ref(), &model, &unit);
        assert_eq!(diags.len(), 1);
        assert_eq!(diags[0].message_args[1], "UtcNow");
        assert_eq!(diags[0].severity, Severity::Warning);
    }

    #[test]
    fn allow_options_extend_the_http_surface() {
        let config = Config::parse(
            r#"
[rules.restricted-http-client-surface]
allow = ["Send"]
allow-patterns = ["Cancel.*"]
"#,
        )
        .unwrap();
        let rule = build_rule(
            "restricted-http-client-surface",
            config.rule("restricted-http-client-surface"),
        )
        .unwrap();

        let mut b = InMemoryModel::builder();
        let client = b.add_type("System.Net.Http", "HttpClient", TypeKind::Class);
        let send = b.add_method(client, "Send", None);
        let cancel = b.add_method(client, "CancelPendingRequests", None);
        let stream = b.add_method(client, "GetStream", None);
        let unit = reference_unit(&mut b, &[send, cancel, stream]);
        let model = b.build();

        let diags = run(rule.as_ref(), &model, &unit);
        assert_eq!(diags.len(), 1);
        assert_eq!(diags[0].message_args[1], "GetStream");
    }

    #[test]
    fn invalid_configuration_is_rejected() {
        let unknown_preset = Config::parse(r#"preset = "paranoid""#).unwrap();
        assert!(matches!(
            configured_rules(&unknown_preset),
            Err(RuleBuildError::UnknownPreset(_))
        ));

        let unknown_rule = Config::parse("[rules.no-such-rule]\nenabled = true").unwrap();
        assert!(matches!(
            configured_rules(&unknown_rule),
            Err(RuleBuildError::UnknownRule(_))
        ));

        let bad_pattern = Config::parse(
            r#"
[rules.restricted-http-client-surface]
allow-patterns = ["("]
"#,
        )
        .unwrap();
        let err = build_rule(
            "restricted-http-client-surface",
            bad_pattern.rule("restricted-http-client-surface"),
        )
        .err()
        .unwrap();
        assert!(err
            .to_string()
            .starts_with("rules.restricted-http-client-surface:"));

        let bad_mode = Config::parse(
            r#"
[rules.prefer-async-alternative]
awaitability = "sometimes"
"#,
        )
        .unwrap();
        assert!(matches!(
            configured_rules(&bad_mode),
            Err(RuleBuildError::UnknownAwaitability { .. })
        ));
    }

    #[test]
    fn policy_options_deserialize() {
        let config = Config::parse(
            r#"
[rules.no-generated-models-in-controllers]
suffixes = ["proxy"]
"#,
        )
        .unwrap();
        let policy =
            policy_options(config.rule("no-generated-models-in-controllers").unwrap()).unwrap();
        assert_eq!(policy.suffixes, vec!["proxy"]);
        assert_eq!(policy.exact, vec!["graphql"]);
    }
}
