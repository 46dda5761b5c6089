//! Check presets for common configurations.

use symlint_core::CheckBox;

use crate::{
    no_blocking_task_wait, no_console_logging, no_generated_models_in_controllers,
    no_local_clock, prefer_async_alternative, require_public_docs,
    restricted_http_client_surface, NoBlockingTaskWait, NoConsoleLogging,
    NoGeneratedModelsInControllers, NoLocalClock, PreferAsyncAlternative, RequirePublicDocs,
    RestrictedHttpClientSurface,
};

/// Preset configurations for symlint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Preset {
    /// Recommended checks with sensible defaults.
    #[default]
    Recommended,
    /// Every built-in check.
    Strict,
    /// Minimal checks for gradual adoption.
    Minimal,
}

impl Preset {
    /// Parses a preset name as written in `symlint.toml`.
    #[must_use]
    pub fn parse(name: &str) -> Option<Self> {
        match name {
            "recommended" => Some(Self::Recommended),
            "strict" => Some(Self::Strict),
            "minimal" => Some(Self::Minimal),
            _ => None,
        }
    }

    /// Returns the checks of this preset with default settings.
    #[must_use]
    pub fn rules(self) -> Vec<CheckBox> {
        match self {
            Self::Recommended => recommended_rules(),
            Self::Strict => strict_rules(),
            Self::Minimal => minimal_rules(),
        }
    }

    /// Returns the names of the checks in this preset.
    #[must_use]
    pub fn rule_names(self) -> &'static [&'static str] {
        match self {
            Self::Recommended => RECOMMENDED,
            Self::Strict => STRICT,
            Self::Minimal => MINIMAL,
        }
    }
}

const RECOMMENDED: &[&str] = &[
    no_local_clock::NAME,
    prefer_async_alternative::NAME,
    no_generated_models_in_controllers::NAME,
    no_console_logging::NAME,
    no_blocking_task_wait::NAME,
];

const STRICT: &[&str] = &[
    no_local_clock::NAME,
    prefer_async_alternative::NAME,
    no_generated_models_in_controllers::NAME,
    no_console_logging::NAME,
    no_blocking_task_wait::NAME,
    restricted_http_client_surface::NAME,
    require_public_docs::NAME,
];

const MINIMAL: &[&str] = &[prefer_async_alternative::NAME];

/// Returns the recommended set of checks.
///
/// Includes:
/// - `no-local-clock` (SL001)
/// - `prefer-async-alternative` (SL002)
/// - `no-generated-models-in-controllers` (SL003)
/// - `no-console-logging` (SL004)
/// - `no-blocking-task-wait` (SL005)
#[must_use]
pub fn recommended_rules() -> Vec<CheckBox> {
    vec![
        Box::new(NoLocalClock::new()),
        Box::new(PreferAsyncAlternative::new()),
        Box::new(NoGeneratedModelsInControllers::new()),
        Box::new(NoConsoleLogging::new()),
        Box::new(NoBlockingTaskWait::new()),
    ]
}

/// Returns the strict set of checks.
///
/// Includes all recommended checks plus:
/// - `restricted-http-client-surface` (SL006)
/// - `require-public-docs` (SL007), raised to warning
#[must_use]
pub fn strict_rules() -> Vec<CheckBox> {
    let mut rules = recommended_rules();
    rules.push(Box::new(RestrictedHttpClientSurface::new()));
    rules.push(Box::new(
        RequirePublicDocs::new().severity(symlint_core::Severity::Warning),
    ));
    rules
}

/// Returns the minimal set of checks.
///
/// For gradual adoption, only includes `prefer-async-alternative`.
#[must_use]
pub fn minimal_rules() -> Vec<CheckBox> {
    vec![Box::new(PreferAsyncAlternative::new())]
}

/// Returns all available checks with default settings.
#[must_use]
pub fn all_rules() -> Vec<CheckBox> {
    vec![
        Box::new(NoLocalClock::new()),
        Box::new(PreferAsyncAlternative::new()),
        Box::new(NoGeneratedModelsInControllers::new()),
        Box::new(NoConsoleLogging::new()),
        Box::new(NoBlockingTaskWait::new()),
        Box::new(RestrictedHttpClientSurface::new()),
        Box::new(RequirePublicDocs::new()),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    fn names(rules: &[CheckBox]) -> Vec<&'static str> {
        rules.iter().map(|r| r.name()).collect()
    }

    #[test]
    fn preset_rules_match_their_names() {
        for preset in [Preset::Recommended, Preset::Strict, Preset::Minimal] {
            assert_eq!(names(&preset.rules()), preset.rule_names());
        }
    }

    #[test]
    fn strict_is_every_rule() {
        assert_eq!(names(&strict_rules()), names(&all_rules()));
        let codes: Vec<_> = all_rules().iter().map(|r| r.code()).collect();
        assert_eq!(
            codes,
            vec!["SL001", "SL002", "SL003", "SL004", "SL005", "SL006", "SL007"]
        );
    }

    #[test]
    fn parses_preset_names() {
        assert_eq!(Preset::parse("strict"), Some(Preset::Strict));
        assert_eq!(Preset::parse("Strict"), None);
    }
}
