//! Check restricting `HttpClient` to its asynchronous surface.
//!
//! # Rationale
//!
//! `HttpClient` exposes synchronous `Send` and stream helpers that block a
//! thread per request. Only the `*Async` members and a few configuration
//! properties are allowed.
//!
//! # Configuration
//!
//! - `allow`: additional exact member names to allow
//! - `allow-patterns`: additional whole-name regexes to allow

use symlint_core::{
    Cancelled, Check, CheckContext, Diagnostic, InvocationRule, InvocationRuleSet, NamePattern,
    RuleError, RuleMode, Severity,
};

use crate::invocation::check_references;

/// Rule code for restricted-http-client-surface.
pub const CODE: &str = "SL006";

/// Rule name for restricted-http-client-surface.
pub const NAME: &str = "restricted-http-client-surface";

const TARGET: &str = "System.Net.Http.HttpClient";
const ALLOWED_NAMES: &[&str] = &["Dispose", "BaseAddress", "Timeout", "DefaultRequestHeaders"];
const ALLOWED_PATTERNS: &[&str] = &[".*Async"];

/// Allows only the asynchronous surface of `HttpClient`.
#[derive(Debug, Clone)]
pub struct RestrictedHttpClientSurface {
    rules: InvocationRuleSet,
    /// Custom severity.
    pub severity: Severity,
}

impl Default for RestrictedHttpClientSurface {
    fn default() -> Self {
        Self::new()
    }
}

impl RestrictedHttpClientSurface {
    /// Creates a new check with default settings.
    #[must_use]
    pub fn new() -> Self {
        Self {
            rules: allow_set(&[], &[]).unwrap_or_default(),
            severity: Severity::Warning,
        }
    }

    /// Extends the allowed surface.
    ///
    /// # Errors
    ///
    /// Returns an error if a name is empty or a pattern is not a valid regex.
    pub fn allow(mut self, names: &[String], patterns: &[String]) -> Result<Self, RuleError> {
        self.rules = allow_set(names, patterns)?;
        Ok(self)
    }

    /// Sets the severity level.
    #[must_use]
    pub fn severity(mut self, severity: Severity) -> Self {
        self.severity = severity;
        self
    }
}

fn allow_set(
    extra_names: &[String],
    extra_patterns: &[String],
) -> Result<InvocationRuleSet, RuleError> {
    let names = ALLOWED_NAMES
        .iter()
        .copied()
        .chain(extra_names.iter().map(String::as_str))
        .map(NamePattern::exact);
    let patterns = ALLOWED_PATTERNS
        .iter()
        .copied()
        .chain(extra_patterns.iter().map(String::as_str))
        .map(NamePattern::regex);
    let patterns = names.chain(patterns).collect::<Result<Vec<_>, _>>()?;
    Ok(InvocationRuleSet::new(vec![InvocationRule::new(
        TARGET,
        patterns,
        RuleMode::Allow,
    )?]))
}

impl Check for RestrictedHttpClientSurface {
    fn name(&self) -> &'static str {
        NAME
    }

    fn code(&self) -> &'static str {
        CODE
    }

    fn description(&self) -> &'static str {
        "Allows only the async surface of HttpClient"
    }

    fn default_severity(&self) -> Severity {
        self.severity
    }

    fn check(&self, ctx: &CheckContext<'_>) -> Result<Vec<Diagnostic>, Cancelled> {
        check_references(self, &self.rules, ctx, |m| {
            format!(
                "`HttpClient.{}` is outside the allowed async surface",
                m.member_name
            )
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{reference_unit, run};
    use symlint_core::model::InMemoryModel;
    use symlint_core::TypeKind;

    fn fixture(names: &[&str]) -> (InMemoryModel, symlint_core::AnalysisUnit) {
        let mut b = InMemoryModel::builder();
        let client = b.add_type("System.Net.Http", "HttpClient", TypeKind::Class);
        let members: Vec<_> = names
            .iter()
            .map(|n| b.add_method(client, n, None))
            .collect();
        let unit = reference_unit(&mut b, &members);
        (b.build(), unit)
    }

    #[test]
    fn only_async_and_configuration_members_pass() {
        let (model, unit) = fixture(&["GetAsync", "Send", "Timeout", "GetStream", "Async"]);
        let diags = run(&RestrictedHttpClientSurface::new(), &model, &unit);

        let flagged: Vec<_> = diags.iter().map(|d| d.message_args[1].as_str()).collect();
        assert_eq!(flagged, vec!["Send", "GetStream"]);
    }

    #[test]
    fn extra_allowances_extend_the_surface() {
        let (model, unit) = fixture(&["Send", "GetStream", "CancelPendingRequests"]);
        let check = RestrictedHttpClientSurface::new()
            .allow(&["Send".to_string()], &["Cancel.*".to_string()])
            .unwrap();
        let diags = run(&check, &model, &unit);

        assert_eq!(diags.len(), 1);
        assert_eq!(diags[0].message_args[1], "GetStream");
    }

    #[test]
    fn invalid_pattern_is_rejected() {
        let result = RestrictedHttpClientSurface::new().allow(&[], &["(".to_string()]);
        assert!(matches!(result, Err(RuleError::InvalidRegex { .. })));
    }

    #[test]
    fn default_table_builds_one_rule() {
        let check = RestrictedHttpClientSurface::new();
        crate::test_support::assert_single_rule(
            &check.rules,
            "System.Net.Http.HttpClient",
            5,
            symlint_core::RuleMode::Allow,
        );
    }
}
