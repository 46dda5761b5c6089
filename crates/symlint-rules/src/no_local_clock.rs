//! Check forbidding reads of the local wall clock.
//!
//! # Rationale
//!
//! `DateTime.Now` and `DateTime.Today` depend on the machine's time zone,
//! which makes code behave differently across servers and is hard to test.
//! Use `DateTime.UtcNow` or an injected clock.
//!
//! # Configuration
//!
//! - `members`: member names to forbid (default: `Now`, `Today`)

use symlint_core::{
    Cancelled, Check, CheckContext, Diagnostic, InvocationRuleSet, RuleError, Severity,
};

use crate::invocation::{as_strs, check_references, deny_set};

/// Rule code for no-local-clock.
pub const CODE: &str = "SL001";

/// Rule name for no-local-clock.
pub const NAME: &str = "no-local-clock";

const TARGET: &str = "System.DateTime";
const DEFAULT_MEMBERS: &[&str] = &["Now", "Today"];

/// Forbids local-time reads through `System.DateTime`.
#[derive(Debug, Clone)]
pub struct NoLocalClock {
    rules: InvocationRuleSet,
    /// Custom severity.
    pub severity: Severity,
}

impl Default for NoLocalClock {
    fn default() -> Self {
        Self::new()
    }
}

impl NoLocalClock {
    /// Creates a new check with default settings.
    #[must_use]
    pub fn new() -> Self {
        Self {
            rules: deny_set(TARGET, DEFAULT_MEMBERS).unwrap_or_default(),
            severity: Severity::Warning,
        }
    }

    /// Replaces the forbidden member names.
    ///
    /// # Errors
    ///
    /// Returns an error if `members` is empty or contains an empty name.
    pub fn members(mut self, members: &[String]) -> Result<Self, RuleError> {
        self.rules = deny_set(TARGET, &as_strs(members))?;
        Ok(self)
    }

    /// Sets the severity level.
    #[must_use]
    pub fn severity(mut self, severity: Severity) -> Self {
        self.severity = severity;
        self
    }
}

impl Check for NoLocalClock {
    fn name(&self) -> &'static str {
        NAME
    }

    fn code(&self) -> &'static str {
        CODE
    }

    fn description(&self) -> &'static str {
        "Forbids DateTime.Now/Today; use UTC or an injected clock"
    }

    fn default_severity(&self) -> Severity {
        self.severity
    }

    fn check(&self, ctx: &CheckContext<'_>) -> Result<Vec<Diagnostic>, Cancelled> {
        check_references(self, &self.rules, ctx, |m| {
            format!(
                "`{}.{}` reads the local clock; use `UtcNow` or an injected clock",
                m.type_name, m.member_name
            )
        })
    }
}
