//! Check forbidding console output as a logging mechanism.
//!
//! # Rationale
//!
//! Writes to `System.Console` bypass the logging pipeline: no levels, no
//! structured fields, no sinks. Use an `ILogger`.
//!
//! # Configuration
//!
//! - `members`: member names to forbid (default: `Write`, `WriteLine`)

use symlint_core::{
    Cancelled, Check, CheckContext, Diagnostic, InvocationRuleSet, RuleError, Severity,
};

use crate::invocation::{as_strs, check_references, deny_set};

/// Rule code for no-console-logging.
pub const CODE: &str = "SL004";

/// Rule name for no-console-logging.
pub const NAME: &str = "no-console-logging";

const TARGET: &str = "System.Console";
const DEFAULT_MEMBERS: &[&str] = &["Write", "WriteLine"];

/// Forbids `Console.Write*` calls.
#[derive(Debug, Clone)]
pub struct NoConsoleLogging {
    rules: InvocationRuleSet,
    /// Custom severity.
    pub severity: Severity,
}

impl Default for NoConsoleLogging {
    fn default() -> Self {
        Self::new()
    }
}

impl NoConsoleLogging {
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

impl Check for NoConsoleLogging {
    fn name(&self) -> &'static str {
        NAME
    }

    fn code(&self) -> &'static str {
        CODE
    }

    fn description(&self) -> &'static str {
        "Forbids Console.Write/WriteLine; use a logger"
    }

    fn default_severity(&self) -> Severity {
        self.severity
    }

    fn remediation(&self) -> &'static str {
        "2min"
    }

    fn check(&self, ctx: &CheckContext<'_>) -> Result<Vec<Diagnostic>, Cancelled> {
        check_references(self, &self.rules, ctx, |m| {
            format!("`Console.{}` used for logging; use an ILogger", m.member_name)
        })
    }
}
