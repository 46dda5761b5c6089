//! The check trait implemented by every convention check.

use crate::cancel::Cancelled;
use crate::context::CheckContext;
use crate::types::{Diagnostic, Location, Severity};

/// A convention check run against each analysis unit.
///
/// Checks are configured once and then shared read-only across threads.
///
/// # Example
///
/// ```
/// use symlint_core::{Cancelled, Check, CheckContext, Diagnostic};
///
/// pub struct NoEmptyUnits;
///
/// impl Check for NoEmptyUnits {
///     fn name(&self) -> &'static str { "no-empty-units" }
///     fn code(&self) -> &'static str { "X001" }
///
///     fn check(&self, ctx: &CheckContext<'_>) -> Result<Vec<Diagnostic>, Cancelled> {
///         if ctx.unit.is_empty() {
///             return Ok(vec![self.diagnostic(ctx.unit.location(1, 1), "unit has no sites")]);
///         }
///         Ok(Vec::new())
///     }
/// }
/// ```
pub trait Check: Send + Sync {
    /// Returns the kebab-case name of this check (e.g., "no-local-clock").
    fn name(&self) -> &'static str;

    /// Returns the check code (e.g., "SL001").
    fn code(&self) -> &'static str;

    /// Returns a brief description of what this check enforces.
    fn description(&self) -> &'static str {
        ""
    }

    /// Returns the default severity for diagnostics from this check.
    fn default_severity(&self) -> Severity {
        Severity::Warning
    }

    /// Returns the remediation-cost estimate attached to every diagnostic.
    fn remediation(&self) -> &'static str {
        "5min"
    }

    /// Checks a single unit.
    ///
    /// # Errors
    ///
    /// Returns [`Cancelled`] when the run is cancelled mid-check. Partial
    /// results are discarded.
    fn check(&self, ctx: &CheckContext<'_>) -> Result<Vec<Diagnostic>, Cancelled>;

    /// Builds a diagnostic carrying this check's identity.
    fn diagnostic(&self, location: Location, message: impl Into<String>) -> Diagnostic
    where
        Self: Sized,
    {
        Diagnostic::new(
            self.code(),
            self.name(),
            self.default_severity(),
            location,
            message,
        )
        .with_remediation(self.remediation())
    }
}

/// Type alias for boxed [`Check`] trait objects.
pub type CheckBox = Box<dyn Check>;

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cancel::CancellationToken;
    use crate::model::InMemoryModel;
    use crate::unit::AnalysisUnit;

    struct TestCheck;

    impl Check for TestCheck {
        fn name(&self) -> &'static str {
            "test-check"
        }
        fn code(&self) -> &'static str {
            "TEST001"
        }
        fn description(&self) -> &'static str {
            "A test check"
        }

        fn check(&self, ctx: &CheckContext<'_>) -> Result<Vec<Diagnostic>, Cancelled> {
            ctx.checkpoint()?;
            Ok(vec![self.diagnostic(ctx.unit.location(1, 1), "Test diagnostic")])
        }
    }

    #[test]
    fn defaults_and_diagnostic_identity() {
        let check = TestCheck;
        assert_eq!(check.default_severity(), Severity::Warning);

        let model = InMemoryModel::default();
        let unit = AnalysisUnit::new("src/A.cs");
        let cancel = CancellationToken::new();
        let diags = check.check(&CheckContext::new(&model, &unit, &cancel)).unwrap();

        assert_eq!(diags.len(), 1);
        assert_eq!(diags[0].code, "TEST001");
        assert_eq!(diags[0].rule, "test-check");
        assert_eq!(diags[0].remediation(), Some("5min"));
    }

    #[test]
    fn cancelled_context_short_circuits() {
        let model = InMemoryModel::default();
        let unit = AnalysisUnit::new("src/A.cs");
        let cancel = CancellationToken::new();
        cancel.cancel();
        let result = TestCheck.check(&CheckContext::new(&model, &unit, &cancel));
        assert_eq!(result, Err(Cancelled));
    }
}
