//! Check forbidding synchronous waits on tasks.
//!
//! # Rationale
//!
//! `Task.Result` and `Task.Wait()` block the calling thread until the task
//! completes. Under a synchronization context this deadlocks; elsewhere it
//! starves the thread pool. Await the task instead.
//!
//! # Configuration
//!
//! - `members`: member names to forbid
//!   (default: `Result`, `Wait`, `WaitAll`, `WaitAny`)

use symlint_core::{
    Cancelled, Check, CheckContext, Diagnostic, InvocationRuleSet, RuleError, Severity,
    Suggestion,
};

use crate::invocation::{as_strs, check_references, deny_set};

/// Rule code for no-blocking-task-wait.
pub const CODE: &str = "SL005";

/// Rule name for no-blocking-task-wait.
pub const NAME: &str = "no-blocking-task-wait";

const TARGET: &str = "System.Threading.Tasks.Task";
const DEFAULT_MEMBERS: &[&str] = &["Result", "Wait", "WaitAll", "WaitAny"];

/// Forbids blocking on `Task`/`Task<T>`.
#[derive(Debug, Clone)]
pub struct NoBlockingTaskWait {
    rules: InvocationRuleSet,
    /// Custom severity.
    pub severity: Severity,
}

impl Default for NoBlockingTaskWait {
    fn default() -> Self {
        Self::new()
    }
}

impl NoBlockingTaskWait {
    /// Creates a new check with default settings.
    #[must_use]
    pub fn new() -> Self {
        Self {
            rules: deny_set(TARGET, DEFAULT_MEMBERS).unwrap_or_default(),
            severity: Severity::Error,
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

impl Check for NoBlockingTaskWait {
    fn name(&self) -> &'static str {
        NAME
    }

    fn code(&self) -> &'static str {
        CODE
    }

    fn description(&self) -> &'static str {
        "Forbids Task.Result/Wait; await the task"
    }

    fn default_severity(&self) -> Severity {
        self.severity
    }

    fn remediation(&self) -> &'static str {
        "10min"
    }

    fn check(&self, ctx: &CheckContext<'_>) -> Result<Vec<Diagnostic>, Cancelled> {
        let diagnostics = check_references(self, &self.rules, ctx, |m| {
            format!("`Task.{}` blocks the calling thread", m.member_name)
        })?;
        Ok(diagnostics
            .into_iter()
            .map(|d| d.with_suggestion(Suggestion::new("Make the caller async and await the task")))
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{reference_unit, run};
    use symlint_core::model::InMemoryModel;
    use symlint_core::TypeKind;

    #[test]
    fn detects_result_on_generic_task() {
        let mut b = InMemoryModel::builder();
        let task = b.add_type("System.Threading.Tasks", "Task", TypeKind::Class);
        let int = b.add_type("System", "Int32", TypeKind::Struct);
        let task_int = b.construct(task, &[int]);
        let result = b.add_property(task_int, "Result", int);
        let wait = b.add_method(task, "Wait", None);
        let continue_with = b.add_method(task, "ContinueWith", None);
        let unit = reference_unit(&mut b, &[result, wait, continue_with]);
        let model = b.build();

        let diags = run(&NoBlockingTaskWait::new(), &model, &unit);
        let members: Vec<_> = diags.iter().map(|d| d.message_args[1].as_str()).collect();
        assert_eq!(members, vec!["Result", "Wait"]);
        assert!(diags.iter().all(|d| d.severity == Severity::Error));
        assert!(diags.iter().all(|d| d.suggestion.is_some()));
    }

    #[test]
    fn default_table_builds_one_rule() {
        let check = NoBlockingTaskWait::new();
        crate::test_support::assert_single_rule(
            &check.rules,
            "System.Threading.Tasks.Task",
            4,
            symlint_core::RuleMode::Deny,
        );
    }
}
