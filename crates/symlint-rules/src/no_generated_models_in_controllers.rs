//! Check forbidding generated API client models in controller signatures.
//!
//! # Rationale
//!
//! Types generated from a remote API (`*.Client`, `*.GraphQL` namespaces or
//! assemblies) change whenever the remote schema does. Exposing them from a
//! controller action, directly or through nested properties, couples the
//! public HTTP contract to someone else's schema.
//!
//! # Configuration
//!
//! The options of `[rules.no-generated-models-in-controllers]` are a
//! [`GeneratedModelPolicy`]: `suffixes`, `exact`, `framework-prefixes` and
//! `wrappers`.

use symlint_core::model::qualified_member_name;
use symlint_core::{
    is_controller_action, Cancelled, Check, CheckContext, Diagnostic, GeneratedModelPolicy,
    Severity, TypeScanner,
};

/// Rule code for no-generated-models-in-controllers.
pub const CODE: &str = "SL003";

/// Rule name for no-generated-models-in-controllers.
pub const NAME: &str = "no-generated-models-in-controllers";

/// Reports controller actions whose return or parameter types reach a
/// generated model.
#[derive(Debug, Clone)]
pub struct NoGeneratedModelsInControllers {
    policy: GeneratedModelPolicy,
    /// Custom severity.
    pub severity: Severity,
}

impl Default for NoGeneratedModelsInControllers {
    fn default() -> Self {
        Self::new()
    }
}

impl NoGeneratedModelsInControllers {
    /// Creates a new check with the default policy.
    #[must_use]
    pub fn new() -> Self {
        Self {
            policy: GeneratedModelPolicy::default(),
            severity: Severity::Error,
        }
    }

    /// Replaces the policy deciding which types are generated.
    #[must_use]
    pub fn policy(mut self, policy: GeneratedModelPolicy) -> Self {
        self.policy = policy;
        self
    }

    /// Sets the severity level.
    #[must_use]
    pub fn severity(mut self, severity: Severity) -> Self {
        self.severity = severity;
        self
    }
}

impl Check for NoGeneratedModelsInControllers {
    fn name(&self) -> &'static str {
        NAME
    }

    fn code(&self) -> &'static str {
        CODE
    }

    fn description(&self) -> &'static str {
        "Forbids generated API models in controller action signatures"
    }

    fn default_severity(&self) -> Severity {
        self.severity
    }

    fn remediation(&self) -> &'static str {
        "30min"
    }

    fn check(&self, ctx: &CheckContext<'_>) -> Result<Vec<Diagnostic>, Cancelled> {
        let model = ctx.model;
        let scanner = TypeScanner::new(model, &self.policy);
        let mut diagnostics = Vec::new();

        for decl in &ctx.unit.declarations {
            ctx.checkpoint()?;
            if !is_controller_action(model, decl.symbol) {
                continue;
            }
            let action = qualified_member_name(model, decl.symbol).unwrap_or_default();
            for violation in scanner.scan_action(decl.symbol, &decl.location, ctx.cancel)? {
                let path = violation.path_string();
                let at = if path.is_empty() {
                    String::new()
                } else {
                    format!(" at `{path}`")
                };
                let message = format!(
                    "`{action}` exposes generated {} model `{}` via {}{at}",
                    violation.tag, violation.subject_type, violation.root
                );
                diagnostics.push(
                    self.diagnostic(violation.location, message)
                        .with_args([action.clone(), violation.subject_type, violation.tag, path])
                        .with_metadata("root", violation.root.to_string()),
                );
            }
        }
        Ok(diagnostics)
    }
}
