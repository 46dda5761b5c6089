//! Declarative check implementation.
//!
//! Converts the declared invocation policies into a [`Check`] that
//! evaluates every reference site of a unit.

use std::sync::Arc;

use crate::cancel::Cancelled;
use crate::context::CheckContext;
use crate::declarative::model::DeclarativeConfig;
use crate::matcher::referenced_member;
use crate::rule::Check;
use crate::types::{Diagnostic, Severity};

const INVOCATION_RULE_NAME: &str = "invocation-rule";
const INVOCATION_RULE_CODE: &str = "SLD001";

/// A check that enforces `[[invocation-rule]]` declarations.
///
/// Every declared rule is evaluated independently, so one reference can
/// produce one diagnostic per violated rule.
pub struct InvocationRuleCheck {
    config: Arc<DeclarativeConfig>,
}

impl InvocationRuleCheck {
    /// Creates a new check backed by the given config.
    #[must_use]
    pub fn new(config: Arc<DeclarativeConfig>) -> Self {
        Self { config }
    }
}

impl Check for InvocationRuleCheck {
    fn name(&self) -> &'static str {
        INVOCATION_RULE_NAME
    }

    fn code(&self) -> &'static str {
        INVOCATION_RULE_CODE
    }

    fn description(&self) -> &'static str {
        "Allow/deny member references declared in configuration"
    }

    fn default_severity(&self) -> Severity {
        Severity::Warning
    }

    fn check(&self, ctx: &CheckContext<'_>) -> Result<Vec<Diagnostic>, Cancelled> {
        let mut diagnostics = Vec::new();

        for site in &ctx.unit.references {
            ctx.checkpoint()?;
            let Some(symbol) = ctx.model.resolve(site.node) else {
                continue;
            };
            let Some((type_name, member_name)) = referenced_member(ctx.model, symbol) else {
                continue;
            };

            for declared in self.config.rules() {
                if declared.rule().verify(&type_name, &member_name) {
                    continue;
                }
                let mut diagnostic = Diagnostic::new(
                    declared.code(),
                    declared.name(),
                    declared.severity(),
                    site.location.clone(),
                    format!("{}: `{type_name}.{member_name}`", declared.message()),
                )
                .with_args([type_name.clone(), member_name.clone()]);
                if let Some(cost) = declared.remediation() {
                    diagnostic = diagnostic.with_remediation(cost);
                }
                diagnostics.push(diagnostic);
            }
        }

        Ok(diagnostics)
    }
}
