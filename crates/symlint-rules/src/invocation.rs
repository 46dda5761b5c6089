//! Shared reporting for member-policy checks.

use symlint_core::{
    Cancelled, Check, CheckContext, Diagnostic, InvocationRule, InvocationRuleSet, RuleError,
    RuleMatch,
};

/// Evaluates every reference site of the unit against `rules` and reports
/// one diagnostic per rejected reference.
pub(crate) fn check_references<C, F>(
    check: &C,
    rules: &InvocationRuleSet,
    ctx: &CheckContext<'_>,
    message: F,
) -> Result<Vec<Diagnostic>, Cancelled>
where
    C: Check,
    F: Fn(&RuleMatch<'_>) -> String,
{
    let mut diagnostics = Vec::new();
    for site in &ctx.unit.references {
        ctx.checkpoint()?;
        let Some(found) = rules.check_reference(ctx.model, site.node) else {
            continue;
        };
        diagnostics.push(
            check
                .diagnostic(site.location.clone(), message(&found))
                .with_args([found.type_name.clone(), found.member_name.clone()]),
        );
    }
    Ok(diagnostics)
}

/// Builds a single-rule deny set over exact member names.
pub(crate) fn deny_set(target: &str, members: &[&str]) -> Result<InvocationRuleSet, RuleError> {
    Ok(InvocationRuleSet::new(vec![InvocationRule::deny(
        target, members,
    )?]))
}

/// Borrows a list of owned names.
pub(crate) fn as_strs(names: &[String]) -> Vec<&str> {
    names.iter().map(String::as_str).collect()
}
