//! Fixtures shared by check tests.

use symlint_core::model::{InMemoryModel, InMemoryModelBuilder};
use symlint_core::{
    AnalysisUnit, CancellationToken, Check, CheckContext, DeclarationSite, Diagnostic,
    InvocationRuleSet, Location, ReferenceSite, RuleMode, SymbolId,
};

pub(crate) const FILE: &str = "src/Sample.cs";

/// A unit with one reference site per symbol, on consecutive lines.
pub(crate) fn reference_unit(
    b: &mut InMemoryModelBuilder,
    symbols: &[SymbolId],
) -> AnalysisUnit {
    let mut unit = AnalysisUnit::new(FILE);
    for (i, symbol) in symbols.iter().enumerate() {
        let node = b.add_node(Some(*symbol), None);
        unit.references.push(ReferenceSite {
            node,
            location: Location::new(FILE, i + 1, 5),
        });
    }
    unit
}

/// A unit with one declaration site per symbol, on consecutive lines.
pub(crate) fn declaration_unit(symbols: &[SymbolId]) -> AnalysisUnit {
    let mut unit = AnalysisUnit::new(FILE);
    for (i, symbol) in symbols.iter().enumerate() {
        unit.declarations.push(DeclarationSite {
            symbol: *symbol,
            location: Location::new(FILE, i + 1, 1),
        });
    }
    unit
}

/// Runs one check over one unit.
pub(crate) fn run(
    check: &dyn Check,
    model: &InMemoryModel,
    unit: &AnalysisUnit,
) -> Vec<Diagnostic> {
    let cancel = CancellationToken::new();
    check
        .check(&CheckContext::new(model, unit, &cancel))
        .unwrap()
}

/// Asserts that a built-in table produced exactly one populated rule.
pub(crate) fn assert_single_rule(
    set: &InvocationRuleSet,
    target: &str,
    patterns: usize,
    mode: RuleMode,
) {
    assert_eq!(set.rules().len(), 1);
    let rule = &set.rules()[0];
    assert_eq!(rule.target_type(), target);
    assert_eq!(rule.patterns().len(), patterns);
    assert_eq!(rule.mode(), mode);
}
