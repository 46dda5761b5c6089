//! Invocation rule matcher.
//!
//! An [`InvocationRule`] is an allow/deny policy over the members of one
//! type. A reference `Type.Member` is *compliant* with a rule when the rule
//! targets another type, or when the member name's match against the
//! pattern set agrees with the rule's mode.
//!
//! Rules in an [`InvocationRuleSet`] are ANDed: a reference is flagged as
//! soon as one rule rejects it.

use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::model::{strip_generic_suffix, NodeId, SymbolId, SymbolModel, TypeKind};

/// Errors in rule construction.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RuleError {
    /// Target type name is empty.
    #[error("rule target type must not be empty")]
    EmptyTargetType,

    /// An exact-name pattern is empty.
    #[error("name pattern must not be empty")]
    EmptyPattern,

    /// A regex pattern failed to compile.
    #[error("invalid name pattern `{pattern}`: {reason}")]
    InvalidRegex {
        /// The invalid pattern.
        pattern: String,
        /// Why it's invalid.
        reason: String,
    },

    /// A rule was given no name patterns.
    #[error("rule for `{target}` has no name patterns")]
    EmptyPatternSet {
        /// The rule's target type.
        target: String,
    },
}

/// A member-name predicate: an exact name or a whole-name regular expression.
#[derive(Debug, Clone)]
pub enum NamePattern {
    /// Matches one name exactly.
    Exact(String),
    /// Matches names accepted by an anchored regex.
    Regex {
        /// Pattern as written.
        raw: String,
        /// Compiled, anchored form.
        compiled: Regex,
    },
}

impl NamePattern {
    /// Creates an exact-name pattern.
    ///
    /// # Errors
    ///
    /// Returns error if the name is empty.
    pub fn exact(name: &str) -> Result<Self, RuleError> {
        if name.is_empty() {
            return Err(RuleError::EmptyPattern);
        }
        Ok(Self::Exact(name.to_string()))
    }

    /// Creates a regex pattern matched against the whole member name.
    ///
    /// # Errors
    ///
    /// Returns error if the pattern is empty or fails to compile.
    pub fn regex(pattern: &str) -> Result<Self, RuleError> {
        if pattern.is_empty() {
            return Err(RuleError::EmptyPattern);
        }
        let compiled =
            Regex::new(&format!("^(?:{pattern})$")).map_err(|e| RuleError::InvalidRegex {
                pattern: pattern.to_string(),
                reason: e.to_string(),
            })?;
        Ok(Self::Regex {
            raw: pattern.to_string(),
            compiled,
        })
    }

    /// Tests a member name.
    #[must_use]
    pub fn matches(&self, name: &str) -> bool {
        match self {
            Self::Exact(exact) => exact == name,
            Self::Regex { compiled, .. } => compiled.is_match(name),
        }
    }

    /// Returns the pattern as written.
    #[must_use]
    pub fn as_str(&self) -> &str {
        match self {
            Self::Exact(s) | Self::Regex { raw: s, .. } => s,
        }
    }
}

impl PartialEq for NamePattern {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::Exact(a), Self::Exact(b))
            | (Self::Regex { raw: a, .. }, Self::Regex { raw: b, .. }) => a == b,
            _ => false,
        }
    }
}

impl Eq for NamePattern {}

/// Whether matching names are the permitted set or the forbidden set.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RuleMode {
    /// Only matching members may be used.
    Allow,
    /// Matching members must not be used.
    Deny,
}

impl fmt::Display for RuleMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Allow => write!(f, "allow"),
            Self::Deny => write!(f, "deny"),
        }
    }
}

/// An immutable allow/deny policy over the members of one type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InvocationRule {
    target_type: String,
    patterns: Vec<NamePattern>,
    mode: RuleMode,
}

impl InvocationRule {
    /// Creates a rule. The target's generic suffix is stripped, so a rule
    /// keyed on `List<T>` or `List` applies to every `List<...>`.
    ///
    /// # Errors
    ///
    /// Returns error if the target is empty or `patterns` is empty.
    pub fn new(
        target_type: &str,
        patterns: Vec<NamePattern>,
        mode: RuleMode,
    ) -> Result<Self, RuleError> {
        let target = strip_generic_suffix(target_type.trim());
        if target.is_empty() {
            return Err(RuleError::EmptyTargetType);
        }
        if patterns.is_empty() {
            return Err(RuleError::EmptyPatternSet {
                target: target.to_string(),
            });
        }
        Ok(Self {
            target_type: target.to_string(),
            patterns,
            mode,
        })
    }

    /// Shorthand for a deny rule over exact member names.
    ///
    /// # Errors
    ///
    /// Same as [`InvocationRule::new`].
    pub fn deny(target_type: &str, names: &[&str]) -> Result<Self, RuleError> {
        let patterns = names
            .iter()
            .map(|n| NamePattern::exact(n))
            .collect::<Result<Vec<_>, _>>()?;
        Self::new(target_type, patterns, RuleMode::Deny)
    }

    /// Shorthand for an allow rule over exact member names.
    ///
    /// # Errors
    ///
    /// Same as [`InvocationRule::new`].
    pub fn allow(target_type: &str, names: &[&str]) -> Result<Self, RuleError> {
        let patterns = names
            .iter()
            .map(|n| NamePattern::exact(n))
            .collect::<Result<Vec<_>, _>>()?;
        Self::new(target_type, patterns, RuleMode::Allow)
    }

    /// Returns the generic-stripped target type name.
    #[must_use]
    pub fn target_type(&self) -> &str {
        &self.target_type
    }

    /// Returns the name patterns.
    #[must_use]
    pub fn patterns(&self) -> &[NamePattern] {
        &self.patterns
    }

    /// Returns the mode.
    #[must_use]
    pub fn mode(&self) -> RuleMode {
        self.mode
    }

    /// Returns true if the rule is keyed on this type.
    #[must_use]
    pub fn applies_to(&self, type_full_name: &str) -> bool {
        strip_generic_suffix(type_full_name) == self.target_type
    }

    /// Returns true if `type_full_name.member_name` complies with this rule.
    ///
    /// References to other types are compliant (the rule is out of scope).
    #[must_use]
    pub fn verify(&self, type_full_name: &str, member_name: &str) -> bool {
        if !self.applies_to(type_full_name) {
            return true;
        }
        let matched = self.patterns.iter().any(|p| p.matches(member_name));
        match self.mode {
            RuleMode::Allow => matched,
            RuleMode::Deny => !matched,
        }
    }
}

/// A rule that rejected a resolved reference.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RuleMatch<'a> {
    /// The violated rule.
    pub rule: &'a InvocationRule,
    /// Generic-stripped full name of the member's declaring type.
    pub type_name: String,
    /// Member name.
    pub member_name: String,
}

/// Rules evaluated together; each must pass.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct InvocationRuleSet {
    rules: Vec<InvocationRule>,
}

impl InvocationRuleSet {
    /// Creates a rule set.
    #[must_use]
    pub fn new(rules: Vec<InvocationRule>) -> Self {
        Self { rules }
    }

    /// Adds a rule.
    #[must_use]
    pub fn with_rule(mut self, rule: InvocationRule) -> Self {
        self.rules.push(rule);
        self
    }

    /// Returns the rules.
    #[must_use]
    pub fn rules(&self) -> &[InvocationRule] {
        &self.rules
    }

    /// Returns true if the set has no rules.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    /// Returns the first rule rejecting `type_full_name.member_name`.
    #[must_use]
    pub fn first_violation(
        &self,
        type_full_name: &str,
        member_name: &str,
    ) -> Option<&InvocationRule> {
        self.rules
            .iter()
            .find(|r| !r.verify(type_full_name, member_name))
    }

    /// Returns true if every rule accepts `type_full_name.member_name`.
    #[must_use]
    pub fn is_compliant(&self, type_full_name: &str, member_name: &str) -> bool {
        self.first_violation(type_full_name, member_name).is_none()
    }

    /// Evaluates a member symbol through the facade.
    ///
    /// Unresolved names or declaring types are compliant.
    #[must_use]
    pub fn check_symbol(&self, model: &dyn SymbolModel, symbol: SymbolId) -> Option<RuleMatch<'_>> {
        let (type_name, member_name) = referenced_member(model, symbol)?;
        self.first_violation(&type_name, &member_name)
            .map(|rule| RuleMatch {
                rule,
                type_name,
                member_name,
            })
    }

    /// Resolves a reference node and evaluates the symbol it names.
    #[must_use]
    pub fn check_reference(&self, model: &dyn SymbolModel, node: NodeId) -> Option<RuleMatch<'_>> {
        let symbol = model.resolve(node)?;
        self.check_symbol(model, symbol)
    }
}

/// Returns the generic-stripped declaring type name and the member name of
/// a referenced symbol.
///
/// `None` when the symbol, its declaring type, or that type's name is
/// unresolved.
#[must_use]
pub fn referenced_member(model: &dyn SymbolModel, symbol: SymbolId) -> Option<(String, String)> {
    let member_name = model.name(symbol)?;
    let owner = model.containing_type(symbol)?;
    if model.type_kind(owner).map_or(true, TypeKind::is_unresolved) {
        return None;
    }
    let full_name = model.full_name(owner)?;
    Some((
        strip_generic_suffix(&full_name).to_string(),
        member_name.to_string(),
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{InMemoryModel, TypeKind};

    #[test]
    fn deny_rule_semantics() {
        let rule = InvocationRule::deny("T", &["Foo"]).unwrap();
        assert!(!rule.verify("T", "Foo"));
        assert!(rule.verify("T", "Bar"));
        assert!(rule.verify("U", "Foo"));
    }

    #[test]
    fn allow_rule_semantics() {
        let rule = InvocationRule::new(
            "System.Net.Http.HttpClient",
            vec![
                NamePattern::regex(".*Async").unwrap(),
                NamePattern::exact("Dispose").unwrap(),
            ],
            RuleMode::Allow,
        )
        .unwrap();
        assert!(rule.verify("System.Net.Http.HttpClient", "GetAsync"));
        assert!(rule.verify("System.Net.Http.HttpClient", "Dispose"));
        assert!(!rule.verify("System.Net.Http.HttpClient", "Send"));
        assert!(rule.verify("System.Net.WebClient", "Send"));
    }

    #[test]
    fn generic_names_are_stripped() {
        let rule = InvocationRule::deny("List", &["Sort"]).unwrap();
        assert_eq!(rule.verify("List<int>", "Sort"), rule.verify("List", "Sort"));
        assert_eq!(rule.verify("List<int>", "Add"), rule.verify("List", "Add"));
        assert!(!rule.verify("List`1", "Sort"));

        let keyed_on_open = InvocationRule::deny("List<T>", &["Sort"]).unwrap();
        assert_eq!(keyed_on_open.target_type(), "List");
        assert!(!keyed_on_open.verify("List<string>", "Sort"));
    }

    #[test]
    fn regex_is_anchored() {
        let pattern = NamePattern::regex("Get.*").unwrap();
        assert!(pattern.matches("GetAsync"));
        assert!(!pattern.matches("TryGetValue"));
    }

    #[test]
    fn construction_rejects_malformed_rules() {
        assert_eq!(
            InvocationRule::new("T", vec![], RuleMode::Deny),
            Err(RuleError::EmptyPatternSet {
                target: "T".to_string()
            })
        );
        assert_eq!(
            InvocationRule::deny("", &["Foo"]),
            Err(RuleError::EmptyTargetType)
        );
        assert_eq!(NamePattern::exact(""), Err(RuleError::EmptyPattern));
        assert!(matches!(
            NamePattern::regex("(unclosed"),
            Err(RuleError::InvalidRegex { .. })
        ));
    }

    #[test]
    fn rule_set_requires_every_rule() {
        let set = InvocationRuleSet::default()
            .with_rule(InvocationRule::deny("System.DateTime", &["Now"]).unwrap())
            .with_rule(InvocationRule::deny("System.Console", &["WriteLine"]).unwrap());
        assert!(set.is_compliant("System.DateTime", "UtcNow"));
        let violated = set.first_violation("System.Console", "WriteLine").unwrap();
        assert_eq!(violated.target_type(), "System.Console");
    }

    #[test]
    fn check_reference_through_model() {
        let mut b = InMemoryModel::builder();
        let list = b.add_type("System.Collections.Generic", "List", TypeKind::Class);
        let int = b.add_type("System", "Int32", TypeKind::Struct);
        let list_int = b.construct(list, &[int]);
        let sort = b.add_method(list_int, "Sort", None);
        let add = b.add_method(list_int, "Add", None);
        let sort_ref = b.add_node(Some(sort), None);
        let add_ref = b.add_node(Some(add), None);
        let unresolved = b.add_node(None, None);
        let model = b.build();

        let set = InvocationRuleSet::new(vec![InvocationRule::deny(
            "System.Collections.Generic.List",
            &["Sort"],
        )
        .unwrap()]);

        let found = set.check_reference(&model, sort_ref).unwrap();
        assert_eq!(found.type_name, "System.Collections.Generic.List");
        assert_eq!(found.member_name, "Sort");
        assert!(set.check_reference(&model, add_ref).is_none());
        assert!(set.check_reference(&model, unresolved).is_none());
    }

    #[test]
    fn dynamic_receiver_fails_open() {
        let mut b = InMemoryModel::builder();
        let dynamic = b.add_type("", "dynamic", TypeKind::Dynamic);
        let member = b.add_method(dynamic, "Now", None);
        let model = b.build();

        let set =
            InvocationRuleSet::new(vec![InvocationRule::allow("dynamic", &["Safe"]).unwrap()]);
        assert!(set.check_symbol(&model, member).is_none());
    }
}
