//! Pure domain model for declarative invocation rules.
//!
//! This module contains no serde and no I/O dependencies.
//! All invariants are enforced at construction time via validated newtypes.

use crate::matcher::{InvocationRule, RuleError};
use crate::types::Severity;
use std::collections::HashSet;
use std::fmt;

/// Code used by declarative rules that do not set their own.
pub const DEFAULT_CODE: &str = "SLD001";

/// A validated rule name (non-empty, `[a-z0-9-]` only).
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct RuleName(String);

impl RuleName {
    /// Creates a new rule name.
    ///
    /// # Errors
    ///
    /// Returns error if the name is empty or contains invalid characters.
    pub fn new(name: &str) -> Result<Self, ModelError> {
        if name.is_empty() {
            return Err(ModelError::EmptyRuleName);
        }
        if !name
            .chars()
            .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '-')
        {
            return Err(ModelError::InvalidRuleName {
                name: name.to_string(),
            });
        }
        Ok(Self(name.to_string()))
    }

    /// Returns the name as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for RuleName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A validated diagnostic code (non-empty, `[A-Za-z0-9]` only).
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct RuleCode(String);

impl RuleCode {
    /// Creates a new code.
    ///
    /// # Errors
    ///
    /// Returns error if the code is empty or not alphanumeric.
    pub fn new(code: &str) -> Result<Self, ModelError> {
        if code.is_empty() || !code.chars().all(|c| c.is_ascii_alphanumeric()) {
            return Err(ModelError::InvalidCode {
                code: code.to_string(),
            });
        }
        Ok(Self(code.to_string()))
    }

    /// Returns the code as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Default for RuleCode {
    fn default() -> Self {
        Self(DEFAULT_CODE.to_string())
    }
}

/// One declared invocation policy with its reporting metadata.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeclaredRule {
    name: RuleName,
    code: RuleCode,
    rule: InvocationRule,
    message: String,
    severity: Severity,
    remediation: Option<String>,
}

impl DeclaredRule {
    /// Creates a declared rule.
    #[must_use]
    pub fn new(
        name: RuleName,
        code: RuleCode,
        rule: InvocationRule,
        message: String,
        severity: Severity,
        remediation: Option<String>,
    ) -> Self {
        Self {
            name,
            code,
            rule,
            message,
            severity,
            remediation,
        }
    }

    /// Returns the rule name.
    #[must_use]
    pub fn name(&self) -> &str {
        self.name.as_str()
    }

    /// Returns the diagnostic code.
    #[must_use]
    pub fn code(&self) -> &str {
        self.code.as_str()
    }

    /// Returns the policy.
    #[must_use]
    pub fn rule(&self) -> &InvocationRule {
        &self.rule
    }

    /// Returns the violation message.
    #[must_use]
    pub fn message(&self) -> &str {
        &self.message
    }

    /// Returns the severity.
    #[must_use]
    pub fn severity(&self) -> Severity {
        self.severity
    }

    /// Returns the remediation-cost estimate.
    #[must_use]
    pub fn remediation(&self) -> Option<&str> {
        self.remediation.as_deref()
    }
}

/// Aggregate root: every declared invocation rule, names unique.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DeclarativeConfig {
    rules: Vec<DeclaredRule>,
}

impl DeclarativeConfig {
    /// Creates the aggregate, collecting every cross-rule error.
    ///
    /// # Errors
    ///
    /// Returns all duplicate-name errors.
    pub fn new(rules: Vec<DeclaredRule>) -> Result<Self, Vec<ModelError>> {
        let mut seen = HashSet::new();
        let errors: Vec<ModelError> = rules
            .iter()
            .filter(|r| !seen.insert(r.name().to_string()))
            .map(|r| ModelError::DuplicateRuleName {
                name: r.name().to_string(),
            })
            .collect();
        if errors.is_empty() {
            Ok(Self { rules })
        } else {
            Err(errors)
        }
    }

    /// Returns true if no rules are declared.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    /// Returns the declared rules in file order.
    #[must_use]
    pub fn rules(&self) -> &[DeclaredRule] {
        &self.rules
    }
}

/// Domain validation errors.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ModelError {
    /// Rule name is empty.
    #[error("rule name must not be empty")]
    EmptyRuleName,

    /// Rule name contains characters outside `[a-z0-9-]`.
    #[error("invalid rule name `{name}`: only [a-z0-9-] allowed")]
    InvalidRuleName {
        /// The invalid name.
        name: String,
    },

    /// Code is empty or not alphanumeric.
    #[error("invalid code `{code}`: only [A-Za-z0-9] allowed")]
    InvalidCode {
        /// The invalid code.
        code: String,
    },

    /// Message is empty.
    #[error("message must not be empty")]
    EmptyMessage,

    /// Mode is neither "allow" nor "deny".
    #[error("unknown mode `{value}`, expected: allow, deny")]
    UnknownMode {
        /// The invalid value.
        value: String,
    },

    /// Two rules share a name.
    #[error("duplicate rule name `{name}`")]
    DuplicateRuleName {
        /// The repeated name.
        name: String,
    },

    /// The policy itself is malformed.
    #[error(transparent)]
    Rule(#[from] RuleError),
}
