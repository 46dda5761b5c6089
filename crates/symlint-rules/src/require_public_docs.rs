//! Check requiring documentation on the public surface.
//!
//! # Rationale
//!
//! Public types and members form the contract other assemblies compile
//! against. Undocumented surface makes generated API references useless.
//!
//! # Detected Patterns
//!
//! - Public types without documentation
//! - Public methods and properties of public types without documentation
//!
//! Members of non-public types are skipped: they are not reachable from
//! outside the assembly even when declared `public`.
//!
//! # Configuration
//!
//! - `types`, `methods`, `properties`: toggle each declaration kind
//! - `exempt-attributes`: attribute names that exempt a declaration
//!   (default: `CompilerGenerated`)

use symlint_core::model::{qualified_member_name, Accessibility};
use symlint_core::{
    Cancelled, Check, CheckContext, Diagnostic, Severity, Suggestion, SymbolId, SymbolKind,
    SymbolModel,
};

/// Rule code for require-public-docs.
pub const CODE: &str = "SL007";

/// Rule name for require-public-docs.
pub const NAME: &str = "require-public-docs";

/// Requires documentation on public declarations.
#[derive(Debug, Clone)]
pub struct RequirePublicDocs {
    /// Custom severity.
    pub severity: Severity,
    /// Require docs for public types.
    pub require_type_docs: bool,
    /// Require docs for public methods.
    pub require_method_docs: bool,
    /// Require docs for public properties.
    pub require_property_docs: bool,
    exempt_attributes: Vec<String>,
}

impl Default for RequirePublicDocs {
    fn default() -> Self {
        Self::new()
    }
}

impl RequirePublicDocs {
    /// Creates a new check with default settings.
    #[must_use]
    pub fn new() -> Self {
        Self {
            severity: Severity::Info,
            require_type_docs: true,
            require_method_docs: true,
            require_property_docs: true,
            exempt_attributes: vec!["CompilerGenerated".to_string()],
        }
    }

    /// Sets the severity level.
    #[must_use]
    pub fn severity(mut self, severity: Severity) -> Self {
        self.severity = severity;
        self
    }

    /// Sets whether to require docs for public types.
    #[must_use]
    pub fn require_type_docs(mut self, require: bool) -> Self {
        self.require_type_docs = require;
        self
    }

    /// Sets whether to require docs for public methods.
    #[must_use]
    pub fn require_method_docs(mut self, require: bool) -> Self {
        self.require_method_docs = require;
        self
    }

    /// Sets whether to require docs for public properties.
    #[must_use]
    pub fn require_property_docs(mut self, require: bool) -> Self {
        self.require_property_docs = require;
        self
    }

    /// Replaces the attributes that exempt a declaration.
    #[must_use]
    pub fn exempt_attributes(mut self, attributes: Vec<String>) -> Self {
        self.exempt_attributes = attributes;
        self
    }

    fn kind_label(&self, kind: SymbolKind) -> Option<&'static str> {
        match kind {
            SymbolKind::Type if self.require_type_docs => Some("type"),
            SymbolKind::Method if self.require_method_docs => Some("method"),
            SymbolKind::Property if self.require_property_docs => Some("property"),
            _ => None,
        }
    }

    /// Public all the way out: the symbol and every enclosing type.
    fn is_visible(model: &dyn SymbolModel, symbol: SymbolId) -> bool {
        let mut current = Some(symbol);
        // Nesting depth is finite; the bound guards malformed models.
        for _ in 0..32 {
            let Some(sym) = current else {
                return true;
            };
            if model.accessibility(sym) != Some(Accessibility::Public) {
                return false;
            }
            current = model.containing_type(sym);
        }
        false
    }
}

impl Check for RequirePublicDocs {
    fn name(&self) -> &'static str {
        NAME
    }

    fn code(&self) -> &'static str {
        CODE
    }

    fn description(&self) -> &'static str {
        "Requires documentation on public declarations"
    }

    fn default_severity(&self) -> Severity {
        self.severity
    }

    fn remediation(&self) -> &'static str {
        "2min"
    }

    fn check(&self, ctx: &CheckContext<'_>) -> Result<Vec<Diagnostic>, Cancelled> {
        let model = ctx.model;
        let mut diagnostics = Vec::new();

        for decl in &ctx.unit.declarations {
            ctx.checkpoint()?;
            let symbol = decl.symbol;
            let Some(label) = model.kind(symbol).and_then(|k| self.kind_label(k)) else {
                continue;
            };
            if model.has_documentation(symbol)
                || !Self::is_visible(model, symbol)
                || self
                    .exempt_attributes
                    .iter()
                    .any(|a| model.has_attribute(symbol, a))
            {
                continue;
            }

            let name = match label {
                "type" => model.full_name(symbol),
                _ => qualified_member_name(model, symbol),
            }
            .unwrap_or_else(|| "?".to_string());

            diagnostics.push(
                self.diagnostic(
                    decl.location.clone(),
                    format!("Public {label} `{name}` is missing documentation"),
                )
                .with_args([label.to_string(), name])
                .with_suggestion(Suggestion::new("Add a /// <summary> comment")),
            );
        }
        Ok(diagnostics)
    }
}
