//! Check suggesting awaitable alternatives to synchronous calls.
//!
//! # Rationale
//!
//! Calling `Fetch()` when the same receiver offers an awaitable
//! `FetchAsync()` (or an awaitable overload of `Fetch`) blocks a thread for
//! work that could have yielded. Extension methods count as alternatives,
//! static calls only match static alternatives, and instance calls only
//! match instance ones.
//!
//! # Configuration
//!
//! - `awaitability`: `"model"` (default) trusts the host's awaitable flag;
//!   `"task-like"` decides structurally from the return type

use symlint_core::model::definition_name;
use symlint_core::{
    AsyncAlternativeResolver, Awaitability, Cancelled, Check, CheckContext, Diagnostic,
    ModelAwaitability, Severity, Suggestion, SymbolId, SymbolModel, TaskLikeAwaitability,
};

/// Rule code for prefer-async-alternative.
pub const CODE: &str = "SL002";

/// Rule name for prefer-async-alternative.
pub const NAME: &str = "prefer-async-alternative";

/// How awaitability of candidate methods is decided.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AwaitabilityMode {
    /// Ask the symbol model.
    #[default]
    Model,
    /// Inspect return types for `Task`/`ValueTask` or a `GetAwaiter` member.
    TaskLike,
}

impl AwaitabilityMode {
    /// Parses the configuration spelling.
    #[must_use]
    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "model" => Some(Self::Model),
            "task-like" => Some(Self::TaskLike),
            _ => None,
        }
    }
}

/// Reports calls that have an awaitable alternative on the same receiver.
pub struct PreferAsyncAlternative {
    awaitability: Box<dyn Awaitability>,
    /// Built-in mode, or `None` once a custom predicate is installed.
    mode: Option<AwaitabilityMode>,
    /// Custom severity.
    pub severity: Severity,
}

impl std::fmt::Debug for PreferAsyncAlternative {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PreferAsyncAlternative")
            .field("mode", &self.mode)
            .field("severity", &self.severity)
            .finish_non_exhaustive()
    }
}

impl Default for PreferAsyncAlternative {
    fn default() -> Self {
        Self::new()
    }
}

impl PreferAsyncAlternative {
    /// Creates a new check trusting the model's awaitable flags.
    #[must_use]
    pub fn new() -> Self {
        Self {
            awaitability: Box::new(ModelAwaitability),
            mode: Some(AwaitabilityMode::Model),
            severity: Severity::Warning,
        }
    }

    /// Selects a built-in awaitability predicate.
    #[must_use]
    pub fn awaitability(mut self, mode: AwaitabilityMode) -> Self {
        self.awaitability = match mode {
            AwaitabilityMode::Model => Box::new(ModelAwaitability),
            AwaitabilityMode::TaskLike => Box::new(TaskLikeAwaitability::new()),
        };
        self.mode = Some(mode);
        self
    }

    /// Installs a custom awaitability predicate.
    #[must_use]
    pub fn with_awaitability(mut self, awaitability: impl Awaitability + 'static) -> Self {
        self.awaitability = Box::new(awaitability);
        self.mode = None;
        self
    }

    /// Sets the severity level.
    #[must_use]
    pub fn severity(mut self, severity: Severity) -> Self {
        self.severity = severity;
        self
    }
}

fn display_type(model: &dyn SymbolModel, ty: SymbolId) -> String {
    definition_name(model, ty)
        .and_then(|full| full.rsplit('.').next().map(String::from))
        .unwrap_or_else(|| "?".to_string())
}

impl Check for PreferAsyncAlternative {
    fn name(&self) -> &'static str {
        NAME
    }

    fn code(&self) -> &'static str {
        CODE
    }

    fn description(&self) -> &'static str {
        "Prefers awaitable alternatives to synchronous calls"
    }

    fn default_severity(&self) -> Severity {
        self.severity
    }

    fn check(&self, ctx: &CheckContext<'_>) -> Result<Vec<Diagnostic>, Cancelled> {
        let model = ctx.model;
        let resolver = AsyncAlternativeResolver::new(model, self.awaitability.as_ref());
        let mut diagnostics = Vec::new();

        for call in &ctx.unit.calls {
            let Some(finding) = resolver.check(call, ctx.cancel)? else {
                continue;
            };
            let descriptor = finding.descriptor;
            let type_name = display_type(model, descriptor.calling_type);
            let method = model.name(descriptor.used_method).unwrap_or("?").to_string();
            let alternative = finding
                .alternatives
                .first()
                .and_then(|alt| model.name(*alt))
                .unwrap_or("?")
                .to_string();

            diagnostics.push(
                self.diagnostic(
                    finding.location,
                    format!("`{type_name}.{method}` has an awaitable alternative `{alternative}`"),
                )
                .with_args([type_name, method, alternative.clone()])
                .with_metadata("alternatives", finding.alternatives.len().to_string())
                .with_suggestion(Suggestion::new(format!(
                    "Call `{alternative}` and await the result"
                ))),
            );
        }
        Ok(diagnostics)
    }
}
