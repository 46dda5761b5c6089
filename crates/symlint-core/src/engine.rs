//! Engine orchestrating checks over analysis units.

use rayon::prelude::*;
use thiserror::Error;
use tracing::{debug, info};

use crate::cancel::{CancellationToken, Cancelled};
use crate::config::{Config, RuleConfig};
use crate::context::CheckContext;
use crate::model::SymbolModel;
use crate::rule::{Check, CheckBox};
use crate::sink::DiagnosticSink;
use crate::types::{Diagnostic, LintResult};
use crate::unit::AnalysisUnit;

/// Errors that can occur during analysis.
#[derive(Debug, Error)]
pub enum EngineError {
    /// The run was cancelled; partial results were discarded.
    #[error(transparent)]
    Cancelled(#[from] Cancelled),

    /// The dedicated thread pool could not be created.
    #[error("Failed to build thread pool: {0}")]
    ThreadPool(#[from] rayon::ThreadPoolBuildError),

    /// Glob pattern error.
    #[error("Invalid glob pattern: {0}")]
    Glob(#[from] glob::PatternError),
}

/// Builder for configuring an [`Engine`].
#[derive(Default)]
pub struct EngineBuilder {
    checks: Vec<CheckBox>,
    exclude_patterns: Vec<String>,
    config: Option<Config>,
    parallelism: Option<usize>,
}

impl EngineBuilder {
    /// Creates a new builder with default settings.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a check to the engine.
    #[must_use]
    pub fn check<C: Check + 'static>(mut self, check: C) -> Self {
        self.checks.push(Box::new(check));
        self
    }

    /// Adds a boxed check to the engine.
    #[must_use]
    pub fn check_box(mut self, check: CheckBox) -> Self {
        self.checks.push(check);
        self
    }

    /// Adds several boxed checks.
    #[must_use]
    pub fn checks(mut self, checks: impl IntoIterator<Item = CheckBox>) -> Self {
        self.checks.extend(checks);
        self
    }

    /// Adds an exclude glob pattern matched against unit file paths.
    #[must_use]
    pub fn exclude(mut self, pattern: impl Into<String>) -> Self {
        self.exclude_patterns.push(pattern.into());
        self
    }

    /// Adds multiple exclude glob patterns.
    #[must_use]
    pub fn excludes<I, S>(mut self, patterns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.exclude_patterns
            .extend(patterns.into_iter().map(Into::into));
        self
    }

    /// Sets the configuration.
    #[must_use]
    pub fn config(mut self, config: Config) -> Self {
        self.config = Some(config);
        self
    }

    /// Runs units on a dedicated pool of `threads` workers.
    #[must_use]
    pub fn parallelism(mut self, threads: usize) -> Self {
        self.parallelism = Some(threads);
        self
    }

    /// Builds the engine.
    ///
    /// # Errors
    ///
    /// Returns an error if an exclude pattern is invalid or the thread pool
    /// cannot be created.
    pub fn build(self) -> Result<Engine, EngineError> {
        let config = self.config.unwrap_or_default();

        let mut patterns = self.exclude_patterns;
        patterns.extend(config.analyzer.exclude.iter().cloned());
        let excludes = patterns
            .iter()
            .map(|p| glob::Pattern::new(p))
            .collect::<Result<Vec<_>, _>>()?;

        let pool = match self.parallelism.or(config.analyzer.parallelism) {
            Some(threads) => Some(
                rayon::ThreadPoolBuilder::new()
                    .num_threads(threads)
                    .thread_name(|i| format!("symlint-{i}"))
                    .build()?,
            ),
            None => None,
        };

        Ok(Engine {
            checks: self.checks,
            excludes,
            config,
            pool,
        })
    }
}

/// Runs checks over analysis units in parallel.
///
/// Use [`Engine::builder()`] to construct an instance.
pub struct Engine {
    checks: Vec<CheckBox>,
    excludes: Vec<glob::Pattern>,
    config: Config,
    pool: Option<rayon::ThreadPool>,
}

impl Engine {
    /// Creates a new builder for configuring an engine.
    #[must_use]
    pub fn builder() -> EngineBuilder {
        EngineBuilder::new()
    }

    /// Returns the number of registered checks.
    #[must_use]
    pub fn check_count(&self) -> usize {
        self.checks.len()
    }

    /// Returns the registered checks.
    #[must_use]
    pub fn checks(&self) -> &[CheckBox] {
        &self.checks
    }

    /// Analyzes all units and returns sorted results.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::Cancelled`] if `cancel` fires before every
    /// unit completes.
    pub fn analyze(
        &self,
        model: &dyn SymbolModel,
        units: &[AnalysisUnit],
        cancel: &CancellationToken,
    ) -> Result<LintResult, EngineError> {
        info!(
            "Starting analysis of {} units with {} checks",
            units.len(),
            self.checks.len()
        );

        let selected: Vec<&AnalysisUnit> = units
            .iter()
            .filter(|unit| {
                let excluded = self.should_exclude(unit);
                if excluded {
                    debug!("Excluding: {}", unit.file.display());
                }
                !excluded
            })
            .collect();

        let run = || {
            selected
                .par_iter()
                .map(|unit| self.analyze_unit(model, unit, cancel))
                .collect::<Result<Vec<_>, Cancelled>>()
        };
        let per_unit = match &self.pool {
            Some(pool) => pool.install(run),
            None => run(),
        }?;

        let mut result = LintResult::new();
        result.units_checked = per_unit.len();
        result.diagnostics = per_unit.into_iter().flatten().collect();
        result.sort();

        info!(
            "Analysis complete: {} diagnostics in {} units",
            result.diagnostics.len(),
            result.units_checked
        );

        Ok(result)
    }

    /// Analyzes all units and reports each diagnostic to `sink`.
    ///
    /// Returns the number of diagnostics reported. Nothing is reported
    /// when the run fails.
    ///
    /// # Errors
    ///
    /// See [`Engine::analyze`].
    pub fn analyze_into<S: DiagnosticSink + ?Sized>(
        &self,
        model: &dyn SymbolModel,
        units: &[AnalysisUnit],
        cancel: &CancellationToken,
        sink: &mut S,
    ) -> Result<usize, EngineError> {
        let result = self.analyze(model, units, cancel)?;
        let count = result.diagnostics.len();
        for diagnostic in result.diagnostics {
            sink.report(diagnostic);
        }
        Ok(count)
    }

    /// Runs every enabled check on one unit.
    fn analyze_unit(
        &self,
        model: &dyn SymbolModel,
        unit: &AnalysisUnit,
        cancel: &CancellationToken,
    ) -> Result<Vec<Diagnostic>, Cancelled> {
        debug!("Analyzing: {}", unit.file.display());
        cancel.check()?;

        let ctx = CheckContext::new(model, unit, cancel);
        let mut diagnostics = Vec::new();

        for check in &self.checks {
            if !self.config.is_rule_enabled(check.name()) {
                debug!("Skipping disabled rule: {}", check.name());
                continue;
            }

            let found = check.check(&ctx)?;
            diagnostics.extend(self.apply_severity_override(check.name(), found));
        }

        Ok(diagnostics)
    }

    /// Applies severity overrides from configuration.
    fn apply_severity_override(
        &self,
        rule_name: &str,
        mut diagnostics: Vec<Diagnostic>,
    ) -> Vec<Diagnostic> {
        if let Some(severity) = self.config.rule_severity(rule_name) {
            for d in &mut diagnostics {
                d.severity = severity;
            }
        }
        diagnostics
    }

    /// Checks if a unit should be excluded.
    fn should_exclude(&self, unit: &AnalysisUnit) -> bool {
        self.excludes.iter().any(|p| p.matches_path(&unit.file))
    }

    /// Gets the rule configuration for a specific rule.
    #[must_use]
    pub fn rule_config(&self, rule_name: &str) -> Option<&RuleConfig> {
        self.config.rule(rule_name)
    }
}
