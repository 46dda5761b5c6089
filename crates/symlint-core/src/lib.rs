//! # symlint-core
//!
//! Core framework for convention checks over a resolved program model.
//!
//! Checks never parse source text. They query a [`SymbolModel`] supplied by
//! the host and report [`Diagnostic`]s. This crate provides:
//!
//! - [`SymbolModel`], the read-only symbol facade, and [`InMemoryModel`]
//!   with its JSON [`Snapshot`] loader
//! - [`InvocationRule`] / [`InvocationRuleSet`] for allow/deny member policies
//! - [`AsyncAlternativeResolver`] for "an awaitable sibling exists" checks
//! - [`TypeScanner`] for finding generated model types in a type's shape
//! - [`Check`] trait and [`Engine`] for orchestrating checks in parallel
//!
//! ## Example
//!
//! ```ignore
//! use symlint_core::{CancellationToken, Engine, Snapshot};
//!
//! let snapshot = Snapshot::from_file("model.json".as_ref())?;
//! let engine = Engine::builder()
//!     .check(MyCheck::new())
//!     .build()?;
//!
//! let result = engine.analyze(&snapshot.model, &snapshot.units, &CancellationToken::new())?;
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]

mod async_alternative;
mod cancel;
mod config;
mod context;
mod engine;
mod matcher;
mod rule;
mod sink;
mod type_scan;
mod types;
mod unit;

pub mod declarative;
pub mod model;

pub use async_alternative::{
    AsyncAlternativeResolver, AsyncFinding, Awaitability, MethodDescriptor, ModelAwaitability,
    TaskLikeAwaitability, ASYNC_SUFFIX,
};
pub use cancel::{CancellationToken, Cancelled};
pub use config::{AnalyzerConfig, Config, ConfigError, RuleConfig};
pub use context::CheckContext;
pub use engine::{Engine, EngineBuilder, EngineError};
pub use matcher::{
    referenced_member, InvocationRule, InvocationRuleSet, NamePattern, RuleError, RuleMatch,
    RuleMode,
};
pub use model::snapshot::{Snapshot, SnapshotError};
pub use model::{InMemoryModel, NodeId, SymbolId, SymbolKind, SymbolModel, TypeKind};
pub use rule::{Check, CheckBox};
pub use sink::DiagnosticSink;
pub use type_scan::{
    is_controller_action, GeneratedModelPolicy, ScanRoot, TypeScanner, TypeViolation,
};
pub use types::{
    Diagnostic, DiagnosticReport, LintResult, Location, Severity, Suggestion, REMEDIATION_KEY,
};
pub use unit::{AnalysisUnit, CallSite, DeclarationSite, ReferenceSite};
