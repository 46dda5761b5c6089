//! # symlint-rules
//!
//! Built-in convention checks for symlint.
//!
//! Every check is a thin configuration of a `symlint-core` primitive: the
//! invocation rule matcher, the async alternative resolver, the type
//! violation scanner, or a direct symbol model query.
//!
//! ## Available Checks
//!
//! | Code | Name | Description |
//! |------|------|-------------|
//! | SL001 | `no-local-clock` | Forbids `DateTime.Now`/`Today` |
//! | SL002 | `prefer-async-alternative` | Prefers awaitable alternatives to sync calls |
//! | SL003 | `no-generated-models-in-controllers` | Forbids generated API models in controller actions |
//! | SL004 | `no-console-logging` | Forbids `Console.Write`/`WriteLine` |
//! | SL005 | `no-blocking-task-wait` | Forbids `Task.Result`/`Wait` |
//! | SL006 | `restricted-http-client-surface` | Allows only the async surface of `HttpClient` |
//! | SL007 | `require-public-docs` | Requires documentation on public declarations |
//!
//! ## Usage
//!
//! ```ignore
//! use symlint_core::{CancellationToken, Engine, Snapshot};
//! use symlint_rules::{NoLocalClock, PreferAsyncAlternative};
//!
//! let engine = Engine::builder()
//!     .check(NoLocalClock::new())
//!     .check(PreferAsyncAlternative::new())
//!     .build()?;
//! let snapshot = Snapshot::from_file("model.json".as_ref())?;
//! let result = engine.analyze(&snapshot.model, &snapshot.units, &CancellationToken::new())?;
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]

mod invocation;
mod presets;
mod registry;

pub mod no_blocking_task_wait;
pub mod no_console_logging;
pub mod no_generated_models_in_controllers;
pub mod no_local_clock;
pub mod prefer_async_alternative;
pub mod require_public_docs;
pub mod restricted_http_client_surface;

#[cfg(test)]
mod test_support;

pub use no_blocking_task_wait::NoBlockingTaskWait;
pub use no_console_logging::NoConsoleLogging;
pub use no_generated_models_in_controllers::NoGeneratedModelsInControllers;
pub use no_local_clock::NoLocalClock;
pub use prefer_async_alternative::{AwaitabilityMode, PreferAsyncAlternative};
pub use presets::{all_rules, minimal_rules, recommended_rules, strict_rules, Preset};
pub use registry::{build_rule, configured_rules, RuleBuildError, RULE_NAMES};
pub use require_public_docs::RequirePublicDocs;
pub use restricted_http_client_surface::RestrictedHttpClientSurface;

/// Re-export core types for convenience.
pub use symlint_core::{Check, Diagnostic, Severity};
