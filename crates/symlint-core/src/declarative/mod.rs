//! Declarative invocation rules driven by TOML configuration.
//!
//! Lets a project ban or restrict members of arbitrary types without
//! writing Rust check code.
//!
//! # Architecture
//!
//! ```text
//! TOML text
//!   ↓ serde (DTO layer)
//! config_dto types
//!   ↓ validate + convert
//! DeclarativeConfig (pure domain model)
//!   ↓ load_rules_from_toml()
//! Vec<CheckBox>
//! ```

use std::sync::Arc;

pub mod config_dto;
pub mod loader;
pub mod model;
pub mod rules;

/// Errors from parsing TOML and loading declarative rules.
#[derive(Debug, thiserror::Error)]
pub enum LoadRulesError {
    /// TOML deserialization failed.
    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),

    /// Domain model validation failed.
    #[error("{0}")]
    Load(#[from] loader::LoadError),
}

/// Parses TOML content and creates all applicable declarative checks.
///
/// Returns `Ok(vec![])` if no declarative sections are present.
///
/// # Errors
///
/// Returns an error if TOML parsing or model validation fails.
pub fn load_rules_from_toml(content: &str) -> Result<Vec<crate::rule::CheckBox>, LoadRulesError> {
    let dto: config_dto::DeclarativeConfigDto = toml::from_str(content)?;
    let config = loader::load(dto)?;
    Ok(create_rules(config))
}

/// Creates all declarative checks from a validated [`model::DeclarativeConfig`].
///
/// Returns an empty vec if no declarative rules are defined.
#[must_use]
pub fn create_rules(config: model::DeclarativeConfig) -> Vec<crate::rule::CheckBox> {
    if config.is_empty() {
        return vec![];
    }
    vec![Box::new(rules::InvocationRuleCheck::new(Arc::new(config)))]
}
