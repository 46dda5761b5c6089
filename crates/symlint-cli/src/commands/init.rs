//! Init command implementation.

use anyhow::{bail, Result};
use std::path::Path;

const DEFAULT_CONFIG: &str = r#"# symlint configuration

# Check preset: recommended (default), strict or minimal
preset = "recommended"

# Lowest severity that fails the run: error (default), warning or info
fail_on = "error"

[analyzer]
# Glob patterns on unit file paths to skip
exclude = [
    "**/obj/**",
    "**/Generated/**",
]

# Worker threads (default: one per core)
# parallelism = 4

# Rule configurations
# Each rule can be enabled/disabled and have its severity overridden

[rules.no-local-clock]
enabled = true
# severity = "error"
# members = ["Now", "Today"]

[rules.prefer-async-alternative]
# "model" trusts the snapshot's awaitable flags, "task-like" inspects return types
awaitability = "model"

# [rules.no-generated-models-in-controllers]
# suffixes = ["client"]
# exact = ["graphql"]

# [rules.restricted-http-client-surface]
# enabled = true
# allow = ["CancelPendingRequests"]

# Declarative invocation rules
# [[invocation-rule]]
# name = "no-thread-sleep"
# type = "System.Threading.Thread"
# names = ["Sleep"]
# message = "Blocking the thread"
# severity = "error"
"#;

/// Runs the init command.
pub fn run(force: bool) -> Result<()> {
    let config_path = Path::new("symlint.toml");

    if config_path.exists() && !force {
        bail!(
            "Configuration file already exists at {}. Use --force to overwrite.",
            config_path.display()
        );
    }

    std::fs::write(config_path, DEFAULT_CONFIG)?;

    println!("Created symlint.toml");
    println!("\nNext steps:");
    println!("  1. Edit symlint.toml to configure rules");
    println!("  2. Export a model snapshot (*.symlint.json) from your build");
    println!("  3. Run: symlint check");

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use symlint_core::declarative::load_rules_from_toml;
    use symlint_core::Config;

    #[test]
    fn default_config_is_valid() {
        let config = Config::parse(DEFAULT_CONFIG).unwrap();
        assert_eq!(config.preset.as_deref(), Some("recommended"));
        assert!(symlint_rules::configured_rules(&config).is_ok());
        assert!(load_rules_from_toml(DEFAULT_CONFIG).unwrap().is_empty());
    }
}
