//! Check command implementation.

use anyhow::{bail, Context, Result};
use ignore::WalkBuilder;
use std::path::{Path, PathBuf};
use symlint_core::declarative::load_rules_from_toml;
use symlint_core::{CancellationToken, CheckBox, Config, Engine, LintResult, Snapshot};
use symlint_rules::{build_rule, configured_rules, RULE_NAMES};

use crate::config_resolver::{self, ConfigSource};
use crate::OutputFormat;

/// File suffix of snapshots discovered under a directory.
const SNAPSHOT_SUFFIX: &str = ".symlint.json";

/// Names under which `--rules` selects the declarative tables.
const DECLARATIVE_SELECTORS: &[&str] = &["invocation-rule", "SLD001"];

/// Runs the check command.
///
/// Returns `true` when diagnostics at or above the `fail_on` threshold were
/// found.
pub fn run(
    path: &Path,
    format: OutputFormat,
    rules_filter: Option<&str>,
    exclude: Vec<String>,
    explicit_config: Option<&Path>,
) -> Result<bool> {
    let project_dir = if path.is_file() {
        path.parent()
            .filter(|p| !p.as_os_str().is_empty())
            .unwrap_or_else(|| Path::new("."))
    } else {
        path
    };
    let source = config_resolver::resolve(project_dir, explicit_config);
    let (config, declarative) = load_config(&source)?;
    let fail_on = config.fail_threshold().context("Invalid fail_on")?;

    let checks = match rules_filter {
        Some(filter) => {
            let names: Vec<&str> = filter.split(',').map(str::trim).collect();
            let mut checks = filter_rules(&names, &config)?;
            if names.iter().any(|n| DECLARATIVE_SELECTORS.contains(n)) {
                checks.extend(declarative);
            }
            checks
        }
        None => {
            let mut checks = configured_rules(&config).context("Invalid rule configuration")?;
            checks.extend(declarative);
            checks
        }
    };

    let engine = Engine::builder()
        .config(config)
        .excludes(exclude)
        .checks(checks)
        .build()
        .context("Failed to build engine")?;

    let snapshots = discover_snapshots(path)?;
    if snapshots.is_empty() {
        tracing::warn!("No *{SNAPSHOT_SUFFIX} snapshots found under {}", path.display());
    }
    tracing::info!(
        "Analyzing {} snapshot(s) with {} checks",
        snapshots.len(),
        engine.check_count()
    );

    let cancel = CancellationToken::new();
    let mut result = LintResult::new();
    for snapshot_path in &snapshots {
        let snapshot = Snapshot::from_file(snapshot_path)
            .with_context(|| format!("Failed to load snapshot: {}", snapshot_path.display()))?;
        let found = engine
            .analyze(&snapshot.model, &snapshot.units, &cancel)
            .with_context(|| format!("Analysis failed: {}", snapshot_path.display()))?;
        result.extend(found);
    }
    result.sort();

    super::output::print(&result, format)?;

    Ok(result.has_violations_at(fail_on))
}

/// Loads the typed configuration and the declarative tables from the same
/// file.
fn load_config(source: &ConfigSource) -> Result<(Config, Vec<CheckBox>)> {
    let Some(path) = source.path() else {
        return Ok((Config::default(), Vec::new()));
    };
    if source.is_global() {
        tracing::info!("Using global config: {}", path.display());
    }

    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read config: {}", path.display()))?;
    let config = Config::parse(&content)
        .with_context(|| format!("Failed to load config: {}", path.display()))?;
    let declarative = load_rules_from_toml(&content)
        .with_context(|| format!("Invalid [[invocation-rule]] in {}", path.display()))?;
    if !declarative.is_empty() {
        tracing::debug!("Loaded declarative invocation rules from {}", path.display());
    }
    Ok((config, declarative))
}

/// Builds the built-in checks named (or coded) in `--rules`.
fn filter_rules(names: &[&str], config: &Config) -> Result<Vec<CheckBox>> {
    let all = symlint_rules::all_rules();
    let mut rules = Vec::new();

    for name in names {
        if DECLARATIVE_SELECTORS.contains(name) {
            continue;
        }
        let resolved = all
            .iter()
            .find(|r| r.name() == *name || r.code() == *name)
            .map(|r| r.name());
        match resolved {
            Some(rule) => rules.push(
                build_rule(rule, config.rule(rule))
                    .with_context(|| format!("Invalid configuration for {rule}"))?,
            ),
            None => tracing::warn!("Unknown rule: {name} (known: {})", RULE_NAMES.join(", ")),
        }
    }

    Ok(rules)
}

/// Returns `path` itself when it is a file, otherwise every
/// `*.symlint.json` below it, honoring ignore files.
fn discover_snapshots(path: &Path) -> Result<Vec<PathBuf>> {
    if path.is_file() {
        return Ok(vec![path.to_path_buf()]);
    }
    if !path.is_dir() {
        bail!("Path not found: {}", path.display());
    }

    let mut found = Vec::new();
    for entry in WalkBuilder::new(path).build() {
        let entry = entry.context("Failed to walk directory")?;
        let is_file = entry.file_type().is_some_and(|t| t.is_file());
        let is_snapshot = entry
            .file_name()
            .to_str()
            .is_some_and(|n| n.ends_with(SNAPSHOT_SUFFIX));
        if is_file && is_snapshot {
            found.push(entry.into_path());
        }
    }
    found.sort();
    Ok(found)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    const SNAPSHOT: &str = r#"{
  "symbols": [
    { "kind": "type", "name": "DateTime", "namespace": "System", "type_kind": "struct", "members": [1] },
    { "kind": "property", "name": "Now", "containing_type": 0, "type": 0 }
  ],
  "nodes": [ { "symbol": 1 } ],
  "units": [
    { "file": "src/Clock.cs", "references": [ { "node": 0, "line": 3, "column": 17 } ] }
  ]
}"#;

    #[test]
    fn discovers_only_snapshot_files() {
        let tmp = TempDir::new().unwrap();
        fs::create_dir(tmp.path().join("nested")).unwrap();
        fs::write(tmp.path().join("a.symlint.json"), SNAPSHOT).unwrap();
        fs::write(tmp.path().join("nested/b.symlint.json"), SNAPSHOT).unwrap();
        fs::write(tmp.path().join("package.json"), "{}").unwrap();

        let found = discover_snapshots(tmp.path()).unwrap();
        let names: Vec<_> = found
            .iter()
            .map(|p| p.file_name().unwrap().to_string_lossy().into_owned())
            .collect();
        assert_eq!(names, vec!["a.symlint.json", "b.symlint.json"]);
    }

    #[test]
    fn explicit_file_is_used_as_is() {
        let tmp = TempDir::new().unwrap();
        let file = tmp.path().join("model.json");
        fs::write(&file, SNAPSHOT).unwrap();
        assert_eq!(discover_snapshots(&file).unwrap(), vec![file]);
        assert!(discover_snapshots(&tmp.path().join("missing")).is_err());
    }

    #[test]
    fn filter_accepts_names_and_codes() {
        let config = Config::default();
        let rules = filter_rules(&["SL001", "no-console-logging", "bogus"], &config).unwrap();
        let names: Vec<_> = rules.iter().map(|r| r.name()).collect();
        assert_eq!(names, vec!["no-local-clock", "no-console-logging"]);
    }

    #[test]
    fn config_and_declarative_rules_share_one_file() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("symlint.toml");
        fs::write(
            &path,
            r#"
fail_on = "warning"

[[invocation-rule]]
name = "no-thread-sleep"
type = "System.Threading.Thread"
names = ["Sleep"]
message = "Blocking the thread"
"#,
        )
        .unwrap();

        let (config, declarative) = load_config(&ConfigSource::Project(path)).unwrap();
        assert_eq!(config.fail_on.as_deref(), Some("warning"));
        assert_eq!(declarative.len(), 1);
    }

    #[test]
    fn check_fails_on_violations() {
        let tmp = TempDir::new().unwrap();
        fs::write(tmp.path().join("app.symlint.json"), SNAPSHOT).unwrap();
        let config = tmp.path().join("symlint.toml");
        fs::write(&config, "fail_on = \"warning\"\n").unwrap();

        let failed = run(
            tmp.path(),
            OutputFormat::Compact,
            None,
            Vec::new(),
            Some(&config),
        )
        .unwrap();
        assert!(failed);

        let failed_with_exclude = run(
            tmp.path(),
            OutputFormat::Compact,
            None,
            vec!["src/**".to_string()],
            Some(&config),
        )
        .unwrap();
        assert!(!failed_with_exclude);
    }
}
