//! Configuration file lookup.
//!
//! Priority order:
//!
//! 1. `--config` flag or `$SYMLINT_CONFIG` (explicit path, trusted as-is)
//! 2. `symlint.toml` or `.symlint.toml` in the snapshot directory, then in
//!    each parent up to the enclosing repository root (the first directory
//!    holding `.git`); outside a repository only the snapshot directory
//! 3. `$SYMLINT_CONFIG_DIR/config.toml` or `~/.symlint/config.toml`
//! 4. Built-in defaults

use std::fmt;
use std::path::{Path, PathBuf};

/// Where the configuration was found.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigSource {
    /// Given on the command line or through the environment.
    Explicit(PathBuf),
    /// Found next to the snapshots or in an enclosing directory.
    Project(PathBuf),
    /// Found in the global config directory.
    Global(PathBuf),
    /// Nothing found; defaults apply.
    Default,
}

impl ConfigSource {
    /// Returns the resolved path, if any.
    #[must_use]
    pub fn path(&self) -> Option<&Path> {
        match self {
            Self::Explicit(p) | Self::Project(p) | Self::Global(p) => Some(p),
            Self::Default => None,
        }
    }

    /// Returns `true` if the config came from the global directory.
    #[must_use]
    pub fn is_global(&self) -> bool {
        matches!(self, Self::Global(_))
    }
}

impl fmt::Display for ConfigSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Explicit(p) => write!(f, "{} (explicit)", p.display()),
            Self::Project(p) => write!(f, "{} (project)", p.display()),
            Self::Global(p) => write!(f, "{} (global)", p.display()),
            Self::Default => f.write_str("built-in defaults"),
        }
    }
}

const PROJECT_CONFIG_NAMES: &[&str] = &["symlint.toml", ".symlint.toml"];
const GLOBAL_CONFIG_NAME: &str = "config.toml";
const REPOSITORY_MARKER: &str = ".git";

/// Resolves the configuration for snapshots under `project_dir`.
#[must_use]
pub fn resolve(project_dir: &Path, explicit: Option<&Path>) -> ConfigSource {
    let dir = project_dir
        .canonicalize()
        .unwrap_or_else(|_| project_dir.to_path_buf());
    let source = resolve_inner(&dir, explicit, global_config_dir());
    tracing::debug!("Configuration: {source}");
    source
}

/// Takes `global_dir` as a parameter so tests need not touch the environment.
fn resolve_inner(
    project_dir: &Path,
    explicit: Option<&Path>,
    global_dir: Option<PathBuf>,
) -> ConfigSource {
    if let Some(p) = explicit {
        return ConfigSource::Explicit(p.to_path_buf());
    }

    if let Some(found) = search_dirs(project_dir)
        .iter()
        .find_map(|dir| project_config_in(dir))
    {
        return ConfigSource::Project(found);
    }

    global_dir
        .map(|dir| dir.join(GLOBAL_CONFIG_NAME))
        .filter(|candidate| candidate.is_file())
        .map_or(ConfigSource::Default, ConfigSource::Global)
}

/// `start` and its ancestors up to the repository root, or `start` alone
/// when no repository encloses it.
fn search_dirs(start: &Path) -> Vec<PathBuf> {
    let mut dirs = Vec::new();
    for dir in start.ancestors() {
        dirs.push(dir.to_path_buf());
        if dir.join(REPOSITORY_MARKER).exists() {
            return dirs;
        }
    }
    vec![start.to_path_buf()]
}

fn project_config_in(dir: &Path) -> Option<PathBuf> {
    PROJECT_CONFIG_NAMES
        .iter()
        .map(|name| dir.join(name))
        .find(|candidate| candidate.is_file())
}

/// Returns the global config directory: `$SYMLINT_CONFIG_DIR`, else
/// `~/.symlint/`.
#[must_use]
pub fn global_config_dir() -> Option<PathBuf> {
    if let Ok(dir) = std::env::var("SYMLINT_CONFIG_DIR") {
        return Some(PathBuf::from(dir));
    }
    home::home_dir().map(|h| h.join(".symlint"))
}
