//! Type violation scanner.
//!
//! Walks the shape of a type (generic arguments, array elements, public
//! properties) looking for machine-generated API model types. Each root
//! scan owns its visited set, so cyclic type graphs terminate and the
//! same type can still be reported once per root.

use std::collections::HashSet;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::cancel::{CancellationToken, Cancelled};
use crate::model::{definition_name, Accessibility, SymbolId, SymbolKind, SymbolModel, TypeKind};
use crate::types::Location;

/// Decides which types count as generated API models.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct GeneratedModelPolicy {
    /// Tag suffixes marking generated code (compared case-insensitively).
    pub suffixes: Vec<String>,
    /// Tags marking generated code as a whole (compared case-insensitively).
    pub exact: Vec<String>,
    /// Namespace prefixes whose types are never descended into.
    pub framework_prefixes: Vec<String>,
    /// Single-argument generic wrappers peeled off action return types.
    pub wrappers: Vec<String>,
}

impl Default for GeneratedModelPolicy {
    fn default() -> Self {
        Self {
            suffixes: vec!["client".to_string()],
            exact: vec!["graphql".to_string()],
            framework_prefixes: vec!["System".to_string(), "Microsoft".to_string()],
            wrappers: vec![
                "System.Threading.Tasks.Task".to_string(),
                "System.Threading.Tasks.ValueTask".to_string(),
                "Microsoft.AspNetCore.Mvc.ActionResult".to_string(),
            ],
        }
    }
}

impl GeneratedModelPolicy {
    /// Returns the tag a type is judged by: the last dotted segment of its
    /// assembly, or of its namespace when the assembly is unknown.
    #[must_use]
    pub fn tag_of<'m>(&self, model: &'m dyn SymbolModel, ty: SymbolId) -> Option<&'m str> {
        let source = model.assembly(ty).or_else(|| model.namespace(ty))?;
        source.rsplit('.').next().filter(|s| !s.is_empty())
    }

    /// Returns true if `tag` marks generated code.
    #[must_use]
    pub fn is_forbidden_tag(&self, tag: &str) -> bool {
        let tag = tag.to_ascii_lowercase();
        self.suffixes
            .iter()
            .any(|s| tag.ends_with(&s.to_ascii_lowercase()))
            || self.exact.iter().any(|e| tag == e.to_ascii_lowercase())
    }

    /// Returns the forbidding tag of `ty`, if it is a generated model.
    #[must_use]
    pub fn forbidden_tag<'m>(&self, model: &'m dyn SymbolModel, ty: SymbolId) -> Option<&'m str> {
        self.tag_of(model, ty).filter(|tag| self.is_forbidden_tag(tag))
    }

    /// Returns true if `ty` lives under a framework namespace.
    #[must_use]
    pub fn is_framework(&self, model: &dyn SymbolModel, ty: SymbolId) -> bool {
        let Some(ns) = model.namespace(ty) else {
            return false;
        };
        self.framework_prefixes.iter().any(|prefix| {
            ns == prefix
                || ns
                    .strip_prefix(prefix.as_str())
                    .is_some_and(|rest| rest.starts_with('.'))
        })
    }

    fn is_wrapper(&self, name: &str) -> bool {
        self.wrappers.iter().any(|w| w == name)
    }
}

/// Where a root scan started.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case", tag = "kind", content = "name")]
pub enum ScanRoot {
    /// The (unwrapped) return type of an action.
    ReturnType,
    /// A named parameter of an action.
    Parameter(String),
}

impl fmt::Display for ScanRoot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ReturnType => write!(f, "return type"),
            Self::Parameter(name) => write!(f, "parameter '{name}'"),
        }
    }
}

/// A generated model type reachable from a root.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TypeViolation {
    /// Full name of the offending type.
    pub subject_type: String,
    /// Assembly or namespace segment that marked it.
    pub tag: String,
    /// Property names from the root to the offending type.
    pub property_path: Vec<String>,
    /// Root the scan started from.
    pub root: ScanRoot,
    /// Where to report.
    pub location: Location,
}

impl TypeViolation {
    /// Returns the dot-joined property path (empty for a direct hit).
    #[must_use]
    pub fn path_string(&self) -> String {
        self.property_path.join(".")
    }
}

/// Per-root traversal state.
struct Walk<'w> {
    root: &'w ScanRoot,
    location: &'w Location,
    cancel: &'w CancellationToken,
    visited: HashSet<SymbolId>,
    path: Vec<String>,
    found: Vec<TypeViolation>,
}

/// Scans type shapes for generated API models.
pub struct TypeScanner<'a> {
    model: &'a dyn SymbolModel,
    policy: &'a GeneratedModelPolicy,
}

impl<'a> TypeScanner<'a> {
    /// Creates a scanner over `model` judging types by `policy`.
    #[must_use]
    pub fn new(model: &'a dyn SymbolModel, policy: &'a GeneratedModelPolicy) -> Self {
        Self { model, policy }
    }

    /// Scans one root type with a fresh visited set.
    ///
    /// # Errors
    ///
    /// Returns [`Cancelled`] if `cancel` fires during the walk.
    pub fn scan_root(
        &self,
        ty: SymbolId,
        root: ScanRoot,
        location: &Location,
        cancel: &CancellationToken,
    ) -> Result<Vec<TypeViolation>, Cancelled> {
        let mut walk = Walk {
            root: &root,
            location,
            cancel,
            visited: HashSet::new(),
            path: Vec::new(),
            found: Vec::new(),
        };
        self.scan(Some(ty), &mut walk)?;
        Ok(walk.found)
    }

    fn scan(&self, ty: Option<SymbolId>, walk: &mut Walk<'_>) -> Result<(), Cancelled> {
        walk.cancel.check()?;
        let Some(ty) = ty else {
            return Ok(());
        };
        if !walk.visited.insert(ty) {
            return Ok(());
        }
        let model = self.model;
        let Some(kind) = model.type_kind(ty) else {
            return Ok(());
        };
        if kind.is_unresolved() || kind == TypeKind::TypeParameter {
            return Ok(());
        }

        if let Some(tag) = self.policy.forbidden_tag(model, ty) {
            walk.found.push(TypeViolation {
                subject_type: model.full_name(ty).unwrap_or_default(),
                tag: tag.to_string(),
                property_path: walk.path.clone(),
                root: walk.root.clone(),
                location: walk.location.clone(),
            });
            return Ok(());
        }

        for arg in model.type_arguments(ty) {
            self.scan(Some(arg), walk)?;
        }
        if kind == TypeKind::Array {
            self.scan(model.array_element(ty), walk)?;
            return Ok(());
        }

        if matches!(kind, TypeKind::Class | TypeKind::Struct)
            && !self.policy.is_framework(model, ty)
        {
            for member in model.members(ty) {
                if !self.is_public_instance_property(member) {
                    continue;
                }
                let Some(name) = model.name(member) else {
                    continue;
                };
                walk.path.push(name.to_string());
                let result = self.scan(model.symbol_type(member), walk);
                walk.path.pop();
                result?;
            }
        }
        Ok(())
    }

    fn is_public_instance_property(&self, member: SymbolId) -> bool {
        let model = self.model;
        model.kind(member) == Some(SymbolKind::Property)
            && model.accessibility(member) == Some(Accessibility::Public)
            && !model.is_static(member)
    }

    /// Peels wrapper types such as `Task<T>` and `ActionResult<T>`.
    #[must_use]
    pub fn unwrap_wrappers(&self, mut ty: SymbolId) -> SymbolId {
        let model = self.model;
        // Bounded by the wrapper nesting of a finite type graph.
        for _ in 0..8 {
            let args = model.type_arguments(ty);
            let is_wrapper = definition_name(model, ty).is_some_and(|n| self.policy.is_wrapper(&n));
            match args.as_slice() {
                [inner] if is_wrapper => ty = *inner,
                _ => break,
            }
        }
        ty
    }

    /// Scans an action's unwrapped return type and each parameter, every
    /// root with its own visited set.
    ///
    /// # Errors
    ///
    /// Returns [`Cancelled`] if `cancel` fires during any root scan.
    pub fn scan_action(
        &self,
        method: SymbolId,
        location: &Location,
        cancel: &CancellationToken,
    ) -> Result<Vec<TypeViolation>, Cancelled> {
        let model = self.model;
        let mut found = Vec::new();
        if let Some(ret) = model.symbol_type(method) {
            let ret = self.unwrap_wrappers(ret);
            found.extend(self.scan_root(ret, ScanRoot::ReturnType, location, cancel)?);
        }
        for param in model.parameters(method) {
            let Some(ty) = model.symbol_type(param) else {
                continue;
            };
            let name = model.name(param).unwrap_or_default().to_string();
            found.extend(self.scan_root(ty, ScanRoot::Parameter(name), location, cancel)?);
        }
        Ok(found)
    }
}

/// Returns true if `method` is a web controller action: a public instance
/// method on a type named `*Controller` or marked `[ApiController]`.
#[must_use]
pub fn is_controller_action(model: &dyn SymbolModel, method: SymbolId) -> bool {
    if model.kind(method) != Some(SymbolKind::Method)
        || model.accessibility(method) != Some(Accessibility::Public)
        || model.is_static(method)
    {
        return false;
    }
    let Some(owner) = model.containing_type(method) else {
        return false;
    };
    model.name(owner).is_some_and(|n| n.ends_with("Controller"))
        || model.has_attribute(owner, "ApiController")
}
