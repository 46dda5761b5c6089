//! Symbol facade: a read-only view over the host's resolved program model.
//!
//! The primitives in this crate never parse source text. They ask a
//! [`SymbolModel`] about symbols and syntax nodes, and every query may come
//! back unresolved (`None`/empty). Callers treat unresolved answers as
//! "no violation".
//!
//! [`InMemoryModel`] is the reference implementation, used by tests and by
//! the CLI through JSON snapshots.

use serde::{Deserialize, Serialize};
use std::fmt;

mod memory;
pub mod snapshot;

pub use memory::{InMemoryModel, InMemoryModelBuilder, SymbolData};

/// Opaque handle to a symbol owned by a [`SymbolModel`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SymbolId(pub u32);

impl fmt::Display for SymbolId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Opaque handle to a syntax node (an expression or a member access).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct NodeId(pub u32);

/// Kind of a symbol.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SymbolKind {
    /// A class, struct, interface, enum, array or type parameter.
    Type,
    /// A method, including extension methods.
    Method,
    /// A property.
    Property,
    /// A method parameter.
    Parameter,
    /// A field.
    Field,
    /// An event.
    Event,
}

/// Declared accessibility of a symbol.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Accessibility {
    /// Visible inside the declaring type only.
    Private,
    /// Visible to derived types.
    Protected,
    /// Visible inside the declaring assembly.
    Internal,
    /// Visible everywhere.
    #[default]
    Public,
}

/// Shape category of a type symbol.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum TypeKind {
    /// Reference type.
    Class,
    /// Value type.
    Struct,
    /// Interface.
    Interface,
    /// Enumeration.
    Enum,
    /// Array of an element type.
    Array,
    /// Unsubstituted generic parameter (`T`).
    TypeParameter,
    /// Dynamically typed; never resolvable.
    Dynamic,
    /// Type the host failed to resolve.
    Error,
}

impl TypeKind {
    /// Returns true for kinds the host could not resolve statically.
    #[must_use]
    pub fn is_unresolved(self) -> bool {
        matches!(self, Self::Dynamic | Self::Error)
    }
}

/// Read-only queries over the host's AST and semantic model.
///
/// Every query may answer "unresolved". Implementations must be safe to
/// share across threads: one model snapshot serves many concurrent checks.
pub trait SymbolModel: Send + Sync {
    // ── Symbol queries ──────────────────────────

    /// Returns the kind of a symbol.
    fn kind(&self, symbol: SymbolId) -> Option<SymbolKind>;

    /// Returns the simple name of a symbol (no namespace, no type arguments).
    fn name(&self, symbol: SymbolId) -> Option<&str>;

    /// Returns the type declaring this symbol.
    fn containing_type(&self, symbol: SymbolId) -> Option<SymbolId>;

    /// Returns the declared accessibility.
    fn accessibility(&self, symbol: SymbolId) -> Option<Accessibility>;

    /// Returns true if the symbol is declared static.
    fn is_static(&self, symbol: SymbolId) -> bool;

    /// Returns true if the method is an extension method.
    fn is_extension_method(&self, symbol: SymbolId) -> bool;

    /// Returns a method's return type, or the declared type of a property,
    /// parameter, field or event.
    fn symbol_type(&self, symbol: SymbolId) -> Option<SymbolId>;

    /// Returns a method's parameters in declaration order.
    fn parameters(&self, method: SymbolId) -> Vec<SymbolId>;

    /// Returns true if the symbol carries an attribute of the given type name.
    fn has_attribute(&self, symbol: SymbolId, attribute: &str) -> bool;

    /// Returns true if the declaration has documentation attached.
    fn has_documentation(&self, symbol: SymbolId) -> bool;

    // ── Type shape ──────────────────────────────

    /// Returns the shape category of a type.
    fn type_kind(&self, ty: SymbolId) -> Option<TypeKind>;

    /// Returns the fully-qualified name, including type arguments for
    /// constructed generics (e.g. `System.Collections.Generic.List<Foo.Bar>`).
    fn full_name(&self, ty: SymbolId) -> Option<String>;

    /// Returns the declaring namespace of a type.
    fn namespace(&self, ty: SymbolId) -> Option<&str>;

    /// Returns the name of the assembly/module that owns a type.
    fn assembly(&self, ty: SymbolId) -> Option<&str>;

    /// Returns the type arguments of a constructed generic type.
    fn type_arguments(&self, ty: SymbolId) -> Vec<SymbolId>;

    /// Returns the element type of an array type.
    fn array_element(&self, ty: SymbolId) -> Option<SymbolId>;

    /// Returns the members declared on a type.
    fn members(&self, ty: SymbolId) -> Vec<SymbolId>;

    // ── Resolution ──────────────────────────────

    /// Resolves the symbol a syntax node refers to.
    fn resolve(&self, node: NodeId) -> Option<SymbolId>;

    /// Returns the static type of an expression node.
    fn type_of(&self, expression: NodeId) -> Option<SymbolId>;

    /// Looks up methods named `name` callable on `container`, including
    /// extension methods that reduce onto it.
    fn lookup_members(&self, container: SymbolId, name: &str) -> Vec<SymbolId>;

    /// Returns true if calling `method` yields an awaitable value.
    fn is_awaitable(&self, method: SymbolId) -> bool;
}

/// Strips a generic type-argument suffix from a type name.
///
/// Handles both the source form (`List<int>`) and the metadata arity form
/// (``List`1``).
///
/// # Examples
///
/// ```
/// use symlint_core::model::strip_generic_suffix;
///
/// assert_eq!(strip_generic_suffix("System.Collections.Generic.List<int>"), "System.Collections.Generic.List");
/// assert_eq!(strip_generic_suffix("Foo`2"), "Foo");
/// assert_eq!(strip_generic_suffix("Foo"), "Foo");
/// ```
#[must_use]
pub fn strip_generic_suffix(name: &str) -> &str {
    match name.find(|c| c == '<' || c == '`') {
        Some(idx) => name[..idx].trim_end(),
        None => name,
    }
}

/// Returns the generic-stripped full name of a type, if resolved.
#[must_use]
pub fn definition_name(model: &dyn SymbolModel, ty: SymbolId) -> Option<String> {
    model
        .full_name(ty)
        .map(|full| strip_generic_suffix(&full).to_string())
}

/// Returns `Type.Member` for a member symbol, falling back to the bare name.
#[must_use]
pub fn qualified_member_name(model: &dyn SymbolModel, member: SymbolId) -> Option<String> {
    let name = model.name(member)?;
    match model
        .containing_type(member)
        .and_then(|ty| definition_name(model, ty))
    {
        Some(owner) => Some(format!("{owner}.{name}")),
        None => Some(name.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn strip_generic_suffix_forms() {
        assert_eq!(strip_generic_suffix("List<int>"), "List");
        assert_eq!(strip_generic_suffix("Dictionary<string, List<int>>"), "Dictionary");
        assert_eq!(strip_generic_suffix("List`1"), "List");
        assert_eq!(strip_generic_suffix("List"), "List");
        assert_eq!(strip_generic_suffix(""), "");
    }

    #[test]
    fn unresolved_kinds() {
        assert!(TypeKind::Dynamic.is_unresolved());
        assert!(TypeKind::Error.is_unresolved());
        assert!(!TypeKind::Class.is_unresolved());
    }
}
