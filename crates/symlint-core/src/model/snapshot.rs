//! JSON snapshots of a resolved program model.
//!
//! A host that cannot link against this crate dumps its semantic model as
//! JSON. Symbol and node ids are positions in the `symbols` and `nodes`
//! arrays.
//!
//! ```text
//! JSON text
//!   ↓ serde (DTO layer)
//! SnapshotDto
//!   ↓ load(), validates every id
//! Snapshot { InMemoryModel, Vec<AnalysisUnit> }
//! ```

use serde::Deserialize;
use std::path::{Path, PathBuf};

use super::memory::{InMemoryModel, InMemoryModelBuilder, SymbolData};
use super::{Accessibility, NodeId, SymbolId, SymbolKind, TypeKind};
use crate::unit::{AnalysisUnit, CallSite, DeclarationSite, ReferenceSite};
use crate::types::Location;

/// Raw JSON representation of a snapshot.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct SnapshotDto {
    /// Symbol table; a symbol's id is its index.
    #[serde(default)]
    pub symbols: Vec<SymbolDto>,
    /// Syntax node table; a node's id is its index.
    #[serde(default)]
    pub nodes: Vec<NodeDto>,
    /// Analysis units, one per source file.
    #[serde(default)]
    pub units: Vec<UnitDto>,
}

/// JSON representation of a symbol.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SymbolDto {
    /// Symbol kind.
    pub kind: SymbolKind,
    /// Simple name.
    pub name: String,
    /// Declaring type.
    #[serde(default)]
    pub containing_type: Option<SymbolId>,
    /// Declared accessibility (default: public).
    #[serde(default)]
    pub accessibility: Accessibility,
    /// Static flag.
    #[serde(default, rename = "static")]
    pub is_static: bool,
    /// Extension-method flag.
    #[serde(default)]
    pub extension: bool,
    /// Return type or declared type.
    #[serde(default, rename = "type")]
    pub symbol_type: Option<SymbolId>,
    /// Method parameters.
    #[serde(default)]
    pub parameters: Vec<SymbolId>,
    /// Attribute type names.
    #[serde(default)]
    pub attributes: Vec<String>,
    /// Documentation presence.
    #[serde(default)]
    pub documented: bool,
    /// Shape of a type symbol (required for `kind = "type"`).
    #[serde(default)]
    pub type_kind: Option<TypeKind>,
    /// Declaring namespace.
    #[serde(default)]
    pub namespace: Option<String>,
    /// Owning assembly.
    #[serde(default)]
    pub assembly: Option<String>,
    /// Type arguments of a constructed generic.
    #[serde(default)]
    pub type_arguments: Vec<SymbolId>,
    /// Array element type.
    #[serde(default)]
    pub element_type: Option<SymbolId>,
    /// Open generic definition.
    #[serde(default)]
    pub definition: Option<SymbolId>,
    /// Base class.
    #[serde(default)]
    pub base_type: Option<SymbolId>,
    /// Declared members.
    #[serde(default)]
    pub members: Vec<SymbolId>,
    /// Awaitable type flag.
    #[serde(default)]
    pub awaitable: bool,
}

/// JSON representation of a syntax node.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct NodeDto {
    /// Symbol the node resolves to.
    #[serde(default)]
    pub symbol: Option<SymbolId>,
    /// Static type of the expression.
    #[serde(default, rename = "type")]
    pub ty: Option<SymbolId>,
}

/// JSON representation of an analysis unit.
#[derive(Debug, Clone, Deserialize)]
pub struct UnitDto {
    /// Source file path.
    pub file: PathBuf,
    /// Reference sites.
    #[serde(default)]
    pub references: Vec<ReferenceDto>,
    /// Call sites.
    #[serde(default)]
    pub calls: Vec<CallDto>,
    /// Declaration sites.
    #[serde(default)]
    pub declarations: Vec<DeclarationDto>,
}

/// JSON representation of a reference site.
#[derive(Debug, Clone, Deserialize)]
pub struct ReferenceDto {
    /// Referencing node.
    pub node: NodeId,
    /// Line (1-indexed).
    pub line: usize,
    /// Column (1-indexed).
    pub column: usize,
}

/// JSON representation of a call site.
#[derive(Debug, Clone, Deserialize)]
pub struct CallDto {
    /// Invocation node.
    pub node: NodeId,
    /// Receiver expression node.
    #[serde(default)]
    pub receiver: Option<NodeId>,
    /// Enclosing type.
    #[serde(default)]
    pub enclosing_type: Option<SymbolId>,
    /// Line (1-indexed).
    pub line: usize,
    /// Column (1-indexed).
    pub column: usize,
}

/// JSON representation of a declaration site.
#[derive(Debug, Clone, Deserialize)]
pub struct DeclarationDto {
    /// Declared symbol.
    pub symbol: SymbolId,
    /// Line (1-indexed).
    pub line: usize,
    /// Column (1-indexed).
    pub column: usize,
}

/// A loaded, validated snapshot.
#[derive(Debug, Clone, Default)]
pub struct Snapshot {
    /// The symbol model.
    pub model: InMemoryModel,
    /// Sites to analyze.
    pub units: Vec<AnalysisUnit>,
}

impl Snapshot {
    /// Parses and validates a snapshot from JSON text.
    ///
    /// # Errors
    ///
    /// Returns an error if the JSON is malformed or references unknown ids.
    pub fn from_json(content: &str) -> Result<Self, SnapshotError> {
        let dto: SnapshotDto = serde_json::from_str(content)?;
        load(dto)
    }

    /// Reads and validates a snapshot file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or is invalid.
    pub fn from_file(path: &Path) -> Result<Self, SnapshotError> {
        let content = std::fs::read_to_string(path).map_err(|e| SnapshotError::Io {
            path: path.to_path_buf(),
            source: e,
        })?;
        Self::from_json(&content)
    }
}

/// Errors from reading or validating a snapshot.
#[derive(Debug, thiserror::Error)]
pub enum SnapshotError {
    /// IO error reading a snapshot file.
    #[error("Failed to read snapshot {path}: {source}")]
    Io {
        /// Path that failed to read.
        path: PathBuf,
        /// Underlying IO error.
        source: std::io::Error,
    },

    /// JSON deserialization failed.
    #[error("JSON parse error: {0}")]
    Json(#[from] serde_json::Error),

    /// A symbol id points past the symbol table.
    #[error("{context}: unknown symbol id {id}")]
    DanglingSymbol {
        /// Where the reference was found.
        context: String,
        /// The unknown id.
        id: SymbolId,
    },

    /// A node id points past the node table.
    #[error("{context}: unknown node id {}", .id.0)]
    DanglingNode {
        /// Where the reference was found.
        context: String,
        /// The unknown id.
        id: NodeId,
    },

    /// A type symbol has no `type_kind`.
    #[error("symbols[{index}]: type symbol `{name}` has no type_kind")]
    MissingTypeKind {
        /// Index of the symbol.
        index: usize,
        /// Symbol name.
        name: String,
    },
}

/// Converts a [`SnapshotDto`] into a validated [`Snapshot`].
///
/// # Errors
///
/// Returns the first dangling reference or missing type kind encountered.
pub fn load(dto: SnapshotDto) -> Result<Snapshot, SnapshotError> {
    let symbol_count = dto.symbols.len();
    let node_count = dto.nodes.len();
    let mut builder = InMemoryModelBuilder::new();
    for (index, symbol) in dto.symbols.into_iter().enumerate() {
        let ctx = || format!("symbols[{index}]");
        if symbol.kind == SymbolKind::Type && symbol.type_kind.is_none() {
            return Err(SnapshotError::MissingTypeKind {
                index,
                name: symbol.name,
            });
        }
        let single = [
            symbol.containing_type,
            symbol.symbol_type,
            symbol.element_type,
            symbol.definition,
            symbol.base_type,
        ];
        for id in single.into_iter().flatten() {
            check_symbol(symbol_count, &ctx, id)?;
        }
        for id in symbol
            .parameters
            .iter()
            .chain(&symbol.type_arguments)
            .chain(&symbol.members)
        {
            check_symbol(symbol_count, &ctx, *id)?;
        }

        builder.push(SymbolData {
            kind: symbol.kind,
            name: symbol.name,
            containing_type: symbol.containing_type,
            accessibility: symbol.accessibility,
            is_static: symbol.is_static,
            is_extension: symbol.extension,
            symbol_type: symbol.symbol_type,
            parameters: symbol.parameters,
            attributes: symbol.attributes,
            documented: symbol.documented,
            type_kind: symbol.type_kind,
            namespace: symbol.namespace,
            assembly: symbol.assembly,
            type_arguments: symbol.type_arguments,
            element_type: symbol.element_type,
            definition: symbol.definition,
            base_type: symbol.base_type,
            members: symbol.members,
            awaitable: symbol.awaitable,
        });
    }

    for (index, node) in dto.nodes.iter().enumerate() {
        let ctx = || format!("nodes[{index}]");
        for id in [node.symbol, node.ty].into_iter().flatten() {
            check_symbol(symbol_count, &ctx, id)?;
        }
        builder.add_node(node.symbol, node.ty);
    }

    let mut units = Vec::with_capacity(dto.units.len());
    for (u, unit) in dto.units.into_iter().enumerate() {
        let location = |line: usize, column: usize| Location::new(unit.file.clone(), line, column);

        let mut references = Vec::with_capacity(unit.references.len());
        for (i, r) in unit.references.iter().enumerate() {
            let ctx = || format!("units[{u}].references[{i}]");
            references.push(ReferenceSite {
                node: check_node(node_count, &ctx, r.node)?,
                location: location(r.line, r.column),
            });
        }

        let mut calls = Vec::with_capacity(unit.calls.len());
        for (i, c) in unit.calls.iter().enumerate() {
            let ctx = || format!("units[{u}].calls[{i}]");
            if let Some(receiver) = c.receiver {
                check_node(node_count, &ctx, receiver)?;
            }
            if let Some(enclosing) = c.enclosing_type {
                check_symbol(symbol_count, &ctx, enclosing)?;
            }
            calls.push(CallSite {
                node: check_node(node_count, &ctx, c.node)?,
                receiver: c.receiver,
                enclosing_type: c.enclosing_type,
                location: location(c.line, c.column),
            });
        }

        let mut declarations = Vec::with_capacity(unit.declarations.len());
        for (i, d) in unit.declarations.iter().enumerate() {
            let ctx = || format!("units[{u}].declarations[{i}]");
            declarations.push(DeclarationSite {
                symbol: check_symbol(symbol_count, &ctx, d.symbol)?,
                location: location(d.line, d.column),
            });
        }

        units.push(AnalysisUnit {
            file: unit.file,
            references,
            calls,
            declarations,
        });
    }

    tracing::debug!(
        "Loaded snapshot: {} symbols, {} nodes, {} units",
        symbol_count,
        node_count,
        units.len()
    );

    Ok(Snapshot {
        model: builder.build(),
        units,
    })
}

fn check_symbol(
    count: usize,
    context: &dyn Fn() -> String,
    id: SymbolId,
) -> Result<SymbolId, SnapshotError> {
    if (id.0 as usize) < count {
        Ok(id)
    } else {
        Err(SnapshotError::DanglingSymbol {
            context: context(),
            id,
        })
    }
}

fn check_node(
    count: usize,
    context: &dyn Fn() -> String,
    id: NodeId,
) -> Result<NodeId, SnapshotError> {
    if (id.0 as usize) < count {
        Ok(id)
    } else {
        Err(SnapshotError::DanglingNode {
            context: context(),
            id,
        })
    }
}
