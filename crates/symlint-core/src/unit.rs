//! Syntax sites handed to checks by the host, grouped per source file.

use crate::model::{NodeId, SymbolId};
use crate::types::Location;
use std::path::PathBuf;

/// A member access or invocation whose target symbol should be policed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReferenceSite {
    /// Node resolving to the referenced member.
    pub node: NodeId,
    /// Where to report.
    pub location: Location,
}

/// A method invocation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CallSite {
    /// Node resolving to the invoked method.
    pub node: NodeId,
    /// Receiver expression of `receiver.Method()`; `None` for unqualified calls.
    pub receiver: Option<NodeId>,
    /// Type whose body contains the call.
    pub enclosing_type: Option<SymbolId>,
    /// Where to report.
    pub location: Location,
}

/// A declared symbol (type, method, property...).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeclarationSite {
    /// The declared symbol.
    pub symbol: SymbolId,
    /// Where to report.
    pub location: Location,
}

/// Every analyzable site of one source file.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AnalysisUnit {
    /// Source file path as reported by the host.
    pub file: PathBuf,
    /// Member accesses and invocations.
    pub references: Vec<ReferenceSite>,
    /// Method invocations with receiver information.
    pub calls: Vec<CallSite>,
    /// Declarations.
    pub declarations: Vec<DeclarationSite>,
}

impl AnalysisUnit {
    /// Creates an empty unit for `file`.
    #[must_use]
    pub fn new(file: impl Into<PathBuf>) -> Self {
        Self {
            file: file.into(),
            ..Self::default()
        }
    }

    /// Returns true if the unit has no sites.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.references.is_empty() && self.calls.is_empty() && self.declarations.is_empty()
    }

    /// Returns a location in this unit's file.
    #[must_use]
    pub fn location(&self, line: usize, column: usize) -> Location {
        Location::new(self.file.clone(), line, column)
    }
}
