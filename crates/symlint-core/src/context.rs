//! Context handed to checks.

use crate::cancel::{CancellationToken, Cancelled};
use crate::model::SymbolModel;
use crate::unit::AnalysisUnit;

/// Everything a check sees while analyzing one unit.
///
/// The model is shared by every unit of a run; the unit is the file being
/// checked.
#[derive(Clone, Copy)]
pub struct CheckContext<'a> {
    /// Resolved program model.
    pub model: &'a dyn SymbolModel,
    /// Sites of the file being checked.
    pub unit: &'a AnalysisUnit,
    /// Cancellation signal for the whole run.
    pub cancel: &'a CancellationToken,
}

impl<'a> CheckContext<'a> {
    /// Creates a new context.
    #[must_use]
    pub fn new(
        model: &'a dyn SymbolModel,
        unit: &'a AnalysisUnit,
        cancel: &'a CancellationToken,
    ) -> Self {
        Self {
            model,
            unit,
            cancel,
        }
    }

    /// Shorthand for `self.cancel.check()`.
    ///
    /// # Errors
    ///
    /// Returns [`Cancelled`] once the run was cancelled.
    pub fn checkpoint(&self) -> Result<(), Cancelled> {
        self.cancel.check()
    }
}

impl std::fmt::Debug for CheckContext<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CheckContext")
            .field("unit", &self.unit.file)
            .field("cancelled", &self.cancel.is_cancelled())
            .finish_non_exhaustive()
    }
}
