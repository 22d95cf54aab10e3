//! Allocation session
//!
//! Holds the current forest snapshot together with the amounts entered per
//! row, and turns "allocate by percent" / "allocate by value" actions into
//! override edits.

use tracing::{debug, instrument, warn};

use crate::application::ApplicationResult;
use crate::domain::{
    allocate, apply_override, parse_amount, AllocationMode, Forest, PendingInputs, RowId,
};

/// An edit that was accepted and replaced the snapshot.
#[derive(Debug, Clone, PartialEq)]
pub struct AppliedEdit {
    pub id: RowId,
    pub new_value: f64,
    /// Shift applied to every ancestor of `id`
    pub delta: f64,
}

/// Result of an edit request.
#[derive(Debug, Clone, PartialEq)]
pub enum EditOutcome {
    /// Snapshot replaced
    Applied(AppliedEdit),
    /// No row with this id; snapshot untouched
    NotFound(RowId),
    /// Allocation requested without a pending amount; snapshot untouched
    NoInput(RowId),
}

impl EditOutcome {
    pub fn is_applied(&self) -> bool {
        matches!(self, EditOutcome::Applied(_))
    }
}

/// Stateful caller of the propagation engine.
///
/// Every accepted edit swaps in a new snapshot; failed or no-op edits keep
/// the previous one.
#[derive(Debug, Clone)]
pub struct AllocationSession {
    forest: Forest,
    pending: PendingInputs,
    history: Vec<AppliedEdit>,
}

impl AllocationSession {
    pub fn new(forest: Forest) -> Self {
        Self {
            forest,
            pending: PendingInputs::new(),
            history: Vec::new(),
        }
    }

    pub fn forest(&self) -> &Forest {
        &self.forest
    }

    pub fn into_forest(self) -> Forest {
        self.forest
    }

    pub fn pending(&self) -> &PendingInputs {
        &self.pending
    }

    /// Accepted edits, oldest first.
    pub fn history(&self) -> &[AppliedEdit] {
        &self.history
    }

    /// Record a raw amount entered for `id`.
    ///
    /// Malformed input is rejected and leaves any previous amount in place.
    pub fn set_input(&mut self, id: RowId, raw: &str) -> ApplicationResult<f64> {
        let amount = parse_amount(raw)?;
        debug!("set_input: row={} amount={}", id, amount);
        self.pending.set(id, amount);
        Ok(amount)
    }

    pub fn clear_input(&mut self, id: &RowId) -> Option<f64> {
        self.pending.clear(id)
    }

    /// Assign `new_value` to `id` directly and propagate to its ancestors.
    #[instrument(level = "debug", skip(self))]
    pub fn set_value(&mut self, id: &RowId, new_value: f64) -> ApplicationResult<EditOutcome> {
        let propagation = apply_override(&self.forest, id, new_value)?;
        match propagation.delta {
            Some(delta) if propagation.changed => {
                self.forest = propagation.forest;
                let edit = AppliedEdit {
                    id: id.clone(),
                    new_value,
                    delta,
                };
                self.history.push(edit.clone());
                Ok(EditOutcome::Applied(edit))
            }
            _ => {
                warn!("row not found: {}", id);
                Ok(EditOutcome::NotFound(id.clone()))
            }
        }
    }

    /// Apply the pending amount of `id` according to `mode`.
    ///
    /// The amount stays pending afterwards, so the same action can be repeated.
    #[instrument(level = "debug", skip(self))]
    pub fn allocate(&mut self, id: &RowId, mode: AllocationMode) -> ApplicationResult<EditOutcome> {
        let Some(amount) = self.pending.get(id) else {
            debug!("allocate: no pending input for {}", id);
            return Ok(EditOutcome::NoInput(id.clone()));
        };
        let Some(row) = self.forest.find(id) else {
            warn!("row not found: {}", id);
            return Ok(EditOutcome::NotFound(id.clone()));
        };

        let new_value = allocate(row.effective_value(), mode, amount);
        debug!(
            "allocate: row={} mode={} amount={} current={} new={}",
            id,
            mode,
            amount,
            row.effective_value(),
            new_value
        );
        self.set_value(id, new_value)
    }
}
