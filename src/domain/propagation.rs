//! Override propagation over an immutable forest snapshot.
//!
//! Setting a row's value rewrites only the path from that row up to its root:
//! the row gets the new override and every ancestor is shifted by the same
//! delta (`new_value - base_value` of the edited row). Everything off that
//! path is carried over by reference.

use std::sync::Arc;

use tracing::{debug, instrument, trace};

use crate::domain::entities::{Forest, Row, RowId};
use crate::domain::error::{DomainError, DomainResult};

/// Outcome of [`apply_override`].
#[derive(Debug, Clone, PartialEq)]
pub struct Propagation {
    /// Whether the target row was found and rewritten
    pub changed: bool,
    /// New snapshot; identical to the input when nothing changed
    pub forest: Forest,
    /// Shift applied to every ancestor, `None` when nothing changed
    pub delta: Option<f64>,
}

/// A rebuilt sibling sequence together with the delta it carries upward.
struct LevelEdit {
    rows: Vec<Arc<Row>>,
    delta: f64,
}

/// Override the value of `target` and propagate the delta to all its ancestors.
///
/// The delta is always measured against the row's base value, so repeated
/// edits of the same row reset rather than compound on the row itself.
///
/// # Errors
/// * `MalformedInput` if `new_value` is not finite.
/// * `ConflictingIdentifier` if `target` occurs more than once in the forest.
///   No snapshot is produced in that case.
#[instrument(level = "debug", skip(forest, target), fields(target = %target))]
pub fn apply_override(forest: &Forest, target: &RowId, new_value: f64) -> DomainResult<Propagation> {
    if !new_value.is_finite() {
        return Err(DomainError::MalformedInput(format!(
            "value for row {target} is not a finite number: {new_value}"
        )));
    }

    match rewrite_level(forest.roots(), target, new_value)? {
        Some(edit) => {
            debug!(delta = edit.delta, "override applied");
            Ok(Propagation {
                changed: true,
                forest: Forest::from_shared(edit.rows),
                delta: Some(edit.delta),
            })
        }
        None => {
            debug!("target not found, forest unchanged");
            Ok(Propagation {
                changed: false,
                forest: forest.clone(),
                delta: None,
            })
        }
    }
}

/// Scan every sibling of one level; rebuild the sequence only if the target
/// lives somewhere below it.
fn rewrite_level(rows: &[Arc<Row>], target: &RowId, new_value: f64) -> DomainResult<Option<LevelEdit>> {
    let mut edit: Option<LevelEdit> = None;

    for (i, row) in rows.iter().enumerate() {
        let replacement = if &row.id == target {
            if occurs_in(&row.children, target) {
                return Err(DomainError::ConflictingIdentifier(target.clone()));
            }
            let delta = finite(new_value - row.base_value, row, "delta")?;
            trace!(row = %row.id, delta, "target row");
            let updated = Row {
                override_value: Some(new_value),
                ..Row::clone(row)
            };
            Some((updated, delta))
        } else if !row.children.is_empty() {
            match rewrite_level(&row.children, target, new_value)? {
                Some(child_edit) => {
                    trace!(row = %row.id, delta = child_edit.delta, "ancestor row");
                    let shifted = finite(row.effective_value() + child_edit.delta, row, "value")?;
                    let updated = Row {
                        id: row.id.clone(),
                        label: row.label.clone(),
                        base_value: row.base_value,
                        override_value: Some(shifted),
                        children: child_edit.rows,
                    };
                    Some((updated, child_edit.delta))
                }
                None => None,
            }
        } else {
            None
        };

        if let Some((updated, delta)) = replacement {
            if edit.is_some() {
                return Err(DomainError::ConflictingIdentifier(target.clone()));
            }
            let mut rebuilt = rows.to_vec();
            rebuilt[i] = Arc::new(updated);
            edit = Some(LevelEdit { rows: rebuilt, delta });
        }
    }

    Ok(edit)
}

/// Edits must not push any row out of the finite range; `null` on the wire
/// would silently drop the override on reload.
fn finite(value: f64, row: &Row, what: &str) -> DomainResult<f64> {
    if value.is_finite() {
        Ok(value)
    } else {
        Err(DomainError::MalformedInput(format!(
            "{what} of row {} overflows: {value}",
            row.id
        )))
    }
}

fn occurs_in(rows: &[Arc<Row>], target: &RowId) -> bool {
    rows.iter()
        .any(|row| &row.id == target || occurs_in(&row.children, target))
}
