//! Allocation policy: turning a pending input into the value to assign.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::domain::entities::RowId;
use crate::domain::error::{DomainError, DomainResult};

/// How a pending amount is applied to a row's current effective value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AllocationMode {
    /// Grow or shrink by `amount` percent
    #[default]
    #[serde(alias = "percent")]
    Percentage,
    /// Add `amount` as is
    #[serde(alias = "value")]
    Absolute,
}

impl fmt::Display for AllocationMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AllocationMode::Percentage => f.write_str("percentage"),
            AllocationMode::Absolute => f.write_str("absolute"),
        }
    }
}

/// New value for a row whose effective value is `current`.
pub fn allocate(current: f64, mode: AllocationMode, amount: f64) -> f64 {
    match mode {
        AllocationMode::Percentage => current + current * amount / 100.0,
        AllocationMode::Absolute => current + amount,
    }
}

/// Parse raw user input into an amount.
///
/// Non-numeric, empty and non-finite input is rejected here so that nothing
/// but a finite number ever reaches the propagation engine.
pub fn parse_amount(raw: &str) -> DomainResult<f64> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Err(DomainError::MalformedInput("empty amount".to_string()));
    }
    let amount: f64 = trimmed
        .parse()
        .map_err(|_| DomainError::MalformedInput(format!("not a number: {trimmed}")))?;
    if !amount.is_finite() {
        return Err(DomainError::MalformedInput(format!(
            "not a finite number: {trimmed}"
        )));
    }
    Ok(amount)
}

/// Amounts entered per row but not yet allocated.
///
/// An entered `0` is a real input, distinct from "nothing entered".
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PendingInputs {
    amounts: BTreeMap<RowId, f64>,
}

impl PendingInputs {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set(&mut self, id: RowId, amount: f64) {
        self.amounts.insert(id, amount);
    }

    pub fn get(&self, id: &RowId) -> Option<f64> {
        self.amounts.get(id).copied()
    }

    pub fn clear(&mut self, id: &RowId) -> Option<f64> {
        self.amounts.remove(id)
    }

    pub fn is_empty(&self) -> bool {
        self.amounts.is_empty()
    }
}
