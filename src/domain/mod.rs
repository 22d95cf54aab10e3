//! Domain layer: allocation tree entities and propagation logic
//!
//! This layer is independent of external concerns (no I/O, no CLI, no config loading).

pub mod allocation;
pub mod display;
pub mod entities;
pub mod error;
pub mod propagation;

pub use allocation::{allocate, parse_amount, AllocationMode, PendingInputs};
pub use display::{effective_value, variance, variance_or, variance_percent};
pub use entities::{Forest, ForestIter, Row, RowId, TableDocument};
pub use error::{DomainError, DomainResult};
pub use propagation::{apply_override, Propagation};
