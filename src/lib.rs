//! allotree: hierarchical allocation tables.
//!
//! Rows form a forest; overriding one row's value shifts every ancestor by
//! the same delta while leaving the rest of the forest untouched. The
//! propagation itself lives in [`domain::propagation`]; the other layers load
//! table documents, hold editing sessions and drive the command line.

pub mod application;
pub mod cli;
pub mod config;
pub mod domain;
pub mod exitcode;
pub mod infrastructure;
pub mod util;
