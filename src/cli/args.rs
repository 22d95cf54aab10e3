//! CLI argument definitions using clap

use std::path::PathBuf;

use clap::{ArgAction, Parser, Subcommand, ValueEnum, ValueHint};

use crate::domain::{AllocationMode, RowId};

/// Hierarchical allocation tables: edit a row, every ancestor follows
#[derive(Parser, Debug)]
#[command(name = "allotree")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Log verbosity (-d info, -dd debug, -ddd trace)
    #[arg(short, long, action = ArgAction::Count, global = true)]
    pub debug: u8,

    /// Table document (default: data_file from config)
    #[arg(short, long, global = true, value_hint = ValueHint::FilePath)]
    pub file: Option<PathBuf>,

    /// Print the resulting table document as JSON
    #[arg(long, global = true)]
    pub json: bool,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Show rows with value and variance
    Show,

    /// Show the row hierarchy as a tree
    Tree,

    /// Set a row's value and shift its ancestors
    Set {
        /// Row id
        id: RowId,
        /// New value
        #[arg(allow_negative_numbers = true)]
        value: f64,
    },

    /// Allocate an amount to a row by percent or by value
    Allocate {
        /// Row id
        id: RowId,
        /// Amount: percent in percentage mode, absolute otherwise
        #[arg(allow_negative_numbers = true)]
        amount: String,
        /// Allocation mode (default: default_mode from config)
        #[arg(short, long, value_enum)]
        mode: Option<ModeArg>,
    },

    /// Manage settings
    Config {
        #[command(subcommand)]
        command: ConfigCommands,
    },

    /// Generate shell completions
    Completion {
        /// Shell type
        #[arg(value_enum)]
        shell: clap_complete::Shell,
    },
}

/// Config subcommands
#[derive(Subcommand, Debug)]
pub enum ConfigCommands {
    /// Show merged config
    Show,

    /// Create config template
    Init {
        /// Create global config
        #[arg(short, long)]
        global: bool,
    },

    /// Show config paths
    Path,
}

/// Allocation mode as accepted on the command line.
#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum ModeArg {
    /// Grow or shrink by a percentage of the current value
    #[value(alias = "percent")]
    Percentage,
    /// Add the amount as is
    #[value(alias = "value")]
    Absolute,
}

impl From<ModeArg> for AllocationMode {
    fn from(mode: ModeArg) -> Self {
        match mode {
            ModeArg::Percentage => AllocationMode::Percentage,
            ModeArg::Absolute => AllocationMode::Absolute,
        }
    }
}
