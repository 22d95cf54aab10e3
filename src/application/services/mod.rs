//! Application services

pub mod document;
pub mod session;

pub use document::DocumentService;
pub use session::{AllocationSession, AppliedEdit, EditOutcome};
