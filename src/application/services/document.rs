//! Table document service
//!
//! Loads the initial forest from a JSON table document (`{"rows": [...]}`)
//! and renders snapshots back to JSON for display.

use std::path::Path;
use std::sync::Arc;

use tracing::{debug, instrument};

use crate::application::{ApplicationError, ApplicationResult, IoResultExt};
use crate::domain::{DomainError, Forest, TableDocument};
use crate::infrastructure::traits::FileSystem;

/// Service for reading table documents.
pub struct DocumentService {
    fs: Arc<dyn FileSystem>,
}

impl DocumentService {
    /// Create a new document service.
    pub fn new(fs: Arc<dyn FileSystem>) -> Self {
        Self { fs }
    }

    /// Load and validate the forest stored at `path`.
    ///
    /// Fails if the file is missing, is not a valid table document, or
    /// contains the same row id more than once.
    #[instrument(level = "debug", skip(self))]
    pub fn load(&self, path: &Path) -> ApplicationResult<Forest> {
        if !self.fs.is_file(path) {
            return Err(ApplicationError::OperationFailed {
                context: format!("table document not found: {}", path.display()),
                source: Box::new(std::io::Error::new(
                    std::io::ErrorKind::NotFound,
                    "file does not exist",
                )),
            });
        }

        let content = self
            .fs
            .read_to_string(path)
            .with_path_context("read table document", path)?;

        let forest = Self::parse(&content).map_err(|e| match e {
            ApplicationError::Domain(DomainError::InvalidDocument(msg)) => {
                DomainError::InvalidDocument(format!("{}: {}", path.display(), msg)).into()
            }
            other => other,
        })?;
        debug!("load: {} rows, depth {}", forest.len(), forest.depth());
        Ok(forest)
    }

    /// Parse a table document from JSON text.
    pub fn parse(content: &str) -> ApplicationResult<Forest> {
        let document: TableDocument = serde_json::from_str(content)
            .map_err(|e| DomainError::InvalidDocument(e.to_string()))?;
        document.rows.validate_unique_ids()?;
        Ok(document.rows)
    }

    /// Render a snapshot as a pretty-printed table document.
    pub fn to_json(forest: &Forest) -> ApplicationResult<String> {
        let document = TableDocument {
            rows: forest.clone(),
        };
        serde_json::to_string_pretty(&document).map_err(|e| ApplicationError::OperationFailed {
            context: "serialize table document".to_string(),
            source: Box::new(e),
        })
    }
}
