//! Service container for dependency injection
//!
//! Wires up all services with their dependencies.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use tracing::debug;

use crate::application::services::{AllocationSession, DocumentService};
use crate::application::{ApplicationError, ApplicationResult};
use crate::config::Settings;
use crate::infrastructure::traits::{FileSystem, RealFileSystem};

/// Container holding all application services.
pub struct ServiceContainer {
    /// Application settings
    pub settings: Arc<Settings>,

    /// Filesystem abstraction
    pub fs: Arc<dyn FileSystem>,
}

impl ServiceContainer {
    /// Create a new service container with real implementations.
    pub fn new(settings: Settings) -> Self {
        Self::with_deps(settings, Arc::new(RealFileSystem))
    }

    /// Create a service container with custom dependencies (for testing).
    pub fn with_deps(settings: Settings, fs: Arc<dyn FileSystem>) -> Self {
        let settings = Arc::new(settings);

        Self { settings, fs }
    }

    pub fn document_service(&self) -> DocumentService {
        DocumentService::new(Arc::clone(&self.fs))
    }

    /// Table document to work on: explicit path first, then `data_file` from settings.
    pub fn resolve_document(&self, explicit: Option<&Path>) -> ApplicationResult<PathBuf> {
        explicit
            .map(Path::to_path_buf)
            .or_else(|| self.settings.data_file.clone())
            .ok_or(ApplicationError::NoDocument)
    }

    /// Load the table document and start a session on it.
    pub fn open_session(&self, explicit: Option<&Path>) -> ApplicationResult<AllocationSession> {
        let path = self.resolve_document(explicit)?;
        debug!("open_session: {}", path.display());
        let forest = self.document_service().load(&path)?;
        Ok(AllocationSession::new(forest))
    }
}
