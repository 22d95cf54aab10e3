//! Tests for ServiceContainer wiring with an in-memory filesystem

use std::collections::HashMap;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use allotree::application::ApplicationError;
use allotree::config::Settings;
use allotree::domain::RowId;
use allotree::infrastructure::di::ServiceContainer;
use allotree::infrastructure::traits::FileSystem;
use allotree::util::testing;

/// Filesystem backed by a map of path -> content.
#[derive(Default)]
struct MemoryFileSystem {
    files: HashMap<PathBuf, String>,
}

impl MemoryFileSystem {
    fn with_file(mut self, path: &str, content: &str) -> Self {
        self.files.insert(PathBuf::from(path), content.to_string());
        self
    }
}

impl FileSystem for MemoryFileSystem {
    fn read_to_string(&self, path: &Path) -> io::Result<String> {
        self.files
            .get(path)
            .cloned()
            .ok_or_else(|| io::Error::new(io::ErrorKind::NotFound, "not in memory"))
    }

    fn is_file(&self, path: &Path) -> bool {
        self.files.contains_key(path)
    }
}

const TABLE: &str = r#"{"rows":[{"id":"r","label":"Root","value":10,
    "children":[{"id":"c","label":"Child","value":4}]}]}"#;

fn container(settings: Settings) -> ServiceContainer {
    testing::init_test_setup();
    let fs = MemoryFileSystem::default().with_file("/mem/table.json", TABLE);
    ServiceContainer::with_deps(settings, Arc::new(fs))
}

#[test]
fn given_explicit_file_when_opening_session_then_loads_it() {
    // Arrange
    let container = container(Settings::default());

    // Act
    let session = container
        .open_session(Some(Path::new("/mem/table.json")))
        .unwrap();

    // Assert
    assert_eq!(session.forest().len(), 2);
}

#[test]
fn given_data_file_in_settings_when_opening_without_file_then_uses_it() {
    // Arrange
    let settings = Settings {
        data_file: Some(PathBuf::from("/mem/table.json")),
        ..Settings::default()
    };
    let container = container(settings);

    // Act
    let mut session = container.open_session(None).unwrap();
    session.set_value(&RowId::from("c"), 6.0).unwrap();

    // Assert
    let root = session.forest().find(&RowId::from("r")).unwrap();
    assert_eq!(root.effective_value(), 12.0);
}

#[test]
fn given_explicit_file_and_data_file_when_resolving_then_explicit_wins() {
    // Arrange
    let settings = Settings {
        data_file: Some(PathBuf::from("/mem/other.json")),
        ..Settings::default()
    };
    let container = container(settings);

    // Act
    let path = container
        .resolve_document(Some(Path::new("/mem/table.json")))
        .unwrap();

    // Assert
    assert_eq!(path, PathBuf::from("/mem/table.json"));
}

#[test]
fn given_no_document_anywhere_when_opening_then_no_document_error() {
    let container = container(Settings::default());
    assert!(matches!(
        container.open_session(None),
        Err(ApplicationError::NoDocument)
    ));
}

#[test]
fn given_missing_file_when_opening_then_operation_failed() {
    let container = container(Settings::default());
    assert!(matches!(
        container.open_session(Some(Path::new("/mem/missing.json"))),
        Err(ApplicationError::OperationFailed { .. })
    ));
}
