// Integration test utilities and common code
// WHY: Centralized utilities avoid duplication across integration tests

use std::path::{Path, PathBuf};
use tempfile::TempDir;

/// Test fixture helper for creating temporary directories with .docx documents
pub struct TestFixture {
    pub temp_dir: TempDir,
    pub root_path: PathBuf,
}

impl TestFixture {
    /// Create a new test fixture with temporary directory
    pub fn new() -> Self {
        let temp_dir = TempDir::new().expect("Failed to create temp directory");
        let root_path = temp_dir.path().to_path_buf();

        Self {
            temp_dir,
            root_path,
        }
    }

    /// Create a document with the given paragraphs
    pub fn create_document<P: AsRef<Path>>(&self, relative_path: P, paragraphs: &[&str]) -> PathBuf {
        let file_path = self.root_path.join(relative_path);

        if let Some(parent) = file_path.parent() {
            std::fs::create_dir_all(parent).expect("Failed to create parent directories");
        }

        reflow::write_paragraphs(&file_path, paragraphs).expect("Failed to write test document");
        file_path
    }

    /// Path for an output document inside the fixture
    pub fn path<P: AsRef<Path>>(&self, relative_path: P) -> PathBuf {
        self.root_path.join(relative_path)
    }

    /// Read the paragraphs of a document
    pub fn read_document<P: AsRef<Path>>(&self, path: P) -> Vec<String> {
        let (paragraphs, _stats) = reflow::read_paragraphs(path).expect("Failed to read document");
        paragraphs
    }

    /// Names of all entries in the fixture root
    pub fn entries(&self) -> Vec<String> {
        let mut names: Vec<String> = std::fs::read_dir(&self.root_path)
            .expect("Failed to list fixture directory")
            .map(|entry| entry.expect("Bad dir entry").file_name().to_string_lossy().to_string())
            .collect();
        names.sort();
        names
    }
}

/// Compare paragraph sequences, providing detailed diff on mismatch
pub fn assert_paragraphs(actual: &[String], expected: &[&str], context: &str) {
    if actual.len() != expected.len() {
        panic!(
            "{}: Paragraph count mismatch. Expected {} paragraphs, got {}\nActual: {:#?}",
            context, expected.len(), actual.len(), actual
        );
    }

    for (i, (actual_para, expected_para)) in actual.iter().zip(expected.iter()).enumerate() {
        if actual_para != expected_para {
            panic!(
                "{}: Paragraph {} mismatch\nExpected: {:?}\nActual:   {:?}",
                context, i + 1, expected_para, actual_para
            );
        }
    }
}
