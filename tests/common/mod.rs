//! Common test utilities for Podgen integration tests

use std::path::PathBuf;
use tempfile::TempDir;

/// A test sandbox for integration tests
#[allow(dead_code)]
pub struct TestSandbox {
    /// Temporary directory
    #[allow(dead_code)]
    pub temp: TempDir,
    /// Path to sandbox root
    pub path: PathBuf,
}

#[allow(dead_code)]
impl TestSandbox {
    /// Create a new test sandbox
    pub fn new() -> Self {
        let temp = TempDir::new().expect("Failed to create temp directory");
        let path = temp.path().to_path_buf();
        Self { temp, path }
    }

    /// Write a file in the sandbox
    pub fn write_file(&self, path: &str, content: &str) {
        let file_path = self.path.join(path);
        if let Some(parent) = file_path.parent() {
            std::fs::create_dir_all(parent).expect("Failed to create parent directory");
        }
        std::fs::write(&file_path, content).expect("Failed to write file");
    }

    /// Read a file from the sandbox
    pub fn read_file(&self, path: &str) -> String {
        let file_path = self.path.join(path);
        std::fs::read_to_string(&file_path).expect("Failed to read file")
    }

    /// Check if a file exists in the sandbox
    pub fn file_exists(&self, path: &str) -> bool {
        self.path.join(path).exists()
    }

    /// Write the install manifest at the sandbox root
    pub fn write_manifest(&self, content: &str) {
        self.write_file("podgen.yaml", content);
    }

    /// Seed a source file under a pod's directory
    pub fn write_pod_file(&self, pod: &str, path: &str, content: &str) {
        self.write_file(&format!("{}/{}", pod, path), content);
    }

    /// Path to a generated support file for one build unit family
    pub fn support_file(&self, pod: &str, name: &str) -> PathBuf {
        self.path
            .join("Target Support Files")
            .join(pod)
            .join(name)
    }
}
