//! Sandbox directory layout
//!
//! All generated artifacts live under one sandbox root:
//! - `Target Support Files/<Label>/` holds every generated support file
//! - `Headers/Public/<Module>/` is the canonical non-framework header space
//! - `<PodName>/` holds the pod's own sources
//!
//! Build settings and script entries render paths relative to this root so a
//! checked-in sandbox works from any checkout location.

use std::path::{Path, PathBuf};

use crate::path_utils::relative_path_from;

/// Root of the generated artifact tree
#[derive(Debug, Clone)]
pub struct Sandbox {
    root: PathBuf,
}

impl Sandbox {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Sandbox { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Directory holding a pod's sources
    pub fn pod_dir(&self, name: &str) -> PathBuf {
        self.root.join(name)
    }

    pub fn target_support_files_root(&self) -> PathBuf {
        self.root.join("Target Support Files")
    }

    /// Support-files directory for one build unit family
    pub fn target_support_files_dir(&self, name: &str) -> PathBuf {
        self.target_support_files_root().join(name)
    }

    /// Canonical header space for modules built outside a framework wrapper
    pub fn public_headers_root(&self) -> PathBuf {
        self.root.join("Headers").join("Public")
    }

    /// Where the generated project description is written
    pub fn project_path(&self) -> PathBuf {
        self.root.join("project.yaml")
    }

    /// Expresses `path` relative to the sandbox root, stepping out with `..`
    /// components when the path lives outside the sandbox.
    pub fn relative_path(&self, path: &Path) -> PathBuf {
        relative_path_from(path, &self.root)
    }
}
