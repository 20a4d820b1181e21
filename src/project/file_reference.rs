//! File references and localization variant groups

use std::path::PathBuf;

use serde::Serialize;

/// Index of a file reference within the project
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(transparent)]
pub struct FileRefId(pub usize);

/// A project-level handle to a file or variant group on disk.
///
/// Members of a localization variant group carry `parent` pointing at the
/// group reference; lookups for a member resolve to the group. Composite
/// resources such as versioned data models are registered through their
/// top-level directory only.
#[derive(Debug, Clone, Serialize)]
pub struct FileReference {
    pub path: PathBuf,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    pub is_variant_group: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub parent: Option<FileRefId>,
}

impl FileReference {
    pub fn file(path: impl Into<PathBuf>) -> Self {
        FileReference {
            path: path.into(),
            name: None,
            is_variant_group: false,
            parent: None,
        }
    }

    /// Display name of the reference: its explicit name or the path basename
    pub fn display_name(&self) -> String {
        if let Some(name) = &self.name {
            return name.clone();
        }
        self.path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default()
    }
}
