//! Build phases attached to build units

use serde::Serialize;

use super::file_reference::FileRefId;

/// Per-file settings inside a build phase
#[derive(Debug, Clone, Default, Serialize)]
pub struct BuildFileSettings {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub compiler_flags: Option<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub attributes: Vec<String>,
}

impl BuildFileSettings {
    pub fn compiler_flags(flags: impl Into<String>) -> Self {
        BuildFileSettings {
            compiler_flags: Some(flags.into()),
            attributes: Vec::new(),
        }
    }

    pub fn attributes(attributes: Vec<String>) -> Self {
        BuildFileSettings {
            compiler_flags: None,
            attributes,
        }
    }
}

/// A file added to a build phase
#[derive(Debug, Clone, Serialize)]
pub struct BuildFile {
    pub file_ref: FileRefId,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub settings: Option<BuildFileSettings>,
}

/// An ordered list of build files, shared by the simple phase kinds
#[derive(Debug, Clone, Default, Serialize)]
pub struct FilesBuildPhase {
    pub files: Vec<BuildFile>,
}

impl FilesBuildPhase {
    pub fn add_file_reference(&mut self, file_ref: FileRefId, settings: Option<BuildFileSettings>) {
        self.files.push(BuildFile { file_ref, settings });
    }

    pub fn contains(&self, file_ref: FileRefId) -> bool {
        self.files.iter().any(|file| file.file_ref == file_ref)
    }

    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }
}

/// A named copy-files phase with a destination inside the build products
#[derive(Debug, Clone, Serialize)]
pub struct CopyFilesBuildPhase {
    pub name: String,
    pub dst_path: String,
    pub files: Vec<BuildFile>,
}

impl CopyFilesBuildPhase {
    pub fn new(name: impl Into<String>, dst_path: impl Into<String>) -> Self {
        CopyFilesBuildPhase {
            name: name.into(),
            dst_path: dst_path.into(),
            files: Vec::new(),
        }
    }

    pub fn add_file_reference(&mut self, file_ref: FileRefId) {
        self.files.push(BuildFile {
            file_ref,
            settings: None,
        });
    }
}

/// A shell-script phase run during the build
#[derive(Debug, Clone, Serialize)]
pub struct ShellScriptBuildPhase {
    pub name: String,
    pub shell_path: String,
    pub shell_script: String,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub input_paths: Vec<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub output_paths: Vec<String>,
}

impl ShellScriptBuildPhase {
    pub fn new(name: impl Into<String>) -> Self {
        ShellScriptBuildPhase {
            name: name.into(),
            shell_path: "/bin/sh".to_string(),
            shell_script: String::new(),
            input_paths: Vec::new(),
            output_paths: Vec::new(),
        }
    }
}
