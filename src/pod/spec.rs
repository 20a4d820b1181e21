//! Specification variants of a pod
//!
//! A pod declares one or more library specs plus optional test and app specs.
//! Each variant gets its own build unit, settings scope and support files.

use std::collections::BTreeMap;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};

/// Kind of test bundle a test spec produces
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TestType {
    Unit,
    Ui,
}

impl TestType {
    /// Capitalized form used in unit labels and app host names
    pub fn capitalized(self) -> &'static str {
        match self {
            TestType::Unit => "Unit",
            TestType::Ui => "Ui",
        }
    }
}

/// Closed set of artifact kinds a specification variant can declare
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SpecKind {
    Library,
    Test(TestType),
    App,
}

impl SpecKind {
    pub fn is_library(self) -> bool {
        matches!(self, SpecKind::Library)
    }

    pub fn is_test(self) -> bool {
        matches!(self, SpecKind::Test(_))
    }

    pub fn is_app(self) -> bool {
        matches!(self, SpecKind::App)
    }
}

/// Prefix-header declaration of a single spec
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum PrefixHeaderFile {
    /// Nothing declared; the generated header carries the platform import and
    /// any inline contents.
    #[default]
    Default,
    /// Prefix-header generation is disabled for the whole variant group.
    Disabled,
    /// The contents of this file (relative to the pod root) are appended to
    /// the generated header.
    Path(PathBuf),
}

/// One declared specification variant of a pod
#[derive(Debug, Clone)]
pub struct Specification {
    /// Variant name, e.g. `Tests` or `App`. Library specs carry the pod name.
    pub name: String,
    pub kind: SpecKind,
    /// Test specs only: whether running requires a hosting application
    pub requires_app_host: bool,
    pub compiler_flags: Vec<String>,
    pub prefix_header_contents: Option<String>,
    pub prefix_header_file: PrefixHeaderFile,
    /// User-declared build-setting overrides destined for the configuration
    /// fragment of this variant's scope
    pub pod_target_xcconfig: BTreeMap<String, String>,
    /// Extra entries merged into generated Info.plist files
    pub info_plist_entries: BTreeMap<String, String>,
}

impl Specification {
    pub fn library(name: impl Into<String>) -> Self {
        Specification {
            name: name.into(),
            kind: SpecKind::Library,
            requires_app_host: false,
            compiler_flags: Vec::new(),
            prefix_header_contents: None,
            prefix_header_file: PrefixHeaderFile::Default,
            pod_target_xcconfig: BTreeMap::new(),
            info_plist_entries: BTreeMap::new(),
        }
    }

    pub fn test(name: impl Into<String>, test_type: TestType) -> Self {
        Specification {
            kind: SpecKind::Test(test_type),
            ..Specification::library(name)
        }
    }

    pub fn app(name: impl Into<String>) -> Self {
        Specification {
            kind: SpecKind::App,
            ..Specification::library(name)
        }
    }

    pub fn test_type(&self) -> Option<TestType> {
        match self.kind {
            SpecKind::Test(test_type) => Some(test_type),
            SpecKind::Library | SpecKind::App => None,
        }
    }
}
