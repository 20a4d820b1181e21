//! Linkage modes a pod target can be built with

use serde::{Deserialize, Serialize};

/// How a pod target is linked into the consuming app, if at all.
///
/// `None` marks pre-built pods that ship vendored binaries: they still get a
/// placeholder unit and a configuration fragment, but no sources are compiled.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Linkage {
    StaticLibrary,
    StaticFramework,
    DynamicFramework,
    None,
}

impl Linkage {
    pub fn should_build(self) -> bool {
        self != Linkage::None
    }

    pub fn builds_framework(self) -> bool {
        matches!(self, Linkage::StaticFramework | Linkage::DynamicFramework)
    }

    pub fn is_static_framework(self) -> bool {
        self == Linkage::StaticFramework
    }

    pub fn is_dynamic_framework(self) -> bool {
        self == Linkage::DynamicFramework
    }

    pub fn is_static_library(self) -> bool {
        self == Linkage::StaticLibrary
    }
}

impl Default for Linkage {
    fn default() -> Self {
        Linkage::StaticLibrary
    }
}
