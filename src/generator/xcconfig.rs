//! Configuration fragment composition
//!
//! This module handles:
//! - Merging user-declared build-setting overrides per scope
//! - Composing the standard pod entries for a fragment
//! - Rendering fragments as sorted `KEY = VALUE` lines

use std::collections::BTreeMap;

use crate::pod::{PodTarget, Specification};

/// Scope a fragment is computed for: the library unit as a whole, or one
/// test/app specification variant layered on top of it.
#[derive(Debug, Clone, Copy)]
pub enum FragmentScope<'a> {
    Library,
    Spec(&'a Specification),
}

/// Build-setting entries destined for one fragment file
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct XcconfigFragment {
    entries: BTreeMap<String, String>,
}

impl XcconfigFragment {
    pub fn new() -> Self {
        XcconfigFragment::default()
    }

    pub fn set(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.entries.insert(key.into(), value.into());
    }

    /// Layer `entries` on top, later values winning
    pub fn merge(&mut self, entries: &BTreeMap<String, String>) {
        for (key, value) in entries {
            self.entries.insert(key.clone(), value.clone());
        }
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.entries.get(key).map(String::as_str)
    }

    pub fn entries(&self) -> &BTreeMap<String, String> {
        &self.entries
    }

    /// Render as `KEY = VALUE` lines, sorted by key
    pub fn render(&self) -> String {
        let mut out = String::new();
        for (key, value) in &self.entries {
            out.push_str(key);
            out.push_str(" = ");
            out.push_str(value);
            out.push('\n');
        }
        out
    }
}

/// User-declared overrides merged for a scope.
///
/// The library scope merges every library spec's declared settings in
/// declaration order; a variant scope layers that variant's own settings on
/// top of the library merge. These keys are authoritative in the fragment
/// file, so the same keys are subtracted from in-memory unit settings.
pub fn merged_overrides(
    target: &PodTarget,
    scope: FragmentScope<'_>,
) -> BTreeMap<String, String> {
    let mut merged = BTreeMap::new();
    for accessor in target.library_file_accessors() {
        merged.extend(accessor.spec.pod_target_xcconfig.clone());
    }
    if let FragmentScope::Spec(spec) = scope {
        merged.extend(spec.pod_target_xcconfig.clone());
    }
    merged
}

/// Complete fragment for a scope: the standard pod entries plus the merged
/// user overrides. Only the buildable library scope pins the configuration
/// build directory; variants build into the default location.
pub fn fragment_for_scope(target: &PodTarget, scope: FragmentScope<'_>) -> XcconfigFragment {
    let mut fragment = XcconfigFragment::new();
    fragment.set("PODS_ROOT", "${SRCROOT}");
    fragment.set("PODS_BUILD_DIR", "${BUILD_DIR}");
    fragment.set(
        "PODS_CONFIGURATION_BUILD_DIR",
        "${PODS_BUILD_DIR}/$(CONFIGURATION)$(EFFECTIVE_PLATFORM_NAME)",
    );
    fragment.set(
        "PODS_TARGET_SRCROOT",
        format!("${{PODS_ROOT}}/{}", target.name),
    );
    if matches!(scope, FragmentScope::Library) && target.should_build() {
        fragment.set(
            "CONFIGURATION_BUILD_DIR",
            format!("${{PODS_CONFIGURATION_BUILD_DIR}}/{}", target.label()),
        );
    }
    fragment.set(
        "PRODUCT_BUNDLE_IDENTIFIER",
        "org.cocoapods.${PRODUCT_NAME:rfc1034identifier}",
    );
    fragment.set("SKIP_INSTALL", "YES");
    fragment.set(
        "GCC_PREPROCESSOR_DEFINITIONS",
        "$(inherited) COCOAPODS=1",
    );
    fragment.merge(&merged_overrides(target, scope));
    fragment
}
