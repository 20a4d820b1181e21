//! Cross-platform path utilities for Podgen
//!
//! Generated settings, scripts and symlinks always render paths with forward
//! slashes so output is identical across platforms.

use std::path::{Component, Path, PathBuf};

/// Converts a path to a string with forward slashes regardless of platform.
pub fn to_forward_slashes(path: &Path) -> String {
    path.to_string_lossy().replace('\\', "/")
}

/// Make a build unit label usable as a C identifier.
///
/// Replaces every character outside `[a-zA-Z0-9_]` with an underscore and
/// prefixes an underscore when the label starts with a digit. Used for the
/// generated dummy class name.
pub fn sanitize_identifier(label: &str) -> String {
    let mut identifier: String = label
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() || c == '_' { c } else { '_' })
        .collect();
    if identifier.chars().next().is_some_and(|c| c.is_ascii_digit()) {
        identifier.insert(0, '_');
    }
    identifier
}

/// Computes `path` relative to the directory `base` lexically.
///
/// Both paths must share a root (both absolute or both relative to the same
/// anchor). No filesystem access is performed, so neither path has to exist.
///
/// # Examples
///
/// `/pods/Headers/Public/Foo` to `/pods/Target Support Files/Foo/Foo.modulemap`
/// yields `../../../Target Support Files/Foo/Foo.modulemap`.
pub fn relative_path_from(path: &Path, base: &Path) -> PathBuf {
    let path_components: Vec<Component> = path.components().collect();
    let base_components: Vec<Component> = base.components().collect();

    let mut common = 0;
    while common < path_components.len()
        && common < base_components.len()
        && path_components[common] == base_components[common]
    {
        common += 1;
    }

    let mut result = PathBuf::new();
    for _ in common..base_components.len() {
        result.push("..");
    }
    for component in &path_components[common..] {
        result.push(component.as_os_str());
    }

    if result.as_os_str().is_empty() {
        PathBuf::from(".")
    } else {
        result
    }
}
