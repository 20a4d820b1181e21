//! Copy-resources and embed-frameworks script generation
//!
//! Each test/app variant gets one script of each kind. Entries are grouped
//! per build configuration and emitted as guarded blocks, so the scripts
//! only act on artifacts of the active configuration.

use std::collections::BTreeMap;

/// Render the copy-resources script: `install_resource` calls guarded per
/// configuration.
pub fn copy_resources_script(resources_by_config: &BTreeMap<String, Vec<String>>) -> String {
    let mut out = String::new();
    out.push_str("#!/bin/sh\n");
    out.push_str("set -e\n");
    out.push_str("set -u\n");
    out.push_str("set -o pipefail\n");
    out.push('\n');
    out.push_str("mkdir -p \"${TARGET_BUILD_DIR}/${UNLOCALIZED_RESOURCES_FOLDER_PATH}\"\n");
    out.push('\n');
    out.push_str("install_resource()\n");
    out.push_str("{\n");
    out.push_str("  cp -R \"$1\" \"${TARGET_BUILD_DIR}/${UNLOCALIZED_RESOURCES_FOLDER_PATH}/\"\n");
    out.push_str("}\n");
    out.push('\n');
    out.push_str(&guarded_blocks(resources_by_config, "install_resource"));
    out
}

/// Render the embed-frameworks script: `install_framework` calls guarded
/// per configuration, one per dynamic-framework dependency.
pub fn embed_frameworks_script(frameworks_by_config: &BTreeMap<String, Vec<String>>) -> String {
    let mut out = String::new();
    out.push_str("#!/bin/sh\n");
    out.push_str("set -e\n");
    out.push_str("set -u\n");
    out.push_str("set -o pipefail\n");
    out.push('\n');
    out.push_str("mkdir -p \"${TARGET_BUILD_DIR}/${FRAMEWORKS_FOLDER_PATH}\"\n");
    out.push('\n');
    out.push_str("install_framework()\n");
    out.push_str("{\n");
    out.push_str("  rsync -av --exclude '*.h' \"$1\" \"${TARGET_BUILD_DIR}/${FRAMEWORKS_FOLDER_PATH}\"\n");
    out.push_str("}\n");
    out.push('\n');
    out.push_str(&guarded_blocks(frameworks_by_config, "install_framework"));
    out
}

fn guarded_blocks(entries_by_config: &BTreeMap<String, Vec<String>>, function: &str) -> String {
    let mut out = String::new();
    for (configuration, entries) in entries_by_config {
        if entries.is_empty() {
            continue;
        }
        out.push_str(&format!(
            "if [[ \"$CONFIGURATION\" == \"{configuration}\" ]]; then\n"
        ));
        for entry in entries {
            out.push_str(&format!("  {function} \"{entry}\"\n"));
        }
        out.push_str("fi\n");
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entries(pairs: &[(&str, &[&str])]) -> BTreeMap<String, Vec<String>> {
        pairs
            .iter()
            .map(|(config, values)| {
                (
                    (*config).to_string(),
                    values.iter().map(|v| (*v).to_string()).collect(),
                )
            })
            .collect()
    }

    #[test]
    fn test_copy_resources_guarded_blocks() {
        let script = copy_resources_script(&entries(&[
            ("Debug", &["${PODS_ROOT}/BananaLib/Resources/logo.png"]),
            ("Release", &["${PODS_ROOT}/BananaLib/Resources/logo.png"]),
        ]));

        assert!(script.starts_with("#!/bin/sh\nset -e\n"));
        assert!(script.contains(
            "if [[ \"$CONFIGURATION\" == \"Debug\" ]]; then\n  install_resource \"${PODS_ROOT}/BananaLib/Resources/logo.png\"\nfi\n"
        ));
        assert!(script.contains("if [[ \"$CONFIGURATION\" == \"Release\" ]]; then"));
    }

    #[test]
    fn test_configurations_render_in_sorted_order() {
        let script = copy_resources_script(&entries(&[
            ("Release", &["${PODS_ROOT}/A/a.png"]),
            ("Debug", &["${PODS_ROOT}/A/a.png"]),
        ]));

        let debug = script.find("== \"Debug\"").unwrap();
        let release = script.find("== \"Release\"").unwrap();
        assert!(debug < release);
    }

    #[test]
    fn test_embed_frameworks_entries() {
        let script = embed_frameworks_script(&entries(&[(
            "Debug",
            &["${BUILT_PRODUCTS_DIR}/BananaLib/BananaLib.framework"],
        )]));

        assert!(script.contains(
            "  install_framework \"${BUILT_PRODUCTS_DIR}/BananaLib/BananaLib.framework\"\n"
        ));
    }

    #[test]
    fn test_empty_configurations_are_skipped() {
        let script = embed_frameworks_script(&entries(&[("Debug", &[])]));
        assert!(!script.contains("if [["));
        assert!(script.contains("install_framework()"));
    }
}
