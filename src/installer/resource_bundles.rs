//! Bundle units packaging a variant's declared resource bundles

use std::collections::BTreeMap;
use std::path::PathBuf;

use crate::error::Result;
use crate::generator::info_plist::{self, BundlePackageType};
use crate::generator::update_changed_file;
use crate::generator::xcconfig::{merged_overrides, FragmentScope};
use crate::path_utils::to_forward_slashes;
use crate::pod::{FileAccessor, PodTarget, SpecKind};
use crate::project::{Project, TargetId};
use crate::sandbox::Sandbox;

use super::phases::{filter_resource_file_references, is_compile_phase_resource};
use super::settings::remove_fragment_overrides;

/// One bundle unit per declared resource bundle of the accessor's spec.
/// Returns the created units and the support files written this run.
pub fn add_resource_bundle_targets(
    project: &mut Project,
    sandbox: &Sandbox,
    pod: &PodTarget,
    accessor: &FileAccessor,
) -> Result<(Vec<TargetId>, Vec<PathBuf>)> {
    let mut unit_ids = Vec::new();
    let mut written = Vec::new();
    let pod_uses_swift = pod.file_accessors.iter().any(FileAccessor::uses_swift);

    for (bundle_name, paths) in &accessor.resource_bundles {
        let label = pod.resources_bundle_target_label(bundle_name);
        let unit_id = project.new_target(
            label,
            crate::project::ProductType::Bundle,
            pod.platform.name,
            pod.platform.deployment_target.clone(),
            format!("{bundle_name}.bundle"),
        );

        let refs = filter_resource_file_references(project, paths);
        let (compile_refs, resource_refs): (Vec<_>, Vec<_>) = refs.into_iter().partition(|id| {
            is_compile_phase_resource(&project.file_reference(*id).path)
        });
        let has_compiled_resources = !compile_refs.is_empty();

        let unit = project.target_mut(unit_id);
        for (name, kind) in &pod.user_build_configurations {
            unit.add_build_configuration(name, *kind);
        }
        for file_ref in compile_refs {
            unit.source_build_phase.add_file_reference(file_ref, None);
        }
        for file_ref in resource_refs {
            unit.resources_build_phase.add_file_reference(file_ref, None);
        }

        for configuration in &mut unit.build_configurations {
            configuration.set("PRODUCT_NAME", bundle_name.clone());
            if !accessor.spec.kind.is_test() {
                configuration.set(
                    "CONFIGURATION_BUILD_DIR",
                    pod.configuration_build_dir(
                        "$(BUILD_DIR)/$(CONFIGURATION)$(EFFECTIVE_PLATFORM_NAME)",
                    ),
                );
            }
            if let Some(family) = pod.platform.name.device_family() {
                configuration.set("TARGETED_DEVICE_FAMILY", family);
            }
            if has_compiled_resources && pod_uses_swift {
                if let Some(swift_version) = &pod.swift_version {
                    configuration.set("SWIFT_VERSION", swift_version.clone());
                }
            }
        }

        written.extend(create_bundle_info_plist(
            project, sandbox, pod, bundle_name, unit_id,
        )?);

        let scope = match &accessor.spec.kind {
            SpecKind::Library => FragmentScope::Library,
            SpecKind::Test(_) | SpecKind::App => FragmentScope::Spec(&accessor.spec),
        };
        let keys = merged_overrides(pod, scope).into_keys().collect();
        remove_fragment_overrides(project.target_mut(unit_id), &keys);

        unit_ids.push(unit_id);
    }

    Ok((unit_ids, written))
}

/// A plain property list carrying the pod's version, next to the pod's own
fn create_bundle_info_plist(
    project: &mut Project,
    sandbox: &Sandbox,
    pod: &PodTarget,
    bundle_name: &str,
    unit_id: TargetId,
) -> Result<Vec<PathBuf>> {
    let pod_plist = pod.info_plist_path(sandbox);
    let basename = pod_plist
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| format!("{}-Info.plist", pod.label()));
    let path = pod
        .support_files_dir(sandbox)
        .join(format!("ResourceBundle-{bundle_name}-{basename}"));

    let contents = info_plist::generate(&pod.version, BundlePackageType::Bundle, &BTreeMap::new());
    let mut written = Vec::new();
    if update_changed_file(&path, &contents)? {
        written.push(path.clone());
    }
    super::add_file_to_support_group(project, pod, &path);

    let relative = to_forward_slashes(&sandbox.relative_path(&path));
    for configuration in &mut project.target_mut(unit_id).build_configurations {
        configuration.set("INFOPLIST_FILE", relative.clone());
    }
    Ok(written)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pod::{Platform, PlatformName, Specification, TestType, Version};
    use tempfile::TempDir;

    fn pod_with_bundle(kind_test: bool) -> (PodTarget, FileAccessor) {
        let mut pod = PodTarget::new(
            "BananaLib",
            "1.6.2",
            Platform::new(PlatformName::Ios, Version::parse("8.0")),
        );
        let spec = if kind_test {
            Specification::test("Tests", TestType::Unit)
        } else {
            Specification::library("BananaLib")
        };
        let mut accessor = FileAccessor::new(spec);
        accessor.resource_bundles.insert(
            "BananaRes".to_string(),
            vec![PathBuf::from("/pods/Banana/Resources/logo.png")],
        );
        pod.file_accessors = vec![accessor.clone()];
        (pod, accessor)
    }

    #[test]
    fn test_bundle_unit_carries_product_and_build_dir_settings() {
        let workspace = TempDir::new().unwrap();
        let sandbox = Sandbox::new(workspace.path());
        let (pod, accessor) = pod_with_bundle(false);

        let mut project = Project::new();
        project.add_file_reference("/pods/Banana/Resources/logo.png");

        let (units, _) =
            add_resource_bundle_targets(&mut project, &sandbox, &pod, &accessor).unwrap();
        assert_eq!(units.len(), 1);

        let unit = project.target(units[0]);
        assert_eq!(unit.name, "BananaLib-BananaRes");
        assert_eq!(unit.resources_build_phase.files.len(), 1);

        let debug = unit.build_configuration("Debug").unwrap();
        assert_eq!(
            debug.build_settings.get("PRODUCT_NAME").map(String::as_str),
            Some("BananaRes")
        );
        assert_eq!(
            debug.build_settings.get("CONFIGURATION_BUILD_DIR").map(String::as_str),
            Some("$(BUILD_DIR)/$(CONFIGURATION)$(EFFECTIVE_PLATFORM_NAME)/BananaLib")
        );
        assert_eq!(
            debug.build_settings.get("TARGETED_DEVICE_FAMILY").map(String::as_str),
            Some("1,2")
        );
    }

    #[test]
    fn test_test_spec_bundles_build_into_the_shared_products_dir() {
        let workspace = TempDir::new().unwrap();
        let sandbox = Sandbox::new(workspace.path());
        let (pod, accessor) = pod_with_bundle(true);

        let mut project = Project::new();
        project.add_file_reference("/pods/Banana/Resources/logo.png");

        let (units, _) =
            add_resource_bundle_targets(&mut project, &sandbox, &pod, &accessor).unwrap();
        let unit = project.target(units[0]);
        let debug = unit.build_configuration("Debug").unwrap();
        assert!(!debug.build_settings.contains_key("CONFIGURATION_BUILD_DIR"));
    }

    #[test]
    fn test_compiled_resources_in_swift_pod_carry_swift_version() {
        let workspace = TempDir::new().unwrap();
        let sandbox = Sandbox::new(workspace.path());
        let (mut pod, _) = pod_with_bundle(false);
        pod.swift_version = Some("5.0".to_string());
        // Swift lives in the library variant; the bundle is declared elsewhere
        pod.file_accessors[0]
            .source_files
            .push(PathBuf::from("/pods/Banana/Sources/Banana.swift"));

        let mut accessor = FileAccessor::new(Specification::library("BananaLib"));
        accessor.resource_bundles.insert(
            "BananaModels".to_string(),
            vec![PathBuf::from("/pods/Banana/Resources/Model.xcdatamodeld")],
        );

        let mut project = Project::new();
        project.add_file_reference("/pods/Banana/Resources/Model.xcdatamodeld");

        let (units, _) =
            add_resource_bundle_targets(&mut project, &sandbox, &pod, &accessor).unwrap();
        let unit = project.target(units[0]);
        assert_eq!(unit.source_build_phase.files.len(), 1);
        let debug = unit.build_configuration("Debug").unwrap();
        assert_eq!(
            debug.build_settings.get("SWIFT_VERSION").map(String::as_str),
            Some("5.0")
        );
    }

    #[test]
    fn test_bundle_info_plist_is_generated_and_wired() {
        let workspace = TempDir::new().unwrap();
        let sandbox = Sandbox::new(workspace.path());
        let (pod, accessor) = pod_with_bundle(false);

        let mut project = Project::new();
        project.add_file_reference("/pods/Banana/Resources/logo.png");

        let (units, written) =
            add_resource_bundle_targets(&mut project, &sandbox, &pod, &accessor).unwrap();
        let expected = sandbox
            .target_support_files_dir("BananaLib")
            .join("ResourceBundle-BananaRes-BananaLib-Info.plist");
        assert_eq!(written, vec![expected.clone()]);

        let contents = std::fs::read_to_string(&expected).unwrap();
        assert!(contents.contains("<string>1.6.2</string>"));
        assert!(contents.contains("<string>BNDL</string>"));

        let debug = project.target(units[0]).build_configuration("Debug").unwrap();
        assert_eq!(
            debug.build_settings.get("INFOPLIST_FILE").map(String::as_str),
            Some("Target Support Files/BananaLib/ResourceBundle-BananaRes-BananaLib-Info.plist")
        );
    }
}
