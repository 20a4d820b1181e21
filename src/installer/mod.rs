//! Turning one resolved pod target into build units and support files
//!
//! This module handles:
//! - Unit creation for the library, test, app host and app variants
//! - Build settings layered per configuration and per variant scope
//! - Generated support files, rewritten only when their contents change
//! - Wiring of configuration fragments, module maps and build phases

pub mod app_host;
pub mod phases;
pub mod resource_bundles;
pub mod result;
pub mod settings;

pub use app_host::AppHostInstaller;
pub use result::{InstalledUnit, TargetInstallationResult};

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use crate::error::{PodgenError, Result};
use crate::generator::info_plist::{self, BundlePackageType, PlistValue};
use crate::generator::xcconfig::{self, FragmentScope};
use crate::generator::{
    dummy_source, module_map, prefix_header, replace_symlink, scripts, umbrella_header,
    update_changed_file,
};
use crate::path_utils::{relative_path_from, to_forward_slashes};
use crate::pod::{FileAccessor, PodTarget, PrefixHeaderFile, Specification, TestType};
use crate::project::{
    BuildFileSettings, FileRefId, NativeTarget, ProductType, Project, ShellScriptBuildPhase,
    TargetId,
};
use crate::sandbox::Sandbox;

const HEADER_SYMLINK_PHASE_NAME: &str = "Create Symlinks to Header Folders";

const HEADER_SYMLINK_SCRIPT: &str = "\
base=\"$CONFIGURATION_BUILD_DIR/$WRAPPER_NAME\"
ln -fs \"$base/${PUBLIC_HEADERS_FOLDER_PATH#$WRAPPER_NAME/}\" \"$base/${PUBLIC_HEADERS_FOLDER_PATH#$CONTENTS_FOLDER_PATH/}\"
ln -fs \"$base/${PRIVATE_HEADERS_FOLDER_PATH#$WRAPPER_NAME/}\" \"$base/${PRIVATE_HEADERS_FOLDER_PATH#$CONTENTS_FOLDER_PATH/}\"
";

/// Installs one resolved pod target into a project.
///
/// Creates a unit for every declared variant, layers their build settings,
/// and generates the support files next to them. Support files are compared
/// against what is on disk and rewritten only when their contents differ,
/// so repeated runs leave the project directory untouched.
pub struct PodTargetInstaller<'a> {
    sandbox: &'a Sandbox,
    target: &'a PodTarget,
    /// Resolved dependencies of the pod, the pod itself excluded
    dependent_targets: Vec<&'a PodTarget>,
    /// Umbrella header basenames of other pods sharing the public header
    /// tree, excluded from the generated module map
    foreign_umbrella_headers: Vec<String>,
    written_files: Vec<PathBuf>,
    unchanged_files: usize,
}

impl<'a> PodTargetInstaller<'a> {
    pub fn new(sandbox: &'a Sandbox, target: &'a PodTarget) -> Self {
        PodTargetInstaller {
            sandbox,
            target,
            dependent_targets: Vec::new(),
            foreign_umbrella_headers: Vec::new(),
            written_files: Vec::new(),
            unchanged_files: 0,
        }
    }

    pub fn with_dependent_targets(mut self, dependent_targets: Vec<&'a PodTarget>) -> Self {
        self.dependent_targets = dependent_targets;
        self
    }

    pub fn with_foreign_umbrella_headers(mut self, headers: Vec<String>) -> Self {
        self.foreign_umbrella_headers = headers;
        self
    }

    /// Install the pod into `project` and return handles to everything that
    /// was created.
    pub fn install(&mut self, project: &mut Project) -> Result<TargetInstallationResult> {
        let support_dir = self.target.support_files_dir(self.sandbox);
        fs::create_dir_all(&support_dir).map_err(|e| file_write_error(&support_dir, e))?;

        let custom_module_map = self.target.custom_module_map();

        if !self.target.should_build() {
            let placeholder = self.add_placeholder_target(project);
            let mut result = TargetInstallationResult::new(
                self.target.label(),
                InstalledUnit::Placeholder(placeholder),
            );
            result.resource_bundle_targets = self.add_library_resource_bundles(project)?;
            self.create_xcconfig_file(
                project,
                InstalledUnit::Placeholder(placeholder),
                &result.resource_bundle_targets,
            )?;
            result.written_files = std::mem::take(&mut self.written_files);
            result.unchanged_files = std::mem::take(&mut self.unchanged_files);
            return Ok(result);
        }

        let native = self.add_library_target(project);
        let mut result =
            TargetInstallationResult::new(self.target.label(), InstalledUnit::Native(native));

        result.resource_bundle_targets = self.add_library_resource_bundles(project)?;
        result.test_native_targets = self.add_test_targets(project)?;
        result.test_app_host_targets =
            self.add_test_app_host_targets(project, &result.test_native_targets)?;

        for accessor in self.target.test_file_accessors() {
            let (units, written) = resource_bundles::add_resource_bundle_targets(
                project,
                self.sandbox,
                self.target,
                accessor,
            )?;
            self.written_files.extend(written);
            result
                .test_resource_bundle_targets
                .insert(accessor.spec.name.clone(), units);
        }

        result.app_native_targets = self.add_app_targets(project)?;
        for accessor in self.target.app_file_accessors() {
            let (units, written) = resource_bundles::add_resource_bundle_targets(
                project,
                self.sandbox,
                self.target,
                accessor,
            )?;
            self.written_files.extend(written);
            result
                .app_resource_bundle_targets
                .insert(accessor.spec.name.clone(), units);
        }

        phases::add_files_to_build_phases(project, self.target, &result)?;

        let mut compiling_units = vec![native];
        compiling_units.extend(&result.test_native_targets);
        compiling_units.extend(&result.app_native_targets);
        phases::validate_targets_contain_sources(project, self.target, &compiling_units)?;

        self.create_xcconfig_file(
            project,
            InstalledUnit::Native(native),
            &result.resource_bundle_targets,
        )?;
        self.create_test_xcconfig_files(project, &result)?;
        self.create_app_xcconfig_files(project, &result)?;

        if self.target.defines_module {
            self.create_module_map(project, native, custom_module_map.as_deref())?;
        }

        if self.target.builds_framework() {
            self.create_info_plist_if_needed(project, native)?;
            if self.target.platform.name.is_osx() && self.target.header_mappings_dir.is_some() {
                add_header_symlink_phase(project.target_mut(native));
            }
        }

        if self.target.linkage.is_static_library() && self.target.uses_swift() {
            self.add_swift_compatibility_header_phase(
                project,
                native,
                custom_module_map.as_deref(),
            )?;
        }

        self.create_prefix_headers(project, native, &result)?;
        self.create_dummy_source(project, native)?;

        result.written_files = std::mem::take(&mut self.written_files);
        result.unchanged_files = std::mem::take(&mut self.unchanged_files);
        Ok(result)
    }

    fn add_library_target(&self, project: &mut Project) -> TargetId {
        let unit_id = project.new_target(
            self.target.label().to_string(),
            self.target.product_type(),
            self.target.platform.name,
            self.target.platform.deployment_target.clone(),
            self.target.product_name(),
        );
        let unit = project.target_mut(unit_id);
        for (name, kind) in &self.target.user_build_configurations {
            unit.add_build_configuration(name, *kind);
        }
        settings::apply_settings(unit, &settings::custom_build_settings(self.target));
        let keys = xcconfig::merged_overrides(self.target, FragmentScope::Library)
            .into_keys()
            .collect();
        settings::remove_fragment_overrides(unit, &keys);
        unit_id
    }

    /// An aggregate standing in for pods with nothing to compile, keeping
    /// the dependency graph and configuration wiring intact.
    fn add_placeholder_target(&self, project: &mut Project) -> usize {
        let index = project.new_aggregate_target(
            self.target.label().to_string(),
            self.target.platform.name,
            self.target.platform.deployment_target.clone(),
        );
        let aggregate = &mut project.aggregate_targets[index];
        for (name, kind) in &self.target.user_build_configurations {
            aggregate.add_build_configuration(name, *kind);
        }
        if !self.target.archs.is_empty() {
            let archs = self.target.archs.join(" ");
            for configuration in &mut aggregate.build_configurations {
                configuration.set("ARCHS", archs.clone());
            }
        }
        index
    }

    fn add_library_resource_bundles(&mut self, project: &mut Project) -> Result<Vec<TargetId>> {
        let mut unit_ids = Vec::new();
        for accessor in self.target.library_file_accessors() {
            let (units, written) = resource_bundles::add_resource_bundle_targets(
                project,
                self.sandbox,
                self.target,
                accessor,
            )?;
            self.written_files.extend(written);
            unit_ids.extend(units);
        }
        Ok(unit_ids)
    }

    fn add_test_targets(&mut self, project: &mut Project) -> Result<Vec<TargetId>> {
        let base_settings = settings::custom_build_settings(self.target);
        let mut unit_ids = Vec::new();
        for spec in self.target.test_specs() {
            let label = self.target.spec_label(spec);
            let product_type = match spec.test_type() {
                Some(TestType::Ui) => ProductType::UiTestBundle,
                _ => ProductType::UnitTestBundle,
            };
            let unit_id = project.new_target(
                label.clone(),
                product_type,
                self.target.platform.name,
                self.target.platform.deployment_target.clone(),
                format!("{label}.xctest"),
            );

            let unit = project.target_mut(unit_id);
            for (name, kind) in &self.target.user_build_configurations {
                unit.add_build_configuration(name, *kind);
            }
            settings::apply_settings(unit, &base_settings);
            for configuration in &mut unit.build_configurations {
                settings::apply_variant_overrides(configuration, &label, self.target.platform.name);
            }
            let keys = xcconfig::merged_overrides(self.target, FragmentScope::Spec(spec))
                .into_keys()
                .collect();
            settings::remove_fragment_overrides(unit, &keys);

            self.create_embed_frameworks_script(spec)?;
            self.create_copy_resources_script(spec)?;
            self.create_test_info_plist(project, spec, unit_id)?;

            unit_ids.push(unit_id);
        }
        Ok(unit_ids)
    }

    /// One host application per test type that asks for one, shared by all
    /// test specs of that type.
    fn add_test_app_host_targets(
        &mut self,
        project: &mut Project,
        test_unit_ids: &[TargetId],
    ) -> Result<Vec<TargetId>> {
        let mut hosts: BTreeMap<TestType, TargetId> = BTreeMap::new();
        let specs = self.target.test_specs();
        for (spec, unit_id) in specs.iter().zip(test_unit_ids) {
            if !spec.requires_app_host {
                continue;
            }
            let Some(test_type) = spec.test_type() else {
                continue;
            };
            let host_id = match hosts.get(&test_type) {
                Some(id) => *id,
                None => {
                    let name = self.target.app_host_label(test_type);
                    let installer = AppHostInstaller::new(
                        self.sandbox,
                        &self.target.platform,
                        name.clone(),
                        name,
                        &self.target.user_build_configurations,
                    );
                    let (id, written) = installer.install(project)?;
                    self.written_files.extend(written);
                    hosts.insert(test_type, id);
                    id
                }
            };
            self.wire_test_host(project, *unit_id, host_id);
        }
        Ok(hosts.into_values().collect())
    }

    fn wire_test_host(&self, project: &mut Project, test_unit_id: TargetId, host_id: TargetId) {
        let host_name = project.target(host_id).name.clone();
        let test_name = project.target(test_unit_id).name.clone();
        let test_host = if self.target.platform.name.is_osx() {
            format!("$(BUILT_PRODUCTS_DIR)/{host_name}.app/Contents/MacOS/{host_name}")
        } else {
            format!("$(BUILT_PRODUCTS_DIR)/{host_name}.app/{host_name}")
        };

        let test_unit = project.target_mut(test_unit_id);
        test_unit.add_dependency(host_id);
        for configuration in &mut test_unit.build_configurations {
            configuration.set("TEST_HOST", test_host.clone());
        }
        project.set_target_attribute(&test_name, "TestTargetID", &host_name);
    }

    fn add_app_targets(&mut self, project: &mut Project) -> Result<Vec<TargetId>> {
        let base_settings = settings::custom_build_settings(self.target);
        let mut unit_ids = Vec::new();
        for spec in self.target.app_specs() {
            let label = self.target.spec_label(spec);
            let installer = AppHostInstaller::new(
                self.sandbox,
                &self.target.platform,
                spec.name.clone(),
                label.clone(),
                &self.target.user_build_configurations,
            )
            .without_main()
            .with_info_plist_entries(plist_entries(&spec.info_plist_entries));
            let (unit_id, written) = installer.install(project)?;
            self.written_files.extend(written);

            let unit = project.target_mut(unit_id);
            settings::apply_settings(unit, &base_settings);
            for configuration in &mut unit.build_configurations {
                settings::apply_variant_overrides(configuration, &label, self.target.platform.name);
            }
            let keys = xcconfig::merged_overrides(self.target, FragmentScope::Spec(spec))
                .into_keys()
                .collect();
            settings::remove_fragment_overrides(unit, &keys);

            self.create_embed_frameworks_script(spec)?;
            self.create_copy_resources_script(spec)?;
            self.add_app_resources(project, spec, unit_id);

            unit_ids.push(unit_id);
        }
        Ok(unit_ids)
    }

    /// App variants copy every declared resource, compiled document kinds
    /// included, straight into the application bundle.
    fn add_app_resources(&self, project: &mut Project, spec: &Specification, unit_id: TargetId) {
        let Some(accessor) = self.target.file_accessor_for_spec(spec) else {
            return;
        };
        let refs = phases::filter_resource_file_references(project, &accessor.resources);
        let unit = project.target_mut(unit_id);
        for file_ref in refs {
            if !unit.resources_build_phase.contains(file_ref) {
                unit.resources_build_phase.add_file_reference(file_ref, None);
            }
        }
    }

    fn create_xcconfig_file(
        &mut self,
        project: &mut Project,
        unit: InstalledUnit,
        bundle_ids: &[TargetId],
    ) -> Result<()> {
        let fragment = xcconfig::fragment_for_scope(self.target, FragmentScope::Library);
        let path = self.target.xcconfig_path(self.sandbox);
        self.write(&path, &fragment.render())?;
        let file_ref = add_file_to_support_group(project, self.target, &path);
        project.record_fragment_entries(file_ref, fragment.entries().clone());

        match unit {
            InstalledUnit::Native(id) => {
                apply_base_configuration(project.target_mut(id), file_ref);
            }
            InstalledUnit::Placeholder(index) => {
                for configuration in &mut project.aggregate_targets[index].build_configurations {
                    configuration.base_configuration = Some(file_ref);
                }
            }
        }
        for bundle_id in bundle_ids {
            apply_base_configuration(project.target_mut(*bundle_id), file_ref);
        }
        Ok(())
    }

    fn create_test_xcconfig_files(
        &mut self,
        project: &mut Project,
        result: &TargetInstallationResult,
    ) -> Result<()> {
        let specs = self.target.test_specs();
        for (spec, unit_id) in specs.iter().zip(&result.test_native_targets) {
            let file_ref = self.create_variant_xcconfig(project, spec)?;

            apply_base_configuration(project.target_mut(*unit_id), file_ref);
            if let Some(bundles) = result.test_resource_bundle_targets.get(&spec.name) {
                for bundle_id in bundles {
                    apply_base_configuration(project.target_mut(*bundle_id), file_ref);
                }
            }

            if self.any_dependency_uses_swift(spec) {
                settings::add_swift_debug_linker_flags(project.target_mut(*unit_id));
            }
        }
        Ok(())
    }

    fn create_app_xcconfig_files(
        &mut self,
        project: &mut Project,
        result: &TargetInstallationResult,
    ) -> Result<()> {
        let specs = self.target.app_specs();
        for (spec, unit_id) in specs.iter().zip(&result.app_native_targets) {
            let file_ref = self.create_variant_xcconfig(project, spec)?;

            apply_base_configuration(project.target_mut(*unit_id), file_ref);
            if let Some(bundles) = result.app_resource_bundle_targets.get(&spec.name) {
                for bundle_id in bundles {
                    apply_base_configuration(project.target_mut(*bundle_id), file_ref);
                }
            }
        }
        Ok(())
    }

    fn create_variant_xcconfig(
        &mut self,
        project: &mut Project,
        spec: &Specification,
    ) -> Result<FileRefId> {
        let fragment = xcconfig::fragment_for_scope(self.target, FragmentScope::Spec(spec));
        let path = match self.target.spec_variant(spec) {
            Some(variant) => self.target.xcconfig_path_for_variant(self.sandbox, &variant),
            None => self.target.xcconfig_path(self.sandbox),
        };
        self.write(&path, &fragment.render())?;
        let file_ref = add_file_to_support_group(project, self.target, &path);
        project.record_fragment_entries(file_ref, fragment.entries().clone());
        Ok(file_ref)
    }

    /// Debug builds of test bundles link the no-optimization Swift runtime
    /// support library when any dependency ships Swift.
    fn any_dependency_uses_swift(&self, spec: &Specification) -> bool {
        self.target.uses_swift()
            || self.target.uses_swift_for_spec(spec)
            || self.dependent_targets.iter().any(|pod| pod.uses_swift())
    }

    fn create_module_map(
        &mut self,
        project: &mut Project,
        native: TargetId,
        custom_module_map: Option<&Path>,
    ) -> Result<()> {
        let write_path = self.target.module_map_path_to_write(self.sandbox);
        let contents = match custom_module_map {
            Some(path) => {
                let raw = fs::read_to_string(path).map_err(|e| file_read_error(path, e))?;
                if self.target.builds_framework() {
                    raw
                } else {
                    module_map::deframeworked(&raw)
                }
            }
            None => module_map::generate(self.target, &self.foreign_umbrella_headers),
        };
        self.write(&write_path, &contents)?;
        add_file_to_support_group(project, self.target, &write_path);

        let canonical = self.target.module_map_path(self.sandbox);
        if canonical != write_path {
            link_into_header_tree(&write_path, &canonical)?;
            let setting = to_forward_slashes(&self.sandbox.relative_path(&canonical));
            for configuration in &mut project.target_mut(native).build_configurations {
                configuration.set("MODULEMAP_FILE", setting.clone());
            }
        }

        if custom_module_map.is_none() {
            self.create_umbrella_header(project, native)?;
        }
        Ok(())
    }

    fn create_umbrella_header(&mut self, project: &mut Project, native: TargetId) -> Result<()> {
        let write_path = self.target.umbrella_header_path_to_write(self.sandbox);
        let contents = umbrella_header::generate(self.target);
        self.write(&write_path, &contents)?;

        let canonical = self.target.umbrella_header_path(self.sandbox);
        if canonical != write_path {
            link_into_header_tree(&write_path, &canonical)?;
        }

        let file_ref = add_file_to_support_group(project, self.target, &write_path);
        let acl = if self.target.builds_framework() {
            "Public"
        } else {
            "Project"
        };
        project
            .target_mut(native)
            .headers_build_phase
            .add_file_reference(
                file_ref,
                Some(BuildFileSettings::attributes(vec![acl.to_string()])),
            );
        Ok(())
    }

    /// Frameworks get a generated property list unless any configuration
    /// already resolves one, inline or through its fragment.
    fn create_info_plist_if_needed(
        &mut self,
        project: &mut Project,
        native: TargetId,
    ) -> Result<()> {
        let resolved = project.resolved_build_setting(project.target(native), "INFOPLIST_FILE");
        if resolved
            .values()
            .any(|value| value.as_deref().is_some_and(|v| !v.is_empty()))
        {
            return Ok(());
        }

        let mut entries = BTreeMap::new();
        for accessor in self.target.library_file_accessors() {
            entries.extend(plist_entries(&accessor.spec.info_plist_entries));
        }
        let contents =
            info_plist::generate(&self.target.version, BundlePackageType::Framework, &entries);
        let path = self.target.info_plist_path(self.sandbox);
        self.write(&path, &contents)?;
        add_file_to_support_group(project, self.target, &path);

        let relative = to_forward_slashes(&self.sandbox.relative_path(&path));
        for configuration in &mut project.target_mut(native).build_configurations {
            configuration.set("INFOPLIST_FILE", relative.clone());
        }
        Ok(())
    }

    fn create_test_info_plist(
        &mut self,
        project: &mut Project,
        spec: &Specification,
        unit_id: TargetId,
    ) -> Result<()> {
        let path = self.target.info_plist_path_for_spec(self.sandbox, spec);
        let entries = plist_entries(&spec.info_plist_entries);
        let contents = info_plist::generate("1.0", BundlePackageType::Bundle, &entries);
        self.write(&path, &contents)?;
        add_file_to_support_group(project, self.target, &path);

        let relative = to_forward_slashes(&self.sandbox.relative_path(&path));
        for configuration in &mut project.target_mut(unit_id).build_configurations {
            configuration.set("INFOPLIST_FILE", relative.clone());
        }
        Ok(())
    }

    fn create_copy_resources_script(&mut self, spec: &Specification) -> Result<()> {
        let path = self
            .target
            .copy_resources_script_path_for_spec(self.sandbox, spec);
        let entries = self.resource_entries_for_spec(spec);
        let contents = scripts::copy_resources_script(&self.entries_by_configuration(entries));
        self.write(&path, &contents)
    }

    fn create_embed_frameworks_script(&mut self, spec: &Specification) -> Result<()> {
        let path = self
            .target
            .embed_frameworks_script_path_for_spec(self.sandbox, spec);
        let entries = self.framework_entries();
        let contents = scripts::embed_frameworks_script(&self.entries_by_configuration(entries));
        self.write(&path, &contents)
    }

    fn entries_by_configuration(&self, entries: Vec<String>) -> BTreeMap<String, Vec<String>> {
        self.target
            .user_build_configurations
            .keys()
            .map(|name| (name.clone(), entries.clone()))
            .collect()
    }

    /// Built dynamic framework products the variant embeds at run time
    fn framework_entries(&self) -> Vec<String> {
        std::iter::once(self.target)
            .chain(self.dependent_targets.iter().copied())
            .filter(|pod| pod.linkage.is_dynamic_framework())
            .map(|pod| pod.build_product_path("${BUILT_PRODUCTS_DIR}"))
            .collect()
    }

    /// Resource files and built bundles the variant copies at run time:
    /// everything the library specs of the pod and its dependencies declare,
    /// plus the variant's own.
    fn resource_entries_for_spec(&self, spec: &Specification) -> Vec<String> {
        let mut entries = Vec::new();
        for pod in std::iter::once(self.target).chain(self.dependent_targets.iter().copied()) {
            for accessor in pod.library_file_accessors() {
                entries.extend(self.accessor_resource_entries(pod, accessor));
            }
        }
        if let Some(accessor) = self.target.file_accessor_for_spec(spec) {
            entries.extend(self.accessor_resource_entries(self.target, accessor));
        }
        entries
    }

    fn accessor_resource_entries(&self, pod: &PodTarget, accessor: &FileAccessor) -> Vec<String> {
        let mut entries: Vec<String> = accessor
            .resources
            .iter()
            .map(|resource| {
                format!(
                    "${{PODS_ROOT}}/{}",
                    to_forward_slashes(&self.sandbox.relative_path(resource))
                )
            })
            .collect();
        let prefix = if accessor.spec.kind.is_test() {
            "${PODS_CONFIGURATION_BUILD_DIR}".to_string()
        } else {
            pod.configuration_build_dir("${PODS_CONFIGURATION_BUILD_DIR}")
        };
        for bundle_name in accessor.resource_bundles.keys() {
            entries.push(format!("{prefix}/{bundle_name}.bundle"));
        }
        entries
    }

    /// Static libraries carrying Swift copy the generated compatibility
    /// header next to the built product, so Objective-C consumers can
    /// import the module without a framework wrapper.
    fn add_swift_compatibility_header_phase(
        &self,
        project: &mut Project,
        native: TargetId,
        custom_module_map: Option<&Path>,
    ) -> Result<()> {
        if custom_module_map.is_some() {
            return Err(PodgenError::SwiftStaticLibraryWithCustomModuleMap {
                pod: self.target.label().to_string(),
            });
        }

        let module_map_path = to_forward_slashes(
            &self
                .sandbox
                .relative_path(&self.target.module_map_path(self.sandbox)),
        );
        let umbrella_path = to_forward_slashes(
            &self
                .sandbox
                .relative_path(&self.target.umbrella_header_path(self.sandbox)),
        );
        let umbrella_basename = format!("{}-umbrella.h", self.target.label());

        let mut phase = ShellScriptBuildPhase::new("Copy generated compatibility header");
        phase.shell_script = format!(
            concat!(
                "COMPATIBILITY_HEADER_PATH=\"${{BUILT_PRODUCTS_DIR}}/Swift Compatibility Header/${{PRODUCT_MODULE_NAME}}-Swift.h\"\n",
                "MODULE_MAP_PATH=\"${{BUILT_PRODUCTS_DIR}}/${{PRODUCT_MODULE_NAME}}.modulemap\"\n",
                "\n",
                "ditto \"${{DERIVED_SOURCES_DIR}}/${{PRODUCT_MODULE_NAME}}-Swift.h\" \"${{COMPATIBILITY_HEADER_PATH}}\"\n",
                "ditto \"${{PODS_ROOT}}/{module_map}\" \"${{MODULE_MAP_PATH}}\"\n",
                "ditto \"${{PODS_ROOT}}/{umbrella}\" \"${{BUILT_PRODUCTS_DIR}}\"\n",
                "printf \"\\n\\nmodule ${{PRODUCT_MODULE_NAME}}.Swift {{\\n  header \\\"${{COMPATIBILITY_HEADER_PATH}}\\\"\\n  requires objc\\n}}\\n\" >> \"${{MODULE_MAP_PATH}}\"\n",
            ),
            module_map = module_map_path,
            umbrella = umbrella_path,
        );
        phase.input_paths = vec![
            "${DERIVED_SOURCES_DIR}/${PRODUCT_MODULE_NAME}-Swift.h".to_string(),
            format!("${{PODS_ROOT}}/{module_map_path}"),
            format!("${{PODS_ROOT}}/{umbrella_path}"),
        ];
        phase.output_paths = vec![
            "${BUILT_PRODUCTS_DIR}/${PRODUCT_MODULE_NAME}.modulemap".to_string(),
            format!("${{BUILT_PRODUCTS_DIR}}/{umbrella_basename}"),
            "${BUILT_PRODUCTS_DIR}/Swift Compatibility Header/${PRODUCT_MODULE_NAME}-Swift.h"
                .to_string(),
        ];
        project.target_mut(native).add_shell_script_build_phase(phase);
        Ok(())
    }

    /// One prefix header per variant group, skipped whole when any spec in
    /// the group disables prefix headers.
    fn create_prefix_headers(
        &mut self,
        project: &mut Project,
        native: TargetId,
        result: &TargetInstallationResult,
    ) -> Result<()> {
        let library_accessors = self.target.library_file_accessors();
        if !skips_prefix_header(&library_accessors) {
            let contents = prefix_header::generate(self.target.platform.name, &library_accessors)?;
            let path = self.target.prefix_header_path(self.sandbox);
            self.apply_prefix_header(project, native, &path, &contents)?;
        }

        if !skips_prefix_header(&self.target.test_file_accessors()) {
            let specs = self.target.test_specs();
            for (spec, unit_id) in specs.iter().zip(&result.test_native_targets) {
                self.create_variant_prefix_header(project, spec, *unit_id)?;
            }
        }

        if !skips_prefix_header(&self.target.app_file_accessors()) {
            let specs = self.target.app_specs();
            for (spec, unit_id) in specs.iter().zip(&result.app_native_targets) {
                self.create_variant_prefix_header(project, spec, *unit_id)?;
            }
        }
        Ok(())
    }

    fn create_variant_prefix_header(
        &mut self,
        project: &mut Project,
        spec: &Specification,
        unit_id: TargetId,
    ) -> Result<()> {
        let Some(accessor) = self.target.file_accessor_for_spec(spec) else {
            return Ok(());
        };
        let contents = prefix_header::generate(self.target.platform.name, &[accessor])?;
        let path = self.target.prefix_header_path_for_spec(self.sandbox, spec);
        self.apply_prefix_header(project, unit_id, &path, &contents)
    }

    fn apply_prefix_header(
        &mut self,
        project: &mut Project,
        unit_id: TargetId,
        path: &Path,
        contents: &str,
    ) -> Result<()> {
        self.write(path, contents)?;
        add_file_to_support_group(project, self.target, path);
        let relative = to_forward_slashes(&self.sandbox.relative_path(path));
        for configuration in &mut project.target_mut(unit_id).build_configurations {
            configuration.set("GCC_PREFIX_HEADER", relative.clone());
        }
        Ok(())
    }

    /// An empty implementation file keeps the library unit linkable even
    /// when every declared source is a header.
    fn create_dummy_source(&mut self, project: &mut Project, native: TargetId) -> Result<()> {
        let contents = dummy_source::generate(self.target.label());
        let path = self.target.dummy_source_path(self.sandbox);
        self.write(&path, &contents)?;
        let file_ref = add_file_to_support_group(project, self.target, &path);
        project
            .target_mut(native)
            .source_build_phase
            .add_file_reference(file_ref, None);
        Ok(())
    }

    fn write(&mut self, path: &Path, contents: &str) -> Result<()> {
        if update_changed_file(path, contents)? {
            self.written_files.push(path.to_path_buf());
        } else {
            self.unchanged_files += 1;
        }
        Ok(())
    }
}

/// Register `path` under the pod's support files group
pub(crate) fn add_file_to_support_group(
    project: &mut Project,
    pod: &PodTarget,
    path: &Path,
) -> FileRefId {
    let file_ref = project.add_file_reference(path.to_path_buf());
    project.add_file_to_group(file_ref, &format!("Pods/{}/Support Files", pod.label()));
    file_ref
}

fn apply_base_configuration(unit: &mut NativeTarget, file_ref: FileRefId) {
    for configuration in &mut unit.build_configurations {
        configuration.base_configuration = Some(file_ref);
    }
}

fn add_header_symlink_phase(unit: &mut NativeTarget) {
    let mut phase = ShellScriptBuildPhase::new(HEADER_SYMLINK_PHASE_NAME);
    phase.shell_script = HEADER_SYMLINK_SCRIPT.to_string();
    unit.add_shell_script_build_phase(phase);
}

/// Symlink `canonical` to the written file so consumers find it in the
/// sandbox header tree.
fn link_into_header_tree(write_path: &Path, canonical: &Path) -> Result<()> {
    let Some(parent) = canonical.parent() else {
        return Ok(());
    };
    fs::create_dir_all(parent).map_err(|e| file_write_error(parent, e))?;
    let relative = relative_path_from(write_path, parent);
    replace_symlink(canonical, &relative)
}

fn skips_prefix_header(accessors: &[&FileAccessor]) -> bool {
    accessors
        .iter()
        .any(|accessor| accessor.spec.prefix_header_file == PrefixHeaderFile::Disabled)
}

fn plist_entries(entries: &BTreeMap<String, String>) -> BTreeMap<String, PlistValue> {
    entries
        .iter()
        .map(|(key, value)| (key.clone(), PlistValue::from(value.clone())))
        .collect()
}

fn file_read_error(path: &Path, e: std::io::Error) -> PodgenError {
    PodgenError::FileReadFailed {
        path: path.display().to_string(),
        reason: e.to_string(),
    }
}

fn file_write_error(path: &Path, e: std::io::Error) -> PodgenError {
    PodgenError::FileWriteFailed {
        path: path.display().to_string(),
        reason: e.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pod::{Linkage, Platform, PlatformName, SpecKind, Version};
    use tempfile::TempDir;

    fn banana_pod() -> PodTarget {
        let mut pod = PodTarget::new(
            "BananaLib",
            "1.0",
            Platform::new(PlatformName::Ios, Version::parse("8.0")),
        );
        let mut accessor = FileAccessor::new(Specification::library("BananaLib"));
        accessor.source_files = vec![
            PathBuf::from("/pods/BananaLib/Classes/Banana.m"),
            PathBuf::from("/pods/BananaLib/Classes/Banana.h"),
        ];
        accessor.arc_source_files = accessor.source_files.clone();
        accessor.headers = vec![PathBuf::from("/pods/BananaLib/Classes/Banana.h")];
        pod.file_accessors = vec![accessor];
        pod
    }

    fn register_files(project: &mut Project, pod: &PodTarget) {
        for accessor in &pod.file_accessors {
            for path in accessor
                .source_files
                .iter()
                .chain(&accessor.headers)
                .chain(&accessor.resources)
            {
                project.add_file_reference(path.clone());
            }
        }
    }

    fn install(pod: &PodTarget, sandbox: &Sandbox) -> (Project, TargetInstallationResult) {
        let mut project = Project::new();
        register_files(&mut project, pod);
        let mut installer = PodTargetInstaller::new(sandbox, pod);
        let result = installer
            .install(&mut project)
            .expect("install should succeed");
        (project, result)
    }

    #[test]
    fn test_installs_a_static_library_pod() {
        let workspace = TempDir::new().unwrap();
        let sandbox = Sandbox::new(workspace.path());
        let pod = banana_pod();

        let (project, result) = install(&pod, &sandbox);

        let InstalledUnit::Native(native) = result.native_target else {
            panic!("expected a native unit");
        };
        let unit = project.target(native);
        assert_eq!(unit.name, "BananaLib");
        assert_eq!(unit.product_type, ProductType::StaticLibrary);

        // source plus generated dummy file
        assert_eq!(unit.source_build_phase.files.len(), 2);
        assert_eq!(unit.headers_build_phase.files.len(), 1);

        let debug = unit.build_configuration("Debug").unwrap();
        assert!(debug.base_configuration.is_some());
        assert_eq!(
            debug.build_settings.get("PRODUCT_NAME").map(String::as_str),
            Some("BananaLib")
        );

        let support_dir = sandbox.target_support_files_dir("BananaLib");
        assert!(support_dir.join("BananaLib.xcconfig").is_file());
        assert!(support_dir.join("BananaLib-dummy.m").is_file());
        assert!(support_dir.join("BananaLib-prefix.pch").is_file());
        assert_eq!(
            debug
                .build_settings
                .get("GCC_PREFIX_HEADER")
                .map(String::as_str),
            Some("Target Support Files/BananaLib/BananaLib-prefix.pch")
        );
    }

    #[test]
    fn test_second_install_writes_nothing() {
        let workspace = TempDir::new().unwrap();
        let sandbox = Sandbox::new(workspace.path());
        let pod = banana_pod();

        let (_, first) = install(&pod, &sandbox);
        assert!(!first.written_files.is_empty());
        assert_eq!(first.unchanged_files, 0);

        let (_, second) = install(&pod, &sandbox);
        assert!(second.written_files.is_empty(), "{:?}", second.written_files);
        assert_eq!(second.unchanged_files, first.written_files.len());
    }

    #[test]
    fn test_pods_without_sources_get_a_placeholder() {
        let workspace = TempDir::new().unwrap();
        let sandbox = Sandbox::new(workspace.path());
        let mut pod = banana_pod();
        pod.linkage = Linkage::None;

        let (project, result) = install(&pod, &sandbox);

        let InstalledUnit::Placeholder(index) = result.native_target else {
            panic!("expected a placeholder");
        };
        let aggregate = &project.aggregate_targets[index];
        assert_eq!(aggregate.name, "BananaLib");
        assert!(aggregate.build_configurations[0]
            .base_configuration
            .is_some());
        assert!(project.targets.is_empty());
    }

    #[test]
    fn test_module_defining_library_links_map_into_header_tree() {
        let workspace = TempDir::new().unwrap();
        let sandbox = Sandbox::new(workspace.path());
        let mut pod = banana_pod();
        pod.defines_module = true;

        let (project, result) = install(&pod, &sandbox);

        let support_dir = sandbox.target_support_files_dir("BananaLib");
        assert!(support_dir.join("BananaLib.modulemap").is_file());
        assert!(support_dir.join("BananaLib-umbrella.h").is_file());

        let canonical = sandbox
            .public_headers_root()
            .join("BananaLib/BananaLib.modulemap");
        assert!(canonical.is_symlink());

        let InstalledUnit::Native(native) = result.native_target else {
            panic!("expected a native unit");
        };
        let debug = project.target(native).build_configuration("Debug").unwrap();
        assert_eq!(
            debug
                .build_settings
                .get("MODULEMAP_FILE")
                .map(String::as_str),
            Some("Headers/Public/BananaLib/BananaLib.modulemap")
        );
    }

    #[test]
    fn test_framework_pod_gets_an_info_plist_unless_overridden() {
        let workspace = TempDir::new().unwrap();
        let sandbox = Sandbox::new(workspace.path());
        let mut pod = banana_pod();
        pod.linkage = Linkage::DynamicFramework;

        let (project, result) = install(&pod, &sandbox);
        let InstalledUnit::Native(native) = result.native_target else {
            panic!("expected a native unit");
        };
        let debug = project.target(native).build_configuration("Debug").unwrap();
        assert_eq!(
            debug
                .build_settings
                .get("INFOPLIST_FILE")
                .map(String::as_str),
            Some("Target Support Files/BananaLib/BananaLib-Info.plist")
        );

        // a user-declared plist suppresses the generated one
        let other = TempDir::new().unwrap();
        let sandbox = Sandbox::new(other.path());
        let mut pod = banana_pod();
        pod.linkage = Linkage::DynamicFramework;
        pod.file_accessors[0].spec.pod_target_xcconfig.insert(
            "INFOPLIST_FILE".to_string(),
            "Custom/Info.plist".to_string(),
        );

        let (project, result) = install(&pod, &sandbox);
        let InstalledUnit::Native(native) = result.native_target else {
            panic!("expected a native unit");
        };
        let resolved = project.resolved_build_setting(project.target(native), "INFOPLIST_FILE");
        assert_eq!(
            resolved.get("Debug").and_then(|v| v.as_deref()),
            Some("Custom/Info.plist")
        );
        assert!(!sandbox
            .target_support_files_dir("BananaLib")
            .join("BananaLib-Info.plist")
            .exists());
    }

    #[test]
    fn test_test_spec_gets_unit_scripts_and_app_host() {
        let workspace = TempDir::new().unwrap();
        let sandbox = Sandbox::new(workspace.path());
        let mut pod = banana_pod();
        let mut test_spec = Specification::test("Tests", TestType::Unit);
        test_spec.requires_app_host = true;
        let mut accessor = FileAccessor::new(test_spec);
        accessor.source_files = vec![PathBuf::from("/pods/BananaLib/Tests/BananaTests.m")];
        accessor.arc_source_files = accessor.source_files.clone();
        pod.file_accessors.push(accessor);

        let (project, result) = install(&pod, &sandbox);

        assert_eq!(result.test_native_targets.len(), 1);
        let test_unit = project.target(result.test_native_targets[0]);
        assert_eq!(test_unit.name, "BananaLib-Unit-Tests");
        assert_eq!(test_unit.product_type, ProductType::UnitTestBundle);
        assert_eq!(test_unit.dependencies, result.test_app_host_targets);

        let debug = test_unit.build_configuration("Debug").unwrap();
        assert_eq!(
            debug.build_settings.get("TEST_HOST").map(String::as_str),
            Some(
                "$(BUILT_PRODUCTS_DIR)/AppHost-BananaLib-Unit-Tests.app/AppHost-BananaLib-Unit-Tests"
            )
        );
        assert_eq!(
            project
                .target_attributes
                .get("BananaLib-Unit-Tests")
                .and_then(|attributes| attributes.get("TestTargetID"))
                .map(String::as_str),
            Some("AppHost-BananaLib-Unit-Tests")
        );

        let support_dir = sandbox.target_support_files_dir("BananaLib");
        assert!(support_dir
            .join("BananaLib-Unit-Tests-resources.sh")
            .is_file());
        assert!(support_dir
            .join("BananaLib-Unit-Tests-frameworks.sh")
            .is_file());
        assert!(support_dir
            .join("BananaLib-Unit-Tests-Info.plist")
            .is_file());
        assert!(support_dir.join("BananaLib.unit-tests.xcconfig").is_file());
    }

    #[test]
    fn test_swift_static_library_rejects_custom_module_maps() {
        let workspace = TempDir::new().unwrap();
        let sandbox = Sandbox::new(workspace.path());
        let module_map = workspace.path().join("module.modulemap");
        std::fs::write(&module_map, "module BananaLib { }\n").unwrap();

        let mut pod = banana_pod();
        pod.defines_module = true;
        pod.file_accessors[0].module_map = Some(module_map);
        pod.file_accessors[0]
            .source_files
            .push(PathBuf::from("/pods/BananaLib/Classes/Banana.swift"));
        pod.file_accessors[0]
            .arc_source_files
            .push(PathBuf::from("/pods/BananaLib/Classes/Banana.swift"));

        let mut project = Project::new();
        register_files(&mut project, &pod);
        let mut installer = PodTargetInstaller::new(&sandbox, &pod);
        let err = installer
            .install(&mut project)
            .expect_err("custom module map with Swift static library must fail");
        assert!(matches!(
            err,
            PodgenError::SwiftStaticLibraryWithCustomModuleMap { .. }
        ));
    }

    #[test]
    fn test_no_sources_validation_runs_before_support_files() {
        let workspace = TempDir::new().unwrap();
        let sandbox = Sandbox::new(workspace.path());
        let mut pod = banana_pod();
        pod.file_accessors[0].source_files = vec![];
        pod.file_accessors[0].arc_source_files = vec![];
        pod.file_accessors[0].headers = vec![];

        let mut project = Project::new();
        let mut installer = PodTargetInstaller::new(&sandbox, &pod);
        let err = installer
            .install(&mut project)
            .expect_err("a pod without sources must fail");
        assert!(matches!(err, PodgenError::NoSourcesToCompile { .. }));
        assert!(!sandbox
            .target_support_files_dir("BananaLib")
            .join("BananaLib.xcconfig")
            .exists());
    }

    #[test]
    fn test_app_spec_installs_an_application_unit() {
        let workspace = TempDir::new().unwrap();
        let sandbox = Sandbox::new(workspace.path());
        let mut pod = banana_pod();
        let mut accessor = FileAccessor::new(Specification::app("App"));
        accessor.source_files = vec![PathBuf::from("/pods/BananaLib/App/main.m")];
        accessor.arc_source_files = accessor.source_files.clone();
        pod.file_accessors.push(accessor);

        let (project, result) = install(&pod, &sandbox);

        assert_eq!(result.app_native_targets.len(), 1);
        let app_unit = project.target(result.app_native_targets[0]);
        assert_eq!(app_unit.name, "BananaLib-App");
        assert_eq!(app_unit.product_type, ProductType::Application);

        let debug = app_unit.build_configuration("Debug").unwrap();
        assert_eq!(
            debug.build_settings.get("PRODUCT_NAME").map(String::as_str),
            Some("BananaLib-App")
        );
        assert!(debug.base_configuration.is_some());
        assert!(sandbox
            .root()
            .join("App/BananaLib-App-Info.plist")
            .is_file());

        let app_spec = pod
            .file_accessors
            .iter()
            .find(|accessor| accessor.spec.kind == SpecKind::App)
            .map(|accessor| &accessor.spec)
            .unwrap();
        assert_eq!(
            result.native_target_for_spec(&pod, app_spec),
            Some(result.app_native_targets[0])
        );
    }

    #[test]
    fn test_desktop_framework_with_mappings_dir_gets_symlink_phase() {
        let workspace = TempDir::new().unwrap();
        let sandbox = Sandbox::new(workspace.path());
        let mut pod = banana_pod();
        pod.platform = Platform::new(PlatformName::Osx, Version::parse("10.12"));
        pod.linkage = Linkage::DynamicFramework;
        pod.header_mappings_dir = Some(PathBuf::from("/pods/BananaLib/Classes"));

        let (project, result) = install(&pod, &sandbox);
        let InstalledUnit::Native(native) = result.native_target else {
            panic!("expected a native unit");
        };
        let unit = project.target(native);
        assert!(unit
            .shell_script_build_phases
            .iter()
            .any(|phase| phase.name == HEADER_SYMLINK_PHASE_NAME));
    }
}
