//! The resolved pod target and its derived names and paths

use std::collections::BTreeMap;
use std::path::PathBuf;

use crate::path_utils::sanitize_identifier;
use crate::project::{ConfigurationKind, ProductType};
use crate::sandbox::Sandbox;

use super::accessor::FileAccessor;
use super::build_type::Linkage;
use super::platform::Platform;
use super::spec::{SpecKind, Specification, TestType};

/// One resolved pod on one platform, ready to be turned into build units.
///
/// Constructed by the manifest loader before installation; read-only during
/// it apart from generated files recorded on the project.
#[derive(Debug, Clone)]
pub struct PodTarget {
    pub name: String,
    pub version: String,
    pub platform: Platform,
    pub linkage: Linkage,
    pub defines_module: bool,
    /// Explicit module name; the sanitized pod name otherwise
    pub module_name: Option<String>,
    pub swift_version: Option<String>,
    /// Import prefix for non-framework headers, when declared
    pub header_dir: Option<String>,
    /// Directory header sub-paths are preserved relative to, when declared
    pub header_mappings_dir: Option<PathBuf>,
    pub archs: Vec<String>,
    pub inhibit_warnings: bool,
    pub user_build_configurations: BTreeMap<String, ConfigurationKind>,
    pub file_accessors: Vec<FileAccessor>,
    /// Names of other pods this pod's units link against
    pub dependencies: Vec<String>,
}

impl PodTarget {
    pub fn new(name: impl Into<String>, version: impl Into<String>, platform: Platform) -> Self {
        PodTarget {
            name: name.into(),
            version: version.into(),
            platform,
            linkage: Linkage::default(),
            defines_module: false,
            module_name: None,
            swift_version: None,
            header_dir: None,
            header_mappings_dir: None,
            archs: Vec::new(),
            inhibit_warnings: false,
            user_build_configurations: BTreeMap::from([
                ("Debug".to_string(), ConfigurationKind::Debug),
                ("Release".to_string(), ConfigurationKind::Release),
            ]),
            file_accessors: Vec::new(),
            dependencies: Vec::new(),
        }
    }

    pub fn label(&self) -> &str {
        &self.name
    }

    pub fn should_build(&self) -> bool {
        self.linkage.should_build()
    }

    pub fn builds_framework(&self) -> bool {
        self.linkage.builds_framework()
    }

    pub fn product_module_name(&self) -> String {
        self.module_name
            .clone()
            .unwrap_or_else(|| sanitize_identifier(&self.name))
    }

    /// Product file name without extension: the module name for frameworks,
    /// the label for libraries.
    pub fn product_basename(&self) -> String {
        if self.builds_framework() {
            self.product_module_name()
        } else {
            self.label().to_string()
        }
    }

    pub fn product_name(&self) -> String {
        if self.builds_framework() {
            format!("{}.framework", self.product_module_name())
        } else {
            format!("lib{}.a", self.label())
        }
    }

    pub fn product_type(&self) -> ProductType {
        if self.builds_framework() {
            ProductType::Framework
        } else {
            ProductType::StaticLibrary
        }
    }

    // ------- Names -------

    /// Unit label for a specification variant
    pub fn spec_label(&self, spec: &Specification) -> String {
        match spec.kind {
            SpecKind::Library => self.label().to_string(),
            SpecKind::Test(test_type) => {
                format!("{}-{}-{}", self.label(), test_type.capitalized(), spec.name)
            }
            SpecKind::App => format!("{}-{}", self.label(), spec.name),
        }
    }

    pub fn app_host_label(&self, test_type: TestType) -> String {
        format!(
            "AppHost-{}-{}-Tests",
            self.label(),
            test_type.capitalized()
        )
    }

    pub fn resources_bundle_target_label(&self, bundle_name: &str) -> String {
        format!("{}-{}", self.label(), bundle_name)
    }

    /// Fragment-file suffix for a non-library variant, e.g. `Unit-Tests`
    pub fn spec_variant(&self, spec: &Specification) -> Option<String> {
        match spec.kind {
            SpecKind::Library => None,
            SpecKind::Test(test_type) => {
                Some(format!("{}-{}", test_type.capitalized(), spec.name))
            }
            SpecKind::App => Some(spec.name.clone()),
        }
    }

    // ------- Accessors by kind -------

    pub fn library_file_accessors(&self) -> Vec<&FileAccessor> {
        self.accessors_where(|kind| kind.is_library())
    }

    pub fn test_file_accessors(&self) -> Vec<&FileAccessor> {
        self.accessors_where(|kind| kind.is_test())
    }

    pub fn app_file_accessors(&self) -> Vec<&FileAccessor> {
        self.accessors_where(|kind| kind.is_app())
    }

    fn accessors_where(&self, predicate: impl Fn(SpecKind) -> bool) -> Vec<&FileAccessor> {
        self.file_accessors
            .iter()
            .filter(|accessor| predicate(accessor.spec.kind))
            .collect()
    }

    pub fn test_specs(&self) -> Vec<&Specification> {
        self.test_file_accessors()
            .into_iter()
            .map(|accessor| &accessor.spec)
            .collect()
    }

    pub fn app_specs(&self) -> Vec<&Specification> {
        self.app_file_accessors()
            .into_iter()
            .map(|accessor| &accessor.spec)
            .collect()
    }

    pub fn file_accessor_for_spec(&self, spec: &Specification) -> Option<&FileAccessor> {
        self.file_accessors
            .iter()
            .find(|accessor| accessor.spec.kind == spec.kind && accessor.spec.name == spec.name)
    }

    pub fn uses_swift(&self) -> bool {
        self.library_file_accessors()
            .iter()
            .any(|accessor| accessor.uses_swift())
    }

    pub fn uses_swift_for_spec(&self, spec: &Specification) -> bool {
        self.file_accessor_for_spec(spec)
            .is_some_and(FileAccessor::uses_swift)
    }

    /// The custom module map of the library variant, when one is declared.
    /// Computed once by the orchestrator and threaded down from there.
    pub fn custom_module_map(&self) -> Option<PathBuf> {
        self.library_file_accessors()
            .iter()
            .find_map(|accessor| accessor.module_map.clone())
    }

    // ------- Generated file paths -------

    pub fn support_files_dir(&self, sandbox: &Sandbox) -> PathBuf {
        sandbox.target_support_files_dir(self.label())
    }

    pub fn xcconfig_path(&self, sandbox: &Sandbox) -> PathBuf {
        self.support_files_dir(sandbox)
            .join(format!("{}.xcconfig", self.label()))
    }

    /// Fragment path for a variant suffix, lower-cased in the file name
    pub fn xcconfig_path_for_variant(&self, sandbox: &Sandbox, variant: &str) -> PathBuf {
        let suffix = variant.replace('/', "-").to_lowercase();
        self.support_files_dir(sandbox)
            .join(format!("{}.{}.xcconfig", self.label(), suffix))
    }

    pub fn prefix_header_path(&self, sandbox: &Sandbox) -> PathBuf {
        self.support_files_dir(sandbox)
            .join(format!("{}-prefix.pch", self.label()))
    }

    pub fn prefix_header_path_for_spec(&self, sandbox: &Sandbox, spec: &Specification) -> PathBuf {
        self.support_files_dir(sandbox)
            .join(format!("{}-prefix.pch", self.spec_label(spec)))
    }

    pub fn info_plist_path(&self, sandbox: &Sandbox) -> PathBuf {
        self.support_files_dir(sandbox)
            .join(format!("{}-Info.plist", self.label()))
    }

    pub fn info_plist_path_for_spec(&self, sandbox: &Sandbox, spec: &Specification) -> PathBuf {
        self.support_files_dir(sandbox)
            .join(format!("{}-Info.plist", self.spec_label(spec)))
    }

    pub fn dummy_source_path(&self, sandbox: &Sandbox) -> PathBuf {
        self.support_files_dir(sandbox)
            .join(format!("{}-dummy.m", self.label()))
    }

    pub fn copy_resources_script_path_for_spec(
        &self,
        sandbox: &Sandbox,
        spec: &Specification,
    ) -> PathBuf {
        self.support_files_dir(sandbox)
            .join(format!("{}-resources.sh", self.spec_label(spec)))
    }

    pub fn embed_frameworks_script_path_for_spec(
        &self,
        sandbox: &Sandbox,
        spec: &Specification,
    ) -> PathBuf {
        self.support_files_dir(sandbox)
            .join(format!("{}-frameworks.sh", self.spec_label(spec)))
    }

    /// Where the module map is written
    pub fn module_map_path_to_write(&self, sandbox: &Sandbox) -> PathBuf {
        self.support_files_dir(sandbox)
            .join(format!("{}.modulemap", self.label()))
    }

    /// Where the build expects the module map. Differs from the write path
    /// for non-framework modules, which consume it from the public header
    /// space through a symlink.
    pub fn module_map_path(&self, sandbox: &Sandbox) -> PathBuf {
        if self.builds_framework() {
            self.module_map_path_to_write(sandbox)
        } else {
            sandbox
                .public_headers_root()
                .join(self.product_module_name())
                .join(format!("{}.modulemap", self.label()))
        }
    }

    pub fn umbrella_header_path_to_write(&self, sandbox: &Sandbox) -> PathBuf {
        self.support_files_dir(sandbox)
            .join(format!("{}-umbrella.h", self.label()))
    }

    pub fn umbrella_header_path(&self, sandbox: &Sandbox) -> PathBuf {
        if self.builds_framework() {
            self.umbrella_header_path_to_write(sandbox)
        } else {
            sandbox
                .public_headers_root()
                .join(self.product_module_name())
                .join(format!("{}-umbrella.h", self.label()))
        }
    }

    // ------- Build paths -------

    /// Directory this pod's products build into, under the given base
    pub fn configuration_build_dir(&self, base: &str) -> String {
        format!("{}/{}", base, self.label())
    }

    /// Built product path under the given variable, e.g.
    /// `${BUILT_PRODUCTS_DIR}/Foo/Foo.framework`
    pub fn build_product_path(&self, base: &str) -> String {
        format!("{}/{}/{}", base, self.label(), self.product_name())
    }
}
