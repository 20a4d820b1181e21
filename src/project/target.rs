//! Build units of the generated project

use std::collections::BTreeMap;

use serde::Serialize;

use crate::pod::platform::PlatformName;
use crate::pod::version::Version;

use super::configuration::{BuildConfiguration, ConfigurationKind};
use super::phase::{CopyFilesBuildPhase, FilesBuildPhase, ShellScriptBuildPhase};

/// Identifier of a build unit, unique across native and aggregate units
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(transparent)]
pub struct TargetId(pub usize);

/// Product a native build unit produces
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ProductType {
    StaticLibrary,
    Framework,
    UnitTestBundle,
    UiTestBundle,
    Application,
    Bundle,
}

impl ProductType {
    pub fn is_test_bundle(self) -> bool {
        matches!(self, ProductType::UnitTestBundle | ProductType::UiTestBundle)
    }
}

/// Settings every fresh configuration starts from, modeled on what Xcode
/// seeds for a new target of the given product type.
fn default_build_settings(
    product_type: ProductType,
    platform: PlatformName,
    deployment_target: Option<&Version>,
) -> BTreeMap<String, String> {
    let mut settings = BTreeMap::new();
    settings.insert("PRODUCT_NAME".to_string(), "$(TARGET_NAME)".to_string());
    settings.insert("SDKROOT".to_string(), platform.sdk_root().to_string());
    if let Some(deployment_target) = deployment_target {
        settings.insert(
            platform.deployment_target_setting().to_string(),
            deployment_target.to_string(),
        );
    }
    let signs_by_default =
        matches!(product_type, ProductType::Application) || product_type.is_test_bundle();
    if signs_by_default && !platform.is_osx() {
        settings.insert(
            "CODE_SIGN_IDENTITY".to_string(),
            "iPhone Developer".to_string(),
        );
    }
    settings
}

/// A compiling or bundling build unit
#[derive(Debug, Clone, Serialize)]
pub struct NativeTarget {
    pub id: TargetId,
    pub name: String,
    pub product_type: ProductType,
    pub platform: PlatformName,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub deployment_target: Option<Version>,
    /// Display name of the product reference, when it differs from the path
    #[serde(skip_serializing_if = "Option::is_none")]
    pub product_reference_name: Option<String>,
    pub product_reference_path: String,
    pub build_configurations: Vec<BuildConfiguration>,
    pub source_build_phase: FilesBuildPhase,
    pub headers_build_phase: FilesBuildPhase,
    pub resources_build_phase: FilesBuildPhase,
    pub frameworks_build_phase: FilesBuildPhase,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub copy_files_build_phases: Vec<CopyFilesBuildPhase>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub shell_script_build_phases: Vec<ShellScriptBuildPhase>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub dependencies: Vec<TargetId>,
}

impl NativeTarget {
    pub fn new(
        id: TargetId,
        name: impl Into<String>,
        product_type: ProductType,
        platform: PlatformName,
        deployment_target: Option<Version>,
        product_reference_path: impl Into<String>,
    ) -> Self {
        NativeTarget {
            id,
            name: name.into(),
            product_type,
            platform,
            deployment_target,
            product_reference_name: None,
            product_reference_path: product_reference_path.into(),
            build_configurations: Vec::new(),
            source_build_phase: FilesBuildPhase::default(),
            headers_build_phase: FilesBuildPhase::default(),
            resources_build_phase: FilesBuildPhase::default(),
            frameworks_build_phase: FilesBuildPhase::default(),
            copy_files_build_phases: Vec::new(),
            shell_script_build_phases: Vec::new(),
            dependencies: Vec::new(),
        }
    }

    /// Adds a configuration seeded with the product-type defaults.
    /// Adding an existing name is a no-op.
    pub fn add_build_configuration(&mut self, name: &str, kind: ConfigurationKind) {
        if self.build_configurations.iter().any(|c| c.name == name) {
            return;
        }
        let mut configuration = BuildConfiguration::new(name, kind);
        configuration.build_settings = default_build_settings(
            self.product_type,
            self.platform,
            self.deployment_target.as_ref(),
        );
        self.build_configurations.push(configuration);
    }

    pub fn build_configuration(&self, name: &str) -> Option<&BuildConfiguration> {
        self.build_configurations.iter().find(|c| c.name == name)
    }

    pub fn add_dependency(&mut self, target: TargetId) {
        if !self.dependencies.contains(&target) {
            self.dependencies.push(target);
        }
    }

    /// Index of the copy-files phase with the given name, creating it with
    /// the destination path when missing.
    pub fn copy_files_phase_index(&mut self, name: &str, dst_path: &str) -> usize {
        if let Some(index) = self
            .copy_files_build_phases
            .iter()
            .position(|phase| phase.name == name)
        {
            return index;
        }
        self.copy_files_build_phases
            .push(CopyFilesBuildPhase::new(name, dst_path));
        self.copy_files_build_phases.len() - 1
    }

    pub fn add_shell_script_build_phase(&mut self, phase: ShellScriptBuildPhase) {
        self.shell_script_build_phases.push(phase);
    }
}

/// A unit that builds nothing itself; stands in for pods that should not build
#[derive(Debug, Clone, Serialize)]
pub struct AggregateTarget {
    pub id: TargetId,
    pub name: String,
    pub platform: PlatformName,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub deployment_target: Option<Version>,
    pub build_configurations: Vec<BuildConfiguration>,
}

impl AggregateTarget {
    pub fn new(
        id: TargetId,
        name: impl Into<String>,
        platform: PlatformName,
        deployment_target: Option<Version>,
    ) -> Self {
        AggregateTarget {
            id,
            name: name.into(),
            platform,
            deployment_target,
            build_configurations: Vec::new(),
        }
    }

    pub fn add_build_configuration(&mut self, name: &str, kind: ConfigurationKind) {
        if self.build_configurations.iter().any(|c| c.name == name) {
            return;
        }
        let mut configuration = BuildConfiguration::new(name, kind);
        configuration.build_settings.insert(
            "SDKROOT".to_string(),
            self.platform.sdk_root().to_string(),
        );
        if let Some(deployment_target) = &self.deployment_target {
            configuration.build_settings.insert(
                self.platform.deployment_target_setting().to_string(),
                deployment_target.to_string(),
            );
        }
        self.build_configurations.push(configuration);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ios_library() -> NativeTarget {
        NativeTarget::new(
            TargetId(0),
            "BananaLib",
            ProductType::StaticLibrary,
            PlatformName::Ios,
            Version::parse("6.0"),
            "libBananaLib.a",
        )
    }

    #[test]
    fn test_configuration_seeding() {
        let mut target = ios_library();
        target.add_build_configuration("Debug", ConfigurationKind::Debug);

        let configuration = target.build_configuration("Debug").unwrap();
        assert_eq!(configuration.build_settings["SDKROOT"], "iphoneos");
        assert_eq!(
            configuration.build_settings["IPHONEOS_DEPLOYMENT_TARGET"],
            "6.0"
        );
        assert_eq!(configuration.build_settings["PRODUCT_NAME"], "$(TARGET_NAME)");
        assert!(!configuration.build_settings.contains_key("CODE_SIGN_IDENTITY"));
    }

    #[test]
    fn test_test_bundles_sign_on_device_platforms() {
        let mut target = NativeTarget::new(
            TargetId(1),
            "BananaLib-Unit-Tests",
            ProductType::UnitTestBundle,
            PlatformName::Ios,
            None,
            "BananaLib-Unit-Tests.xctest",
        );
        target.add_build_configuration("Release", ConfigurationKind::Release);

        let configuration = target.build_configuration("Release").unwrap();
        assert_eq!(
            configuration.build_settings["CODE_SIGN_IDENTITY"],
            "iPhone Developer"
        );
    }

    #[test]
    fn test_adding_existing_configuration_is_a_no_op() {
        let mut target = ios_library();
        target.add_build_configuration("Debug", ConfigurationKind::Debug);
        target.add_build_configuration("Debug", ConfigurationKind::Debug);
        assert_eq!(target.build_configurations.len(), 1);
    }

    #[test]
    fn test_copy_files_phase_reuse() {
        let mut target = ios_library();
        let first = target.copy_files_phase_index("Copy A Public Headers", "$(PUBLIC_HEADERS_FOLDER_PATH)/A");
        let second = target.copy_files_phase_index("Copy A Public Headers", "ignored");
        assert_eq!(first, second);
        assert_eq!(target.copy_files_build_phases.len(), 1);
        assert_eq!(
            target.copy_files_build_phases[0].dst_path,
            "$(PUBLIC_HEADERS_FOLDER_PATH)/A"
        );
    }

    #[test]
    fn test_aggregate_configuration_seeding() {
        let mut target = AggregateTarget::new(
            TargetId(2),
            "BananaLib",
            PlatformName::Ios,
            Version::parse("6.0"),
        );
        target.add_build_configuration("Debug", ConfigurationKind::Debug);
        assert_eq!(
            target.build_configurations[0].build_settings["SDKROOT"],
            "iphoneos"
        );
    }

    #[test]
    fn test_dependencies_deduplicate() {
        let mut target = ios_library();
        target.add_dependency(TargetId(9));
        target.add_dependency(TargetId(9));
        assert_eq!(target.dependencies.len(), 1);
    }
}
