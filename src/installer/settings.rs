//! Build settings layered onto the created units
//!
//! Settings are applied in passes: the pod's base settings first, then the
//! variant adjustments for test and app units, and finally the subtraction
//! of every key the scope's configuration fragment already declares.

use std::collections::{BTreeMap, BTreeSet};

use crate::pod::{Linkage, PlatformName, PodTarget};
use crate::project::{BuildConfiguration, NativeTarget};

/// Base settings of the library unit, shared by test and app units before
/// their own adjustments.
pub fn custom_build_settings(pod: &PodTarget) -> BTreeMap<String, String> {
    let mut settings = BTreeMap::new();

    if !pod.archs.is_empty() {
        settings.insert("ARCHS".to_string(), pod.archs.join(" "));
    }

    match pod.linkage {
        Linkage::StaticFramework => {
            settings.insert("MACH_O_TYPE".to_string(), "staticlib".to_string());
        }
        Linkage::StaticLibrary => {
            settings.insert("OTHER_LDFLAGS".to_string(), String::new());
            settings.insert("OTHER_LIBTOOLFLAGS".to_string(), String::new());
        }
        Linkage::DynamicFramework | Linkage::None => {}
    }

    if !pod.builds_framework() {
        settings.insert("PRIVATE_HEADERS_FOLDER_PATH".to_string(), String::new());
        settings.insert("PUBLIC_HEADERS_FOLDER_PATH".to_string(), String::new());
    }

    settings.insert("PRODUCT_NAME".to_string(), pod.product_basename());
    settings.insert("PRODUCT_MODULE_NAME".to_string(), pod.product_module_name());

    settings.insert("CODE_SIGN_IDENTITY[sdk=appletvos*]".to_string(), String::new());
    settings.insert("CODE_SIGN_IDENTITY[sdk=iphoneos*]".to_string(), String::new());
    settings.insert("CODE_SIGN_IDENTITY[sdk=watchos*]".to_string(), String::new());

    settings.insert(
        "SWIFT_ACTIVE_COMPILATION_CONDITIONS".to_string(),
        "$(inherited) ".to_string(),
    );
    if let Some(swift_version) = &pod.swift_version {
        settings.insert("SWIFT_VERSION".to_string(), swift_version.clone());
    }

    settings
}

/// Merge `settings` into every configuration of the unit
pub fn apply_settings(unit: &mut NativeTarget, settings: &BTreeMap<String, String>) {
    for configuration in &mut unit.build_configurations {
        for (key, value) in settings {
            configuration.set(key, value.clone());
        }
    }
}

/// Adjust one configuration of a test or app unit after the base settings.
/// The product carries the unit's own label, never links as the library
/// does, and signs according to the platform.
pub fn apply_variant_overrides(
    configuration: &mut BuildConfiguration,
    unit_label: &str,
    platform: PlatformName,
) {
    configuration.build_settings.remove("OTHER_LDFLAGS");
    configuration.set("PRODUCT_NAME", unit_label);
    configuration.build_settings.remove("MACH_O_TYPE");
    configuration.build_settings.remove("PRODUCT_MODULE_NAME");
    if platform.is_osx() {
        configuration.set("CODE_SIGN_IDENTITY", "");
    } else {
        configuration.set("CODE_SIGNING_REQUIRED", "YES");
        configuration.set("CODE_SIGNING_ALLOWED", "YES");
    }
}

/// Delete from the unit's configurations every key the scope's fragment
/// declares. The fragment applied as base configuration stays the single
/// authority for those keys.
pub fn remove_fragment_overrides(unit: &mut NativeTarget, fragment_keys: &BTreeSet<String>) {
    for configuration in &mut unit.build_configurations {
        for key in fragment_keys {
            configuration.build_settings.remove(key);
        }
    }
}

/// Link the no-optimization Swift runtime support library into debug
/// configurations. Test bundles need it when any dependency ships Swift
/// built without optimization.
pub fn add_swift_debug_linker_flags(unit: &mut NativeTarget) {
    for configuration in &mut unit.build_configurations {
        if configuration.is_debug() {
            let flags = configuration
                .build_settings
                .entry("OTHER_LDFLAGS".to_string())
                .or_insert_with(|| "$(inherited)".to_string());
            flags.push_str(" -lswiftSwiftOnoneSupport");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pod::{Platform, PodTarget, Version};
    use crate::project::{ConfigurationKind, ProductType};

    fn static_library_pod() -> PodTarget {
        PodTarget::new(
            "BananaLib",
            "1.0",
            Platform::new(PlatformName::Ios, Version::parse("8.0")),
        )
    }

    fn unit_with_configurations(product_type: ProductType) -> NativeTarget {
        let mut unit = NativeTarget::new(
            crate::project::TargetId(0),
            "BananaLib",
            product_type,
            PlatformName::Ios,
            None,
            "libBananaLib.a",
        );
        unit.add_build_configuration("Debug", ConfigurationKind::Debug);
        unit.add_build_configuration("Release", ConfigurationKind::Release);
        unit
    }

    #[test]
    fn test_static_library_blanks_linker_and_header_folder_settings() {
        let pod = static_library_pod();
        let settings = custom_build_settings(&pod);

        assert_eq!(settings.get("OTHER_LDFLAGS").map(String::as_str), Some(""));
        assert_eq!(settings.get("OTHER_LIBTOOLFLAGS").map(String::as_str), Some(""));
        assert_eq!(
            settings.get("PUBLIC_HEADERS_FOLDER_PATH").map(String::as_str),
            Some("")
        );
        assert_eq!(
            settings.get("PRODUCT_NAME").map(String::as_str),
            Some("BananaLib")
        );
        assert!(!settings.contains_key("MACH_O_TYPE"));
    }

    #[test]
    fn test_static_framework_sets_mach_o_type() {
        let mut pod = static_library_pod();
        pod.linkage = Linkage::StaticFramework;
        let settings = custom_build_settings(&pod);

        assert_eq!(
            settings.get("MACH_O_TYPE").map(String::as_str),
            Some("staticlib")
        );
        assert!(!settings.contains_key("OTHER_LDFLAGS"));
        assert!(!settings.contains_key("PUBLIC_HEADERS_FOLDER_PATH"));
    }

    #[test]
    fn test_declared_archs_and_swift_version_are_carried() {
        let mut pod = static_library_pod();
        pod.archs = vec!["arm64".to_string(), "x86_64".to_string()];
        pod.swift_version = Some("5.0".to_string());
        let settings = custom_build_settings(&pod);

        assert_eq!(
            settings.get("ARCHS").map(String::as_str),
            Some("arm64 x86_64")
        );
        assert_eq!(settings.get("SWIFT_VERSION").map(String::as_str), Some("5.0"));
    }

    #[test]
    fn test_variant_overrides_reshape_test_configurations() {
        let pod = static_library_pod();
        let mut unit = unit_with_configurations(ProductType::UnitTestBundle);
        apply_settings(&mut unit, &custom_build_settings(&pod));

        for configuration in &mut unit.build_configurations {
            apply_variant_overrides(configuration, "BananaLib-Unit-Tests", PlatformName::Ios);
        }

        let debug = unit.build_configuration("Debug").unwrap();
        assert_eq!(
            debug.build_settings.get("PRODUCT_NAME").map(String::as_str),
            Some("BananaLib-Unit-Tests")
        );
        assert!(!debug.build_settings.contains_key("OTHER_LDFLAGS"));
        assert!(!debug.build_settings.contains_key("PRODUCT_MODULE_NAME"));
        assert_eq!(
            debug.build_settings.get("CODE_SIGNING_REQUIRED").map(String::as_str),
            Some("YES")
        );
    }

    #[test]
    fn test_variant_overrides_blank_identity_on_desktop() {
        let mut configuration = BuildConfiguration::new("Debug", ConfigurationKind::Debug);
        apply_variant_overrides(&mut configuration, "BananaLib-App", PlatformName::Osx);

        assert_eq!(
            configuration.build_settings.get("CODE_SIGN_IDENTITY").map(String::as_str),
            Some("")
        );
        assert!(!configuration.build_settings.contains_key("CODE_SIGNING_REQUIRED"));
    }

    #[test]
    fn test_fragment_keys_are_subtracted_from_configurations() {
        let mut unit = unit_with_configurations(ProductType::StaticLibrary);
        apply_settings(
            &mut unit,
            &BTreeMap::from([("ENABLE_BITCODE".to_string(), "NO".to_string())]),
        );

        let keys = BTreeSet::from(["ENABLE_BITCODE".to_string()]);
        remove_fragment_overrides(&mut unit, &keys);

        for configuration in &unit.build_configurations {
            assert!(!configuration.build_settings.contains_key("ENABLE_BITCODE"));
        }
    }

    #[test]
    fn test_swift_debug_flags_only_touch_debug_configurations() {
        let mut unit = unit_with_configurations(ProductType::UnitTestBundle);
        add_swift_debug_linker_flags(&mut unit);

        let debug = unit.build_configuration("Debug").unwrap();
        assert_eq!(
            debug.build_settings.get("OTHER_LDFLAGS").map(String::as_str),
            Some("$(inherited) -lswiftSwiftOnoneSupport")
        );
        let release = unit.build_configuration("Release").unwrap();
        assert!(!release.build_settings.contains_key("OTHER_LDFLAGS"));
    }
}
