//! Target platforms and their build-system constants

use std::fmt;

use serde::{Deserialize, Serialize};

use super::version::Version;

/// Platform a pod target is built for
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PlatformName {
    Ios,
    Osx,
    Tvos,
    Watchos,
}

impl PlatformName {
    /// SDK the platform builds against by default
    pub fn sdk_root(self) -> &'static str {
        match self {
            PlatformName::Ios => "iphoneos",
            PlatformName::Osx => "macosx",
            PlatformName::Tvos => "appletvos",
            PlatformName::Watchos => "watchos",
        }
    }

    /// Build-setting key carrying the minimum OS version
    pub fn deployment_target_setting(self) -> &'static str {
        match self {
            PlatformName::Ios => "IPHONEOS_DEPLOYMENT_TARGET",
            PlatformName::Osx => "MACOSX_DEPLOYMENT_TARGET",
            PlatformName::Tvos => "TVOS_DEPLOYMENT_TARGET",
            PlatformName::Watchos => "WATCHOS_DEPLOYMENT_TARGET",
        }
    }

    /// `TARGETED_DEVICE_FAMILY` value for resource bundle units, when any
    pub fn device_family(self) -> Option<&'static str> {
        match self {
            PlatformName::Ios => Some("1,2"),
            PlatformName::Tvos => Some("3"),
            PlatformName::Watchos => Some("1,2"),
            PlatformName::Osx => None,
        }
    }

    /// First OS version on which dispatch objects are Objective-C objects
    /// by default, making the legacy `OS_OBJECT_USE_OBJC` macro unnecessary.
    pub fn object_use_objc_from(self) -> Version {
        match self {
            PlatformName::Ios => Version::new(&[6]),
            PlatformName::Osx => Version::new(&[10, 8]),
            PlatformName::Tvos => Version::new(&[9, 0]),
            PlatformName::Watchos => Version::new(&[2, 0]),
        }
    }

    /// Root framework import used by prefix and umbrella headers
    pub fn root_header_import(self) -> &'static str {
        match self {
            PlatformName::Osx => "#import <Cocoa/Cocoa.h>",
            _ => "#import <UIKit/UIKit.h>",
        }
    }

    pub fn is_osx(self) -> bool {
        self == PlatformName::Osx
    }
}

impl fmt::Display for PlatformName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PlatformName::Ios => write!(f, "iOS"),
            PlatformName::Osx => write!(f, "macOS"),
            PlatformName::Tvos => write!(f, "tvOS"),
            PlatformName::Watchos => write!(f, "watchOS"),
        }
    }
}

/// A platform together with the deployment target a pod declares for it
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Platform {
    pub name: PlatformName,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub deployment_target: Option<Version>,
}

impl Platform {
    pub fn new(name: PlatformName, deployment_target: Option<Version>) -> Self {
        Platform {
            name,
            deployment_target,
        }
    }

    /// True when the declared deployment target already guarantees
    /// Objective-C dispatch objects, so no legacy macro is needed.
    pub fn supports_objc_dispatch_objects(&self) -> bool {
        match &self.deployment_target {
            Some(version) => *version >= self.name.object_use_objc_from(),
            None => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sdk_roots() {
        assert_eq!(PlatformName::Ios.sdk_root(), "iphoneos");
        assert_eq!(PlatformName::Osx.sdk_root(), "macosx");
        assert_eq!(PlatformName::Tvos.sdk_root(), "appletvos");
        assert_eq!(PlatformName::Watchos.sdk_root(), "watchos");
    }

    #[test]
    fn test_deployment_target_settings() {
        assert_eq!(
            PlatformName::Ios.deployment_target_setting(),
            "IPHONEOS_DEPLOYMENT_TARGET"
        );
        assert_eq!(
            PlatformName::Osx.deployment_target_setting(),
            "MACOSX_DEPLOYMENT_TARGET"
        );
    }

    #[test]
    fn test_device_family() {
        assert_eq!(PlatformName::Ios.device_family(), Some("1,2"));
        assert_eq!(PlatformName::Tvos.device_family(), Some("3"));
        assert_eq!(PlatformName::Watchos.device_family(), Some("1,2"));
        assert_eq!(PlatformName::Osx.device_family(), None);
    }

    #[test]
    fn test_objc_dispatch_threshold() {
        let old_ios = Platform::new(PlatformName::Ios, Some(Version::parse("5.1").unwrap()));
        assert!(!old_ios.supports_objc_dispatch_objects());

        let new_ios = Platform::new(PlatformName::Ios, Some(Version::parse("6.0").unwrap()));
        assert!(new_ios.supports_objc_dispatch_objects());

        let unspecified = Platform::new(PlatformName::Ios, None);
        assert!(!unspecified.supports_objc_dispatch_objects());
    }

    #[test]
    fn test_root_header_import() {
        assert_eq!(
            PlatformName::Osx.root_header_import(),
            "#import <Cocoa/Cocoa.h>"
        );
        assert_eq!(
            PlatformName::Watchos.root_header_import(),
            "#import <UIKit/UIKit.h>"
        );
    }

    #[test]
    fn test_display() {
        assert_eq!(PlatformName::Ios.to_string(), "iOS");
        assert_eq!(PlatformName::Osx.to_string(), "macOS");
    }
}
