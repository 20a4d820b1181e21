//! Hosting application units
//!
//! Test bundles that need a running app and app variants share one
//! installer: both are application units with a generated property list,
//! differing only in whether an entry point is generated for them.

use std::collections::BTreeMap;
use std::path::PathBuf;

use crate::error::Result;
use crate::generator::info_plist::{self, BundlePackageType, PlistValue};
use crate::generator::update_changed_file;
use crate::path_utils::to_forward_slashes;
use crate::pod::{Platform, PlatformName};
use crate::project::{ConfigurationKind, ProductType, Project, TargetId};
use crate::sandbox::Sandbox;

const TOUCH_MAIN: &str = "\
#import <UIKit/UIKit.h>

int main(int argc, char *argv[])
{
    @autoreleasepool
    {
        return UIApplicationMain(argc, argv, nil, nil);
    }
}
";

const DESKTOP_MAIN: &str = "\
#import <Cocoa/Cocoa.h>

int main(int argc, const char *argv[])
{
    return NSApplicationMain(argc, argv);
}
";

/// Installs one application unit, either hosting test bundles or standing
/// as an app variant's own product.
pub struct AppHostInstaller<'a> {
    sandbox: &'a Sandbox,
    platform: &'a Platform,
    /// Directory under the sandbox root holding the unit's own files
    subgroup: String,
    name: String,
    add_main: bool,
    user_build_configurations: &'a BTreeMap<String, ConfigurationKind>,
    info_plist_entries: BTreeMap<String, PlistValue>,
}

impl<'a> AppHostInstaller<'a> {
    pub fn new(
        sandbox: &'a Sandbox,
        platform: &'a Platform,
        subgroup: impl Into<String>,
        name: impl Into<String>,
        user_build_configurations: &'a BTreeMap<String, ConfigurationKind>,
    ) -> Self {
        AppHostInstaller {
            sandbox,
            platform,
            subgroup: subgroup.into(),
            name: name.into(),
            add_main: true,
            user_build_configurations,
            info_plist_entries: BTreeMap::new(),
        }
    }

    /// Skip the generated entry point; the unit compiles the variant's own
    /// sources instead.
    pub fn without_main(mut self) -> Self {
        self.add_main = false;
        self
    }

    pub fn with_info_plist_entries(mut self, entries: BTreeMap<String, PlistValue>) -> Self {
        self.info_plist_entries = entries;
        self
    }

    pub fn install(&self, project: &mut Project) -> Result<(TargetId, Vec<PathBuf>)> {
        let unit_id = project.new_target(
            self.name.clone(),
            ProductType::Application,
            self.platform.name,
            self.platform.deployment_target.clone(),
            format!("{}.app", self.name),
        );

        let unit = project.target_mut(unit_id);
        for (name, kind) in self.user_build_configurations {
            unit.add_build_configuration(name, *kind);
        }
        for configuration in &mut unit.build_configurations {
            configuration.set("PRODUCT_NAME", self.name.clone());
            configuration.set(
                "PRODUCT_BUNDLE_IDENTIFIER",
                "org.cocoapods.${PRODUCT_NAME:rfc1034identifier}",
            );
            configuration.set("CURRENT_PROJECT_VERSION", "1");
            if self.platform.name.is_osx() {
                configuration.set("CODE_SIGN_IDENTITY", "");
            } else {
                configuration.set("CODE_SIGNING_REQUIRED", "YES");
                configuration.set("CODE_SIGNING_ALLOWED", "YES");
            }
        }

        let mut written = Vec::new();
        if self.add_main {
            written.extend(self.create_main_source(project, unit_id)?);
        }
        written.extend(self.create_info_plist(project, unit_id)?);
        Ok((unit_id, written))
    }

    fn create_main_source(
        &self,
        project: &mut Project,
        unit_id: TargetId,
    ) -> Result<Vec<PathBuf>> {
        let path = self.sandbox.root().join(&self.subgroup).join("main.m");
        let contents = match self.platform.name {
            PlatformName::Osx => DESKTOP_MAIN,
            _ => TOUCH_MAIN,
        };
        let mut written = Vec::new();
        if update_changed_file(&path, contents)? {
            written.push(path.clone());
        }
        let file_ref = project.add_file_reference(path);
        project.add_file_to_group(file_ref, &self.subgroup);
        project
            .target_mut(unit_id)
            .source_build_phase
            .add_file_reference(file_ref, None);
        Ok(written)
    }

    fn create_info_plist(&self, project: &mut Project, unit_id: TargetId) -> Result<Vec<PathBuf>> {
        let path = self
            .sandbox
            .root()
            .join(&self.subgroup)
            .join(format!("{}-Info.plist", self.name));

        let mut entries = self.info_plist_entries.clone();
        entries.insert(
            "NSAppTransportSecurity".to_string(),
            PlistValue::Dict(BTreeMap::from([(
                "NSAllowsArbitraryLoads".to_string(),
                PlistValue::Bool(true),
            )])),
        );
        if self.platform.name == PlatformName::Ios {
            entries.insert(
                "UILaunchStoryboardName".to_string(),
                PlistValue::from("LaunchScreen"),
            );
        }

        let contents = info_plist::generate("1.0.0", BundlePackageType::Application, &entries);
        let mut written = Vec::new();
        if update_changed_file(&path, &contents)? {
            written.push(path.clone());
        }
        let file_ref = project.add_file_reference(path.clone());
        project.add_file_to_group(file_ref, &self.subgroup);

        let relative = to_forward_slashes(&self.sandbox.relative_path(&path));
        for configuration in &mut project.target_mut(unit_id).build_configurations {
            configuration.set("INFOPLIST_FILE", relative.clone());
        }
        Ok(written)
    }
}
