//! Info.plist generation
//!
//! Generated property lists carry the bundle identity placeholders the
//! build resolves, a package-type code per unit kind, and any additional
//! entries a variant or app host declares. Keys render sorted so output is
//! stable.

use std::collections::BTreeMap;

/// Bundle package type code written into generated property lists
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BundlePackageType {
    Framework,
    Bundle,
    Application,
}

impl BundlePackageType {
    pub fn code(self) -> &'static str {
        match self {
            BundlePackageType::Framework => "FMWK",
            BundlePackageType::Bundle => "BNDL",
            BundlePackageType::Application => "APPL",
        }
    }
}

/// A property-list value
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PlistValue {
    String(String),
    Bool(bool),
    Dict(BTreeMap<String, PlistValue>),
}

impl From<&str> for PlistValue {
    fn from(value: &str) -> Self {
        PlistValue::String(value.to_string())
    }
}

impl From<String> for PlistValue {
    fn from(value: String) -> Self {
        PlistValue::String(value)
    }
}

impl From<bool> for PlistValue {
    fn from(value: bool) -> Self {
        PlistValue::Bool(value)
    }
}

/// Render the standard Info.plist for a generated unit.
///
/// Bundles report a fixed `CFBundleVersion` of `1` and no executable entry;
/// every other package type defers both to build variables.
pub fn generate(
    version: &str,
    package_type: BundlePackageType,
    additional_entries: &BTreeMap<String, PlistValue>,
) -> String {
    let mut entries: BTreeMap<String, PlistValue> = BTreeMap::new();
    entries.insert(
        "CFBundleDevelopmentRegion".to_string(),
        "${PODS_DEVELOPMENT_LANGUAGE}".into(),
    );
    if package_type != BundlePackageType::Bundle {
        entries.insert(
            "CFBundleExecutable".to_string(),
            "${EXECUTABLE_NAME}".into(),
        );
    }
    entries.insert(
        "CFBundleIdentifier".to_string(),
        "${PRODUCT_BUNDLE_IDENTIFIER}".into(),
    );
    entries.insert(
        "CFBundleInfoDictionaryVersion".to_string(),
        "6.0".into(),
    );
    entries.insert("CFBundleName".to_string(), "${PRODUCT_NAME}".into());
    entries.insert(
        "CFBundlePackageType".to_string(),
        package_type.code().into(),
    );
    entries.insert(
        "CFBundleShortVersionString".to_string(),
        version.into(),
    );
    entries.insert("CFBundleSignature".to_string(), "????".into());
    let bundle_version = if package_type == BundlePackageType::Bundle {
        "1"
    } else {
        "${CURRENT_PROJECT_VERSION}"
    };
    entries.insert("CFBundleVersion".to_string(), bundle_version.into());
    entries.insert("NSPrincipalClass".to_string(), "".into());
    for (key, value) in additional_entries {
        entries.insert(key.clone(), value.clone());
    }
    render(&entries)
}

fn render(root: &BTreeMap<String, PlistValue>) -> String {
    let mut out = String::new();
    out.push_str("<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n");
    out.push_str(
        "<!DOCTYPE plist PUBLIC \"-//Apple//DTD PLIST 1.0//EN\" \"http://www.apple.com/DTDs/PropertyList-1.0.dtd\">\n",
    );
    out.push_str("<plist version=\"1.0\">\n");
    out.push_str("<dict>\n");
    render_dict_entries(root, 1, &mut out);
    out.push_str("</dict>\n");
    out.push_str("</plist>\n");
    out
}

fn render_dict_entries(dict: &BTreeMap<String, PlistValue>, depth: usize, out: &mut String) {
    let indent = "\t".repeat(depth);
    for (key, value) in dict {
        out.push_str(&format!("{indent}<key>{}</key>\n", escape_xml(key)));
        render_value(value, depth, out);
    }
}

fn render_value(value: &PlistValue, depth: usize, out: &mut String) {
    let indent = "\t".repeat(depth);
    match value {
        PlistValue::String(s) => {
            out.push_str(&format!("{indent}<string>{}</string>\n", escape_xml(s)));
        }
        PlistValue::Bool(true) => out.push_str(&format!("{indent}<true/>\n")),
        PlistValue::Bool(false) => out.push_str(&format!("{indent}<false/>\n")),
        PlistValue::Dict(entries) => {
            out.push_str(&format!("{indent}<dict>\n"));
            render_dict_entries(entries, depth + 1, out);
            out.push_str(&format!("{indent}</dict>\n"));
        }
    }
}

fn escape_xml(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_framework_plist() {
        let plist = generate("1.0.0", BundlePackageType::Framework, &BTreeMap::new());

        assert!(plist.starts_with("<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n<!DOCTYPE plist"));
        assert!(plist.contains("\t<key>CFBundlePackageType</key>\n\t<string>FMWK</string>\n"));
        assert!(plist.contains("\t<key>CFBundleExecutable</key>\n\t<string>${EXECUTABLE_NAME}</string>\n"));
        assert!(plist.contains("\t<key>CFBundleShortVersionString</key>\n\t<string>1.0.0</string>\n"));
        assert!(plist.contains("\t<key>CFBundleVersion</key>\n\t<string>${CURRENT_PROJECT_VERSION}</string>\n"));
        assert!(plist.ends_with("</dict>\n</plist>\n"));
    }

    #[test]
    fn test_bundle_plist_has_fixed_version_and_no_executable() {
        let plist = generate("2.3", BundlePackageType::Bundle, &BTreeMap::new());

        assert!(plist.contains("\t<key>CFBundleVersion</key>\n\t<string>1</string>\n"));
        assert!(!plist.contains("CFBundleExecutable"));
        assert!(plist.contains("\t<key>CFBundlePackageType</key>\n\t<string>BNDL</string>\n"));
    }

    #[test]
    fn test_additional_entries_render_nested_dicts() {
        let mut transport = BTreeMap::new();
        transport.insert(
            "NSAllowsArbitraryLoads".to_string(),
            PlistValue::Bool(true),
        );
        let mut additional = BTreeMap::new();
        additional.insert(
            "NSAppTransportSecurity".to_string(),
            PlistValue::Dict(transport),
        );
        additional.insert(
            "UILaunchStoryboardName".to_string(),
            "LaunchScreen".into(),
        );

        let plist = generate("1.0.0", BundlePackageType::Application, &additional);

        assert!(plist.contains(
            "\t<key>NSAppTransportSecurity</key>\n\t<dict>\n\t\t<key>NSAllowsArbitraryLoads</key>\n\t\t<true/>\n\t</dict>\n"
        ));
        assert!(plist.contains("\t<key>UILaunchStoryboardName</key>\n\t<string>LaunchScreen</string>\n"));
    }

    #[test]
    fn test_escapes_xml_entities() {
        let mut additional = BTreeMap::new();
        additional.insert("Note".to_string(), "a < b & c".into());

        let plist = generate("1.0", BundlePackageType::Framework, &additional);
        assert!(plist.contains("<string>a &lt; b &amp; c</string>"));
    }

    #[test]
    fn test_keys_are_sorted() {
        let plist = generate("1.0", BundlePackageType::Framework, &BTreeMap::new());
        let region = plist.find("CFBundleDevelopmentRegion").unwrap();
        let name = plist.find("CFBundleName").unwrap();
        let principal = plist.find("NSPrincipalClass").unwrap();
        assert!(region < name && name < principal);
    }
}
