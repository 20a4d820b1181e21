//! Umbrella header generation
//!
//! The umbrella header imports every effective public header of the
//! library variants. Test and app headers never contribute.

use crate::path_utils::{relative_path_from, to_forward_slashes};
use crate::pod::PodTarget;

use super::objc_preamble;

/// Render the umbrella header: the platform preamble, one import per public
/// header, and the module version symbols.
pub fn generate(target: &PodTarget) -> String {
    let mut out = objc_preamble(target.platform.name);
    out.push('\n');
    for import in umbrella_imports(target) {
        out.push_str(&format!("#import \"{import}\"\n"));
    }
    out.push('\n');
    let module = target.product_module_name();
    out.push_str(&format!("FOUNDATION_EXPORT double {module}VersionNumber;\n"));
    out.push_str(&format!(
        "FOUNDATION_EXPORT const unsigned char {module}VersionString[];\n"
    ));
    out
}

/// Import path for each effective public header of the library variants.
///
/// Paths keep their sub-directory relative to the header-mapping root when
/// one is declared and fall back to the base name otherwise. Non-framework
/// builds consume headers through the header-dir prefix when the pod
/// declares one.
pub fn umbrella_imports(target: &PodTarget) -> Vec<String> {
    let mut imports = Vec::new();
    for accessor in target.library_file_accessors() {
        for header in accessor.effective_public_headers() {
            let mut import = match &target.header_mappings_dir {
                Some(root) => to_forward_slashes(&relative_path_from(&header, root)),
                None => header
                    .file_name()
                    .map(|name| name.to_string_lossy().into_owned())
                    .unwrap_or_default(),
            };
            if !target.builds_framework() {
                if let Some(dir) = &target.header_dir {
                    import = format!("{dir}/{import}");
                }
            }
            imports.push(import);
        }
    }
    imports
}
