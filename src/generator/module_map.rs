//! Module map generation
//!
//! Generated maps declare the umbrella header and re-export everything.
//! Custom maps are copied through as-is, except that non-framework builds
//! strip the `framework` keyword so the map stays valid for library
//! consumption.

use crate::pod::PodTarget;

/// Render the standard module map: a `module` (or `framework module`) block
/// declaring the umbrella header, any excluded foreign umbrella headers, and
/// wildcard exports.
pub fn generate(target: &PodTarget, excluded_umbrella_headers: &[String]) -> String {
    let mut out = String::new();
    if target.builds_framework() {
        out.push_str("framework ");
    }
    out.push_str(&format!("module {} {{\n", target.product_module_name()));
    out.push_str(&format!(
        "  umbrella header \"{}-umbrella.h\"\n",
        target.label()
    ));
    for header in excluded_umbrella_headers {
        out.push_str(&format!("  exclude header \"{header}\"\n"));
    }
    out.push('\n');
    out.push_str("  export *\n");
    out.push_str("  module * { export * }\n");
    out.push_str("}\n");
    out
}

/// Rewrite `framework module` declarations to plain `module` declarations,
/// keeping indentation and anything after the opening brace.
pub fn deframeworked(contents: &str) -> String {
    let mut lines: Vec<String> = contents.lines().map(strip_framework_keyword).collect();
    if contents.ends_with('\n') {
        lines.push(String::new());
    }
    lines.join("\n")
}

fn strip_framework_keyword(line: &str) -> String {
    let indent_len = line.len() - line.trim_start().len();
    let (indent, rest) = line.split_at(indent_len);
    if let Some(after) = rest.strip_prefix("framework") {
        let declaration = after.trim_start();
        let consumed_whitespace = declaration.len() < after.len();
        if consumed_whitespace && declaration.starts_with("module") {
            if let Some(brace) = declaration.find('{') {
                if !declaration[..brace].contains('}') {
                    return format!("{indent}{}{{{}", &declaration[..brace], &declaration[brace + 1..]);
                }
            }
        }
    }
    line.to_string()
}
