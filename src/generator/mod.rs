//! Support file generation
//!
//! This module renders the text of every generated artifact:
//! - Configuration fragments (xcconfig)
//! - Prefix and umbrella headers, module maps, dummy sources
//! - Info.plist property lists
//! - Copy-resources and embed-frameworks shell scripts
//!
//! Writing goes through [`update_changed_file`] so unchanged files keep
//! their timestamps and downstream builds stay warm.

pub mod dummy_source;
pub mod info_plist;
pub mod module_map;
pub mod prefix_header;
pub mod scripts;
pub mod umbrella_header;
pub mod xcconfig;

use std::path::Path;

use crate::error::{PodgenError, Result};
use crate::hash;
use crate::pod::PlatformName;

fn file_write_error(path: &Path, e: std::io::Error) -> PodgenError {
    PodgenError::FileWriteFailed {
        path: path.display().to_string(),
        reason: e.to_string(),
    }
}

fn symlink_error(path: &Path, e: std::io::Error) -> PodgenError {
    PodgenError::SymlinkFailed {
        path: path.display().to_string(),
        reason: e.to_string(),
    }
}

/// Ensure parent directory exists for a path
pub fn ensure_parent_dir(path: &Path) -> Result<()> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).map_err(|e| file_write_error(parent, e))?;
    }
    Ok(())
}

/// Write `contents` to `path` unless the file already holds exactly that
/// content. Returns whether a write happened.
pub fn update_changed_file(path: &Path, contents: &str) -> Result<bool> {
    if hash::file_matches_contents(path, contents.as_bytes())? {
        return Ok(false);
    }
    ensure_parent_dir(path)?;
    std::fs::write(path, contents).map_err(|e| file_write_error(path, e))?;
    Ok(true)
}

/// Replace `link` with a symbolic link pointing at `target`.
///
/// `target` is taken verbatim, so callers pass a path already made relative
/// to the link's directory.
pub fn replace_symlink(link: &Path, target: &Path) -> Result<()> {
    ensure_parent_dir(link)?;
    match std::fs::remove_file(link) {
        Ok(()) => {}
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
        Err(e) => return Err(symlink_error(link, e)),
    }
    #[cfg(unix)]
    std::os::unix::fs::symlink(target, link).map_err(|e| symlink_error(link, e))?;
    #[cfg(windows)]
    std::os::windows::fs::symlink_file(target, link).map_err(|e| symlink_error(link, e))?;
    Ok(())
}

/// Preamble shared by prefix and umbrella headers: the platform root import
/// for Objective-C consumers, a `FOUNDATION_EXPORT` fallback for everyone
/// else.
pub(crate) fn objc_preamble(platform: PlatformName) -> String {
    let mut out = String::new();
    out.push_str("#ifdef __OBJC__\n");
    out.push_str(platform.root_header_import());
    out.push('\n');
    out.push_str("#else\n");
    out.push_str("#ifndef FOUNDATION_EXPORT\n");
    out.push_str("#if defined(__cplusplus)\n");
    out.push_str("#define FOUNDATION_EXPORT extern \"C\"\n");
    out.push_str("#else\n");
    out.push_str("#define FOUNDATION_EXPORT extern\n");
    out.push_str("#endif\n");
    out.push_str("#endif\n");
    out.push_str("#endif\n");
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_update_changed_file_writes_new_file() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("Support/Pod.xcconfig");

        let written = update_changed_file(&path, "PODS_ROOT = ${SRCROOT}\n").unwrap();
        assert!(written);
        assert_eq!(
            std::fs::read_to_string(&path).unwrap(),
            "PODS_ROOT = ${SRCROOT}\n"
        );
    }

    #[test]
    fn test_update_changed_file_skips_identical_content() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("Pod-dummy.m");
        std::fs::write(&path, "@interface X\n@end\n").unwrap();

        let written = update_changed_file(&path, "@interface X\n@end\n").unwrap();
        assert!(!written);
    }

    #[test]
    fn test_update_changed_file_rewrites_on_change() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("Pod.xcconfig");
        std::fs::write(&path, "OLD = 1\n").unwrap();

        let written = update_changed_file(&path, "NEW = 2\n").unwrap();
        assert!(written);
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "NEW = 2\n");
    }

    #[cfg(unix)]
    #[test]
    fn test_replace_symlink_overwrites_existing_link() {
        let temp = TempDir::new().unwrap();
        let link = temp.path().join("Headers/Public/Pod/Pod.modulemap");
        std::fs::create_dir_all(link.parent().unwrap()).unwrap();

        replace_symlink(&link, Path::new("../../old")).unwrap();
        replace_symlink(&link, Path::new("../../new")).unwrap();

        assert_eq!(
            std::fs::read_link(&link).unwrap(),
            Path::new("../../new")
        );
    }

    #[test]
    fn test_objc_preamble_platform_imports() {
        assert!(objc_preamble(PlatformName::Ios).contains("#import <UIKit/UIKit.h>"));
        assert!(objc_preamble(PlatformName::Osx).contains("#import <Cocoa/Cocoa.h>"));
        assert!(objc_preamble(PlatformName::Ios).contains("#define FOUNDATION_EXPORT extern \"C\""));
    }
}
