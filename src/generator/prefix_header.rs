//! Prefix header generation
//!
//! One prefix header per specification variant group, accumulating each
//! accessor's declared contents and referenced prefix file.

use std::path::Path;

use crate::error::{PodgenError, Result};
use crate::pod::{FileAccessor, PlatformName};

use super::objc_preamble;

fn file_read_error(path: &Path, e: std::io::Error) -> PodgenError {
    PodgenError::FileReadFailed {
        path: path.display().to_string(),
        reason: e.to_string(),
    }
}

/// Render the prefix header for a variant group: the platform preamble,
/// then per accessor the declared inline contents and the contents of any
/// referenced prefix file, in declaration order.
pub fn generate(platform: PlatformName, accessors: &[&FileAccessor]) -> Result<String> {
    let mut out = objc_preamble(platform);
    out.push('\n');
    for accessor in accessors {
        if let Some(contents) = &accessor.spec.prefix_header_contents {
            out.push_str(contents);
            out.push('\n');
        }
        if let Some(path) = &accessor.prefix_header {
            let contents =
                std::fs::read_to_string(path).map_err(|e| file_read_error(path, e))?;
            out.push_str(&contents);
        }
    }
    Ok(out)
}
