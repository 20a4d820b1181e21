//! Per-variant file lists of a resolved pod

use std::collections::BTreeMap;
use std::path::PathBuf;

use super::spec::Specification;

/// Resolved file lists for one specification variant.
///
/// Paths are absolute. `source_files` is the full list for the variant,
/// including headers and non-compiled sources; the phase assigner subtracts
/// those when building compile buckets, mirroring how the lists are declared.
#[derive(Debug, Clone)]
pub struct FileAccessor {
    pub spec: Specification,
    pub source_files: Vec<PathBuf>,
    pub arc_source_files: Vec<PathBuf>,
    pub headers: Vec<PathBuf>,
    /// Explicitly declared public headers; empty means every header is public
    pub public_headers: Vec<PathBuf>,
    pub private_headers: Vec<PathBuf>,
    pub other_source_files: Vec<PathBuf>,
    pub resources: Vec<PathBuf>,
    /// Bundle name to the files it packages
    pub resource_bundles: BTreeMap<String, Vec<PathBuf>>,
    /// Custom module map file, when the spec declares one
    pub module_map: Option<PathBuf>,
    /// Resolved prefix-header file, when the spec declares one
    pub prefix_header: Option<PathBuf>,
}

impl FileAccessor {
    pub fn new(spec: Specification) -> Self {
        FileAccessor {
            spec,
            source_files: Vec::new(),
            arc_source_files: Vec::new(),
            headers: Vec::new(),
            public_headers: Vec::new(),
            private_headers: Vec::new(),
            other_source_files: Vec::new(),
            resources: Vec::new(),
            resource_bundles: BTreeMap::new(),
            module_map: None,
            prefix_header: None,
        }
    }

    /// Sources not requiring ARC, in declaration order
    pub fn non_arc_source_files(&self) -> Vec<PathBuf> {
        self.source_files
            .iter()
            .filter(|path| !self.arc_source_files.contains(path))
            .cloned()
            .collect()
    }

    /// The headers consumers may import: the declared public set, or every
    /// header when none are declared, always minus the private set.
    pub fn effective_public_headers(&self) -> Vec<PathBuf> {
        let base = if self.public_headers.is_empty() {
            &self.headers
        } else {
            &self.public_headers
        };
        base.iter()
            .filter(|path| !self.private_headers.contains(path))
            .cloned()
            .collect()
    }

    pub fn uses_swift(&self) -> bool {
        self.source_files
            .iter()
            .any(|path| path.extension().is_some_and(|ext| ext == "swift"))
    }
}
