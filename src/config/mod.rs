//! Install manifest handling
//!
//! The manifest stands in for the upstream resolution stage: it lists every
//! pod to install with its platform, linkage, variants and file patterns.

pub mod manifest;

pub use manifest::{register_file_references, InstallManifest, PodManifest, SpecManifest};
