//! Domain model for resolved pods
//!
//! Inputs to installation: the pod target with its platform, linkage and
//! specification variants, plus the file accessor listing each variant's
//! resolved files. Everything here is read-only during installation.

pub mod accessor;
pub mod build_type;
pub mod platform;
pub mod spec;
pub mod target;
pub mod version;

pub use accessor::FileAccessor;
pub use build_type::Linkage;
pub use platform::{Platform, PlatformName};
pub use spec::{PrefixHeaderFile, SpecKind, Specification, TestType};
pub use target::PodTarget;
pub use version::Version;
