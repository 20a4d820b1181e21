//! The install manifest (podgen.yaml) and its resolution into pod targets
//!
//! This module handles:
//! - Parsing the YAML manifest listing the resolved pods to install
//! - Expanding declared file patterns against the pod directories
//! - Registering every resolved file with the project graph

use std::collections::{BTreeMap, BTreeSet};
use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use walkdir::WalkDir;
use wax::{CandidatePath, Glob, Pattern};

use crate::error::{PodgenError, Result};
use crate::pod::{
    FileAccessor, Linkage, Platform, PodTarget, PrefixHeaderFile, Specification, TestType,
};
use crate::project::{ConfigurationKind, Project};
use crate::sandbox::Sandbox;

/// Extensions of files the compiler consumes as headers
const HEADER_EXTENSIONS: &[&str] = &["h", "hh", "hpp", "ipp", "tpp", "hxx", "def", "inl", "inc"];

/// Extensions of files belonging in a compile phase, headers included
const SOURCE_EXTENSIONS: &[&str] = &[
    "m", "mm", "i", "c", "cc", "cxx", "cpp", "swift", "s", "S", "asm", "h", "hh", "hpp", "ipp",
    "tpp", "hxx", "def", "inl", "inc",
];

/// Directory extensions referenced as one opaque resource
const COMPOSITE_RESOURCE_EXTENSIONS: &[&str] = &["xcassets", "xcdatamodeld", "bundle", "framework"];

/// The install manifest: every pod the upstream resolution produced,
/// with its platform, linkage and per-variant file declarations.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InstallManifest {
    pub pods: Vec<PodManifest>,
}

/// One resolved pod in the manifest
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PodManifest {
    pub name: String,

    pub version: String,

    pub platform: Platform,

    /// How the pod links into consumers; static library when omitted
    #[serde(default)]
    pub linkage: Linkage,

    #[serde(default)]
    pub defines_module: bool,

    /// Explicit module name overriding the sanitized pod name
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub module_name: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub swift_version: Option<String>,

    /// Import prefix for non-framework headers
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub header_dir: Option<String>,

    /// Pod-root-relative directory header sub-paths are preserved under
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub header_mappings_dir: Option<String>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub archs: Vec<String>,

    #[serde(default)]
    pub inhibit_warnings: bool,

    /// Configuration name to kind; `Debug`/`Release` when omitted
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub build_configurations: BTreeMap<String, ConfigurationKind>,

    /// Names of other manifest pods this pod's units link against
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub dependencies: Vec<String>,

    pub specs: Vec<SpecManifest>,
}

/// Kind of a declared specification variant
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SpecManifestKind {
    #[default]
    Library,
    Test,
    App,
}

/// ARC declaration: the whole variant, nothing, or the matching subset
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RequiresArc {
    Whole(bool),
    Patterns(Vec<String>),
}

impl Default for RequiresArc {
    fn default() -> Self {
        RequiresArc::Whole(true)
    }
}

/// Prefix-header declaration: `false` disables generation for the variant
/// group, a path appends that file's contents to the generated header
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub enum PrefixHeaderDecl {
    Enabled(bool),
    Path(String),
}

/// One specification variant of a manifest pod. File lists are pod-root
/// relative and may use glob patterns.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SpecManifest {
    pub name: String,

    #[serde(default)]
    pub kind: SpecManifestKind,

    /// Test specs only; `unit` when omitted
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub test_type: Option<TestType>,

    #[serde(default)]
    pub requires_app_host: bool,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub source_files: Vec<String>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub public_header_files: Vec<String>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub private_header_files: Vec<String>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub resources: Vec<String>,

    /// Bundle name to the patterns it packages
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub resource_bundles: BTreeMap<String, Vec<String>>,

    #[serde(default)]
    pub requires_arc: RequiresArc,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub compiler_flags: Vec<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub prefix_header_contents: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub prefix_header_file: Option<PrefixHeaderDecl>,

    /// Pod-root-relative custom module map file
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub module_map: Option<String>,

    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub pod_target_xcconfig: BTreeMap<String, String>,

    /// Extra entries for generated Info.plist files
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub info_plist: BTreeMap<String, String>,
}

impl InstallManifest {
    /// Load and validate the manifest at `path`
    pub fn load(path: &Path) -> Result<Self> {
        if !path.is_file() {
            return Err(PodgenError::ManifestNotFound {
                path: path.display().to_string(),
            });
        }
        let contents = fs::read_to_string(path).map_err(|e| PodgenError::FileReadFailed {
            path: path.display().to_string(),
            reason: e.to_string(),
        })?;
        let manifest: Self =
            serde_yaml::from_str(&contents).map_err(|e| PodgenError::ManifestParseFailed {
                path: path.display().to_string(),
                reason: e.to_string(),
            })?;
        manifest.validate()?;
        Ok(manifest)
    }

    /// Parse a manifest from YAML without validating
    pub fn from_yaml(yaml: &str) -> Result<Self> {
        let manifest: Self = serde_yaml::from_str(yaml)?;
        Ok(manifest)
    }

    pub fn validate(&self) -> Result<()> {
        let mut seen = BTreeSet::new();
        for pod in &self.pods {
            if pod.name.is_empty() {
                return Err(PodgenError::ManifestInvalid {
                    message: "a pod entry is missing its name".to_string(),
                });
            }
            if !seen.insert(&pod.name) {
                return Err(PodgenError::ManifestInvalid {
                    message: format!("duplicate pod `{}`", pod.name),
                });
            }
            pod.validate()?;
        }
        Ok(())
    }

    /// Resolve every manifest pod against the sandbox, expanding file
    /// patterns into absolute paths.
    pub fn resolve(&self, sandbox: &Sandbox) -> Result<Vec<PodTarget>> {
        self.pods.iter().map(|pod| pod.resolve(sandbox)).collect()
    }
}

impl PodManifest {
    fn validate(&self) -> Result<()> {
        if self.version.is_empty() {
            return Err(PodgenError::ManifestInvalid {
                message: format!("pod `{}` is missing its version", self.name),
            });
        }
        if !self.specs.iter().any(|s| s.kind == SpecManifestKind::Library) {
            return Err(PodgenError::ManifestInvalid {
                message: format!("pod `{}` declares no library spec", self.name),
            });
        }
        let mut seen = BTreeSet::new();
        for spec in &self.specs {
            if !seen.insert((spec.kind, &spec.name)) {
                return Err(PodgenError::ManifestInvalid {
                    message: format!("pod `{}` declares spec `{}` twice", self.name, spec.name),
                });
            }
            if spec.kind != SpecManifestKind::Test && spec.test_type.is_some() {
                return Err(PodgenError::ManifestInvalid {
                    message: format!(
                        "spec `{}` of pod `{}` declares a test type but is not a test spec",
                        spec.name, self.name
                    ),
                });
            }
        }
        Ok(())
    }

    fn resolve(&self, sandbox: &Sandbox) -> Result<PodTarget> {
        let pod_root = sandbox.pod_dir(&self.name);
        let mut target = PodTarget::new(&self.name, &self.version, self.platform.clone());
        target.linkage = self.linkage;
        target.defines_module = self.defines_module;
        target.module_name = self.module_name.clone();
        target.swift_version = self.swift_version.clone();
        target.header_dir = self.header_dir.clone();
        target.header_mappings_dir = self
            .header_mappings_dir
            .as_ref()
            .map(|dir| canonical(&pod_root.join(dir)));
        target.archs = self.archs.clone();
        target.inhibit_warnings = self.inhibit_warnings;
        if !self.build_configurations.is_empty() {
            target.user_build_configurations = self.build_configurations.clone();
        }
        target.dependencies = self.dependencies.clone();
        target.file_accessors = self
            .specs
            .iter()
            .map(|spec| spec.resolve(&pod_root))
            .collect::<Result<_>>()?;
        Ok(target)
    }
}

impl SpecManifest {
    fn specification(&self) -> Specification {
        let mut spec = match self.kind {
            SpecManifestKind::Library => Specification::library(&self.name),
            SpecManifestKind::Test => {
                Specification::test(&self.name, self.test_type.unwrap_or(TestType::Unit))
            }
            SpecManifestKind::App => Specification::app(&self.name),
        };
        spec.requires_app_host = self.requires_app_host;
        spec.compiler_flags = self.compiler_flags.clone();
        spec.prefix_header_contents = self.prefix_header_contents.clone();
        spec.prefix_header_file = match &self.prefix_header_file {
            None | Some(PrefixHeaderDecl::Enabled(true)) => PrefixHeaderFile::Default,
            Some(PrefixHeaderDecl::Enabled(false)) => PrefixHeaderFile::Disabled,
            Some(PrefixHeaderDecl::Path(path)) => PrefixHeaderFile::Path(PathBuf::from(path)),
        };
        spec.pod_target_xcconfig = self.pod_target_xcconfig.clone();
        spec.info_plist_entries = self.info_plist.clone();
        spec
    }

    fn resolve(&self, pod_root: &Path) -> Result<FileAccessor> {
        let mut accessor = FileAccessor::new(self.specification());

        accessor.source_files = expand_patterns(pod_root, &self.source_files)?;
        accessor.headers = accessor
            .source_files
            .iter()
            .filter(|path| has_extension(path, HEADER_EXTENSIONS))
            .cloned()
            .collect();
        accessor.other_source_files = accessor
            .source_files
            .iter()
            .filter(|path| !has_extension(path, SOURCE_EXTENSIONS))
            .cloned()
            .collect();
        accessor.arc_source_files = match &self.requires_arc {
            RequiresArc::Whole(true) => accessor.source_files.clone(),
            RequiresArc::Whole(false) => Vec::new(),
            RequiresArc::Patterns(patterns) => expand_patterns(pod_root, patterns)?,
        };
        accessor.public_headers = expand_patterns(pod_root, &self.public_header_files)?;
        accessor.private_headers = expand_patterns(pod_root, &self.private_header_files)?;
        accessor.resources = collapse_composites(
            pod_root,
            expand_patterns(pod_root, &self.resources)?,
        );
        for (bundle, patterns) in &self.resource_bundles {
            accessor.resource_bundles.insert(
                bundle.clone(),
                collapse_composites(pod_root, expand_patterns(pod_root, patterns)?),
            );
        }
        accessor.module_map = self
            .module_map
            .as_ref()
            .map(|path| canonical(&pod_root.join(path)));
        if let Some(PrefixHeaderDecl::Path(path)) = &self.prefix_header_file {
            accessor.prefix_header = Some(canonical(&pod_root.join(path)));
        }
        Ok(accessor)
    }
}

/// Register every resolved file with the project graph, so unit creation
/// can look the references up. Localized resources register through one
/// variant group per file name, never individually.
pub fn register_file_references(project: &mut Project, pods: &[PodTarget]) {
    for pod in pods {
        for accessor in &pod.file_accessors {
            for path in accessor
                .source_files
                .iter()
                .chain(&accessor.public_headers)
                .chain(&accessor.private_headers)
            {
                project.add_file_reference(path.clone());
            }
            register_resources(project, &accessor.resources);
            for files in accessor.resource_bundles.values() {
                register_resources(project, files);
            }
        }
    }
}

fn register_resources(project: &mut Project, resources: &[PathBuf]) {
    let mut localized: BTreeMap<PathBuf, (String, Vec<PathBuf>)> = BTreeMap::new();
    for resource in resources {
        match variant_group_dir(resource) {
            Some((group_dir, name)) => {
                localized
                    .entry(group_dir)
                    .or_insert_with(|| (name, Vec::new()))
                    .1
                    .push(resource.clone());
            }
            None => {
                project.add_file_reference(resource.clone());
            }
        }
    }
    for (group_dir, (name, members)) in localized {
        project.add_variant_group(group_dir, name, &members);
    }
}

/// The variant-group key for a localized resource: the group's logical
/// path outside the `.lproj` directory and the shared file name.
fn variant_group_dir(path: &Path) -> Option<(PathBuf, String)> {
    let parent = path.parent()?;
    if parent.extension()? != "lproj" {
        return None;
    }
    let name = path.file_name()?.to_string_lossy().into_owned();
    Some((parent.parent()?.join(&name), name))
}

fn expand_patterns(pod_root: &Path, patterns: &[String]) -> Result<Vec<PathBuf>> {
    let mut files = Vec::new();
    for pattern in patterns {
        if is_glob(pattern) {
            files.extend(expand_glob(pod_root, pattern)?);
        } else {
            files.push(canonical(&pod_root.join(pattern)));
        }
    }
    Ok(dedupe(files))
}

fn is_glob(pattern: &str) -> bool {
    pattern.contains(['*', '?', '[', '{'])
}

fn expand_glob(pod_root: &Path, pattern: &str) -> Result<Vec<PathBuf>> {
    let glob = Glob::new(pattern).map_err(|e| PodgenError::InvalidGlobPattern {
        pattern: pattern.to_string(),
        reason: e.to_string(),
    })?;
    let mut matched = Vec::new();
    for entry in WalkDir::new(pod_root)
        .sort_by_file_name()
        .into_iter()
        .filter_map(std::result::Result::ok)
    {
        let Ok(relative) = entry.path().strip_prefix(pod_root) else {
            continue;
        };
        if relative.as_os_str().is_empty() {
            continue;
        }
        if glob.matched(&CandidatePath::from(relative)).is_some() {
            matched.push(canonical(entry.path()));
        }
    }
    Ok(matched)
}

/// Replace paths nested inside composite documents with the document's
/// top-level directory, keeping declaration order.
fn collapse_composites(pod_root: &Path, paths: Vec<PathBuf>) -> Vec<PathBuf> {
    let collapsed = paths
        .into_iter()
        .map(|path| composite_ancestor(pod_root, &path).unwrap_or(path));
    let mut seen = BTreeSet::new();
    collapsed
        .filter(|path| seen.insert(path.clone()))
        .collect()
}

fn composite_ancestor(pod_root: &Path, path: &Path) -> Option<PathBuf> {
    let mut outermost = None;
    let mut current = path.parent();
    while let Some(dir) = current {
        if dir == pod_root || dir.parent().is_none() {
            break;
        }
        if dir
            .extension()
            .is_some_and(|ext| COMPOSITE_RESOURCE_EXTENSIONS.iter().any(|c| ext == *c))
        {
            outermost = Some(dir.to_path_buf());
        }
        current = dir.parent();
    }
    outermost
}

fn has_extension(path: &Path, extensions: &[&str]) -> bool {
    path.extension()
        .is_some_and(|ext| extensions.iter().any(|e| ext == *e))
}

fn dedupe(paths: Vec<PathBuf>) -> Vec<PathBuf> {
    let mut seen = BTreeSet::new();
    paths
        .into_iter()
        .filter(|path| seen.insert(path.clone()))
        .collect()
}

/// Resolved form of a path, falling back to the joined form for files
/// that do not exist yet
fn canonical(path: &Path) -> PathBuf {
    dunce::canonicalize(path).unwrap_or_else(|_| path.to_path_buf())
}
