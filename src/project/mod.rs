//! In-memory project object graph
//!
//! A minimal description of the generated project: build units with their
//! configurations and phases, the file references they point at, support-file
//! groups, and project-level unit attributes. The whole graph serializes to
//! YAML so installs can be inspected and asserted on.

pub mod configuration;
pub mod file_reference;
pub mod phase;
pub mod target;

pub use configuration::{BuildConfiguration, ConfigurationKind};
pub use file_reference::{FileRefId, FileReference};
pub use phase::{
    BuildFile, BuildFileSettings, CopyFilesBuildPhase, FilesBuildPhase, ShellScriptBuildPhase,
};
pub use target::{AggregateTarget, NativeTarget, ProductType, TargetId};

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use serde::Serialize;

use crate::pod::platform::PlatformName;
use crate::pod::version::Version;

/// The generated project
#[derive(Debug, Default, Serialize)]
pub struct Project {
    pub targets: Vec<NativeTarget>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub aggregate_targets: Vec<AggregateTarget>,
    pub file_references: Vec<FileReference>,
    /// Group path (e.g. `Pods/BananaLib/Support Files`) to member references
    pub groups: BTreeMap<String, Vec<FileRefId>>,
    /// Per-unit attributes recorded at the project level, keyed by unit name
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub target_attributes: BTreeMap<String, BTreeMap<String, String>>,
    #[serde(skip)]
    fragment_entries: BTreeMap<FileRefId, BTreeMap<String, String>>,
    #[serde(skip)]
    path_index: BTreeMap<PathBuf, FileRefId>,
}

impl Project {
    pub fn new() -> Self {
        Project::default()
    }

    pub fn new_target(
        &mut self,
        name: impl Into<String>,
        product_type: ProductType,
        platform: PlatformName,
        deployment_target: Option<Version>,
        product_reference_path: impl Into<String>,
    ) -> TargetId {
        let id = TargetId(self.targets.len());
        self.targets.push(NativeTarget::new(
            id,
            name,
            product_type,
            platform,
            deployment_target,
            product_reference_path,
        ));
        id
    }

    /// Index of the new aggregate unit in `aggregate_targets`
    pub fn new_aggregate_target(
        &mut self,
        name: impl Into<String>,
        platform: PlatformName,
        deployment_target: Option<Version>,
    ) -> usize {
        let id = TargetId(usize::MAX - self.aggregate_targets.len());
        self.aggregate_targets
            .push(AggregateTarget::new(id, name, platform, deployment_target));
        self.aggregate_targets.len() - 1
    }

    pub fn target(&self, id: TargetId) -> &NativeTarget {
        &self.targets[id.0]
    }

    pub fn target_mut(&mut self, id: TargetId) -> &mut NativeTarget {
        &mut self.targets[id.0]
    }

    pub fn target_named(&self, name: &str) -> Option<&NativeTarget> {
        self.targets.iter().find(|t| t.name == name)
    }

    /// Registers a plain file, returning the existing reference when the path
    /// is already known.
    pub fn add_file_reference(&mut self, path: impl Into<PathBuf>) -> FileRefId {
        let path = path.into();
        if let Some(id) = self.path_index.get(&path) {
            return *id;
        }
        let id = FileRefId(self.file_references.len());
        self.file_references.push(FileReference::file(path.clone()));
        self.path_index.insert(path, id);
        id
    }

    /// Registers a localization variant group. Lookups for any member resolve
    /// to the group reference.
    pub fn add_variant_group(
        &mut self,
        group_dir: impl Into<PathBuf>,
        name: impl Into<String>,
        members: &[PathBuf],
    ) -> FileRefId {
        let group_id = FileRefId(self.file_references.len());
        self.file_references.push(FileReference {
            path: group_dir.into(),
            name: Some(name.into()),
            is_variant_group: true,
            parent: None,
        });
        for member in members {
            if self.path_index.contains_key(member) {
                continue;
            }
            let member_id = FileRefId(self.file_references.len());
            self.file_references.push(FileReference {
                path: member.clone(),
                name: None,
                is_variant_group: false,
                parent: Some(group_id),
            });
            self.path_index.insert(member.clone(), member_id);
        }
        group_id
    }

    /// Resolves a path to the reference build phases should use: the variant
    /// group for localized members, the reference itself otherwise.
    pub fn reference_for_path(&self, path: &Path) -> Option<FileRefId> {
        let id = *self.path_index.get(path)?;
        match self.file_references[id.0].parent {
            Some(parent) => Some(parent),
            None => Some(id),
        }
    }

    pub fn file_reference(&self, id: FileRefId) -> &FileReference {
        &self.file_references[id.0]
    }

    pub fn add_file_to_group(&mut self, file_ref: FileRefId, group: &str) {
        let members = self.groups.entry(group.to_string()).or_default();
        if !members.contains(&file_ref) {
            members.push(file_ref);
        }
    }

    /// Sorted display names of a group's members, empty when the group does
    /// not exist.
    pub fn group_display_names(&self, group: &str) -> Vec<String> {
        let mut names: Vec<String> = self
            .groups
            .get(group)
            .map(|members| {
                members
                    .iter()
                    .map(|id| self.file_references[id.0].display_name())
                    .collect()
            })
            .unwrap_or_default();
        names.sort();
        names
    }

    pub fn set_target_attribute(
        &mut self,
        target_name: &str,
        key: impl Into<String>,
        value: impl Into<String>,
    ) {
        self.target_attributes
            .entry(target_name.to_string())
            .or_default()
            .insert(key.into(), value.into());
    }

    /// Records a written fragment's entries so settings can be resolved
    /// through base configurations.
    pub fn record_fragment_entries(
        &mut self,
        file_ref: FileRefId,
        entries: BTreeMap<String, String>,
    ) {
        self.fragment_entries.insert(file_ref, entries);
    }

    /// Per-configuration value of a setting, looking through the base
    /// configuration fragment when no inline value is present.
    pub fn resolved_build_setting(
        &self,
        target: &NativeTarget,
        key: &str,
    ) -> BTreeMap<String, Option<String>> {
        target
            .build_configurations
            .iter()
            .map(|configuration| {
                let resolved = configuration
                    .build_settings
                    .get(key)
                    .cloned()
                    .or_else(|| {
                        configuration
                            .base_configuration
                            .and_then(|file_ref| self.fragment_entries.get(&file_ref))
                            .and_then(|entries| entries.get(key).cloned())
                    });
                (configuration.name.clone(), resolved)
            })
            .collect()
    }
}
