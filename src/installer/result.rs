//! Result of installing one pod target

use std::collections::BTreeMap;
use std::path::PathBuf;

use crate::pod::{PodTarget, SpecKind, Specification};
use crate::project::TargetId;

/// Handle to the unit standing for the pod itself
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InstalledUnit {
    /// A compiling library unit
    Native(TargetId),
    /// A placeholder aggregate for pods with nothing to build, by index into
    /// the project's aggregate units
    Placeholder(usize),
}

/// Everything one installation run produced: unit handles grouped by variant
/// kind and the support files written to disk this run.
#[derive(Debug)]
pub struct TargetInstallationResult {
    pub pod_label: String,
    pub native_target: InstalledUnit,
    /// Bundle units owned by the library specs
    pub resource_bundle_targets: Vec<TargetId>,
    /// One unit per test spec, in declaration order
    pub test_native_targets: Vec<TargetId>,
    /// Bundle units owned by test specs, keyed by spec name
    pub test_resource_bundle_targets: BTreeMap<String, Vec<TargetId>>,
    /// App host units backing the test specs that require one
    pub test_app_host_targets: Vec<TargetId>,
    /// One unit per app spec, in declaration order
    pub app_native_targets: Vec<TargetId>,
    /// Bundle units owned by app specs, keyed by spec name
    pub app_resource_bundle_targets: BTreeMap<String, Vec<TargetId>>,
    /// Support files whose contents changed and were rewritten
    pub written_files: Vec<PathBuf>,
    /// Support files left alone because their contents already matched
    pub unchanged_files: usize,
}

impl TargetInstallationResult {
    pub fn new(pod_label: impl Into<String>, native_target: InstalledUnit) -> Self {
        TargetInstallationResult {
            pod_label: pod_label.into(),
            native_target,
            resource_bundle_targets: Vec::new(),
            test_native_targets: Vec::new(),
            test_resource_bundle_targets: BTreeMap::new(),
            test_app_host_targets: Vec::new(),
            app_native_targets: Vec::new(),
            app_resource_bundle_targets: BTreeMap::new(),
            written_files: Vec::new(),
            unchanged_files: 0,
        }
    }

    /// The unit a spec's files compile into. Aligned positionally with the
    /// pod's spec declaration order; `None` for a placeholder pod.
    pub fn native_target_for_spec(
        &self,
        pod: &PodTarget,
        spec: &Specification,
    ) -> Option<TargetId> {
        match spec.kind {
            SpecKind::Library => match self.native_target {
                InstalledUnit::Native(id) => Some(id),
                InstalledUnit::Placeholder(_) => None,
            },
            SpecKind::Test(_) => self.position_of(pod.test_specs(), spec).and_then(|index| {
                self.test_native_targets.get(index).copied()
            }),
            SpecKind::App => self.position_of(pod.app_specs(), spec).and_then(|index| {
                self.app_native_targets.get(index).copied()
            }),
        }
    }

    fn position_of(&self, specs: Vec<&Specification>, spec: &Specification) -> Option<usize> {
        specs
            .iter()
            .position(|candidate| candidate.name == spec.name && candidate.kind == spec.kind)
    }
}
