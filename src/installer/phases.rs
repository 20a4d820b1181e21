//! Distributing a pod's files into the build phases of its units
//!
//! This module handles:
//! - Compile buckets split by memory management mode and language
//! - Header placement with visibility tags for framework products
//! - Resource routing, compiled resource documents included
//! - The no-sources validation run after assignment

use std::collections::BTreeSet;
use std::path::{Path, PathBuf};

use crate::error::{PodgenError, Result};
use crate::path_utils::{relative_path_from, to_forward_slashes};
use crate::pod::{FileAccessor, PodTarget, Specification};
use crate::project::{BuildFileSettings, FileRefId, Project, TargetId};

use super::result::TargetInstallationResult;

/// Visibility tag a header carries inside a framework product
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HeaderVisibility {
    Public,
    Private,
    Project,
}

impl HeaderVisibility {
    pub fn acl(self) -> &'static str {
        match self {
            HeaderVisibility::Public => "Public",
            HeaderVisibility::Private => "Private",
            HeaderVisibility::Project => "Project",
        }
    }
}

/// Where one header lands: inline in the headers phase with a visibility
/// attribute, or a dedicated copy-files phase preserving its sub-path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HeaderPlacement {
    HeadersPhase(HeaderVisibility),
    CopyPhase { name: String, dst_path: String },
}

fn canonical(path: &Path) -> PathBuf {
    dunce::canonicalize(path).unwrap_or_else(|_| path.to_path_buf())
}

/// Visibility of `header` given the declared visibility sets. Membership is
/// decided on canonicalized paths so symlinked trees still match. Products
/// other than frameworks tag every header `Project`; consumers import them
/// out of the sandbox header trees instead.
pub fn header_visibility(
    builds_framework: bool,
    header: &Path,
    public_headers: &[PathBuf],
    private_headers: &[PathBuf],
) -> HeaderVisibility {
    if !builds_framework {
        return HeaderVisibility::Project;
    }
    let real = canonical(header);
    if public_headers.iter().any(|path| canonical(path) == real) {
        HeaderVisibility::Public
    } else if private_headers.iter().any(|path| canonical(path) == real) {
        HeaderVisibility::Private
    } else {
        HeaderVisibility::Project
    }
}

/// Placement for `header`. Frameworks preserving a header mapping root copy
/// public and private headers through a phase named after their sub-path, so
/// the built product mirrors the source layout. Everything else stays in the
/// headers phase tagged with its visibility.
pub fn header_placement(
    builds_framework: bool,
    header_mappings_dir: Option<&Path>,
    header: &Path,
    public_headers: &[PathBuf],
    private_headers: &[PathBuf],
) -> HeaderPlacement {
    let visibility = header_visibility(builds_framework, header, public_headers, private_headers);
    let Some(mappings_dir) = header_mappings_dir else {
        return HeaderPlacement::HeadersPhase(visibility);
    };
    if !builds_framework || visibility == HeaderVisibility::Project {
        return HeaderPlacement::HeadersPhase(visibility);
    }
    let relative = relative_path_from(&canonical(header), &canonical(mappings_dir));
    let sub_dir = match relative.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => to_forward_slashes(parent),
        _ => ".".to_string(),
    };
    HeaderPlacement::CopyPhase {
        name: format!("Copy {} {} Headers", sub_dir, visibility.acl()),
        dst_path: format!(
            "$({}_HEADERS_FOLDER_PATH)/{}",
            visibility.acl().to_uppercase(),
            sub_dir
        ),
    }
}

/// Compiler flags for one bucket of an accessor's sources
pub fn compiler_flags_for_consumer(
    pod: &PodTarget,
    spec: &Specification,
    arc: bool,
    language_is_swift: bool,
) -> String {
    let mut flags = spec.compiler_flags.clone();
    if !arc && !language_is_swift {
        flags.push("-fno-objc-arc".to_string());
    } else if !pod.platform.supports_objc_dispatch_objects() {
        flags.push("-DOS_OBJECT_USE_OBJC=0".to_string());
    }
    if pod.inhibit_warnings && !language_is_swift {
        flags.push("-w -Xanalyzer -analyzer-disable-all-checks".to_string());
    }
    flags.join(" ")
}

/// Distribute every accessor's files into the phases of its unit
pub fn add_files_to_build_phases(
    project: &mut Project,
    pod: &PodTarget,
    result: &TargetInstallationResult,
) -> Result<()> {
    for accessor in &pod.file_accessors {
        let Some(unit_id) = result.native_target_for_spec(pod, &accessor.spec) else {
            continue;
        };
        add_compile_sources(project, pod, accessor, unit_id)?;
        add_headers(project, pod, accessor, unit_id)?;
        add_other_sources(project, pod, accessor, unit_id)?;
        if pod.builds_framework() {
            add_resources(project, accessor, unit_id);
        }
    }
    Ok(())
}

/// Every compiling unit must have ended up with at least one source file
pub fn validate_targets_contain_sources(
    project: &Project,
    pod: &PodTarget,
    unit_ids: &[TargetId],
) -> Result<()> {
    for unit_id in unit_ids {
        let unit = project.target(*unit_id);
        if unit.source_build_phase.is_empty() {
            return Err(PodgenError::NoSourcesToCompile {
                pod: pod.name.clone(),
                unit: unit.name.clone(),
            });
        }
    }
    Ok(())
}

/// Project references for declared resources. Files nested inside composite
/// documents have no reference of their own and are skipped, members of a
/// localized variant group resolve to the group itself, and duplicate
/// references keep their first occurrence.
pub fn filter_resource_file_references(project: &Project, resources: &[PathBuf]) -> Vec<FileRefId> {
    let mut refs = Vec::new();
    for resource in resources {
        let Some(file_ref) = project.reference_for_path(resource) else {
            continue;
        };
        if !refs.contains(&file_ref) {
            refs.push(file_ref);
        }
    }
    refs
}

/// Resource documents the build compiles rather than copies
pub fn is_compile_phase_resource(path: &Path) -> bool {
    path.extension().and_then(|ext| ext.to_str()).is_some_and(|ext| {
        ext.eq_ignore_ascii_case("xcdatamodeld") || ext.eq_ignore_ascii_case("xcdatamodel")
    })
}

fn add_compile_sources(
    project: &mut Project,
    pod: &PodTarget,
    accessor: &FileAccessor,
    unit_id: TargetId,
) -> Result<()> {
    let excluded: BTreeSet<&Path> = accessor
        .headers
        .iter()
        .chain(&accessor.other_source_files)
        .map(PathBuf::as_path)
        .collect();
    let non_arc = accessor.non_arc_source_files();
    let buckets: [(bool, Vec<&Path>); 2] = [
        (true, compile_bucket(&accessor.arc_source_files, &excluded)),
        (false, compile_bucket(&non_arc, &excluded)),
    ];

    for (arc, sources) in buckets {
        if sources.is_empty() {
            continue;
        }
        let (swift, objc): (Vec<&Path>, Vec<&Path>) = sources
            .into_iter()
            .partition(|path| path.extension().is_some_and(|ext| ext == "swift"));
        for (language_is_swift, files) in [(false, objc), (true, swift)] {
            if files.is_empty() {
                continue;
            }
            let flags = compiler_flags_for_consumer(pod, &accessor.spec, arc, language_is_swift);
            let settings = if flags.is_empty() {
                None
            } else {
                Some(BuildFileSettings::compiler_flags(flags))
            };
            let refs = resolve_references(project, pod, &files, "source")?;
            let unit = project.target_mut(unit_id);
            for file_ref in refs {
                unit.source_build_phase.add_file_reference(file_ref, settings.clone());
            }
        }
    }
    Ok(())
}

fn compile_bucket<'a>(sources: &'a [PathBuf], excluded: &BTreeSet<&Path>) -> Vec<&'a Path> {
    sources
        .iter()
        .map(PathBuf::as_path)
        .filter(|path| !excluded.contains(path))
        .collect()
}

fn add_headers(
    project: &mut Project,
    pod: &PodTarget,
    accessor: &FileAccessor,
    unit_id: TargetId,
) -> Result<()> {
    let public_headers = accessor.effective_public_headers();
    let mut placements = Vec::with_capacity(accessor.headers.len());
    for header in &accessor.headers {
        let file_ref = project.reference_for_path(header).ok_or_else(|| {
            missing_reference("header", header, pod)
        })?;
        let placement = header_placement(
            pod.builds_framework(),
            pod.header_mappings_dir.as_deref(),
            header,
            &public_headers,
            &accessor.private_headers,
        );
        placements.push((file_ref, placement));
    }

    let unit = project.target_mut(unit_id);
    for (file_ref, placement) in placements {
        match placement {
            HeaderPlacement::HeadersPhase(visibility) => {
                let settings = BuildFileSettings::attributes(vec![visibility.acl().to_string()]);
                unit.headers_build_phase.add_file_reference(file_ref, Some(settings));
            }
            HeaderPlacement::CopyPhase { name, dst_path } => {
                let index = unit.copy_files_phase_index(&name, &dst_path);
                unit.copy_files_build_phases[index].add_file_reference(file_ref);
            }
        }
    }
    Ok(())
}

fn add_other_sources(
    project: &mut Project,
    pod: &PodTarget,
    accessor: &FileAccessor,
    unit_id: TargetId,
) -> Result<()> {
    let files: Vec<&Path> = accessor.other_source_files.iter().map(PathBuf::as_path).collect();
    let refs = resolve_references(project, pod, &files, "other source")?;
    let unit = project.target_mut(unit_id);
    for file_ref in refs {
        unit.source_build_phase.add_file_reference(file_ref, None);
    }
    Ok(())
}

fn add_resources(project: &mut Project, accessor: &FileAccessor, unit_id: TargetId) {
    let refs = filter_resource_file_references(project, &accessor.resources);
    let (compile, copy): (Vec<FileRefId>, Vec<FileRefId>) = refs
        .into_iter()
        .partition(|file_ref| is_compile_phase_resource(&project.file_reference(*file_ref).path));

    let unit = project.target_mut(unit_id);
    for file_ref in compile {
        if !unit.source_build_phase.contains(file_ref) {
            unit.source_build_phase.add_file_reference(file_ref, None);
        }
    }
    for file_ref in copy {
        if !unit.resources_build_phase.contains(file_ref) {
            unit.resources_build_phase.add_file_reference(file_ref, None);
        }
    }
}

fn resolve_references(
    project: &Project,
    pod: &PodTarget,
    files: &[&Path],
    kind: &str,
) -> Result<Vec<FileRefId>> {
    files
        .iter()
        .map(|path| {
            project
                .reference_for_path(path)
                .ok_or_else(|| missing_reference(kind, path, pod))
        })
        .collect()
}

fn missing_reference(kind: &str, path: &Path, pod: &PodTarget) -> PodgenError {
    PodgenError::MissingFileReference {
        kind: kind.to_string(),
        path: to_forward_slashes(path),
        target: pod.label().to_string(),
    }
}
