//! Install command implementation
//!
//! This command drives a full generation pass:
//! 1. Load and validate the install manifest
//! 2. Resolve each pod's file patterns against the sandbox
//! 3. Register source, header, and resource file references
//! 4. Install every pod target into the project graph
//! 5. Dump the produced project description into the sandbox

use std::collections::BTreeMap;
use std::path::PathBuf;

use console::Style;

use crate::cli::InstallArgs;
use crate::config::{InstallManifest, register_file_references};
use crate::error::{PodgenError, Result};
use crate::generator;
use crate::installer::{PodTargetInstaller, TargetInstallationResult};
use crate::pod::PodTarget;
use crate::progress::ProgressDisplay;
use crate::project::Project;
use crate::sandbox::Sandbox;

/// Run the install command
pub fn run(sandbox: Option<PathBuf>, args: InstallArgs) -> Result<()> {
    let sandbox = Sandbox::new(get_sandbox_path(sandbox)?);
    let manifest_path = args
        .manifest
        .unwrap_or_else(|| sandbox.root().join("podgen.yaml"));

    println!("Podgen: Installing pods from {}", manifest_path.display());

    let manifest = InstallManifest::load(&manifest_path)?;
    let pods = manifest.resolve(&sandbox)?;

    if pods.is_empty() {
        println!("Nothing to install.");
        return Ok(());
    }

    install_pods(&sandbox, &pods)
}

/// Get sandbox path from CLI argument or current directory
fn get_sandbox_path(sandbox: Option<PathBuf>) -> Result<PathBuf> {
    match sandbox {
        Some(path) => Ok(path),
        None => std::env::current_dir().map_err(|e| PodgenError::IoError {
            message: format!("Failed to get current directory: {}", e),
        }),
    }
}

/// Install every pod target into one shared project graph
fn install_pods(sandbox: &Sandbox, pods: &[PodTarget]) -> Result<()> {
    let mut project = Project::new();
    register_file_references(&mut project, pods);

    let by_name: BTreeMap<&str, &PodTarget> =
        pods.iter().map(|pod| (pod.name.as_str(), pod)).collect();

    let progress = ProgressDisplay::new(pods.len() as u64);
    let mut results: Vec<TargetInstallationResult> = Vec::new();

    for (index, pod) in pods.iter().enumerate() {
        progress.update_pod(pod.label(), index + 1, pods.len());

        let dependent_targets: Vec<&PodTarget> = pod
            .dependencies
            .iter()
            .filter_map(|name| by_name.get(name.as_str()).copied())
            .collect();
        let foreign_umbrella_headers: Vec<String> = pods
            .iter()
            .filter(|other| other.name != pod.name)
            .map(|other| format!("{}-umbrella.h", other.label()))
            .collect();

        let outcome = PodTargetInstaller::new(sandbox, pod)
            .with_dependent_targets(dependent_targets)
            .with_foreign_umbrella_headers(foreign_umbrella_headers)
            .install(&mut project);

        match outcome {
            Ok(result) => results.push(result),
            Err(e) => {
                progress.abandon();
                return Err(e);
            }
        }
        progress.inc_pod();
    }
    progress.finish();

    let project_written = dump_project(sandbox, &project)?;
    print_summary(sandbox, &results, project_written);

    Ok(())
}

/// Write the project description next to the generated files
fn dump_project(sandbox: &Sandbox, project: &Project) -> Result<bool> {
    let yaml = serde_yaml::to_string(project).map_err(|e| PodgenError::IoError {
        message: format!("Failed to serialize project description: {}", e),
    })?;
    generator::update_changed_file(&sandbox.project_path(), &yaml)
}

/// Print final installation summary
fn print_summary(sandbox: &Sandbox, results: &[TargetInstallationResult], project_written: bool) {
    let written: usize = results.iter().map(|r| r.written_files.len()).sum::<usize>()
        + usize::from(project_written);
    let unchanged: usize = results.iter().map(|r| r.unchanged_files).sum::<usize>()
        + usize::from(!project_written);

    println!(
        "Installed {} pod(s), {} file(s) written, {} unchanged",
        results.len(),
        written,
        unchanged
    );

    for result in results {
        println!(
            "  - {}",
            Style::new().bold().yellow().apply_to(&result.pod_label)
        );
        for file in &result.written_files {
            println!("    {}", sandbox.relative_path(file).display());
        }
    }
}
