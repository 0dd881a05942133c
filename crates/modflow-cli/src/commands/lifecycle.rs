//! add-module / delete-module / rename-module

use modflow_core::{DeleteOutcome, GitCli, ModuleWorkflow, Workspace};

pub fn add(workspace: &Workspace, repo: &str, name: &str) -> anyhow::Result<()> {
    let git = GitCli::new(workspace);
    let workflow = ModuleWorkflow::new(workspace, &git);

    println!("Adding module '{name}' from {repo}...");
    let report = workflow.add_module(repo, name)?;

    println!("Detected stacks: {}", report.stacks);
    for entry in &report.entries {
        println!("  + {entry}");
    }
    println!("Module '{name}' added successfully!");
    Ok(())
}

pub fn delete(workspace: &Workspace, name: &str, force: bool) -> anyhow::Result<()> {
    let git = GitCli::new(workspace);
    let workflow = ModuleWorkflow::new(workspace, &git);

    println!("Deleting module '{name}'...");
    match workflow.delete_module(name, force)? {
        DeleteOutcome::NotConfirmed => {
            println!("Use --force to confirm deletion.");
        }
        DeleteOutcome::Deleted { removed } => {
            for entry in &removed {
                println!("  - {entry}");
            }
            println!("Module '{name}' deleted successfully.");
        }
    }
    Ok(())
}

pub fn rename(workspace: &Workspace, old: &str, new: &str) -> anyhow::Result<()> {
    let git = GitCli::new(workspace);
    let workflow = ModuleWorkflow::new(workspace, &git);

    println!("Renaming module '{old}' to '{new}'...");
    let report = workflow.rename_module(old, new)?;

    println!("Detected stacks: {}", report.stacks);
    println!(
        "Refactored {} of {} files.",
        report.refactor.files_rewritten, report.refactor.files_scanned
    );
    if !report.refactor.warnings.is_empty() {
        println!("Skipped {} files:", report.refactor.warnings.len());
        for warning in &report.refactor.warnings {
            println!("  {}: {}", warning.path.display(), warning.message);
        }
    }
    println!("Module renamed successfully from '{old}' to '{new}'.");
    Ok(())
}
