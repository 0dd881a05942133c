//! list-modules

use modflow_core::{ModuleInventory, Workspace};

pub fn execute(workspace: &Workspace, json: bool) -> anyhow::Result<()> {
    let inventory = ModuleInventory::scan(workspace)?;

    if json {
        println!("{}", serde_json::to_string_pretty(&inventory)?);
        return Ok(());
    }

    if inventory.modules.is_empty() {
        println!("No modules found.");
    } else {
        println!("Modules:");
        for module in &inventory.modules {
            let marker = if module.stacks.build_marker { " [moon]" } else { "" };
            println!("  {} ({}){marker}", module.name, module.stacks);
            for entry in &module.entries {
                let state = if entry.present { "ok" } else { "MISSING" };
                println!("    {state:<7} {}: {}", entry.surface, entry.entry);
            }
        }
    }

    for path in &inventory.orphaned_packages {
        println!("Orphaned package path: {path}");
    }
    for id in &inventory.orphaned_registry_ids {
        println!("Orphaned registry entry: {id}");
    }
    if inventory.has_drift() {
        println!("\nConfig surfaces are out of sync with the module set.");
    }

    Ok(())
}
