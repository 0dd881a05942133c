//! Read-only inventory of modules and their surface entries
//!
//! Reports, for every directory under the modules dir, which stacks it has
//! and whether each surface entry those stacks call for is present. Entries
//! that point at modules which no longer exist are listed as orphans.

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fs;
use std::path::Path;
use tracing::warn;

use crate::error::{WorkflowError, WorkflowResult};
use crate::layout::Workspace;
use crate::stack::{detect_stacks, StackSet};
use crate::surfaces::{ConfigSurfaces, SurfaceEntry};
use crate::util::to_posix_relative;

/// Presence of one expected surface entry
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EntryStatus {
    pub surface: String,
    pub entry: String,
    pub present: bool,
}

/// One module directory
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModuleStatus {
    pub name: String,
    pub path: String,
    pub stacks: StackSet,
    pub entries: Vec<EntryStatus>,
}

impl ModuleStatus {
    /// True when an entry the module's stacks require is missing
    #[must_use]
    pub fn has_drift(&self) -> bool {
        self.entries.iter().any(|e| !e.present)
    }
}

/// Inventory of the whole workspace
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModuleInventory {
    pub modules: Vec<ModuleStatus>,
    /// Package-list paths under the modules dir with no module behind them
    pub orphaned_packages: Vec<String>,
    /// Registry ids with no module directory
    pub orphaned_registry_ids: Vec<String>,
}

impl ModuleInventory {
    /// Scan the modules dir and the surfaces
    ///
    /// # Errors
    /// Returns an error if the modules dir exists but cannot be listed
    pub fn scan(workspace: &Workspace) -> WorkflowResult<Self> {
        let surfaces = ConfigSurfaces::new(workspace);
        let names = module_names(workspace)?;

        let modules = names
            .iter()
            .map(|name| module_status(workspace, &surfaces, name))
            .collect();

        let modules_prefix = format!("{}/", to_posix_relative(&workspace.layout().modules_dir));
        let orphaned_packages = listed_packages(&workspace.package_list_path())
            .into_iter()
            .filter(|path| {
                path.strip_prefix(&modules_prefix)
                    .and_then(|rest| rest.split('/').next())
                    .is_some_and(|name| !names.contains(name))
            })
            .collect();

        let orphaned_registry_ids = match surfaces.read_registry() {
            Ok(Some(doc)) => doc
                .get("modules")
                .and_then(|m| m.as_object())
                .map(|m| {
                    m.keys()
                        .filter(|id| !names.contains(id.as_str()))
                        .cloned()
                        .collect()
                })
                .unwrap_or_default(),
            Ok(None) => Vec::new(),
            Err(e) => {
                warn!(error = %e, "registry unreadable, skipping orphan check");
                Vec::new()
            }
        };

        Ok(Self {
            modules,
            orphaned_packages,
            orphaned_registry_ids,
        })
    }

    /// True when any module drifted or any orphan exists
    #[must_use]
    pub fn has_drift(&self) -> bool {
        self.modules.iter().any(ModuleStatus::has_drift)
            || !self.orphaned_packages.is_empty()
            || !self.orphaned_registry_ids.is_empty()
    }
}

fn module_names(workspace: &Workspace) -> WorkflowResult<BTreeSet<String>> {
    let dir = workspace.root().join(&workspace.layout().modules_dir);
    if !dir.exists() {
        return Ok(BTreeSet::new());
    }

    let entries = fs::read_dir(&dir).map_err(|e| WorkflowError::io(&dir, &e))?;
    Ok(entries
        .filter_map(Result::ok)
        .filter(|entry| entry.path().is_dir())
        .filter_map(|entry| entry.file_name().to_str().map(str::to_string))
        .filter(|name| !name.starts_with('.'))
        .collect())
}

fn module_status(workspace: &Workspace, surfaces: &ConfigSurfaces<'_>, name: &str) -> ModuleStatus {
    let stacks = detect_stacks(&workspace.module_dir(name), workspace.layout());
    let entries = stacks
        .iter()
        .flat_map(|stack| SurfaceEntry::for_stack(workspace, name, stack))
        .map(|entry| EntryStatus {
            surface: entry.surface().to_string(),
            present: surfaces.contains(&entry),
            entry: entry.to_string(),
        })
        .collect();

    ModuleStatus {
        name: name.to_string(),
        path: to_posix_relative(&workspace.module_rel(name)),
        stacks,
        entries,
    }
}

#[derive(Deserialize)]
struct PackageListDoc {
    #[serde(default)]
    packages: Vec<String>,
}

/// Paths in the package list, parsed as YAML; unreadable lists yield nothing
fn listed_packages(path: &Path) -> Vec<String> {
    let Ok(content) = fs::read_to_string(path) else {
        return Vec::new();
    };
    match serde_yaml::from_str::<PackageListDoc>(&content) {
        Ok(doc) => doc.packages,
        Err(e) => {
            warn!(path = %path.display(), error = %e, "package list is not valid YAML");
            Vec::new()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::layout::WorkspaceLayout;
    use tempfile::TempDir;

    #[test]
    fn test_scan_reports_drift_and_orphans() {
        let temp = TempDir::new().unwrap();
        let ws = Workspace::new(temp.path(), WorkspaceLayout::default());
        fs::create_dir_all(ws.module_dir("demo").join("ts")).unwrap();
        fs::create_dir_all(ws.module_dir("demo").join("go")).unwrap();
        fs::write(
            ws.package_list_path(),
            "packages:\n  - 'apps/*'\n  - 'modules/demo/ts'\n  - 'modules/gone/svelte'\n",
        )
        .unwrap();
        fs::write(ws.directive_path(), "go 1.22\n").unwrap();

        let inventory = ModuleInventory::scan(&ws).unwrap();
        assert_eq!(inventory.modules.len(), 1);

        let demo = &inventory.modules[0];
        assert_eq!(demo.path, "modules/demo");
        assert!(demo.stacks.service && demo.stacks.library);
        assert!(demo.has_drift());
        assert_eq!(
            demo.entries.iter().filter(|e| e.present).count(),
            1,
            "only the package path is registered"
        );
        assert_eq!(inventory.orphaned_packages, vec!["modules/gone/svelte".to_string()]);
        assert!(inventory.has_drift());
    }

    #[test]
    fn test_scan_empty_workspace() {
        let temp = TempDir::new().unwrap();
        let ws = Workspace::new(temp.path(), WorkspaceLayout::default());
        let inventory = ModuleInventory::scan(&ws).unwrap();
        assert!(inventory.modules.is_empty());
        assert!(!inventory.has_drift());
    }
}
