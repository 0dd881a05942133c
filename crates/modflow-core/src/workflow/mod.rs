//! Module lifecycle workflows
//!
//! Every command follows the same shape:
//! 1. validate preconditions without touching anything
//! 2. run the ordered steps, pushing one compensating action per mutation
//! 3. on the first failing step, unwind the [`RollbackStack`] and return the
//!    original error
//! 4. on success, discard the stack
//!
//! The workspace is assumed to be used by one invocation at a time; nothing
//! here takes a lock.

mod add;
mod delete;
mod rename;

pub use add::AddReport;
pub use delete::DeleteOutcome;
pub use rename::RenameReport;

use tracing::{error, warn};

use crate::error::{WorkflowError, WorkflowResult};
use crate::layout::Workspace;
use crate::rollback::RollbackStack;
use crate::surfaces::{ConfigSurfaces, SurfaceEntry};
use crate::vcs::VersionControl;

/// Runs add/delete/rename against one workspace
pub struct ModuleWorkflow<'a> {
    workspace: &'a Workspace,
    vcs: &'a dyn VersionControl,
    surfaces: ConfigSurfaces<'a>,
}

impl<'a> ModuleWorkflow<'a> {
    #[must_use]
    pub fn new(workspace: &'a Workspace, vcs: &'a dyn VersionControl) -> Self {
        Self {
            workspace,
            vcs,
            surfaces: ConfigSurfaces::new(workspace),
        }
    }

    #[must_use]
    pub fn workspace(&self) -> &Workspace {
        self.workspace
    }

    /// Run `steps` with a fresh rollback stack, unwinding it on failure
    fn execute<T, F>(&self, command: &str, steps: F) -> WorkflowResult<T>
    where
        F: FnOnce(&mut RollbackStack<'a>) -> WorkflowResult<T>,
    {
        let mut rollback = RollbackStack::new();
        match steps(&mut rollback) {
            Ok(value) => {
                rollback.discard();
                Ok(value)
            }
            Err(e) => {
                error!(command, error = %e, pending = rollback.len(), "step failed, rolling back");
                let report = rollback.run_all();
                if !report.is_clean() {
                    warn!(
                        command,
                        failed = report.failures.len(),
                        attempted = report.attempted,
                        "rollback incomplete, inspect the workspace manually"
                    );
                }
                Err(e)
            }
        }
    }

    /// Insert an entry and register its removal if the surface changed
    fn insert_compensated(
        &self,
        rollback: &mut RollbackStack<'a>,
        entry: SurfaceEntry,
    ) -> WorkflowResult<bool> {
        let changed = self.surfaces.insert(&entry)?;
        if changed {
            let surfaces = self.surfaces;
            rollback.push(format!("remove {entry}"), move || {
                surfaces.remove(&entry).map(|_| ())
            });
        }
        Ok(changed)
    }

    /// Remove an entry and register the restore of the file as it was
    ///
    /// Later edits to the same file are unwound first, so writing back the
    /// snapshot puts the entry at its old position with all its fields.
    fn remove_compensated(
        &self,
        rollback: &mut RollbackStack<'a>,
        entry: SurfaceEntry,
    ) -> WorkflowResult<bool> {
        let surface = entry.surface();
        let snapshot = self.surfaces.read_raw(surface).ok().flatten();
        let changed = self.surfaces.remove(&entry)?;
        if changed {
            let surfaces = self.surfaces;
            rollback.push(format!("restore {entry}"), move || match snapshot {
                Some(content) => surfaces.write_raw(surface, &content),
                None => surfaces.insert(&entry).map(|_| ()),
            });
        }
        Ok(changed)
    }

    fn require_absent(&self, name: &str) -> WorkflowResult<()> {
        let path = self.workspace.module_dir(name);
        if path.exists() {
            return Err(WorkflowError::ModuleExists {
                name: name.to_string(),
                path: self.workspace.module_rel(name),
            });
        }
        Ok(())
    }

    fn require_present(&self, name: &str) -> WorkflowResult<()> {
        let path = self.workspace.module_dir(name);
        if !path.exists() {
            return Err(WorkflowError::ModuleNotFound {
                name: name.to_string(),
                path: self.workspace.module_rel(name),
            });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::layout::WorkspaceLayout;
    use crate::vcs::VcsResult;
    use std::fs;
    use std::path::Path;
    use tempfile::TempDir;

    struct NoopVcs;

    impl VersionControl for NoopVcs {
        fn add_embedded_repo(&self, _url: &str, _name: &str) -> VcsResult<()> {
            Ok(())
        }

        fn remove_embedded_repo(&self, _name: &str) -> VcsResult<()> {
            Ok(())
        }

        fn move_tracked_directory(&self, _from: &Path, _to: &Path) -> VcsResult<()> {
            Ok(())
        }
    }

    const REGISTRY: &str = r#"{
  "modules": {
    "demo": {
      "id": "demo",
      "src": "/modules/demo/svelte",
      "title": "Demo"
    },
    "portfolio": {
      "id": "portfolio",
      "src": "/modules/portfolio/svelte"
    }
  }
}
"#;

    #[test]
    fn test_restore_puts_registry_entry_back_verbatim() {
        let temp = TempDir::new().unwrap();
        let ws = Workspace::new(temp.path(), WorkspaceLayout::default());
        fs::create_dir_all(ws.registry_path().parent().unwrap()).unwrap();
        fs::write(ws.registry_path(), REGISTRY).unwrap();
        let workflow = ModuleWorkflow::new(&ws, &NoopVcs);

        let mut rollback = RollbackStack::new();
        let old = SurfaceEntry::Registry {
            id: "demo".into(),
            src: "/modules/demo/svelte".into(),
        };
        let new = SurfaceEntry::Registry {
            id: "demo2".into(),
            src: "/modules/demo2/svelte".into(),
        };
        assert!(workflow.remove_compensated(&mut rollback, old).unwrap());
        assert!(workflow.insert_compensated(&mut rollback, new).unwrap());
        assert_ne!(fs::read_to_string(ws.registry_path()).unwrap(), REGISTRY);

        assert!(rollback.run_all().is_clean());
        assert_eq!(fs::read_to_string(ws.registry_path()).unwrap(), REGISTRY);
    }

    #[test]
    fn test_restore_keeps_package_order() {
        let temp = TempDir::new().unwrap();
        let ws = Workspace::new(temp.path(), WorkspaceLayout::default());
        let original = "packages:\n  - 'modules/demo/ts'\n  - 'apps/*'\n";
        fs::write(ws.package_list_path(), original).unwrap();
        let workflow = ModuleWorkflow::new(&ws, &NoopVcs);

        let mut rollback = RollbackStack::new();
        workflow
            .remove_compensated(&mut rollback, SurfaceEntry::PackagePath("modules/demo/ts".into()))
            .unwrap();
        workflow
            .insert_compensated(&mut rollback, SurfaceEntry::PackagePath("modules/demo2/ts".into()))
            .unwrap();

        rollback.run_all();
        assert_eq!(fs::read_to_string(ws.package_list_path()).unwrap(), original);
    }

    #[test]
    fn test_unchanged_surface_pushes_nothing() {
        let temp = TempDir::new().unwrap();
        let ws = Workspace::new(temp.path(), WorkspaceLayout::default());
        fs::write(ws.directive_path(), "go 1.22\n").unwrap();
        let workflow = ModuleWorkflow::new(&ws, &NoopVcs);

        let mut rollback = RollbackStack::new();
        let entry = SurfaceEntry::Directive("./modules/demo/go".into());
        assert!(!workflow.remove_compensated(&mut rollback, entry).unwrap());
        assert!(rollback.is_empty());
    }
}
