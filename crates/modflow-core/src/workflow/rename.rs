//! rename-module

use tracing::{error, info};

use super::ModuleWorkflow;
use crate::error::WorkflowResult;
use crate::refactor::{replace_in_tree, RefactorReport};
use crate::stack::{detect_stacks, StackSet};
use crate::surfaces::SurfaceEntry;
use crate::util::validate_name;

/// What a successful rename changed
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenameReport {
    pub old_name: String,
    pub new_name: String,
    pub stacks: StackSet,
    pub refactor: RefactorReport,
}

impl ModuleWorkflow<'_> {
    /// Move module `old` to `new`, rewrite its surface entries and replace
    /// the old name inside the module's own files
    ///
    /// The move and surface edits are compensated. The final text rewrite is
    /// not: if it fails, the move and surface edits stay in place and the
    /// error is returned as is.
    ///
    /// # Errors
    /// Precondition errors leave the workspace untouched; later errors are
    /// returned after rollback, except for the text rewrite
    pub fn rename_module(&self, old: &str, new: &str) -> WorkflowResult<RenameReport> {
        validate_name(old)?;
        validate_name(new)?;
        self.require_present(old)?;
        self.require_absent(new)?;

        info!(old, new, "renaming module");
        let stacks = self.execute("rename-module", |rollback| {
            let old_rel = self.workspace.module_rel(old);
            let new_rel = self.workspace.module_rel(new);
            self.vcs.move_tracked_directory(&old_rel, &new_rel)?;
            let vcs = self.vcs;
            rollback.push(format!("move {new} back to {old}"), move || {
                vcs.move_tracked_directory(&new_rel, &old_rel)
                    .map_err(Into::into)
            });

            let stacks = detect_stacks(&self.workspace.module_dir(new), self.workspace.layout());
            info!(%stacks, "detected stacks");

            for stack in stacks.iter() {
                let before = SurfaceEntry::for_stack(self.workspace, old, stack);
                let after = SurfaceEntry::for_stack(self.workspace, new, stack);
                for (old_entry, new_entry) in before.into_iter().zip(after) {
                    info!(from = %old_entry, to = %new_entry, "rewriting");
                    self.remove_compensated(rollback, old_entry)?;
                    self.insert_compensated(rollback, new_entry)?;
                }
            }

            Ok(stacks)
        })?;

        info!(old, new, "refactoring module files");
        let refactor = replace_in_tree(&self.workspace.module_dir(new), old, new).map_err(|e| {
            error!(error = %e, "refactor failed; directory move and config edits are kept");
            e
        })?;

        Ok(RenameReport {
            old_name: old.to_string(),
            new_name: new.to_string(),
            stacks,
            refactor,
        })
    }
}
