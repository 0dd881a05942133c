//! delete-module

use tracing::info;

use super::ModuleWorkflow;
use crate::error::WorkflowResult;
use crate::stack::Stack;
use crate::surfaces::SurfaceEntry;
use crate::util::validate_name;

/// Result of a delete request
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DeleteOutcome {
    /// `force` was not given; nothing was touched
    NotConfirmed,
    /// The module is gone
    Deleted {
        /// Surface entries that were present and removed
        removed: Vec<SurfaceEntry>,
    },
}

impl ModuleWorkflow<'_> {
    /// Remove module `name` from every surface, then tear down its repository
    ///
    /// Entries are removed for every stack kind without detection, so stale
    /// entries of a half-deleted module are cleaned up too. The steps are
    /// forced by the user and are not compensated.
    ///
    /// # Errors
    /// Returns an error if the name is invalid, a surface cannot be written,
    /// or repository teardown hits a hard failure
    pub fn delete_module(&self, name: &str, force: bool) -> WorkflowResult<DeleteOutcome> {
        validate_name(name)?;
        if !force {
            return Ok(DeleteOutcome::NotConfirmed);
        }

        info!(name, "deleting module");
        let mut removed = Vec::new();
        for stack in Stack::ALL {
            for entry in SurfaceEntry::for_stack(self.workspace, name, stack) {
                if self.surfaces.remove(&entry)? {
                    info!(%entry, "removed");
                    removed.push(entry);
                }
            }
        }

        self.vcs.remove_embedded_repo(name)?;
        Ok(DeleteOutcome::Deleted { removed })
    }
}
