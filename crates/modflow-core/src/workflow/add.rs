//! add-module

use tracing::{info, warn};

use super::ModuleWorkflow;
use crate::error::WorkflowResult;
use crate::stack::{detect_stacks, StackSet};
use crate::surfaces::SurfaceEntry;
use crate::util::validate_name;

/// What a successful add changed
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AddReport {
    pub name: String,
    pub stacks: StackSet,
    /// Surface entries actually written, in write order
    pub entries: Vec<SurfaceEntry>,
}

impl ModuleWorkflow<'_> {
    /// Clone `url` as module `name` and register it on every surface its
    /// stacks call for
    ///
    /// # Errors
    /// Precondition errors leave the workspace untouched. Any later failure
    /// removes what was already done before the error is returned.
    pub fn add_module(&self, url: &str, name: &str) -> WorkflowResult<AddReport> {
        validate_name(name)?;
        self.require_absent(name)?;

        info!(name, url, "adding module");
        self.execute("add-module", |rollback| {
            self.vcs.add_embedded_repo(url, name)?;
            let vcs = self.vcs;
            let owned = name.to_string();
            rollback.push(format!("remove submodule {name}"), move || {
                vcs.remove_embedded_repo(&owned).map_err(Into::into)
            });

            let stacks = detect_stacks(&self.workspace.module_dir(name), self.workspace.layout());
            info!(%stacks, "detected stacks");
            if stacks.is_empty() {
                warn!(name, "no recognized stack directories; no config surfaces updated");
            }

            let mut entries = Vec::new();
            for stack in stacks.iter() {
                for entry in SurfaceEntry::for_stack(self.workspace, name, stack) {
                    info!(%entry, "registering");
                    if self.insert_compensated(rollback, entry.clone())? {
                        entries.push(entry);
                    }
                }
            }

            Ok(AddReport {
                name: name.to_string(),
                stacks,
                entries,
            })
        })
    }
}
