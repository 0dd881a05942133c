//! modflow core - module lifecycle engine
//!
//! Adds, renames and deletes feature modules that live as embedded git
//! repositories under the workspace, keeping the registry document, the
//! package-path list and the build-workspace directive file in sync, and
//! rolling back completed steps when a later one fails.

#![forbid(unsafe_code)]
#![warn(clippy::all, clippy::pedantic)]
#![allow(clippy::module_name_repetitions, clippy::missing_errors_doc)]

pub mod error;
pub mod inventory;
pub mod layout;
pub mod refactor;
pub mod rollback;
pub mod stack;
pub mod surfaces;
pub mod util;
pub mod vcs;
pub mod workflow;

pub use error::{ErrorKind, WorkflowError, WorkflowResult};
pub use inventory::ModuleInventory;
pub use layout::{Workspace, WorkspaceLayout};
pub use rollback::RollbackStack;
pub use stack::{detect_stacks, Stack, StackSet};
pub use surfaces::{ConfigSurfaces, SurfaceEntry};
pub use vcs::{GitCli, VersionControl};
pub use workflow::{AddReport, DeleteOutcome, ModuleWorkflow, RenameReport};
