//! Workspace layout and configuration
//!
//! Every conventional path the workflows touch lives in [`WorkspaceLayout`].
//! The defaults describe the standard monorepo; a `module-workflow.json` at
//! the workspace root may override any field.

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use crate::error::{WorkflowError, WorkflowResult};
use crate::stack::Stack;
use crate::util::to_posix_relative;

/// Name of the optional per-workspace config file
pub const CONFIG_FILE: &str = "module-workflow.json";

/// Conventional paths inside a workspace, all relative to its root
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct WorkspaceLayout {
    /// Directory holding one embedded repository per module
    pub modules_dir: PathBuf,
    /// Registry document consumed by the app shell
    pub registry_file: PathBuf,
    /// Package-path list (pnpm workspace)
    pub package_list_file: PathBuf,
    /// Build-workspace directive file (go.work)
    pub directive_file: PathBuf,
    /// Subdirectory marking a backend-service stack
    pub service_dir: String,
    /// Subdirectory marking a shared-library stack
    pub library_dir: String,
    /// Subdirectory marking a user-interface stack
    pub interface_dir: String,
    /// Optional build-descriptor file at the module root
    pub marker_file: String,
    /// Where git keeps metadata for embedded repositories
    pub vcs_metadata_dir: PathBuf,
    /// Version-control binary to invoke
    pub git_binary: String,
}

impl Default for WorkspaceLayout {
    fn default() -> Self {
        Self {
            modules_dir: PathBuf::from("modules"),
            registry_file: PathBuf::from("apps/sv-appshell/static/modules.json"),
            package_list_file: PathBuf::from("pnpm-workspace.yaml"),
            directive_file: PathBuf::from("go.work"),
            service_dir: "go".to_string(),
            library_dir: "ts".to_string(),
            interface_dir: "svelte".to_string(),
            marker_file: "moon.yml".to_string(),
            vcs_metadata_dir: PathBuf::from(".git/modules"),
            git_binary: "git".to_string(),
        }
    }
}

impl WorkspaceLayout {
    /// Subdirectory name for a stack
    #[must_use]
    pub fn stack_dir(&self, stack: Stack) -> &str {
        match stack {
            Stack::Service => &self.service_dir,
            Stack::Library => &self.library_dir,
            Stack::Interface => &self.interface_dir,
        }
    }

    /// Load the layout for a workspace root
    ///
    /// A missing config file yields the defaults; a present but malformed
    /// one is an error rather than a silent fallback.
    ///
    /// # Errors
    /// Returns `Config` if the file cannot be read or parsed
    pub fn load(root: &Path) -> WorkflowResult<Self> {
        let path = root.join(CONFIG_FILE);
        if !path.exists() {
            return Ok(Self::default());
        }

        let content = fs::read_to_string(&path).map_err(|e| WorkflowError::Config {
            path: path.clone(),
            message: e.to_string(),
        })?;
        serde_json::from_str(&content).map_err(|e| WorkflowError::Config {
            path,
            message: e.to_string(),
        })
    }
}

/// An explicitly constructed workspace context handed to every command
#[derive(Debug, Clone)]
pub struct Workspace {
    root: PathBuf,
    layout: WorkspaceLayout,
}

impl Workspace {
    /// Create a workspace with an explicit layout
    #[must_use]
    pub fn new(root: impl Into<PathBuf>, layout: WorkspaceLayout) -> Self {
        Self {
            root: root.into(),
            layout,
        }
    }

    /// Open a workspace, reading `module-workflow.json` if present
    ///
    /// # Errors
    /// Returns an error if the config file is malformed
    pub fn open(root: impl Into<PathBuf>) -> WorkflowResult<Self> {
        let root = root.into();
        let layout = WorkspaceLayout::load(&root)?;
        Ok(Self { root, layout })
    }

    /// Workspace root directory
    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }

    #[must_use]
    pub fn layout(&self) -> &WorkspaceLayout {
        &self.layout
    }

    /// Module location relative to the root, e.g. `modules/demo`
    #[must_use]
    pub fn module_rel(&self, name: &str) -> PathBuf {
        self.layout.modules_dir.join(name)
    }

    /// Absolute module location
    #[must_use]
    pub fn module_dir(&self, name: &str) -> PathBuf {
        self.root.join(self.module_rel(name))
    }

    /// Stack location relative to the root, e.g. `modules/demo/go`
    #[must_use]
    pub fn stack_rel(&self, name: &str, stack: Stack) -> PathBuf {
        self.module_rel(name).join(self.layout.stack_dir(stack))
    }

    /// Registry `src` value for a module's interface bundle
    #[must_use]
    pub fn registry_src(&self, name: &str) -> String {
        format!("/{}", to_posix_relative(&self.stack_rel(name, Stack::Interface)))
    }

    #[must_use]
    pub fn registry_path(&self) -> PathBuf {
        self.root.join(&self.layout.registry_file)
    }

    #[must_use]
    pub fn package_list_path(&self) -> PathBuf {
        self.root.join(&self.layout.package_list_file)
    }

    #[must_use]
    pub fn directive_path(&self) -> PathBuf {
        self.root.join(&self.layout.directive_file)
    }

    /// Git's private copy of an embedded repository, e.g. `.git/modules/modules/demo`
    #[must_use]
    pub fn vcs_metadata_path(&self, name: &str) -> PathBuf {
        self.root
            .join(&self.layout.vcs_metadata_dir)
            .join(self.module_rel(name))
    }
}
