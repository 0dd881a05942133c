//! Version-control gateway
//!
//! The workflows only ever talk to [`VersionControl`]; [`GitCli`] drives the
//! real `git` binary with the workspace root as working directory.

use std::ffi::OsStr;
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::process::{Command, Output, Stdio};
use thiserror::Error;
use tracing::{debug, info};

use crate::layout::Workspace;
use crate::util::to_posix_relative;

/// Result type for version-control operations
pub type VcsResult<T> = Result<T, VcsError>;

/// Errors raised by the version-control gateway
#[derive(Debug, Error)]
pub enum VcsError {
    /// The binary could not be started at all
    #[error("Failed to launch `{command}`: {message}")]
    Launch { command: String, message: String },

    /// The binary ran and exited non-zero
    #[error("`{command}` failed ({status}){}", stderr_suffix(.stderr))]
    Failed {
        command: String,
        status: String,
        stderr: String,
    },

    /// Filesystem cleanup failed for a reason other than absence
    #[error("I/O error for {}: {message}", .path.display())]
    Io { path: PathBuf, message: String },
}

fn stderr_suffix(stderr: &str) -> String {
    let trimmed = stderr.trim_end();
    if trimmed.is_empty() {
        String::new()
    } else {
        format!(": {trimmed}")
    }
}

/// Operations the workflows need from version control
pub trait VersionControl {
    /// Clone `url` as an embedded repository at the module's path
    ///
    /// # Errors
    /// Returns an error if the clone fails
    fn add_embedded_repo(&self, url: &str, name: &str) -> VcsResult<()>;

    /// Tear down an embedded repository, tolerating parts that are already gone
    ///
    /// # Errors
    /// Returns an error on hard filesystem failures or if the tool cannot run
    fn remove_embedded_repo(&self, name: &str) -> VcsResult<()>;

    /// Move a tracked directory, preserving history tracking
    ///
    /// Both paths are relative to the workspace root.
    ///
    /// # Errors
    /// Returns an error if the destination exists or the source is untracked
    fn move_tracked_directory(&self, from: &Path, to: &Path) -> VcsResult<()>;
}

/// [`VersionControl`] backed by the `git` command line
#[derive(Debug, Clone)]
pub struct GitCli {
    workspace: Workspace,
}

impl GitCli {
    #[must_use]
    pub fn new(workspace: &Workspace) -> Self {
        Self {
            workspace: workspace.clone(),
        }
    }

    fn command<I, S>(&self, args: I) -> (Command, String)
    where
        I: IntoIterator<Item = S>,
        S: AsRef<OsStr>,
    {
        let binary = &self.workspace.layout().git_binary;
        let mut cmd = Command::new(binary);
        cmd.current_dir(self.workspace.root());

        let mut rendered = binary.clone();
        for arg in args {
            rendered.push(' ');
            rendered.push_str(&arg.as_ref().to_string_lossy());
            cmd.arg(arg);
        }
        (cmd, rendered)
    }

    /// Run with the terminal attached so credential prompts reach the user
    fn run_interactive(&self, args: &[&str]) -> VcsResult<()> {
        let (mut cmd, rendered) = self.command(args);
        debug!(command = %rendered, "running interactively");

        let status = cmd
            .stdin(Stdio::inherit())
            .stdout(Stdio::inherit())
            .stderr(Stdio::inherit())
            .status()
            .map_err(|e| VcsError::Launch {
                command: rendered.clone(),
                message: e.to_string(),
            })?;

        if status.success() {
            Ok(())
        } else {
            Err(VcsError::Failed {
                command: rendered,
                status: status.to_string(),
                stderr: String::new(),
            })
        }
    }

    fn run_captured(&self, args: &[&str]) -> VcsResult<(String, Output)> {
        let (mut cmd, rendered) = self.command(args);
        debug!(command = %rendered, "running");

        let output = cmd
            .stdin(Stdio::null())
            .output()
            .map_err(|e| VcsError::Launch {
                command: rendered.clone(),
                message: e.to_string(),
            })?;
        Ok((rendered, output))
    }

    /// Run a step whose non-zero exit means "nothing left to do"
    fn run_tolerant(&self, args: &[&str]) -> VcsResult<()> {
        let (rendered, output) = self.run_captured(args)?;
        if !output.status.success() {
            debug!(
                command = %rendered,
                stderr = %String::from_utf8_lossy(&output.stderr).trim_end(),
                "ignoring failure of best-effort step"
            );
        }
        Ok(())
    }
}

impl VersionControl for GitCli {
    fn add_embedded_repo(&self, url: &str, name: &str) -> VcsResult<()> {
        let target = to_posix_relative(&self.workspace.module_rel(name));
        info!(url, path = %target, "adding submodule");
        self.run_interactive(&["submodule", "add", "--force", url, &target])
    }

    fn remove_embedded_repo(&self, name: &str) -> VcsResult<()> {
        let target = to_posix_relative(&self.workspace.module_rel(name));
        info!(path = %target, "removing submodule");

        self.run_tolerant(&["submodule", "deinit", "-f", &target])?;
        remove_dir_if_present(&self.workspace.vcs_metadata_path(name))?;
        self.run_tolerant(&["rm", "-f", &target])?;
        remove_dir_if_present(&self.workspace.module_dir(name))
    }

    fn move_tracked_directory(&self, from: &Path, to: &Path) -> VcsResult<()> {
        let from = to_posix_relative(from);
        let to = to_posix_relative(to);
        info!(from = %from, to = %to, "moving tracked directory");

        let (rendered, output) = self.run_captured(&["mv", &from, &to])?;
        if output.status.success() {
            Ok(())
        } else {
            Err(VcsError::Failed {
                command: rendered,
                status: output.status.to_string(),
                stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
            })
        }
    }
}

/// Delete a directory tree, treating absence as success
///
/// # Errors
/// Returns an error for any failure other than not-found
pub fn remove_dir_if_present(path: &Path) -> VcsResult<()> {
    match fs::remove_dir_all(path) {
        Ok(()) => Ok(()),
        Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
        Err(e) => Err(VcsError::Io {
            path: path.to_path_buf(),
            message: e.to_string(),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::layout::WorkspaceLayout;
    use tempfile::TempDir;

    #[test]
    fn test_failed_error_includes_stderr_verbatim() {
        let err = VcsError::Failed {
            command: "git mv a b".into(),
            status: "exit status: 128".into(),
            stderr: "fatal: destination exists\n".into(),
        };
        assert_eq!(
            err.to_string(),
            "`git mv a b` failed (exit status: 128): fatal: destination exists"
        );
    }

    #[test]
    fn test_failed_error_without_stderr() {
        let err = VcsError::Failed {
            command: "git submodule add".into(),
            status: "exit status: 1".into(),
            stderr: String::new(),
        };
        assert_eq!(err.to_string(), "`git submodule add` failed (exit status: 1)");
    }

    #[test]
    fn test_remove_dir_if_present_tolerates_absence() {
        let temp = TempDir::new().unwrap();
        assert!(remove_dir_if_present(&temp.path().join("missing")).is_ok());

        let dir = temp.path().join("present/nested");
        fs::create_dir_all(&dir).unwrap();
        remove_dir_if_present(&temp.path().join("present")).unwrap();
        assert!(!temp.path().join("present").exists());
    }

    #[test]
    fn test_missing_binary_is_launch_error() {
        let temp = TempDir::new().unwrap();
        let layout = WorkspaceLayout {
            git_binary: "definitely-not-a-real-vcs-binary".to_string(),
            ..WorkspaceLayout::default()
        };
        let git = GitCli::new(&Workspace::new(temp.path(), layout));

        let err = git
            .move_tracked_directory(Path::new("modules/a"), Path::new("modules/b"))
            .unwrap_err();
        assert!(matches!(err, VcsError::Launch { .. }));
    }
}
