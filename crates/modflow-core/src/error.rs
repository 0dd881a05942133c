//! Error types for module workflows

use std::path::PathBuf;
use thiserror::Error;

use crate::vcs::VcsError;

/// Result type for workflow operations
pub type WorkflowResult<T> = Result<T, WorkflowError>;

/// Broad classification used by callers to decide how to report an error
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Checked before any mutation; nothing was changed
    Precondition,
    /// The version-control binary failed or could not be launched
    ExternalTool,
    /// A config surface could not be read or written
    ConfigSurface,
    /// The bulk rewrite could not run at all
    Refactor,
    /// The workspace config file is unusable
    Configuration,
}

/// Errors that can occur while adding, renaming or deleting a module
#[derive(Debug, Error)]
pub enum WorkflowError {
    /// Module name is not usable as a directory name
    #[error("Invalid module name '{name}': {reason}")]
    InvalidName { name: String, reason: String },

    /// Target module directory is already present
    #[error("Module '{name}' already exists at {}", .path.display())]
    ModuleExists { name: String, path: PathBuf },

    /// Source module directory is missing
    #[error("Module '{name}' does not exist at {}", .path.display())]
    ModuleNotFound { name: String, path: PathBuf },

    /// Version-control invocation failed
    #[error(transparent)]
    Vcs(#[from] VcsError),

    /// Registry document must exist before entries can be added
    #[error("Registry file not found at {}", .path.display())]
    RegistryMissing { path: PathBuf },

    /// A structured surface could not be parsed
    #[error("Failed to parse {}: {message}", .path.display())]
    SurfaceParse { path: PathBuf, message: String },

    /// File I/O error on a surface or module file
    #[error("I/O error for {}: {message}", .path.display())]
    Io { path: PathBuf, message: String },

    /// Refactor root could not be walked
    #[error("Refactor of {} failed: {message}", .path.display())]
    Refactor { path: PathBuf, message: String },

    /// Workspace config file is malformed
    #[error("Invalid workspace config {}: {message}", .path.display())]
    Config { path: PathBuf, message: String },
}

impl WorkflowError {
    pub(crate) fn io(path: impl Into<PathBuf>, err: &std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            message: err.to_string(),
        }
    }

    /// Get the error code for CLI output
    #[must_use]
    pub fn code(&self) -> &'static str {
        match self {
            Self::InvalidName { .. } => "INVALID_NAME",
            Self::ModuleExists { .. } => "MODULE_EXISTS",
            Self::ModuleNotFound { .. } => "MODULE_NOT_FOUND",
            Self::Vcs(_) => "VCS_FAILED",
            Self::RegistryMissing { .. } => "REGISTRY_MISSING",
            Self::SurfaceParse { .. } => "PARSE_ERROR",
            Self::Io { .. } => "IO_ERROR",
            Self::Refactor { .. } => "REFACTOR_FAILED",
            Self::Config { .. } => "CONFIG_ERROR",
        }
    }

    /// Classify the error
    #[must_use]
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::InvalidName { .. } | Self::ModuleExists { .. } | Self::ModuleNotFound { .. } => {
                ErrorKind::Precondition
            }
            Self::Vcs(_) => ErrorKind::ExternalTool,
            Self::RegistryMissing { .. } | Self::SurfaceParse { .. } | Self::Io { .. } => {
                ErrorKind::ConfigSurface
            }
            Self::Refactor { .. } => ErrorKind::Refactor,
            Self::Config { .. } => ErrorKind::Configuration,
        }
    }

    /// True when the error was raised before anything was mutated
    #[must_use]
    pub fn is_precondition(&self) -> bool {
        self.kind() == ErrorKind::Precondition
    }
}
