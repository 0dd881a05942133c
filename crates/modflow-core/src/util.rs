//! Name and path helpers

use std::path::{Component, Path};

use crate::error::{WorkflowError, WorkflowResult};

/// Validate a module name for use as a directory under the modules dir
///
/// Names must not contain path separators or `..` sequences.
///
/// # Errors
/// Returns `InvalidName` describing the first rule the name breaks
pub fn validate_name(name: &str) -> WorkflowResult<()> {
    let reject = |reason: &str| {
        Err(WorkflowError::InvalidName {
            name: name.to_string(),
            reason: reason.to_string(),
        })
    };

    if name.trim().is_empty() {
        return reject("name cannot be empty");
    }
    if name.contains('/') || name.contains('\\') {
        return reject("name cannot contain path separators");
    }
    if name.contains("..") {
        return reject("name cannot contain '..'");
    }
    if name.starts_with('.') {
        return reject("name cannot start with '.'");
    }
    if name.contains('\0') {
        return reject("name cannot contain null bytes");
    }
    if name.chars().any(char::is_whitespace) {
        return reject("name cannot contain whitespace");
    }
    Ok(())
}

/// Render a workspace-relative path as `./a/b/c` with forward slashes
///
/// `.` components are dropped and `..` pops the previous component, so
/// `modules/demo/../demo/go` and `./modules/demo/go` render the same.
#[must_use]
pub fn to_dot_relative(path: &Path) -> String {
    let mut parts: Vec<String> = Vec::new();
    for component in path.components() {
        match component {
            Component::Normal(c) => parts.push(c.to_string_lossy().into_owned()),
            Component::ParentDir => {
                parts.pop();
            }
            Component::CurDir | Component::RootDir | Component::Prefix(_) => {}
        }
    }
    // Paths handed in from config may still carry Windows separators
    let joined = parts.join("/").replace('\\', "/");
    format!("./{joined}")
}

/// Render a workspace-relative path with forward slashes and no `./` prefix
#[must_use]
pub fn to_posix_relative(path: &Path) -> String {
    to_dot_relative(path).trim_start_matches("./").to_string()
}
