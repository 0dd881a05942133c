//! Structural stack detection
//!
//! A module's stacks are whatever conventionally named subdirectories exist
//! under its root. Detection only checks for existence; contents are never
//! inspected and nothing is cached.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::Path;

use crate::layout::WorkspaceLayout;

/// Implementation stack a module may carry
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Stack {
    /// Backend service (go)
    Service,
    /// Shared library (ts)
    Library,
    /// User interface (svelte)
    Interface,
}

impl Stack {
    /// All stacks, in the order their surfaces are written
    pub const ALL: [Stack; 3] = [Stack::Service, Stack::Library, Stack::Interface];
}

impl fmt::Display for Stack {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Service => write!(f, "backend-service"),
            Self::Library => write!(f, "shared-library"),
            Self::Interface => write!(f, "user-interface"),
        }
    }
}

/// Result of probing a module root
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[allow(clippy::struct_excessive_bools)]
pub struct StackSet {
    pub service: bool,
    pub library: bool,
    pub interface: bool,
    /// Build-descriptor marker file at the module root
    pub build_marker: bool,
}

impl StackSet {
    /// A set with every stack present, used when cleaning up blind
    #[must_use]
    pub fn all() -> Self {
        Self {
            service: true,
            library: true,
            interface: true,
            build_marker: false,
        }
    }

    #[must_use]
    pub fn contains(&self, stack: Stack) -> bool {
        match stack {
            Stack::Service => self.service,
            Stack::Library => self.library,
            Stack::Interface => self.interface,
        }
    }

    /// Present stacks in surface-write order
    pub fn iter(&self) -> impl Iterator<Item = Stack> + '_ {
        Stack::ALL.into_iter().filter(|s| self.contains(*s))
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.iter().next().is_none()
    }
}

impl fmt::Display for StackSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let names: Vec<String> = self.iter().map(|s| s.to_string()).collect();
        if names.is_empty() {
            write!(f, "none")
        } else {
            write!(f, "{}", names.join(", "))
        }
    }
}

/// Probe a module root for stack subdirectories and the marker file
#[must_use]
pub fn detect_stacks(module_root: &Path, layout: &WorkspaceLayout) -> StackSet {
    StackSet {
        service: module_root.join(&layout.service_dir).exists(),
        library: module_root.join(&layout.library_dir).exists(),
        interface: module_root.join(&layout.interface_dir).exists(),
        build_marker: module_root.join(&layout.marker_file).exists(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn test_service_only_module() {
        let temp = TempDir::new().unwrap();
        fs::create_dir_all(temp.path().join("go/pkg")).unwrap();
        fs::write(temp.path().join("go/pkg/svelte.txt"), "not a stack").unwrap();

        let stacks = detect_stacks(temp.path(), &WorkspaceLayout::default());
        assert!(stacks.service);
        assert!(!stacks.library);
        assert!(!stacks.interface);
        assert!(!stacks.build_marker);
        assert_eq!(stacks.iter().collect::<Vec<_>>(), vec![Stack::Service]);
    }

    #[test]
    fn test_empty_subdirectory_still_counts() {
        let temp = TempDir::new().unwrap();
        fs::create_dir(temp.path().join("svelte")).unwrap();
        fs::write(temp.path().join("moon.yml"), "").unwrap();

        let stacks = detect_stacks(temp.path(), &WorkspaceLayout::default());
        assert!(stacks.interface);
        assert!(stacks.build_marker);
    }

    #[test]
    fn test_missing_root_reports_nothing() {
        let temp = TempDir::new().unwrap();
        let stacks = detect_stacks(&temp.path().join("absent"), &WorkspaceLayout::default());
        assert!(stacks.is_empty());
        assert_eq!(stacks.to_string(), "none");
    }

    #[test]
    fn test_display_lists_present_stacks() {
        let stacks = StackSet {
            service: true,
            interface: true,
            ..StackSet::default()
        };
        assert_eq!(stacks.to_string(), "backend-service, user-interface");
    }
}
