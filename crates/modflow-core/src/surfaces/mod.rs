//! Config surfaces that must mirror the module set
//!
//! Three independent files are kept in sync:
//! - the registry document read by the app shell (`modules.json`)
//! - the package-path list (`pnpm-workspace.yaml`)
//! - the build-workspace directive file (`go.work`)
//!
//! Each add/remove reports whether the file actually changed so callers only
//! register compensation for real mutations. Text surfaces are patched line
//! by line through the pure functions in [`package_list`] and [`directive`].

pub mod directive;
pub mod package_list;
pub mod registry;

use serde_json::Value;
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

use crate::error::{WorkflowError, WorkflowResult};
use crate::layout::Workspace;
use crate::stack::Stack;
use crate::util::{to_dot_relative, to_posix_relative};

/// Which file an entry lives in
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Surface {
    Registry,
    PackageList,
    Directive,
}

impl fmt::Display for Surface {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Registry => write!(f, "registry"),
            Self::PackageList => write!(f, "package list"),
            Self::Directive => write!(f, "build workspace"),
        }
    }
}

/// One entry a module contributes to a surface
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SurfaceEntry {
    /// `modules.<id> = { id, src }` in the registry document
    Registry { id: String, src: String },
    /// Quoted path in the package list, e.g. `modules/demo/ts`
    PackagePath(String),
    /// `use ./modules/demo/go` in the directive file
    Directive(String),
}

impl SurfaceEntry {
    /// Entries a module named `name` needs for `stack`
    #[must_use]
    pub fn for_stack(workspace: &Workspace, name: &str, stack: Stack) -> Vec<Self> {
        let stack_path = workspace.stack_rel(name, stack);
        match stack {
            Stack::Service => vec![Self::Directive(to_dot_relative(&stack_path))],
            Stack::Library => vec![Self::PackagePath(to_posix_relative(&stack_path))],
            Stack::Interface => vec![
                Self::PackagePath(to_posix_relative(&stack_path)),
                Self::Registry {
                    id: name.to_string(),
                    src: workspace.registry_src(name),
                },
            ],
        }
    }

    #[must_use]
    pub fn surface(&self) -> Surface {
        match self {
            Self::Registry { .. } => Surface::Registry,
            Self::PackagePath(_) => Surface::PackageList,
            Self::Directive(_) => Surface::Directive,
        }
    }
}

impl fmt::Display for SurfaceEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Registry { id, .. } => write!(f, "registry entry '{id}'"),
            Self::PackagePath(path) => write!(f, "package path '{path}'"),
            Self::Directive(path) => write!(f, "use {path}"),
        }
    }
}

/// File-backed access to the three surfaces of one workspace
#[derive(Debug, Clone, Copy)]
pub struct ConfigSurfaces<'a> {
    workspace: &'a Workspace,
}

impl<'a> ConfigSurfaces<'a> {
    #[must_use]
    pub fn new(workspace: &'a Workspace) -> Self {
        Self { workspace }
    }

    /// Add an entry to its surface
    ///
    /// # Errors
    /// Fails if the registry is missing or malformed, or a file cannot be
    /// read or written
    pub fn insert(&self, entry: &SurfaceEntry) -> WorkflowResult<bool> {
        match entry {
            SurfaceEntry::Registry { id, src } => self.add_registry_entry(id, src),
            SurfaceEntry::PackagePath(path) => self.add_package_path(path),
            SurfaceEntry::Directive(path) => self.add_directive(path),
        }
    }

    /// Remove an entry from its surface
    ///
    /// # Errors
    /// Fails only if a changed file cannot be written back
    pub fn remove(&self, entry: &SurfaceEntry) -> WorkflowResult<bool> {
        match entry {
            SurfaceEntry::Registry { id, .. } => self.remove_registry_entry(id),
            SurfaceEntry::PackagePath(path) => self.remove_package_path(path),
            SurfaceEntry::Directive(path) => self.remove_directive(path),
        }
    }

    /// Whether an entry is currently present; unreadable surfaces count as absent
    #[must_use]
    pub fn contains(&self, entry: &SurfaceEntry) -> bool {
        match entry {
            SurfaceEntry::Registry { id, .. } => self
                .read_registry()
                .ok()
                .flatten()
                .is_some_and(|doc| registry::contains_entry(&doc, id)),
            SurfaceEntry::PackagePath(path) => read_optional(&self.workspace.package_list_path())
                .ok()
                .flatten()
                .is_some_and(|content| package_list::contains_package(&content, path)),
            SurfaceEntry::Directive(path) => read_optional(&self.workspace.directive_path())
                .ok()
                .flatten()
                .is_some_and(|content| directive::contains_directive(&content, path)),
        }
    }

    /// Add `modules.<id>`; the registry must already exist
    ///
    /// # Errors
    /// Returns `RegistryMissing` or `SurfaceParse` if the document is unusable
    pub fn add_registry_entry(&self, id: &str, src: &str) -> WorkflowResult<bool> {
        let path = self.workspace.registry_path();
        let mut doc = self
            .read_registry()?
            .ok_or_else(|| WorkflowError::RegistryMissing { path: path.clone() })?;

        let changed = registry::insert_entry(&mut doc, id, src).map_err(|message| {
            WorkflowError::SurfaceParse {
                path: path.clone(),
                message,
            }
        })?;
        if changed {
            write_registry(&path, &doc)?;
        }
        Ok(changed)
    }

    /// Remove `modules.<id>`; a missing or malformed registry is a no-op
    ///
    /// # Errors
    /// Returns an error if the updated document cannot be written
    pub fn remove_registry_entry(&self, id: &str) -> WorkflowResult<bool> {
        let path = self.workspace.registry_path();
        let mut doc = match self.read_registry() {
            Ok(Some(doc)) => doc,
            Ok(None) => return Ok(false),
            Err(e) => {
                warn!(error = %e, "skipping registry removal");
                return Ok(false);
            }
        };

        if !registry::remove_entry(&mut doc, id) {
            return Ok(false);
        }
        write_registry(&path, &doc)?;
        Ok(true)
    }

    /// Add a quoted path to the package list; a missing file is a no-op
    ///
    /// # Errors
    /// Returns an error if the file exists but cannot be read or written
    pub fn add_package_path(&self, module_path: &str) -> WorkflowResult<bool> {
        let path = self.workspace.package_list_path();
        patch_text(&path, |content| {
            if package_list::has_inline_list(content) {
                return Err("inline `packages:` list cannot be patched".to_string());
            }
            Ok(package_list::insert_package(content, module_path))
        })
    }

    /// Remove a quoted path from the package list; a missing file is a no-op
    ///
    /// # Errors
    /// Returns an error if the updated file cannot be written
    pub fn remove_package_path(&self, module_path: &str) -> WorkflowResult<bool> {
        let path = self.workspace.package_list_path();
        patch_text_lenient(&path, |content| {
            package_list::remove_package(content, module_path)
        })
    }

    /// Append a `use` directive; a missing file is a no-op
    ///
    /// # Errors
    /// Returns an error if the file exists but cannot be read or written
    pub fn add_directive(&self, module_path: &str) -> WorkflowResult<bool> {
        let path = self.workspace.directive_path();
        let normalized = to_dot_relative(Path::new(module_path));
        patch_text(&path, |content| {
            Ok(directive::insert_directive(content, &normalized))
        })
    }

    /// Remove a `use` directive; a missing file is a no-op
    ///
    /// # Errors
    /// Returns an error if the updated file cannot be written
    pub fn remove_directive(&self, module_path: &str) -> WorkflowResult<bool> {
        let path = self.workspace.directive_path();
        let normalized = to_dot_relative(Path::new(module_path));
        patch_text_lenient(&path, |content| directive::remove_directive(content, &normalized))
    }

    /// Raw content of a surface file, `None` if it does not exist
    ///
    /// # Errors
    /// Returns an error if the file exists but cannot be read
    pub fn read_raw(&self, surface: Surface) -> WorkflowResult<Option<String>> {
        read_optional(&self.surface_path(surface))
    }

    /// Overwrite a surface file with previously read content
    ///
    /// # Errors
    /// Returns an error if the file cannot be written
    pub fn write_raw(&self, surface: Surface, content: &str) -> WorkflowResult<()> {
        write_text(&self.surface_path(surface), content)
    }

    fn surface_path(&self, surface: Surface) -> PathBuf {
        match surface {
            Surface::Registry => self.workspace.registry_path(),
            Surface::PackageList => self.workspace.package_list_path(),
            Surface::Directive => self.workspace.directive_path(),
        }
    }

    /// Parsed registry document, `None` if the file does not exist
    ///
    /// # Errors
    /// Returns an error if the file cannot be read or is not valid JSON
    pub fn read_registry(&self) -> WorkflowResult<Option<Value>> {
        let path = self.workspace.registry_path();
        let Some(content) = read_optional(&path)? else {
            return Ok(None);
        };
        serde_json::from_str(&content)
            .map(Some)
            .map_err(|e| WorkflowError::SurfaceParse {
                path,
                message: e.to_string(),
            })
    }
}

fn read_optional(path: &Path) -> WorkflowResult<Option<String>> {
    if !path.exists() {
        return Ok(None);
    }
    fs::read_to_string(path)
        .map(Some)
        .map_err(|e| WorkflowError::io(path, &e))
}

fn write_text(path: &Path, content: &str) -> WorkflowResult<()> {
    fs::write(path, content).map_err(|e| WorkflowError::io(path, &e))?;
    debug!(path = %path.display(), "surface updated");
    Ok(())
}

fn write_registry(path: &Path, doc: &Value) -> WorkflowResult<()> {
    let content = registry::render(doc).map_err(|e| WorkflowError::SurfaceParse {
        path: path.to_path_buf(),
        message: e.to_string(),
    })?;
    write_text(path, &content)
}

/// Apply a pure line patch to an optional file, failing on unreadable files
/// and on content the patch refuses to edit
fn patch_text<F>(path: &Path, patch: F) -> WorkflowResult<bool>
where
    F: FnOnce(&str) -> Result<Option<String>, String>,
{
    let Some(content) = read_optional(path)? else {
        debug!(path = %path.display(), "surface absent, skipping");
        return Ok(false);
    };
    let patched = patch(&content).map_err(|message| WorkflowError::SurfaceParse {
        path: path.to_path_buf(),
        message,
    })?;
    match patched {
        Some(updated) => write_text(path, &updated).map(|()| true),
        None => Ok(false),
    }
}

/// Like [`patch_text`], but an unreadable file counts as already clean
fn patch_text_lenient<F>(path: &Path, patch: F) -> WorkflowResult<bool>
where
    F: FnOnce(&str) -> Option<String>,
{
    let content = match read_optional(path) {
        Ok(Some(content)) => content,
        Ok(None) => return Ok(false),
        Err(e) => {
            warn!(error = %e, "skipping removal from unreadable surface");
            return Ok(false);
        }
    };
    match patch(&content) {
        Some(updated) => write_text(path, &updated).map(|()| true),
        None => Ok(false),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::layout::WorkspaceLayout;
    use tempfile::TempDir;

    fn workspace(temp: &TempDir) -> Workspace {
        Workspace::new(temp.path(), WorkspaceLayout::default())
    }

    #[test]
    fn test_entries_for_interface_stack() {
        let temp = TempDir::new().unwrap();
        let ws = workspace(&temp);
        let entries = SurfaceEntry::for_stack(&ws, "demo", Stack::Interface);
        assert_eq!(
            entries,
            vec![
                SurfaceEntry::PackagePath("modules/demo/svelte".into()),
                SurfaceEntry::Registry {
                    id: "demo".into(),
                    src: "/modules/demo/svelte".into()
                },
            ]
        );
    }

    #[test]
    fn test_entries_for_service_stack() {
        let temp = TempDir::new().unwrap();
        let ws = workspace(&temp);
        assert_eq!(
            SurfaceEntry::for_stack(&ws, "demo", Stack::Service),
            vec![SurfaceEntry::Directive("./modules/demo/go".into())]
        );
    }

    #[test]
    fn test_add_registry_requires_document() {
        let temp = TempDir::new().unwrap();
        let ws = workspace(&temp);
        let err = ConfigSurfaces::new(&ws)
            .add_registry_entry("demo", "/modules/demo/svelte")
            .unwrap_err();
        assert_eq!(err.code(), "REGISTRY_MISSING");
    }

    #[test]
    fn test_add_registry_rejects_malformed_document() {
        let temp = TempDir::new().unwrap();
        let ws = workspace(&temp);
        fs::create_dir_all(ws.registry_path().parent().unwrap()).unwrap();
        fs::write(ws.registry_path(), "{ broken").unwrap();

        let surfaces = ConfigSurfaces::new(&ws);
        let err = surfaces.add_registry_entry("demo", "/x").unwrap_err();
        assert_eq!(err.code(), "PARSE_ERROR");
        // Removal treats the same document as nothing to do
        assert!(!surfaces.remove_registry_entry("demo").unwrap());
    }

    #[test]
    fn test_missing_text_surfaces_are_noops() {
        let temp = TempDir::new().unwrap();
        let ws = workspace(&temp);
        let surfaces = ConfigSurfaces::new(&ws);

        assert!(!surfaces.add_package_path("modules/demo/ts").unwrap());
        assert!(!surfaces.remove_package_path("modules/demo/ts").unwrap());
        assert!(!surfaces.add_directive("modules/demo/go").unwrap());
        assert!(!surfaces.remove_directive("modules/demo/go").unwrap());
        assert!(!ws.package_list_path().exists());
        assert!(!ws.directive_path().exists());
    }

    #[test]
    fn test_directive_path_is_normalized() {
        let temp = TempDir::new().unwrap();
        let ws = workspace(&temp);
        fs::write(ws.directive_path(), "go 1.22\n").unwrap();
        let surfaces = ConfigSurfaces::new(&ws);

        assert!(surfaces.add_directive("modules/demo/go").unwrap());
        assert!(!surfaces.add_directive("./modules/demo/go").unwrap());
        assert_eq!(
            fs::read_to_string(ws.directive_path()).unwrap(),
            "go 1.22\nuse ./modules/demo/go\n"
        );
        assert!(surfaces.contains(&SurfaceEntry::Directive("./modules/demo/go".into())));
    }

    #[test]
    fn test_inline_package_list_is_refused() {
        let temp = TempDir::new().unwrap();
        let ws = workspace(&temp);
        let original = "packages: ['apps/*', 'modules/demo/ts']\n";
        fs::write(ws.package_list_path(), original).unwrap();
        let surfaces = ConfigSurfaces::new(&ws);

        let err = surfaces.add_package_path("modules/demo/svelte").unwrap_err();
        assert_eq!(err.code(), "PARSE_ERROR");
        assert!(!surfaces.remove_package_path("modules/demo/ts").unwrap());
        assert_eq!(fs::read_to_string(ws.package_list_path()).unwrap(), original);
    }

    #[test]
    fn test_raw_snapshot_round_trip() {
        let temp = TempDir::new().unwrap();
        let ws = workspace(&temp);
        let surfaces = ConfigSurfaces::new(&ws);
        assert_eq!(surfaces.read_raw(Surface::Directive).unwrap(), None);

        surfaces.write_raw(Surface::Directive, "go 1.22\n").unwrap();
        assert_eq!(
            surfaces.read_raw(Surface::Directive).unwrap().as_deref(),
            Some("go 1.22\n")
        );
    }

    #[test]
    fn test_unreadable_package_list_fails_add_but_not_remove() {
        let temp = TempDir::new().unwrap();
        let ws = workspace(&temp);
        // A directory where the file should be cannot be read as text
        fs::create_dir(ws.package_list_path()).unwrap();
        let surfaces = ConfigSurfaces::new(&ws);

        assert!(surfaces.add_package_path("modules/demo/ts").is_err());
        assert!(!surfaces.remove_package_path("modules/demo/ts").unwrap());
    }
}
