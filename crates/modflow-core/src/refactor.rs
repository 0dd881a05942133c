//! Bulk literal rename inside a module tree
//!
//! Candidate files come from a lazy `walkdir` traversal that prunes
//! version-control and build-artifact directories and drops known binary
//! extensions before anything is read. Per-file problems are collected as
//! warnings and never stop the walk.

use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};
use walkdir::{DirEntry, WalkDir};

use crate::error::{WorkflowError, WorkflowResult};

/// Entry names never descended into or rewritten
pub const SKIPPED_NAMES: &[&str] = &[".git", "node_modules", "dist", "coverage"];

/// Extensions treated as binary without looking at the content
pub const BINARY_EXTENSIONS: &[&str] = &["png", "jpg", "jpeg", "gif", "ico", "pdf", "exe", "bin"];

/// A file that could not be processed
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RefactorWarning {
    pub path: PathBuf,
    pub message: String,
}

/// Summary of a bulk rename
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RefactorReport {
    /// Candidate files read
    pub files_scanned: usize,
    /// Files whose content changed
    pub files_rewritten: usize,
    pub warnings: Vec<RefactorWarning>,
}

fn is_skipped(entry: &DirEntry) -> bool {
    entry.depth() > 0
        && entry
            .file_name()
            .to_str()
            .is_some_and(|name| SKIPPED_NAMES.contains(&name))
}

fn has_binary_extension(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| {
            BINARY_EXTENSIONS
                .iter()
                .any(|binary| binary.eq_ignore_ascii_case(ext))
        })
}

/// Lazily yield files under `root` that are eligible for rewriting
///
/// Each call starts a fresh traversal. Walk errors are yielded rather than
/// dropped so callers can report them.
pub fn candidate_files(root: &Path) -> impl Iterator<Item = Result<PathBuf, walkdir::Error>> {
    WalkDir::new(root)
        .into_iter()
        .filter_entry(|entry| !is_skipped(entry))
        .filter_map(|entry| match entry {
            Ok(entry) if entry.file_type().is_file() && !has_binary_extension(entry.path()) => {
                Some(Ok(entry.into_path()))
            }
            Ok(_) => None,
            Err(e) => Some(Err(e)),
        })
}

/// Replace every literal `old` with `new` in text files under `root`
///
/// Files that are not valid UTF-8, or cannot be read or written, become
/// warnings in the report.
///
/// # Errors
/// Returns `Refactor` only if `root` is not a directory
pub fn replace_in_tree(root: &Path, old: &str, new: &str) -> WorkflowResult<RefactorReport> {
    if !root.is_dir() {
        return Err(WorkflowError::Refactor {
            path: root.to_path_buf(),
            message: "not a directory".to_string(),
        });
    }

    let mut report = RefactorReport::default();
    for candidate in candidate_files(root) {
        let path = match candidate {
            Ok(path) => path,
            Err(e) => {
                let path = e.path().map(Path::to_path_buf).unwrap_or_else(|| root.to_path_buf());
                report.push_warning(path, e.to_string());
                continue;
            }
        };

        report.files_scanned += 1;
        match rewrite_file(&path, old, new) {
            Ok(true) => {
                debug!(path = %path.display(), "rewrote");
                report.files_rewritten += 1;
            }
            Ok(false) => {}
            Err(message) => report.push_warning(path, message),
        }
    }

    Ok(report)
}

impl RefactorReport {
    fn push_warning(&mut self, path: PathBuf, message: String) {
        warn!(path = %path.display(), %message, "skipping file during refactor");
        self.warnings.push(RefactorWarning { path, message });
    }
}

fn rewrite_file(path: &Path, old: &str, new: &str) -> Result<bool, String> {
    let bytes = fs::read(path).map_err(|e| format!("read failed: {e}"))?;
    let Ok(content) = String::from_utf8(bytes) else {
        return Err("not valid UTF-8, left untouched".to_string());
    };

    if !content.contains(old) {
        return Ok(false);
    }
    fs::write(path, content.replace(old, new)).map_err(|e| format!("write failed: {e}"))?;
    Ok(true)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn module_tree() -> TempDir {
        let temp = TempDir::new().unwrap();
        let root = temp.path();
        fs::create_dir_all(root.join("svelte/src")).unwrap();
        fs::create_dir_all(root.join("svelte/node_modules/dep")).unwrap();
        fs::create_dir_all(root.join("ts/dist")).unwrap();
        fs::write(root.join("svelte/src/index.ts"), "export const demo = 'demo';\n").unwrap();
        fs::write(root.join("svelte/node_modules/dep/index.js"), "demo").unwrap();
        fs::write(root.join("ts/dist/index.js"), "demo").unwrap();
        fs::write(root.join(".git"), "gitdir: ../../.git/modules/modules/demo\n").unwrap();
        fs::write(root.join("logo.PNG"), b"demo\x89PNG").unwrap();
        temp
    }

    #[test]
    fn test_candidates_skip_artifacts_and_binaries() {
        let temp = module_tree();
        let mut found: Vec<PathBuf> = candidate_files(temp.path())
            .map(Result::unwrap)
            .map(|p| p.strip_prefix(temp.path()).unwrap().to_path_buf())
            .collect();
        found.sort();
        assert_eq!(found, vec![PathBuf::from("svelte/src/index.ts")]);
    }

    #[test]
    fn test_candidates_are_restartable() {
        let temp = module_tree();
        let first = candidate_files(temp.path()).count();
        let second = candidate_files(temp.path()).count();
        assert_eq!(first, second);
    }

    #[test]
    fn test_replace_rewrites_text_only() {
        let temp = module_tree();
        let report = replace_in_tree(temp.path(), "demo", "demo2").unwrap();

        assert_eq!(report.files_scanned, 1);
        assert_eq!(report.files_rewritten, 1);
        assert_eq!(
            fs::read_to_string(temp.path().join("svelte/src/index.ts")).unwrap(),
            "export const demo2 = 'demo2';\n"
        );
        assert_eq!(fs::read(temp.path().join("logo.PNG")).unwrap(), b"demo\x89PNG");
        assert_eq!(
            fs::read_to_string(temp.path().join(".git")).unwrap(),
            "gitdir: ../../.git/modules/modules/demo\n"
        );
    }

    #[test]
    fn test_non_utf8_file_is_warning() {
        let temp = TempDir::new().unwrap();
        fs::write(temp.path().join("data.raw"), [0xff, 0xfe, b'd']).unwrap();

        let report = replace_in_tree(temp.path(), "demo", "demo2").unwrap();
        assert_eq!(report.files_rewritten, 0);
        assert_eq!(report.warnings.len(), 1);
        assert_eq!(fs::read(temp.path().join("data.raw")).unwrap(), [0xff, 0xfe, b'd']);
    }

    #[test]
    fn test_missing_root_is_error() {
        let temp = TempDir::new().unwrap();
        let err = replace_in_tree(&temp.path().join("absent"), "a", "b").unwrap_err();
        assert_eq!(err.code(), "REFACTOR_FAILED");
    }
}
