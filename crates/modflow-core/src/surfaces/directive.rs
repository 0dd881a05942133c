//! Build-workspace directive (`go.work`) patching
//!
//! Paths are compared in `./a/b` form, so `use modules/demo/go`,
//! `use ./modules/demo/go` and a bare `./modules/demo/go` entry inside a
//! `use ( ... )` block all name the same module.

use std::path::Path;

use crate::util::to_dot_relative;

/// Whether a single line names `path` as a used module
fn names_path(line: &str, path: &str) -> bool {
    let code = line.split("//").next().unwrap_or_default().trim();
    let code = code
        .strip_prefix("use")
        .filter(|rest| rest.starts_with(char::is_whitespace))
        .map_or(code, str::trim_start);
    let candidate = code.trim_matches('"');

    if candidate.is_empty() || candidate == "(" || candidate == ")" {
        return false;
    }
    to_dot_relative(Path::new(candidate)) == path
}

/// Append `use <path>` unless some line already names it
#[must_use]
pub fn insert_directive(content: &str, path: &str) -> Option<String> {
    if content.lines().any(|line| names_path(line, path)) {
        return None;
    }
    let separator = if content.is_empty() || content.ends_with('\n') {
        ""
    } else {
        "\n"
    };
    Some(format!("{content}{separator}use {path}\n"))
}

/// Drop the line(s) naming `path`
#[must_use]
pub fn remove_directive(content: &str, path: &str) -> Option<String> {
    let lines: Vec<&str> = content.split('\n').collect();
    let kept: Vec<&str> = lines
        .iter()
        .copied()
        .filter(|line| !names_path(line, path))
        .collect();

    if kept.len() == lines.len() {
        None
    } else {
        Some(kept.join("\n"))
    }
}

/// Whether any line names `path`
#[must_use]
pub fn contains_directive(content: &str, path: &str) -> bool {
    content.lines().any(|line| names_path(line, path))
}
