//! Package-path list (`pnpm-workspace.yaml`) patching
//!
//! Edits are made line by line so comments and unrelated formatting in the
//! document survive untouched. Both functions return `None` when the
//! content would not change.

const HEADING: &str = "packages:";
const DEFAULT_INDENT: &str = "  ";

fn quoted(path: &str) -> [String; 2] {
    [format!("'{path}'"), format!("\"{path}\"")]
}

fn mentions(line: &str, forms: &[String; 2]) -> bool {
    forms.iter().any(|form| line.contains(form.as_str()))
}

fn is_list_item(line: &str) -> bool {
    line.trim_start().starts_with('-')
}

fn leading_whitespace(line: &str) -> &str {
    let trimmed = line.trim_start();
    &line[..line.len() - trimmed.len()]
}

/// Whether `packages:` carries its list inline, e.g. `packages: ['apps/*']`
///
/// Line patching only understands the block form, so callers refuse to
/// edit such a document.
#[must_use]
pub fn has_inline_list(content: &str) -> bool {
    content
        .lines()
        .filter_map(|line| line.trim_start().strip_prefix(HEADING))
        .any(|rest| {
            let value = rest.split('#').next().unwrap_or_default().trim();
            !value.is_empty()
        })
}

/// Insert `path` after the last item of the `packages:` list
#[must_use]
pub fn insert_package(content: &str, path: &str) -> Option<String> {
    let forms = quoted(path);
    if content.lines().any(|line| mentions(line, &forms)) {
        return None;
    }

    let crlf = content.contains("\r\n");
    let mut lines: Vec<&str> = content.split('\n').collect();

    let Some(heading) = lines
        .iter()
        .position(|line| line.trim_start().starts_with(HEADING))
    else {
        let separator = if content.is_empty() || content.ends_with('\n') {
            ""
        } else {
            "\n"
        };
        return Some(format!(
            "{content}{separator}{HEADING}\n{DEFAULT_INDENT}- '{path}'\n"
        ));
    };

    let mut insert_at = heading + 1;
    let mut indent = DEFAULT_INDENT;
    while insert_at < lines.len() && is_list_item(lines[insert_at]) {
        indent = leading_whitespace(lines[insert_at]);
        insert_at += 1;
    }

    let entry = format!("{indent}- '{path}'{}", if crlf { "\r" } else { "" });
    lines.insert(insert_at, &entry);
    Some(lines.join("\n"))
}

/// Drop every list item carrying the quoted `path`
#[must_use]
pub fn remove_package(content: &str, path: &str) -> Option<String> {
    let forms = quoted(path);
    let lines: Vec<&str> = content.split('\n').collect();
    let kept: Vec<&str> = lines
        .iter()
        .copied()
        .filter(|line| !(is_list_item(line) && mentions(line, &forms)))
        .collect();

    if kept.len() == lines.len() {
        None
    } else {
        Some(kept.join("\n"))
    }
}

/// Whether the quoted `path` appears anywhere in the list
#[must_use]
pub fn contains_package(content: &str, path: &str) -> bool {
    let forms = quoted(path);
    content.lines().any(|line| mentions(line, &forms))
}
