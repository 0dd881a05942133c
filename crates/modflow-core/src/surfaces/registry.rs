//! Registry document (`modules.json`) editing

use serde_json::{json, Map, Value};

const MODULES_KEY: &str = "modules";

/// Insert or replace `modules.<id>`; returns whether the document changed
///
/// # Errors
/// Returns a message if the document or its `modules` value is not an object
pub fn insert_entry(doc: &mut Value, id: &str, src: &str) -> Result<bool, String> {
    let root = doc
        .as_object_mut()
        .ok_or_else(|| "registry root is not an object".to_string())?;
    let modules = root
        .entry(MODULES_KEY)
        .or_insert_with(|| Value::Object(Map::new()))
        .as_object_mut()
        .ok_or_else(|| format!("'{MODULES_KEY}' is not an object"))?;

    let entry = json!({ "id": id, "src": src });
    if modules.get(id) == Some(&entry) {
        return Ok(false);
    }
    modules.insert(id.to_string(), entry);
    Ok(true)
}

/// Remove `modules.<id>` if present; returns whether the document changed
pub fn remove_entry(doc: &mut Value, id: &str) -> bool {
    doc.get_mut(MODULES_KEY)
        .and_then(Value::as_object_mut)
        .and_then(|modules| modules.shift_remove(id))
        .is_some()
}

/// Whether `modules.<id>` is present
#[must_use]
pub fn contains_entry(doc: &Value, id: &str) -> bool {
    doc.get(MODULES_KEY)
        .and_then(|modules| modules.get(id))
        .is_some()
}

/// `src` recorded for `modules.<id>`
#[must_use]
pub fn entry_src<'a>(doc: &'a Value, id: &str) -> Option<&'a str> {
    doc.get(MODULES_KEY)?.get(id)?.get("src")?.as_str()
}

/// Two-space pretty JSON with a trailing newline
///
/// # Errors
/// Returns an error if serialization fails
pub fn render(doc: &Value) -> serde_json::Result<String> {
    let mut out = serde_json::to_string_pretty(doc)?;
    out.push('\n');
    Ok(out)
}
