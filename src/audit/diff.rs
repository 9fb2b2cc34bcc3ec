//! Change summaries for audit entries

use std::collections::BTreeSet;

use serde_json::Value;

/// Fields that change on every write and carry no information for a reader
const IGNORED_FIELDS: &[&str] = &["updated_at"];

const MAX_SHOWN_CHARS: usize = 40;

/// Describe the top-level differences between two entity states.
///
/// Returns `None` when nothing but bookkeeping fields changed.
pub fn summarize_changes(before: &Value, after: &Value) -> Option<String> {
    let (Value::Object(old), Value::Object(new)) = (before, after) else {
        return (before != after).then(|| format!("{} -> {}", show(before), show(after)));
    };

    let keys: BTreeSet<&String> = old.keys().chain(new.keys()).collect();
    let changes: Vec<String> = keys
        .into_iter()
        .filter(|key| !IGNORED_FIELDS.contains(&key.as_str()))
        .filter_map(|key| match (old.get(key), new.get(key)) {
            (Some(a), Some(b)) if a != b => Some(format!("{}: {} -> {}", key, show(a), show(b))),
            (Some(a), None) => Some(format!("{}: {} -> (removed)", key, show(a))),
            (None, Some(b)) => Some(format!("{}: (added) -> {}", key, show(b))),
            _ => None,
        })
        .collect();

    (!changes.is_empty()).then(|| changes.join(", "))
}

fn show(value: &Value) -> String {
    match value {
        Value::String(s) if s.chars().count() > MAX_SHOWN_CHARS => {
            let head: String = s.chars().take(MAX_SHOWN_CHARS - 3).collect();
            format!("\"{}...\"", head)
        }
        Value::Array(items) => format!("[{} items]", items.len()),
        Value::Object(fields) => format!("{{{} fields}}", fields.len()),
        other => other.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_reports_modified_added_removed() {
        let before = json!({"name": "Groceries", "color": "#fff", "icon": "cart"});
        let after = json!({"name": "Food", "color": "#fff", "archived": true});

        let summary = summarize_changes(&before, &after).unwrap();
        assert_eq!(
            summary,
            "archived: (added) -> true, icon: \"cart\" -> (removed), name: \"Groceries\" -> \"Food\""
        );
    }

    #[test]
    fn test_ignores_updated_at() {
        let before = json!({"name": "Rent", "updated_at": "2025-01-01T00:00:00Z"});
        let after = json!({"name": "Rent", "updated_at": "2025-02-01T00:00:00Z"});
        assert_eq!(summarize_changes(&before, &after), None);
    }

    #[test]
    fn test_truncates_long_strings_on_char_boundary() {
        let long = "é".repeat(60);
        let summary = summarize_changes(&json!({"d": long}), &json!({"d": "x"})).unwrap();
        assert!(summary.starts_with("d: \""));
        assert!(summary.contains("...\" -> \"x\""));
    }

    #[test]
    fn test_scalars() {
        assert_eq!(
            summarize_changes(&json!(1), &json!(2)).as_deref(),
            Some("1 -> 2")
        );
        assert_eq!(summarize_changes(&json!(1), &json!(1)), None);
    }
}
