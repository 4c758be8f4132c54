//! Flattening of nested boolean trees into failed-check paths.

use serde_json::Value;

/// Collect every `false` leaf of a nested boolean tree as a
/// `"k1/k2/.../kn failed."` line.
///
/// Keys are visited in sorted order. Non-boolean leaves and `true` are
/// ignored, and a non-object root yields nothing.
#[must_use]
pub fn failed_check_paths(tree: &Value) -> Vec<String> {
    let mut failed = Vec::new();
    if let Value::Object(map) = tree {
        let mut keys: Vec<&String> = map.keys().collect();
        keys.sort();
        for key in keys {
            collect(key, &map[key], &mut failed);
        }
    }
    failed
}

fn collect(path: &str, value: &Value, failed: &mut Vec<String>) {
    match value {
        Value::Object(map) => {
            let mut keys: Vec<&String> = map.keys().collect();
            keys.sort();
            for key in keys {
                collect(&format!("{path}/{key}"), &map[key], failed);
            }
        }
        Value::Bool(false) => failed.push(format!("{path} failed.")),
        _ => {}
    }
}
