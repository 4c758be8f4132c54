use serde::Serialize;
use serde_json::{Map, Value};

use crate::cli::OutputFormat;
use crate::ui;

pub mod table;

/// Render a serializable response to a string in the requested format.
pub fn render<T: Serialize>(value: &T, format: OutputFormat) -> anyhow::Result<String> {
    match format {
        OutputFormat::Json => Ok(serde_json::to_string_pretty(value)?),
        OutputFormat::Table => render_table(value),
        OutputFormat::Raw => Ok(serde_json::to_string(value)?),
    }
}

/// Print a serializable response in the requested format.
pub fn output<T: Serialize>(value: &T, format: OutputFormat) -> anyhow::Result<()> {
    let rendered = render(value, format)?;
    println!("{rendered}");
    Ok(())
}

fn options() -> table::TableOptions {
    table::TableOptions {
        max_width: ui::prefs().term_width,
    }
}

fn render_table<T: Serialize>(value: &T) -> anyhow::Result<String> {
    let value = serde_json::to_value(value)?;
    Ok(match value {
        Value::Array(items) => render_array_table(&items),
        Value::Object(map) => render_object(map),
        scalar => table::render_table(&["value"], &[vec![value_to_cell(&scalar)]], options()),
    })
}

/// Scalars become `key | value` rows; arrays of objects follow as their own tables.
fn render_object(map: Map<String, Value>) -> String {
    let mut rows = Vec::new();
    let mut nested = Vec::new();
    for (key, value) in map {
        match value {
            Value::Array(items) if items.iter().any(Value::is_object) => nested.push((key, items)),
            other => rows.push(vec![key, value_to_cell(&other)]),
        }
    }
    rows.sort_by(|a, b| a[0].cmp(&b[0]));

    let mut sections = vec![table::render_table(&["key", "value"], &rows, options())];
    for (key, items) in nested {
        if !items.is_empty() {
            sections.push(format!("\n{key}:\n{}", render_array_table(&items)));
        }
    }
    sections.join("\n")
}

fn render_array_table(items: &[Value]) -> String {
    if items.is_empty() {
        return String::from("(no rows)");
    }

    if !items.iter().all(Value::is_object) {
        let rows = items
            .iter()
            .map(|item| vec![value_to_cell(item)])
            .collect::<Vec<_>>();
        return table::render_table(&["value"], &rows, options());
    }

    let mut headers = Vec::<String>::new();
    for map in items.iter().filter_map(Value::as_object) {
        for key in map.keys() {
            if !headers.contains(key) {
                headers.push(key.clone());
            }
        }
    }

    let header_refs = headers.iter().map(String::as_str).collect::<Vec<_>>();
    let rows = items
        .iter()
        .filter_map(Value::as_object)
        .map(|map| {
            headers
                .iter()
                .map(|header| map.get(header).map_or_else(|| String::from("-"), value_to_cell))
                .collect::<Vec<_>>()
        })
        .collect::<Vec<_>>();

    table::render_table(&header_refs, &rows, options())
}

fn value_to_cell(value: &Value) -> String {
    match value {
        Value::Null => String::from("-"),
        Value::Bool(v) => v.to_string(),
        Value::Number(v) => v.to_string(),
        Value::String(v) => v.clone(),
        other => serde_json::to_string(other).unwrap_or_else(|_| String::from("<invalid-json>")),
    }
}

#[cfg(test)]
mod tests {
    use serde::Serialize;

    use super::render;
    use crate::cli::OutputFormat;

    #[derive(Serialize)]
    struct Failure {
        path: &'static str,
        stage: &'static str,
    }

    #[derive(Serialize)]
    struct Summary {
        files: u32,
        results_file: &'static str,
        report_file: Option<&'static str>,
        failures: Vec<Failure>,
    }

    fn summary() -> Summary {
        Summary {
            files: 3,
            results_file: "qc_results_BJM.json",
            report_file: None,
            failures: vec![Failure {
                path: "broken.nwb",
                stage: "connect",
            }],
        }
    }

    #[test]
    fn json_render_is_valid_json() {
        let out = render(&summary(), OutputFormat::Json).expect("json render should work");
        let parsed: serde_json::Value = serde_json::from_str(&out).expect("json should parse");
        assert_eq!(parsed["files"], 3);
        assert_eq!(parsed["failures"][0]["stage"], "connect");
    }

    #[test]
    fn raw_render_is_single_line_json() {
        let out = render(&summary(), OutputFormat::Raw).expect("raw render should work");
        assert!(!out.contains('\n'));
    }

    #[test]
    fn table_render_lists_nested_rows_separately() {
        let out = render(&summary(), OutputFormat::Table).expect("table render should work");
        let lines: Vec<&str> = out.lines().collect();

        assert!(lines[0].starts_with("key"));
        assert!(lines[1].chars().all(|c| c == '-'));
        assert!(out.contains("qc_results_BJM.json"));
        assert!(lines.iter().any(|line| line.starts_with("report_file") && line.ends_with('-')));
        assert!(out.contains("failures:"));
        assert!(
            lines
                .iter()
                .any(|line| line.starts_with("broken.nwb") && line.contains("connect"))
        );
    }
}
