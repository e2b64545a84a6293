use serde::Serialize;
use serde_json::Value;

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

fn table_options() -> table::TableOptions {
    let prefs = ui::prefs();
    table::TableOptions {
        max_width: prefs.term_width,
        color: prefs.table_color,
    }
}

fn render_table<T: Serialize>(value: &T) -> anyhow::Result<String> {
    let value = serde_json::to_value(value)?;
    match value {
        Value::Array(items) => Ok(render_rows(&items)),
        Value::Object(map) => {
            let headers = ["field", "value"];
            let mut entries = map.into_iter().collect::<Vec<_>>();
            entries.sort_by(|a, b| a.0.cmp(&b.0));
            let rows = entries
                .into_iter()
                .map(|(key, value)| vec![key, value_to_cell(&value)])
                .collect::<Vec<_>>();
            Ok(table::render_entity_table(&headers, &rows, table_options()))
        }
        scalar => {
            let rows = vec![vec![value_to_cell(&scalar)]];
            Ok(table::render_entity_table(&["value"], &rows, table_options()))
        }
    }
}

/// One row per record, one column per field seen on any record.
fn render_rows(items: &[Value]) -> String {
    if items.is_empty() {
        return String::from("(no rows)");
    }

    if !items.iter().all(Value::is_object) {
        let rows = items
            .iter()
            .map(|item| vec![value_to_cell(item)])
            .collect::<Vec<_>>();
        return table::render_entity_table(&["value"], &rows, table_options());
    }

    let mut headers = Vec::<String>::new();
    for map in items.iter().filter_map(Value::as_object) {
        for key in map.keys() {
            // Tenant scope is implied by the config; it only adds width.
            if key != "org_id" && !headers.contains(key) {
                headers.push(key.clone());
            }
        }
    }
    if headers.is_empty() {
        return String::from("(no columns)");
    }
    headers.sort_by(|a, b| column_rank(a).cmp(&column_rank(b)).then_with(|| a.cmp(b)));

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

    table::render_entity_table(&header_refs, &rows, table_options())
}

/// `id` first, timestamps last, everything else alphabetical in between.
fn column_rank(header: &str) -> u8 {
    match header {
        "id" => 0,
        "created_at" | "updated_at" => 2,
        _ => 1,
    }
}

fn value_to_cell(value: &Value) -> String {
    match value {
        Value::Null => String::from("-"),
        Value::Bool(v) => v.to_string(),
        Value::Number(v) if v.is_f64() => v
            .as_f64()
            .map_or_else(|| v.to_string(), format_amount),
        Value::Number(v) => v.to_string(),
        Value::String(v) => v.clone(),
        Value::Array(items) if items.iter().all(Value::is_string) => items
            .iter()
            .filter_map(Value::as_str)
            .collect::<Vec<_>>()
            .join(","),
        other => serde_json::to_string(other).unwrap_or_else(|_| String::from("<invalid-json>")),
    }
}

/// Whole numbers print bare; everything else with two decimals.
fn format_amount(value: f64) -> String {
    if value.fract().abs() < f64::EPSILON && value.abs() < 1e15 {
        format!("{value:.0}")
    } else {
        format!("{value:.2}")
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use serde::Serialize;
    use serde_json::json;

    use super::{render, table::render_entity_table, value_to_cell};
    use crate::cli::OutputFormat;

    #[derive(Serialize)]
    struct Lead {
        id: &'static str,
        company: &'static str,
        value: f64,
    }

    fn lead() -> Lead {
        Lead {
            id: "led-1",
            company: "Acme",
            value: 1250.5,
        }
    }

    #[test]
    fn json_render_is_valid_json() {
        let out = render(&lead(), OutputFormat::Json).expect("json render should work");
        let parsed: serde_json::Value = serde_json::from_str(&out).expect("json should parse");
        assert_eq!(parsed["id"], "led-1");
        assert_eq!(parsed["value"], 1250.5);
    }

    #[test]
    fn raw_render_is_single_line_json() {
        let out = render(&lead(), OutputFormat::Raw).expect("raw render should work");
        let parsed: serde_json::Value = serde_json::from_str(&out).expect("json should parse");
        assert_eq!(parsed["company"], "Acme");
        assert!(!out.contains('\n'));
    }

    #[test]
    fn table_render_for_object_is_field_value_pairs() {
        let out = render(&lead(), OutputFormat::Table).expect("table render should work");
        assert!(out.lines().next().is_some_and(|line| line.contains("field")));
        assert!(out.contains("company"));
        assert!(out.contains("1250.50"));
    }

    #[test]
    fn table_render_for_list_puts_id_first_and_hides_org() {
        let rows = json!([
            {"id": "prj-1", "org_id": "org_acme", "name": "Atlas", "created_at": "2026-01-01"},
            {"id": "prj-2", "org_id": "org_acme", "name": "Borealis", "created_at": "2026-01-02"}
        ]);
        let out = render(&rows, OutputFormat::Table).expect("table render should work");
        let header = out.lines().next().expect("header line");
        assert!(header.starts_with("id"));
        assert!(header.trim_end().ends_with("created_at"));
        assert!(!out.contains("org_acme"));
    }

    #[test]
    fn empty_list_renders_placeholder() {
        let rows: Vec<Lead> = Vec::new();
        let out = render(&rows, OutputFormat::Table).expect("table render should work");
        assert_eq!(out, "(no rows)");
    }

    #[test]
    fn cells_format_amounts_and_tags() {
        assert_eq!(value_to_cell(&json!(12.0)), "12");
        assert_eq!(value_to_cell(&json!(12.345)), "12.35");
        assert_eq!(value_to_cell(&json!(["ops", "sales"])), "ops,sales");
        assert_eq!(value_to_cell(&json!(null)), "-");
    }

    #[test]
    fn table_alignment_handles_mixed_widths() {
        let headers = ["id", "status", "title"];
        let rows = vec![
            vec!["dtk-1".to_string(), "todo".to_string(), "short".to_string()],
            vec![
                "dtk-200".to_string(),
                "in_progress".to_string(),
                "a much longer title".to_string(),
            ],
        ];

        let table = render_entity_table(
            &headers,
            &rows,
            super::table::TableOptions {
                max_width: None,
                color: false,
            },
        );
        let lines: Vec<&str> = table.lines().collect();

        assert_eq!(lines.len(), 4);
        assert!(lines[0].contains("status"));
        assert!(lines[1].chars().all(|c| c == '-'));
    }
}
