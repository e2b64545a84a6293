//! Lead import files are JSON Lines; each line is checked against `new_lead`.

use keel_core::entities::NewLead;
use keel_schema::{SchemaError, SchemaRegistry};
use pretty_assertions::assert_eq;
use serde_jsonlines::json_lines;

#[test]
fn validates_each_line_of_an_import_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("leads.jsonl");
    std::fs::write(
        &path,
        concat!(
            r#"{"company":"Acme","value":1200,"probability":30}"#,
            "\n",
            r#"{"value":50}"#,
            "\n",
            r#"{"company":"Globex","stage":"proposal"}"#,
            "\n",
        ),
    )
    .unwrap();

    let reg = SchemaRegistry::new();
    let results: Vec<Result<NewLead, SchemaError>> = json_lines::<serde_json::Value, _>(&path)
        .unwrap()
        .map(|line| reg.parse("new_lead", line.unwrap()))
        .collect();

    assert_eq!(results.len(), 3);
    assert!(results[0].is_ok());
    assert!(matches!(results[1], Err(SchemaError::ValidationFailed { .. })));
    assert_eq!(results[2].as_ref().unwrap().company, "Globex");
}
