//! Draft display formatting

use serde_json::{Map, Value};

use crate::audit::format_for_display;
use crate::models::{humanize_field, DraftRecord, FormDraft};

use super::truncate;

/// Format a draft's fields, nested objects and list entries
pub fn format_draft_details(draft: &FormDraft) -> String {
    let kind = draft.kind();
    let mut output = String::new();

    output.push_str(&format!("Log:       {} ({})\n", kind.entity_type(), kind));
    output.push_str(&format!("Report:    {}\n\n", draft.report_id()));

    let mut nested = Vec::new();
    let mut lists = Vec::new();

    for (key, value) in draft.values() {
        match value {
            Value::Object(object) => nested.push((key, object)),
            Value::Array(items) => lists.push((key, items)),
            _ => {
                let marker = if kind.derived_fields().contains(&key.as_str()) {
                    " (computed)"
                } else {
                    ""
                };
                output.push_str(&format!(
                    "  {:22} {}{}\n",
                    humanize_field(key),
                    format_for_display(value),
                    marker
                ));
            }
        }
    }

    for (key, object) in nested {
        output.push_str(&format!("\n{}:\n", kind.nested_label_for(key)));
        push_object(&mut output, object, "    ");
    }

    for (key, items) in lists {
        output.push_str(&format!("\n{} ({}):\n", humanize_field(key), items.len()));
        for item in items.iter().filter_map(Value::as_object) {
            let id = item.get("id").and_then(Value::as_str).unwrap_or("?");
            let label = item.get("label").and_then(Value::as_str).unwrap_or("");
            output.push_str(&format!("  [{}] {}\n", id, label));

            let fields: Map<String, Value> = item
                .iter()
                .filter(|(k, _)| k.as_str() != "id" && k.as_str() != "label")
                .map(|(k, v)| (k.clone(), v.clone()))
                .collect();
            push_object(&mut output, &fields, "      ");
        }
    }

    output
}

fn push_object(output: &mut String, object: &Map<String, Value>, indent: &str) {
    for (key, value) in object {
        output.push_str(&format!(
            "{}{:20} {}\n",
            indent,
            humanize_field(key),
            format_for_display(value)
        ));
    }
}

/// Format saved drafts as a list
pub fn format_draft_list(records: &[DraftRecord]) -> String {
    if records.is_empty() {
        return "No drafts found.\n".to_string();
    }

    let mut output = String::new();
    output.push_str(&format!("{:10} {:20} {}\n", "Kind", "Report", "Updated"));
    output.push_str(&"-".repeat(50));
    output.push('\n');

    for record in records {
        output.push_str(&format!(
            "{} {} {}\n",
            truncate(record.kind.slug(), 10),
            truncate(&record.report_id, 20),
            record.updated_at.format("%Y-%m-%d %H:%M")
        ));
    }

    output
}
