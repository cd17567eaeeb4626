//! Plain-text comparison table for a collection.

use dacfg_core::{ConfigCollection, LIVEPLOTTING_KEY, Value};

/// Distinct attributes as columns, one row per record, followed by the
/// shared attributes.
pub fn render(cfgs: &ConfigCollection) -> String {
    if cfgs.is_empty() {
        return "ConfigCollection()".to_string();
    }
    let p = cfgs.partition();

    let columns: Vec<(&str, Vec<String>)> = p
        .distinct
        .iter()
        .filter(|(key, _)| key.as_str() != LIVEPLOTTING_KEY)
        .map(|(key, values)| (key.as_str(), values.iter().map(cell).collect()))
        .collect();

    let widths: Vec<usize> = columns
        .iter()
        .map(|(key, cells)| {
            cells
                .iter()
                .map(|c| c.chars().count())
                .chain(std::iter::once(key.chars().count()))
                .max()
                .unwrap_or(0)
        })
        .collect();

    let mut out = String::new();
    push_row(&mut out, columns.iter().map(|(key, _)| *key), &widths);
    let rule: Vec<String> = widths.iter().map(|w| "-".repeat(*w)).collect();
    push_row(&mut out, rule.iter().map(String::as_str), &widths);
    for row in 0..cfgs.len() {
        push_row(
            &mut out,
            columns.iter().map(|(_, cells)| cells[row].as_str()),
            &widths,
        );
    }

    out.push_str("---\nAll: {");
    for (i, (key, value)) in p.common.iter().enumerate() {
        if i > 0 {
            out.push_str(", ");
        }
        out.push_str(&format!("{key}: {value}"));
    }
    out.push('}');
    out
}

fn cell(value: &Value) -> String {
    match value {
        Value::None => String::new(),
        other => other.to_string(),
    }
}

fn push_row<'a>(out: &mut String, cells: impl Iterator<Item = &'a str>, widths: &[usize]) {
    let line: Vec<String> = cells
        .zip(widths)
        .map(|(c, w)| format!("{c:<w$}"))
        .collect();
    out.push_str(line.join("  ").trim_end());
    out.push('\n');
}
