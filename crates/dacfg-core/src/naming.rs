//! Name synthesis: turn the distinct attributes of a collection into one
//! compact, column-aligned label per record.

use std::sync::LazyLock;

use indexmap::IndexMap;
use regex::Regex;

use crate::value::Value;

static WHITESPACE_RUN: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\s+").unwrap());

/// Collapse whitespace runs to single spaces and trim the ends.
pub fn collapse_whitespace(s: &str) -> String {
    WHITESPACE_RUN.replace_all(s.trim(), " ").into_owned()
}

/// Column marker for the key at `position` among the distinct keys.
///
/// The leading column gets no marker. Others get a space, the first two
/// characters of the key, its last character (for keys longer than one
/// character) and a colon: `inflation` -> `" inn:"`.
pub fn column_label(key: &str, position: usize) -> String {
    if position == 0 {
        return String::new();
    }
    let mut label = String::from(" ");
    label.extend(key.chars().take(2));
    if key.chars().count() > 1
        && let Some(last) = key.chars().last()
    {
        label.push(last);
    }
    label.push(':');
    label
}

/// Abbreviate each value and right-pad to the widest in the column.
pub fn typeset(values: &[Value]) -> Vec<String> {
    let formatted: Vec<String> = values.iter().map(Value::abbreviated).collect();
    let width = formatted
        .iter()
        .map(|s| s.chars().count())
        .max()
        .unwrap_or(0);
    formatted
        .into_iter()
        .map(|s| format!("{s:<width$}"))
        .collect()
}

/// One name per record, from the ordered distinct attributes of a
/// collection with `len` records.
///
/// Records lacking a key get blanks in place of that column's marker so
/// the remaining columns stay aligned.
pub fn synthesize_names(distinct: &IndexMap<String, Vec<Value>>, len: usize) -> Vec<String> {
    let mut names = vec![String::new(); len];
    for (position, (key, values)) in distinct.iter().enumerate() {
        let label = column_label(key, position);
        let blank = " ".repeat(label.chars().count());
        for ((name, value), cell) in names.iter_mut().zip(values).zip(typeset(values)) {
            name.push_str(if value.is_none() { &blank } else { &label });
            name.push_str(&cell);
        }
    }
    names
}
