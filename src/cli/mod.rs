//! Terminal rendering for the CLI.

use serde::Serialize;
use serde_json::Value;

use crate::api::ApiResponse;
use crate::error::ClientResult;

const MAX_COL_WIDTH: usize = 40;

/// The printable body of a response. A success without a body (204, empty text) is
/// `Ok(None)`.
pub fn response_value<T: Serialize>(resp: ApiResponse<T>) -> ClientResult<Option<Value>> {
    match resp.into_option()? {
        Some(data) => Ok(Some(serde_json::to_value(&data)?)),
        None => Ok(None),
    }
}

/// Prints a list of records (or a paginated envelope holding one) as an ASCII table.
/// Returns false when `val` has no rows to show, so the caller can fall back to JSON.
pub fn print_records(val: &Value) -> bool {
    let rows_v = match val {
        Value::Array(_) => val,
        Value::Object(map) => match map.get("results") {
            Some(r @ Value::Array(_)) => r,
            _ => return false,
        },
        _ => return false,
    };
    let Some((cols, rows)) = to_table(rows_v) else { return false };
    if rows.is_empty() { return false; }

    let mut widths: Vec<usize> = cols.iter().map(|c| display_len(c).min(MAX_COL_WIDTH)).collect();
    for r in &rows {
        for (i, cell) in r.iter().enumerate() {
            widths[i] = widths[i].max(display_len(cell).min(MAX_COL_WIDTH));
        }
    }
    let sep = build_separator(&widths);
    println!("{}", sep);
    println!("{}", build_row(&cols, &widths));
    println!("{}", sep);
    for r in &rows {
        println!("{}", build_row(r, &widths));
    }
    println!("{}", sep);
    let mut summary = format!("rows: {}", rows.len());
    if let Some(total) = val.get("count").and_then(Value::as_u64) {
        summary.push_str(&format!(" of {}", total));
    }
    println!("{}", summary);
    true
}

/// Columns are the union of scalar-valued keys across all objects, sorted.
fn to_table(v: &Value) -> Option<(Vec<String>, Vec<Vec<String>>)> {
    let arr = v.as_array()?;
    let mut cols: Vec<String> = Vec::new();
    for el in arr {
        let obj = el.as_object()?;
        for (k, v) in obj {
            if !v.is_object() && !v.is_array() && !cols.contains(k) {
                cols.push(k.clone());
            }
        }
    }
    cols.sort();
    let rows = arr
        .iter()
        .filter_map(Value::as_object)
        .map(|obj| cols.iter().map(|c| obj.get(c).map(to_cell_string).unwrap_or_default()).collect())
        .collect();
    Some((cols, rows))
}

fn to_cell_string(v: &Value) -> String {
    match v {
        Value::Null => String::new(),
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

fn display_len(s: &str) -> usize { s.chars().count() }

fn build_separator(widths: &[usize]) -> String {
    let mut s = String::from("+");
    for w in widths {
        s.push_str(&"-".repeat(*w + 2));
        s.push('+');
    }
    s
}

fn build_row(cells: &[String], widths: &[usize]) -> String {
    let mut s = String::from("|");
    for (i, w) in widths.iter().enumerate() {
        let cell = cells.get(i).map(String::as_str).unwrap_or("");
        let text = truncate(cell, *w);
        let pad = " ".repeat(w.saturating_sub(display_len(&text)));
        if is_numeric_like(cell) {
            s.push_str(&format!(" {}{} |", pad, text));
        } else {
            s.push_str(&format!(" {}{} |", text, pad));
        }
    }
    s
}

fn truncate(s: &str, max: usize) -> String {
    if display_len(s) <= max { return s.to_string(); }
    if max <= 1 { return "…".to_string(); }
    s.chars().take(max - 1).collect::<String>() + "…"
}

fn is_numeric_like(s: &str) -> bool {
    let st = s.trim();
    !st.is_empty() && st.chars().any(|c| c.is_ascii_digit()) && st.chars().all(|c| c.is_ascii_digit() || ".-+eE".contains(c))
}
