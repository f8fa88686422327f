use std::collections::{HashMap, HashSet};
use std::path::Path;

use crosstab::Value;
use log::warn;

pub fn simplify_file_name(path: &str) -> String {
    Path::new(path)
        .file_name()
        .and_then(|s| s.to_str())
        .unwrap_or(path)
        .to_string()
}

/// Guesses the input type from the extension of the file.
pub fn infer_provider(path: &str) -> Option<String> {
    let ext = Path::new(path).extension()?.to_str()?.to_lowercase();
    match ext.as_str() {
        "xlsx" | "xlsm" => Some("xlsx".to_string()),
        "csv" => Some("csv".to_string()),
        _ => None,
    }
}

/// The name of a header cell. Blank headers get a placeholder so that every
/// column can be referred to by name.
pub fn header_name(idx: usize, cell: Option<String>) -> String {
    match cell.map(|s| s.trim_start_matches('\u{feff}').trim().to_string()) {
        Some(s) if !s.is_empty() => s,
        _ => format!("Unnamed: {}", idx),
    }
}

/// Repeated column names get a `.1`, `.2`, ... suffix, in order of
/// appearance, so that every column keeps a distinct name.
pub fn unique_headers(names: Vec<String>) -> Vec<String> {
    let mut taken: HashSet<String> = HashSet::new();
    let mut next_suffix: HashMap<String, usize> = HashMap::new();
    let mut res: Vec<String> = Vec::with_capacity(names.len());
    for name in names {
        let mut candidate = name.clone();
        if taken.contains(&candidate) {
            let suffix = next_suffix.entry(name.clone()).or_insert(1);
            loop {
                candidate = format!("{}.{}", name, suffix);
                *suffix += 1;
                if !taken.contains(&candidate) {
                    break;
                }
            }
            warn!("Column {:?} appears more than once, renamed to {:?}", name, candidate);
        }
        taken.insert(candidate.clone());
        res.push(candidate);
    }
    res
}

/// Markers that spreadsheet exports use for an absent answer.
const MISSING_MARKERS: [&str; 7] = ["NA", "N/A", "#N/A", "NaN", "nan", "null", "NULL"];

/// A text cell. Blank cells and the missing markers are missing answers.
pub fn text_value(s: &str) -> Value {
    let trimmed = s.trim();
    if trimmed.is_empty() || MISSING_MARKERS.contains(&trimmed) {
        Value::Missing
    } else {
        Value::Text(s.to_string())
    }
}

/// Reads a cell that only exists as text (csv files).
pub fn parse_text_cell(s: &str) -> Value {
    let trimmed = s.trim();
    if let Ok(i) = trimmed.parse::<i64>() {
        return Value::Int(i);
    }
    match trimmed.parse::<f64>() {
        Ok(f) if f.is_finite() => Value::Float(f),
        _ => text_value(s),
    }
}
