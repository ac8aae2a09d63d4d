//! Loading previously collected raw hostnames.

use std::path::Path;

use anyhow::{Context, Result};
use serde_json::Value;

/// Extract raw candidates from a results file.
///
/// Accepts a JSON array, a JSON object (its `subdomains` or `raw` array, otherwise
/// every array and string value), or plain text with one candidate per line. Nothing
/// is validated here.
pub fn parse_candidates(text: &str) -> Vec<String> {
    match serde_json::from_str::<Value>(text) {
        Ok(Value::Array(items)) => strings(&items),
        Ok(Value::Object(map)) => {
            for key in ["subdomains", "raw"] {
                if let Some(Value::Array(items)) = map.get(key) {
                    return strings(items);
                }
            }
            let mut out = Vec::new();
            for value in map.values() {
                match value {
                    Value::Array(items) => out.extend(strings(items)),
                    Value::String(s) => out.push(s.clone()),
                    _ => {}
                }
            }
            out
        }
        Ok(Value::String(s)) => vec![s],
        Ok(_) => Vec::new(),
        Err(_) => text.lines().map(str::to_string).collect(),
    }
}

fn strings(items: &[Value]) -> Vec<String> {
    items
        .iter()
        .filter_map(|item| item.as_str().map(str::to_string))
        .collect()
}

/// Read and parse a results file.
pub async fn read_candidates(path: &Path) -> Result<Vec<String>> {
    let bytes = tokio::fs::read(path)
        .await
        .with_context(|| format!("Failed to read input file {}", path.display()))?;
    let candidates = parse_candidates(&String::from_utf8_lossy(&bytes));
    log::info!(
        "[input] {} raw candidates from {}",
        candidates.len(),
        path.display()
    );
    Ok(candidates)
}
