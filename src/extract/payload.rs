use anyhow::{anyhow, Result};

use crate::ledger::JournalEntry;

/// Isolates the JSON entry array from free-form model output and parses it.
///
/// The generation step likes to wrap its payload in markdown fences or
/// surround it with prose. Strip a labeled or unlabeled fence if present,
/// then slice from the first `[` to the last `]` before parsing.
pub fn parse_entries(raw: &str) -> Result<Vec<JournalEntry>> {
    let text = raw.trim();
    let text = strip_fences(text).unwrap_or(text);
    let text = bracket_slice(text).unwrap_or(text);
    serde_json::from_str(text)
        .map_err(|err| anyhow!("Extraction output is not a valid entry array: {err}"))
}

fn strip_fences(text: &str) -> Option<&str> {
    let start = if let Some(idx) = text.find("```json") {
        idx + "```json".len()
    } else if let Some(idx) = text.find("```") {
        idx + "```".len()
    } else {
        return None;
    };
    let rest = &text[start..];
    let inner = match rest.find("```") {
        Some(end) => &rest[..end],
        None => rest,
    };
    Some(inner.trim())
}

fn bracket_slice(text: &str) -> Option<&str> {
    let start = text.find('[')?;
    let end = text.rfind(']')?;
    (start <= end).then(|| &text[start..=end])
}
