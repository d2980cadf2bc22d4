use encoding_rs::SHIFT_JIS;

/// Bound on prompt size and extraction cost.
const MAX_TABULAR_ROWS: usize = 50;

/// A document reduced to something the extraction capability accepts.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NormalizedDocument {
    /// Delimited text from a statement export, truncated and re-joined.
    Tabular(String),
    /// Raw bytes (receipt scan, invoice PDF) tagged with their media type.
    Binary { mime_type: String, bytes: Vec<u8> },
}

/// Picks a decoding path from the filename. Never fails: malformed bytes
/// decode to replacement characters, best effort.
pub fn normalize(filename: &str, mime_type: &str, bytes: Vec<u8>) -> NormalizedDocument {
    if filename.to_lowercase().ends_with(".csv") {
        NormalizedDocument::Tabular(decode_tabular(&bytes))
    } else {
        NormalizedDocument::Binary {
            mime_type: mime_type.to_string(),
            bytes,
        }
    }
}

/// Statement export tools disagree on encodings and ship no reliable tag.
/// Try the legacy Shift_JIS encoding first; when the decoded text shows
/// neither a transaction-date column header nor a single delimiter, assume it
/// was UTF-8 all along and re-decode.
fn decode_tabular(bytes: &[u8]) -> String {
    let (decoded, _, _) = SHIFT_JIS.decode(bytes);
    let mut text = decoded.into_owned();
    if !text.contains("確定日") && !text.contains("利用日") && !text.contains(',') {
        text = String::from_utf8_lossy(bytes).into_owned();
    }
    truncate_rows(&text)
}

fn truncate_rows(text: &str) -> String {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .from_reader(text.as_bytes());
    let rows: Vec<String> = reader
        .records()
        .take(MAX_TABULAR_ROWS)
        .filter_map(|record| record.ok())
        .map(|record| record.iter().collect::<Vec<_>>().join(","))
        .collect();
    rows.join("\n")
}
