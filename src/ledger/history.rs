use crate::sheets_api::LedgerStore;

use super::{DegradeReason, HistoryRecord, Loaded, JOURNAL_SHEET};

/// How many of the most recent committed rows to project into the semantic
/// reference list. Bounds prompt size.
const HISTORY_LIMIT: usize = 150;

/// Loads the semantic reference list from the automated journal sheet.
///
/// Never fails: a missing sheet or unreachable store degrades to an empty
/// list so extraction runs without contextual bias instead of aborting.
pub async fn load_history(store: &impl LedgerStore) -> Loaded<Vec<HistoryRecord>> {
    log::info!("Fetching accounting history (semantic reference) from the ledger...");
    let rows = match store.read_rows(JOURNAL_SHEET).await {
        Ok(Some(rows)) => rows,
        Ok(None) => {
            log::warn!("Journal sheet {JOURNAL_SHEET:?} does not exist yet, no history available");
            return Loaded::Degraded {
                fallback: Vec::new(),
                reason: DegradeReason::MissingSheet(JOURNAL_SHEET.to_string()),
            };
        }
        Err(err) => {
            log::warn!("Failed to fetch history: {err}");
            return Loaded::Degraded {
                fallback: Vec::new(),
                reason: DegradeReason::Store(err),
            };
        }
    };
    if rows.len() < 2 {
        return Loaded::Full(Vec::new());
    }
    let data = &rows[1..];
    let start = data.len().saturating_sub(HISTORY_LIMIT);
    let history = data[start..]
        .iter()
        .filter_map(|row| HistoryRecord::from_row(row))
        .collect();
    Loaded::Full(history)
}
