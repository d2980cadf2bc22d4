use std::collections::HashSet;

use crate::sheets_api::LedgerStore;

use super::{DegradeReason, DuplicateKey, JournalEntry, Loaded, JOURNAL_SHEET, MANUAL_SHEET};

/// Gathers duplicate keys from every known journal sheet, automated and
/// manual.
///
/// A missing sheet is skipped silently (a ledger may predate the manual
/// sheet). Any other failure degrades to an empty index: nothing gets flagged
/// as a duplicate rather than blocking extraction.
pub async fn build_duplicate_index(store: &impl LedgerStore) -> Loaded<HashSet<DuplicateKey>> {
    log::info!("Fetching existing entries for the duplicate check...");
    let mut index = HashSet::new();
    for sheet in [JOURNAL_SHEET, MANUAL_SHEET] {
        match store.read_rows(sheet).await {
            Ok(Some(rows)) => {
                for key in rows.iter().skip(1).filter_map(|row| DuplicateKey::from_row(row)) {
                    index.insert(key);
                }
            }
            Ok(None) => {}
            Err(err) => {
                log::warn!("Failed to fetch existing entries from {sheet:?}: {err}");
                return Loaded::Degraded {
                    fallback: HashSet::new(),
                    reason: DegradeReason::Store(err),
                };
            }
        }
    }
    Loaded::Full(index)
}

/// Tags each candidate entry as duplicate/non-duplicate against the index.
/// Pure and total: fields missing from the extraction payload contribute
/// their defaults to the key.
pub fn reconcile(entries: &mut [JournalEntry], index: &HashSet<DuplicateKey>) {
    for entry in entries.iter_mut() {
        entry.is_duplicate = index.contains(&entry.duplicate_key());
    }
}
