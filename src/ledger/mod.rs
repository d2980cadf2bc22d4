use std::fmt;

use crate::sheets_api::StoreError;

mod dedup;
mod entry;
mod history;
mod sync;

pub use dedup::{build_duplicate_index, reconcile};
pub use entry::{
    DuplicateKey, HistoryRecord, JournalEntry, BS_SHEET, HEADER, JOURNAL_SHEET, MANUAL_SHEET,
    PL_SHEET,
};
pub use history::load_history;
pub use sync::save_entries;

/// Result of a ledger read that degrades instead of failing.
///
/// Extraction context is best-effort: when the ledger can't be read, the
/// pipeline continues with `fallback` (empty context) and the reason is kept
/// around for logging and tests instead of being swallowed.
#[derive(Debug)]
pub enum Loaded<T> {
    Full(T),
    Degraded { fallback: T, reason: DegradeReason },
}

impl<T> Loaded<T> {
    pub fn value(&self) -> &T {
        match self {
            Loaded::Full(value) => value,
            Loaded::Degraded { fallback, .. } => fallback,
        }
    }

    pub fn into_value(self) -> T {
        match self {
            Loaded::Full(value) => value,
            Loaded::Degraded { fallback, .. } => fallback,
        }
    }

    pub fn degrade_reason(&self) -> Option<&DegradeReason> {
        match self {
            Loaded::Full(_) => None,
            Loaded::Degraded { reason, .. } => Some(reason),
        }
    }
}

#[derive(Debug)]
pub enum DegradeReason {
    MissingSheet(String),
    Store(StoreError),
}

impl fmt::Display for DegradeReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DegradeReason::MissingSheet(sheet) => write!(f, "sheet {sheet:?} does not exist"),
            DegradeReason::Store(err) => write!(f, "{err}"),
        }
    }
}
