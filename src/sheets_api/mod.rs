use std::fmt;

mod client;
#[cfg(test)]
pub mod testutils;

pub use client::SheetsClient;

/// Error type for ledger store operations.
#[derive(Debug)]
pub enum StoreError {
    /// The access token was rejected
    Unauthorized,
    /// The store answered with a non-success status
    Http(u16, String),
    /// The store couldn't be reached
    Network(String),
    /// The store answered with something we couldn't parse
    Malformed(String),
}

impl fmt::Display for StoreError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StoreError::Unauthorized => write!(f, "Access token rejected by the ledger store"),
            StoreError::Http(status, msg) => write!(f, "Ledger store returned HTTP {}: {}", status, msg),
            StoreError::Network(msg) => write!(f, "Ledger store unreachable: {}", msg),
            StoreError::Malformed(msg) => write!(f, "Unexpected ledger store response: {}", msg),
        }
    }
}

impl std::error::Error for StoreError {}

/// Tabular storage backing the ledger, addressed by sheet name.
///
/// The seam between the synchronization logic and the spreadsheet service.
/// Append and update have USER_ENTERED semantics: the store parses cell
/// strings into numbers, dates and formulas the way a typing user would
/// trigger it.
#[allow(async_fn_in_trait)]
pub trait LedgerStore {
    /// All rows of the given sheet. Returns `Ok(None)` if the sheet doesn't exist.
    async fn read_rows(&self, sheet: &str) -> Result<Option<Vec<Vec<String>>>, StoreError>;

    async fn add_sheet(&self, sheet: &str, rows: u32, cols: u32) -> Result<(), StoreError>;

    async fn append_rows(&self, sheet: &str, rows: &[Vec<String>]) -> Result<(), StoreError>;

    /// Writes a block of cells with its top-left corner at `start` (A1 notation).
    async fn update_cells(&self, sheet: &str, start: &str, rows: &[Vec<String>])
        -> Result<(), StoreError>;

    async fn clear_sheet(&self, sheet: &str) -> Result<(), StoreError>;

    async fn freeze_rows(&self, sheet: &str, count: u32) -> Result<(), StoreError>;
}
