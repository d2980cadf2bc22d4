//! In-memory `LedgerStore` used by the ledger tests.

use std::collections::HashMap;
use std::sync::Mutex;

use super::{LedgerStore, StoreError};

pub struct FakeStore {
    sheets: Mutex<HashMap<String, Vec<Vec<String>>>>,
    frozen: Mutex<HashMap<String, u32>>,
    fail_all: bool,
}

impl FakeStore {
    pub fn new() -> Self {
        Self {
            sheets: Mutex::new(HashMap::new()),
            frozen: Mutex::new(HashMap::new()),
            fail_all: false,
        }
    }

    /// A store where every operation fails with a network error.
    pub fn unreachable() -> Self {
        Self {
            fail_all: true,
            ..Self::new()
        }
    }

    pub fn with_sheet(self, sheet: &str, rows: Vec<Vec<String>>) -> Self {
        self.sheets.lock().unwrap().insert(sheet.to_string(), rows);
        self
    }

    /// Current contents of a sheet. Panics if the sheet doesn't exist.
    pub fn rows(&self, sheet: &str) -> Vec<Vec<String>> {
        self.sheets.lock().unwrap().get(sheet).cloned().unwrap()
    }

    pub fn has_sheet(&self, sheet: &str) -> bool {
        self.sheets.lock().unwrap().contains_key(sheet)
    }

    pub fn frozen_rows(&self, sheet: &str) -> u32 {
        self.frozen.lock().unwrap().get(sheet).copied().unwrap_or(0)
    }

    fn check_reachable(&self) -> Result<(), StoreError> {
        if self.fail_all {
            Err(StoreError::Network("connection refused".to_string()))
        } else {
            Ok(())
        }
    }
}

pub fn row(cells: &[&str]) -> Vec<String> {
    cells.iter().map(|cell| cell.to_string()).collect()
}

impl LedgerStore for FakeStore {
    async fn read_rows(&self, sheet: &str) -> Result<Option<Vec<Vec<String>>>, StoreError> {
        self.check_reachable()?;
        Ok(self.sheets.lock().unwrap().get(sheet).cloned())
    }

    async fn add_sheet(&self, sheet: &str, _rows: u32, _cols: u32) -> Result<(), StoreError> {
        self.check_reachable()?;
        self.sheets
            .lock()
            .unwrap()
            .insert(sheet.to_string(), Vec::new());
        Ok(())
    }

    async fn append_rows(&self, sheet: &str, rows: &[Vec<String>]) -> Result<(), StoreError> {
        self.check_reachable()?;
        let mut sheets = self.sheets.lock().unwrap();
        let existing = sheets
            .get_mut(sheet)
            .ok_or_else(|| StoreError::Malformed(format!("sheet {sheet:?} not found")))?;
        existing.extend(rows.iter().cloned());
        Ok(())
    }

    async fn update_cells(
        &self,
        sheet: &str,
        start: &str,
        rows: &[Vec<String>],
    ) -> Result<(), StoreError> {
        self.check_reachable()?;
        let mut sheets = self.sheets.lock().unwrap();
        let existing = sheets
            .get_mut(sheet)
            .ok_or_else(|| StoreError::Malformed(format!("sheet {sheet:?} not found")))?;
        let (start_row, start_col) = parse_a1(start);
        for (row_offset, row) in rows.iter().enumerate() {
            let row_idx = start_row + row_offset;
            while existing.len() <= row_idx {
                existing.push(Vec::new());
            }
            let target = &mut existing[row_idx];
            for (col_offset, cell) in row.iter().enumerate() {
                let col_idx = start_col + col_offset;
                while target.len() <= col_idx {
                    target.push(String::new());
                }
                target[col_idx] = cell.clone();
            }
        }
        Ok(())
    }

    async fn clear_sheet(&self, sheet: &str) -> Result<(), StoreError> {
        self.check_reachable()?;
        let mut sheets = self.sheets.lock().unwrap();
        let existing = sheets
            .get_mut(sheet)
            .ok_or_else(|| StoreError::Malformed(format!("sheet {sheet:?} not found")))?;
        existing.clear();
        Ok(())
    }

    async fn freeze_rows(&self, sheet: &str, count: u32) -> Result<(), StoreError> {
        self.check_reachable()?;
        self.frozen.lock().unwrap().insert(sheet.to_string(), count);
        Ok(())
    }
}

fn parse_a1(cell: &str) -> (usize, usize) {
    let letters: String = cell.chars().take_while(|c| c.is_ascii_alphabetic()).collect();
    let digits: String = cell.chars().skip_while(|c| c.is_ascii_alphabetic()).collect();
    let col = letters
        .chars()
        .fold(0usize, |acc, c| acc * 26 + (c as usize - 'A' as usize + 1))
        - 1;
    let row = digits.parse::<usize>().unwrap() - 1;
    (row, col)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_a1_notation() {
        assert_eq!((0, 0), parse_a1("A1"));
        assert_eq!((2, 0), parse_a1("A3"));
        assert_eq!((3, 3), parse_a1("D4"));
        assert_eq!((9, 26), parse_a1("AA10"));
    }

    #[tokio::test]
    async fn update_cells_pads_missing_rows_and_cols() {
        let store = FakeStore::new().with_sheet("sheet", vec![]);
        store
            .update_cells("sheet", "D4", &[row(&["x", "y"])])
            .await
            .unwrap();
        let rows = store.rows("sheet");
        assert_eq!(4, rows.len());
        assert_eq!(row(&["", "", "", "x", "y"]), rows[3]);
    }
}
