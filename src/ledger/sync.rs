use anyhow::{Context as _, Result};

use crate::sheets_api::LedgerStore;

use super::{JournalEntry, BS_SHEET, HEADER, JOURNAL_SHEET, MANUAL_SHEET, PL_SHEET};

const PL_TITLE: &str = "損益計算書 (P/L) - 月次推移なし・全体集計";
const BS_TITLE: &str = "簡易貸借対照表 (B/S)";
const BS_NOTE: &str =
    "※P/Lと同様に、仕訳明細から集計を行います。詳細なB/S作成には期首残高が必要です。";

/// Commits entries to the ledger and brings the derived sheets up to date.
///
/// Each step is idempotent on its own, but a failure mid-way leaves earlier
/// writes in place. There is no transaction boundary in the backing store, so
/// partial saves are an accepted risk and surface as an error to the caller.
pub async fn save_entries(store: &impl LedgerStore, entries: &[JournalEntry]) -> Result<()> {
    log::info!("Saving {} entries to the ledger...", entries.len());

    ensure_journal_sheet(store)
        .await
        .context("Failed to prepare the journal sheet")?;
    ensure_manual_sheet(store)
        .await
        .context("Failed to prepare the manual-entry sheet")?;
    regenerate_profit_loss(store)
        .await
        .context("Failed to regenerate the P/L sheet")?;
    ensure_balance_sheet_stub(store)
        .await
        .context("Failed to prepare the balance-sheet stub")?;

    let rows: Vec<Vec<String>> = entries.iter().map(JournalEntry::to_row).collect();
    store
        .append_rows(JOURNAL_SHEET, &rows)
        .await
        .context("Failed to append journal rows")?;

    log::info!("Saving entries...done");
    Ok(())
}

fn header_row() -> Vec<String> {
    HEADER.iter().map(|cell| cell.to_string()).collect()
}

/// Creates the automated journal sheet if needed and makes sure it starts
/// with the canonical header. A non-blank first row that differs from the
/// canonical header is user customization and stays untouched.
async fn ensure_journal_sheet(store: &impl LedgerStore) -> Result<()> {
    let rows = match store.read_rows(JOURNAL_SHEET).await? {
        Some(rows) => rows,
        None => {
            store.add_sheet(JOURNAL_SHEET, 1000, 6).await?;
            Vec::new()
        }
    };
    let header = header_row();
    match rows.first() {
        None => {
            store.append_rows(JOURNAL_SHEET, &[header]).await?;
            store.freeze_rows(JOURNAL_SHEET, 1).await?;
        }
        Some(first) if *first != header && first.iter().all(|cell| cell.is_empty()) => {
            store.update_cells(JOURNAL_SHEET, "A1", &[header]).await?;
            store.freeze_rows(JOURNAL_SHEET, 1).await?;
        }
        Some(_) => {}
    }
    Ok(())
}

async fn ensure_manual_sheet(store: &impl LedgerStore) -> Result<()> {
    if store.read_rows(MANUAL_SHEET).await?.is_none() {
        store.add_sheet(MANUAL_SHEET, 1000, 6).await?;
        store.append_rows(MANUAL_SHEET, &[header_row()]).await?;
        store.freeze_rows(MANUAL_SHEET, 1).await?;
    }
    Ok(())
}

/// Rewrites the P/L view from scratch: clear, title, side-by-side debit and
/// credit aggregation blocks. The sums live in spreadsheet formulas spanning
/// both journal sheets, so the view tracks the data without us re-deriving
/// totals.
async fn regenerate_profit_loss(store: &impl LedgerStore) -> Result<()> {
    if store.read_rows(PL_SHEET).await?.is_none() {
        store.add_sheet(PL_SHEET, 100, 10).await?;
    }
    store.clear_sheet(PL_SHEET).await?;
    store
        .update_cells(PL_SHEET, "A1", &[vec![PL_TITLE.to_string()]])
        .await?;
    store
        .update_cells(
            PL_SHEET,
            "A3",
            &[vec![
                "【借方（費用・資産増加）】".to_string(),
                "金額".to_string(),
                String::new(),
                "【貸方（収益・負債増加）】".to_string(),
                "金額".to_string(),
            ]],
        )
        .await?;
    store
        .update_cells(PL_SHEET, "A4", &[vec![aggregation_formula(2)]])
        .await?;
    store
        .update_cells(PL_SHEET, "D4", &[vec![aggregation_formula(3)]])
        .await?;
    store.freeze_rows(PL_SHEET, 3).await?;
    Ok(())
}

/// Aggregation formula over both journal sheets, grouped by the account
/// column (1-based: 2 = debit, 3 = credit), summing the amount column.
fn aggregation_formula(account_col: u8) -> String {
    format!(
        "=QUERY({{'{JOURNAL_SHEET}'!A2:F; '{MANUAL_SHEET}'!A2:F}}, \
         \"select Col{account_col}, sum(Col4) where Col{account_col} is not null \
         group by Col{account_col} label sum(Col4) ''\", 0)"
    )
}

/// The B/S needs opening balances we don't track, so it stays a one-time
/// placeholder instead of a regenerated view.
async fn ensure_balance_sheet_stub(store: &impl LedgerStore) -> Result<()> {
    if store.read_rows(BS_SHEET).await?.is_some() {
        return Ok(());
    }
    store.add_sheet(BS_SHEET, 100, 6).await?;
    store
        .update_cells(BS_SHEET, "A1", &[vec![BS_TITLE.to_string()]])
        .await?;
    store
        .update_cells(
            BS_SHEET,
            "A3",
            &[vec![
                "勘定科目".to_string(),
                "借方合計".to_string(),
                "貸方合計".to_string(),
                "残高 (資産は正/負債は負)".to_string(),
            ]],
        )
        .await?;
    store
        .update_cells(BS_SHEET, "A4", &[vec![BS_NOTE.to_string()]])
        .await?;
    Ok(())
}
