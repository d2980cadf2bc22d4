use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Automated journal sheet, owned by the synchronizer, appended to on save.
pub const JOURNAL_SHEET: &str = "仕訳明細";
/// Manual-entry sheet, created once and then left to the user.
pub const MANUAL_SHEET: &str = "仕訳明細（手入力）";
/// Profit/loss view, fully regenerated on every save.
pub const PL_SHEET: &str = "損益計算書";
/// Balance-sheet stub, created once.
pub const BS_SHEET: &str = "貸借対照表";

/// Canonical header of both journal sheets:
/// date, debit account, credit account, amount, counterparty, memo.
pub const HEADER: [&str; 6] = ["日にち", "借方", "貸方", "金額", "取引先", "摘要（内容）"];

/// A single debit/credit accounting record.
///
/// Produced by the extractor as a candidate, annotated by reconciliation, and
/// committed to the journal sheet on save. All fields default so a partially
/// filled extraction payload still deserializes.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct JournalEntry {
    #[serde(default)]
    pub date: String,
    #[serde(default)]
    pub debit_account: String,
    #[serde(default)]
    pub credit_account: String,
    #[serde(default, serialize_with = "amount_as_number")]
    pub amount: Decimal,
    #[serde(default)]
    pub counterparty: String,
    #[serde(default)]
    pub memo: String,
    /// Candidate-only annotation, never written to the ledger.
    #[serde(default)]
    pub is_duplicate: bool,
}

/// Amounts cross the API as JSON numbers; `Decimal`'s default serde form is a
/// string. Integral amounts stay integral, anything else goes out as a float.
fn amount_as_number<S>(amount: &Decimal, serializer: S) -> Result<S::Ok, S::Error>
where
    S: serde::Serializer,
{
    use rust_decimal::prelude::ToPrimitive as _;
    if amount.is_integer() {
        if let Some(value) = amount.to_i64() {
            return serializer.serialize_i64(value);
        }
    }
    match amount.to_f64() {
        Some(value) => serializer.serialize_f64(value),
        None => serializer.serialize_str(&amount.to_string()),
    }
}

impl JournalEntry {
    pub fn duplicate_key(&self) -> DuplicateKey {
        DuplicateKey::new(&self.date, &self.amount.to_string(), &self.counterparty)
    }

    /// The journal sheet row for this entry, in canonical column order.
    pub fn to_row(&self) -> Vec<String> {
        vec![
            self.date.clone(),
            self.debit_account.clone(),
            self.credit_account.clone(),
            self.amount.to_string(),
            self.counterparty.clone(),
            self.memo.clone(),
        ]
    }
}

/// Composite identity used for exact-match duplicate suppression.
///
/// Intentionally coarse: two distinct same-day transactions over the same
/// amount with the same counterparty collide. The index is rebuilt from
/// whatever rows exist, storage enforces no uniqueness.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct DuplicateKey(String);

impl DuplicateKey {
    pub fn new(date: &str, amount: &str, counterparty: &str) -> Self {
        Self(format!("{date}_{amount}_{counterparty}"))
    }

    /// Derives the key from a committed ledger row, or `None` for rows too
    /// short to hold the full schema.
    pub fn from_row(row: &[String]) -> Option<Self> {
        if row.len() < 6 {
            return None;
        }
        Some(Self::new(row[0].trim(), row[3].trim(), row[4].trim()))
    }
}

/// A prior committed entry's counterparty/memo/account, used only to bias
/// future classification. Lossy: drops the side the account appeared on,
/// the amount and the date.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct HistoryRecord {
    pub counterparty: String,
    pub memo: String,
    pub account: String,
}

impl HistoryRecord {
    /// Projects a committed ledger row, or `None` for rows too short to hold
    /// the full schema (malformed-row tolerance).
    pub fn from_row(row: &[String]) -> Option<Self> {
        if row.len() < 6 {
            return None;
        }
        Some(Self {
            counterparty: row[4].trim().to_string(),
            memo: row[5].trim().to_string(),
            account: row[1].trim().to_string(),
        })
    }
}
