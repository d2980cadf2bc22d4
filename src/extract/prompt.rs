//! Extraction instructions.
//!
//! The classification rules in here are domain policy, not incidental prompt
//! text: card and electronic payments go to the short-term payable account,
//! cash or unspecified payments to a cash account, bank-transfer invoices to
//! trade payables. Prior history takes precedence over the heuristics.

use crate::ledger::HistoryRecord;

pub fn tabular_prompt(csv_text: &str, history: &[HistoryRecord]) -> String {
    let history_block = if history.is_empty() {
        "なし".to_string()
    } else {
        history
            .iter()
            .map(|record| {
                format!(
                    "- {} ({}) => {}",
                    record.counterparty, record.memo, record.account
                )
            })
            .collect::<Vec<_>>()
            .join("\n")
    };

    format!(
        r#"あなたは優秀な会計士です。明細データ（CSV）から仕訳を作成してください。
このCSVは主に「クレジットカード利用明細」または「銀行入出金」です。

ルール:
1. **クレジットカード明細の場合**、貸方勘定科目は原則として「**未払金**」を使用してください。
2. **銀行口座のCSVの場合**、貸方または借方は「普通預金」などが適切です。
3. 過去の履歴を参考に、最適な勘定科目を選んでください。

過去の仕訳履歴（参考）：
{history_block}

JSON形式（配列）で出力：
[
  {{
    "date": "YYYY-MM-DD",
    "debit_account": "借方勘定科目",
    "credit_account": "貸方勘定科目",
    "amount": 数値,
    "counterparty": "取引先名",
    "memo": "詳細・摘要"
  }}
]

明細データ:
{csv_text}"#
    )
}

pub fn document_prompt(history: &[HistoryRecord]) -> String {
    let history_block = if history.is_empty() {
        "なし".to_string()
    } else {
        serde_json::to_string_pretty(history).unwrap_or_else(|_| "なし".to_string())
    };

    format!(
        r#"あなたは日本の税務・会計士です。
渡された画像の「領収書（レシート）」または「請求書」から仕訳を作成してください。

**重要：決済方法の判定**
画像内の支払情報を確認し、貸方勘定科目を以下のように決定してください：
- **クレジットカード払い、カード利用、VISA/JCB/Master等の記載がある場合** → 「**未払金**」
- **電子マネー（PayPay, Suica等）、後払い決済の場合** → 「**未払金**」
- 現金、Cash、または支払方法の記載がない場合 → 「現金」（または「小口現金」）
- 銀行振込の請求書の場合 → 「買掛金」または「未払金」

履歴（優先）:
{history_block}

JSON形式（配列）で出力してください。他の説明は不要です。
[
  {{
    "date": "YYYY-MM-DD",
    "debit_account": "借方勘定科目",
    "credit_account": "貸方勘定科目（未払金/現金/買掛金など）",
    "amount": 数値,
    "counterparty": "取引先名",
    "memo": "詳細・摘要"
  }}
]"#
    )
}
