use reqwest::StatusCode;
use serde::Deserialize;
use serde_json::json;

use super::{LedgerStore, StoreError};

const API_BASE: &str = "https://sheets.googleapis.com/v4/spreadsheets";

/// Google Sheets v4 client, authenticated with a per-request bearer token.
pub struct SheetsClient {
    http: reqwest::Client,
    spreadsheet_id: String,
    access_token: String,
}

impl SheetsClient {
    pub fn new(spreadsheet_id: impl Into<String>, access_token: impl Into<String>) -> Self {
        Self {
            http: reqwest::Client::new(),
            spreadsheet_id: spreadsheet_id.into(),
            access_token: access_token.into(),
        }
    }

    fn url(&self, suffix: &str) -> String {
        format!("{API_BASE}/{}{}", self.spreadsheet_id, suffix)
    }

    async fn send_checked(
        &self,
        request: reqwest::RequestBuilder,
    ) -> Result<reqwest::Response, StoreError> {
        let response = request
            .bearer_auth(&self.access_token)
            .send()
            .await
            .map_err(|err| StoreError::Network(err.to_string()))?;
        let status = response.status();
        if status == StatusCode::UNAUTHORIZED || status == StatusCode::FORBIDDEN {
            return Err(StoreError::Unauthorized);
        }
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(StoreError::Http(status.as_u16(), body));
        }
        Ok(response)
    }

    /// Resolves a sheet title to its numeric id, or `None` if the spreadsheet
    /// has no sheet with that title.
    async fn sheet_lookup(&self, title: &str) -> Result<Option<i64>, StoreError> {
        let response = self
            .send_checked(self.http.get(self.url("?fields=sheets.properties")))
            .await?;
        let meta: SpreadsheetMeta = response
            .json()
            .await
            .map_err(|err| StoreError::Malformed(err.to_string()))?;
        Ok(meta
            .sheets
            .into_iter()
            .map(|sheet| sheet.properties)
            .find(|properties| properties.title == title)
            .map(|properties| properties.sheet_id))
    }

    async fn batch_update(&self, request: serde_json::Value) -> Result<(), StoreError> {
        self.send_checked(self.http.post(self.url(":batchUpdate")).json(&request))
            .await?;
        Ok(())
    }
}

impl LedgerStore for SheetsClient {
    async fn read_rows(&self, sheet: &str) -> Result<Option<Vec<Vec<String>>>, StoreError> {
        if self.sheet_lookup(sheet).await?.is_none() {
            return Ok(None);
        }
        let response = self
            .send_checked(self.http.get(self.url(&format!("/values/'{sheet}'"))))
            .await?;
        let range: ValueRange = response
            .json()
            .await
            .map_err(|err| StoreError::Malformed(err.to_string()))?;
        Ok(Some(range.values))
    }

    async fn add_sheet(&self, sheet: &str, rows: u32, cols: u32) -> Result<(), StoreError> {
        self.batch_update(json!({
            "requests": [{
                "addSheet": {
                    "properties": {
                        "title": sheet,
                        "gridProperties": { "rowCount": rows, "columnCount": cols },
                    },
                },
            }],
        }))
        .await
    }

    async fn append_rows(&self, sheet: &str, rows: &[Vec<String>]) -> Result<(), StoreError> {
        let url = self.url(&format!("/values/'{sheet}':append?valueInputOption=USER_ENTERED"));
        self.send_checked(self.http.post(url).json(&json!({ "values": rows })))
            .await?;
        Ok(())
    }

    async fn update_cells(
        &self,
        sheet: &str,
        start: &str,
        rows: &[Vec<String>],
    ) -> Result<(), StoreError> {
        let url = self.url(&format!(
            "/values/'{sheet}'!{start}?valueInputOption=USER_ENTERED"
        ));
        self.send_checked(self.http.put(url).json(&json!({ "values": rows })))
            .await?;
        Ok(())
    }

    async fn clear_sheet(&self, sheet: &str) -> Result<(), StoreError> {
        let url = self.url(&format!("/values/'{sheet}':clear"));
        self.send_checked(self.http.post(url).json(&json!({})))
            .await?;
        Ok(())
    }

    async fn freeze_rows(&self, sheet: &str, count: u32) -> Result<(), StoreError> {
        let sheet_id = self
            .sheet_lookup(sheet)
            .await?
            .ok_or_else(|| StoreError::Malformed(format!("sheet {sheet:?} not found")))?;
        self.batch_update(json!({
            "requests": [{
                "updateSheetProperties": {
                    "properties": {
                        "sheetId": sheet_id,
                        "gridProperties": { "frozenRowCount": count },
                    },
                    "fields": "gridProperties.frozenRowCount",
                },
            }],
        }))
        .await
    }
}

#[derive(Deserialize)]
struct SpreadsheetMeta {
    #[serde(default)]
    sheets: Vec<SheetMeta>,
}

#[derive(Deserialize)]
struct SheetMeta {
    properties: SheetProperties,
}

#[derive(Deserialize)]
struct SheetProperties {
    #[serde(rename = "sheetId")]
    sheet_id: i64,
    title: String,
}

#[derive(Deserialize)]
struct ValueRange {
    #[serde(default)]
    values: Vec<Vec<String>>,
}
