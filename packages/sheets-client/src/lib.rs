//! Google Sheets v4 REST client with service-account auth.
//!
//! The one high-level operation is [`SheetsClient::append_records`]: make
//! sure the destination tab exists and is wide enough, reconcile its header
//! row, append the given records after existing content, then apply
//! cosmetic layout on a best-effort basis. The client only ever creates,
//! widens, and appends — it never deletes tabs or data rows.
//!
//! The spreadsheet is a remote shared resource with no client-side locking:
//! two concurrent writers targeting the same tab can interleave their
//! header reconciliation and appends.
//!
//! # Example
//!
//! ```rust,ignore
//! use sheets_client::{ServiceAccountKey, SheetsClient, WriteOptions};
//!
//! let key = ServiceAccountKey::new("svc@project.iam.gserviceaccount.com", pem)?;
//! let client = SheetsClient::new(key);
//!
//! let appended = client
//!     .append_records(sheet_id, "Sheet1", &records, &headers, &WriteOptions::default())
//!     .await?;
//! ```

pub mod auth;
pub mod error;
pub mod header;
pub mod types;

pub use auth::ServiceAccountKey;
pub use error::{Result, SheetsError};
pub use header::{TICK_COLUMN, USER_COLUMN};
pub use types::SheetRecord;

use serde_json::json;

use auth::TokenProvider;
use types::{
    AppendResponse, BatchUpdateResponse, SheetProperties, Spreadsheet, ValueRange,
};

const BASE_URL: &str = "https://sheets.googleapis.com/v4/spreadsheets";

/// New tabs are provisioned with this many rows and at least this many columns.
const NEW_SHEET_ROWS: i64 = 1000;
const NEW_SHEET_MIN_COLUMNS: i64 = 26;

#[derive(Debug, Clone)]
pub struct WriteOptions {
    pub tick_column: String,
    pub user_column: String,
    /// Apply cosmetic formatting after the data write. Failures are logged
    /// and swallowed either way.
    pub apply_layout: bool,
}

impl Default for WriteOptions {
    fn default() -> Self {
        Self {
            tick_column: TICK_COLUMN.to_string(),
            user_column: USER_COLUMN.to_string(),
            apply_layout: true,
        }
    }
}

pub struct SheetsClient {
    http: reqwest::Client,
    tokens: TokenProvider,
}

impl SheetsClient {
    pub fn new(key: ServiceAccountKey) -> Self {
        let http = reqwest::Client::new();
        Self {
            tokens: TokenProvider::new(key, http.clone()),
            http,
        }
    }

    /// Append records to a tab, reconciling the header first.
    ///
    /// `data_headers` is the caller's field list (fixed schema or discovered
    /// union); the final layout pins the checkbox column first and the
    /// user-identity column last, keeps columns the live sheet already has,
    /// and appends newly seen fields. Records are projected onto that final
    /// order, so header and data cannot drift apart. Returns the number of
    /// rows appended (0 for an empty record list, which still reconciles
    /// the header).
    pub async fn append_records<S: AsRef<str>>(
        &self,
        spreadsheet_id: &str,
        sheet_name: &str,
        records: &[SheetRecord],
        data_headers: &[S],
        opts: &WriteOptions,
    ) -> Result<usize> {
        // Fresh state every call; another writer may have touched the tab.
        let meta = self.spreadsheet_meta(spreadsheet_id).await?;
        let existing_sheet = meta
            .sheets
            .into_iter()
            .map(|sheet| sheet.properties)
            .find(|properties| properties.title == sheet_name);

        let existing_headers = match &existing_sheet {
            Some(_) => self.header_row(spreadsheet_id, sheet_name).await?,
            None => Vec::new(),
        };

        let final_headers = header::merge_header_shape(
            &existing_headers,
            data_headers,
            &opts.tick_column,
            &opts.user_column,
        );
        let need_columns = final_headers.len() as i64;

        let sheet = match existing_sheet {
            Some(properties) => {
                if properties.grid_properties.column_count < need_columns {
                    self.append_columns(
                        spreadsheet_id,
                        properties.sheet_id,
                        need_columns - properties.grid_properties.column_count,
                    )
                    .await?;
                }
                properties
            }
            None => {
                self.add_sheet(spreadsheet_id, sheet_name, need_columns).await?
            }
        };

        // Rewrite row 1 so header and appended columns stay aligned.
        self.clear_range(spreadsheet_id, &format!("{}!1:1", sheet_name))
            .await?;
        let end_column = header::column_letter(final_headers.len() - 1);
        self.update_values(
            spreadsheet_id,
            &format!("{}!A1:{}1", sheet_name, end_column),
            vec![final_headers.iter().map(|h| h.to_string()).collect()],
        )
        .await?;

        let values: Vec<Vec<String>> = records
            .iter()
            .map(|record| header::project_row(record, &final_headers, &opts.tick_column))
            .collect();

        let appended = if values.is_empty() {
            0
        } else {
            self.append_values(spreadsheet_id, sheet_name, values).await?
        };

        if opts.apply_layout {
            // Cosmetic only — a failure here must not invalidate the write.
            if let Err(err) = self
                .apply_layout(spreadsheet_id, &sheet, need_columns)
                .await
            {
                tracing::warn!(
                    spreadsheet_id,
                    sheet_name,
                    error = %err,
                    "Sheet layout formatting failed; data write unaffected"
                );
            }
        }

        tracing::info!(spreadsheet_id, sheet_name, appended, "Appended rows to sheet");
        Ok(appended)
    }

    async fn spreadsheet_meta(&self, spreadsheet_id: &str) -> Result<Spreadsheet> {
        let token = self.tokens.access_token().await?;
        let url = format!("{}/{}?fields=sheets.properties", BASE_URL, spreadsheet_id);
        let resp = self.http.get(&url).bearer_auth(token).send().await?;
        Ok(Self::check(resp).await?.json().await?)
    }

    async fn add_sheet(
        &self,
        spreadsheet_id: &str,
        title: &str,
        need_columns: i64,
    ) -> Result<SheetProperties> {
        let token = self.tokens.access_token().await?;
        let url = format!("{}/{}:batchUpdate", BASE_URL, spreadsheet_id);
        let body = json!({
            "requests": [{
                "addSheet": {
                    "properties": {
                        "title": title,
                        "gridProperties": {
                            "rowCount": NEW_SHEET_ROWS,
                            "columnCount": need_columns.max(NEW_SHEET_MIN_COLUMNS),
                        },
                    },
                },
            }],
        });
        let resp = self
            .http
            .post(&url)
            .bearer_auth(token)
            .json(&body)
            .send()
            .await?;
        let reply: BatchUpdateResponse = Self::check(resp).await?.json().await?;

        reply
            .replies
            .into_iter()
            .find_map(|r| r.add_sheet)
            .map(|added| added.properties)
            .ok_or_else(|| SheetsError::Api {
                status: 200,
                message: "addSheet reply missing sheet properties".to_string(),
            })
    }

    async fn append_columns(
        &self,
        spreadsheet_id: &str,
        sheet_id: i64,
        extra: i64,
    ) -> Result<()> {
        let token = self.tokens.access_token().await?;
        let url = format!("{}/{}:batchUpdate", BASE_URL, spreadsheet_id);
        let body = json!({
            "requests": [{
                "appendDimension": {
                    "sheetId": sheet_id,
                    "dimension": "COLUMNS",
                    "length": extra,
                },
            }],
        });
        let resp = self
            .http
            .post(&url)
            .bearer_auth(token)
            .json(&body)
            .send()
            .await?;
        Self::check(resp).await?;
        Ok(())
    }

    /// Current contents of row 1, rendered to strings.
    async fn header_row(&self, spreadsheet_id: &str, sheet_name: &str) -> Result<Vec<String>> {
        let token = self.tokens.access_token().await?;
        let url = format!("{}/{}/values/{}!1:1", BASE_URL, spreadsheet_id, sheet_name);
        let resp = self.http.get(&url).bearer_auth(token).send().await?;
        let range: ValueRange = Self::check(resp).await?.json().await?;
        Ok(range
            .values
            .into_iter()
            .next()
            .unwrap_or_default()
            .iter()
            .map(|cell| header::cell_text(Some(cell)))
            .collect())
    }

    async fn clear_range(&self, spreadsheet_id: &str, range: &str) -> Result<()> {
        let token = self.tokens.access_token().await?;
        let url = format!("{}/{}/values/{}:clear", BASE_URL, spreadsheet_id, range);
        let resp = self
            .http
            .post(&url)
            .bearer_auth(token)
            .json(&json!({}))
            .send()
            .await?;
        Self::check(resp).await?;
        Ok(())
    }

    async fn update_values(
        &self,
        spreadsheet_id: &str,
        range: &str,
        values: Vec<Vec<String>>,
    ) -> Result<()> {
        let token = self.tokens.access_token().await?;
        let url = format!(
            "{}/{}/values/{}?valueInputOption=RAW",
            BASE_URL, spreadsheet_id, range
        );
        let resp = self
            .http
            .put(&url)
            .bearer_auth(token)
            .json(&json!({ "values": values }))
            .send()
            .await?;
        Self::check(resp).await?;
        Ok(())
    }

    async fn append_values(
        &self,
        spreadsheet_id: &str,
        sheet_name: &str,
        values: Vec<Vec<String>>,
    ) -> Result<usize> {
        let sent = values.len();
        let token = self.tokens.access_token().await?;
        let url = format!(
            "{}/{}/values/{}!A1:append?valueInputOption=RAW&insertDataOption=INSERT_ROWS",
            BASE_URL, spreadsheet_id, sheet_name
        );
        let resp = self
            .http
            .post(&url)
            .bearer_auth(token)
            .json(&json!({ "values": values }))
            .send()
            .await?;
        let reply: AppendResponse = Self::check(resp).await?.json().await?;
        Ok(reply
            .updates
            .and_then(|updates| updates.updated_rows)
            .unwrap_or(sent))
    }

    /// Cosmetic formatting: frozen bold header, compact clipped rows,
    /// auto-sized columns, checkbox validation on the first column, and a
    /// basic filter.
    async fn apply_layout(
        &self,
        spreadsheet_id: &str,
        sheet: &SheetProperties,
        need_columns: i64,
    ) -> Result<()> {
        let sheet_id = sheet.sheet_id;
        let last_row = sheet.grid_properties.row_count.max(2);
        let body = json!({
            "requests": [
                {
                    "updateSheetProperties": {
                        "properties": {
                            "sheetId": sheet_id,
                            "gridProperties": { "frozenRowCount": 1 },
                        },
                        "fields": "gridProperties.frozenRowCount",
                    },
                },
                {
                    "repeatCell": {
                        "range": { "sheetId": sheet_id },
                        "cell": {
                            "userEnteredFormat": {
                                "wrapStrategy": "CLIP",
                                "verticalAlignment": "MIDDLE",
                            },
                        },
                        "fields": "userEnteredFormat.wrapStrategy,userEnteredFormat.verticalAlignment",
                    },
                },
                {
                    "repeatCell": {
                        "range": {
                            "sheetId": sheet_id,
                            "startRowIndex": 0,
                            "endRowIndex": 1,
                            "startColumnIndex": 0,
                            "endColumnIndex": need_columns,
                        },
                        "cell": {
                            "userEnteredFormat": {
                                "textFormat": { "bold": true },
                                "backgroundColor": { "red": 0.95, "green": 0.95, "blue": 0.95 },
                            },
                        },
                        "fields": "userEnteredFormat.textFormat.bold,userEnteredFormat.backgroundColor",
                    },
                },
                {
                    "updateDimensionProperties": {
                        "range": {
                            "sheetId": sheet_id,
                            "dimension": "ROWS",
                            "startIndex": 1,
                            "endIndex": last_row,
                        },
                        "properties": { "pixelSize": 22 },
                        "fields": "pixelSize",
                    },
                },
                {
                    "autoResizeDimensions": {
                        "dimensions": {
                            "sheetId": sheet_id,
                            "dimension": "COLUMNS",
                            "startIndex": 0,
                            "endIndex": need_columns,
                        },
                    },
                },
                {
                    "setDataValidation": {
                        "range": {
                            "sheetId": sheet_id,
                            "startRowIndex": 1,
                            "endRowIndex": last_row,
                            "startColumnIndex": 0,
                            "endColumnIndex": 1,
                        },
                        "rule": {
                            "condition": { "type": "BOOLEAN" },
                            "showCustomUi": true,
                        },
                    },
                },
                {
                    "setBasicFilter": {
                        "filter": { "range": { "sheetId": sheet_id } },
                    },
                },
            ],
        });

        let token = self.tokens.access_token().await?;
        let url = format!("{}/{}:batchUpdate", BASE_URL, spreadsheet_id);
        let resp = self
            .http
            .post(&url)
            .bearer_auth(token)
            .json(&body)
            .send()
            .await?;
        Self::check(resp).await?;
        Ok(())
    }

    async fn check(resp: reqwest::Response) -> Result<reqwest::Response> {
        let status = resp.status();
        if status.is_success() {
            return Ok(resp);
        }
        let body = resp.text().await.unwrap_or_default();
        Err(SheetsError::Api {
            status: status.as_u16(),
            message: body,
        })
    }
}
