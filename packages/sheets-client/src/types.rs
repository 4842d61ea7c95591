use serde::Deserialize;
use serde_json::Value;

/// A row record to append: field name -> value.
pub type SheetRecord = serde_json::Map<String, Value>;

/// Spreadsheet metadata (only the sheet properties are requested).
#[derive(Debug, Clone, Deserialize)]
pub struct Spreadsheet {
    #[serde(default)]
    pub sheets: Vec<Sheet>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Sheet {
    pub properties: SheetProperties,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SheetProperties {
    #[serde(rename = "sheetId")]
    pub sheet_id: i64,
    pub title: String,
    #[serde(rename = "gridProperties", default)]
    pub grid_properties: GridProperties,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct GridProperties {
    #[serde(rename = "rowCount", default)]
    pub row_count: i64,
    #[serde(rename = "columnCount", default)]
    pub column_count: i64,
}

/// Response from `values.get` — cells may come back as any scalar type.
#[derive(Debug, Clone, Deserialize)]
pub struct ValueRange {
    #[serde(default)]
    pub values: Vec<Vec<Value>>,
}

/// Response from `spreadsheets.batchUpdate` when adding a sheet.
#[derive(Debug, Clone, Deserialize)]
pub struct BatchUpdateResponse {
    #[serde(default)]
    pub replies: Vec<BatchUpdateReply>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct BatchUpdateReply {
    #[serde(rename = "addSheet")]
    pub add_sheet: Option<AddSheetReply>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AddSheetReply {
    pub properties: SheetProperties,
}

/// Response from `values.append`.
#[derive(Debug, Clone, Deserialize)]
pub struct AppendResponse {
    pub updates: Option<AppendUpdates>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AppendUpdates {
    #[serde(rename = "updatedRows")]
    pub updated_rows: Option<usize>,
}
