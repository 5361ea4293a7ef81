// SPDX-FileCopyrightText: 2026 guildxp Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Wire types for the Sheets v4 REST API (the subset guildxp uses).

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// `GET /spreadsheets/{id}?fields=sheets.properties`
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Spreadsheet {
    #[serde(default)]
    pub sheets: Vec<Sheet>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Sheet {
    pub properties: SheetProperties,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SheetProperties {
    pub title: String,
    #[serde(default)]
    pub index: usize,
    #[serde(default)]
    pub sheet_id: i64,
}

/// A block of cell values addressed by an A1 range.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ValueRange {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub range: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub major_dimension: Option<String>,
    #[serde(default)]
    pub values: Vec<Vec<Value>>,
}

impl ValueRange {
    /// A row-major block of string cells.
    pub fn rows(range: Option<String>, rows: Vec<Vec<String>>) -> Self {
        Self {
            range,
            major_dimension: Some("ROWS".to_string()),
            values: rows
                .into_iter()
                .map(|row| row.into_iter().map(Value::String).collect())
                .collect(),
        }
    }

    /// Cell values as display strings.
    ///
    /// Formatted reads return strings already; numbers and booleans are
    /// rendered the way the Sheets UI shows them.
    pub fn into_grid(self) -> Vec<Vec<String>> {
        self.values
            .into_iter()
            .map(|row| row.into_iter().map(cell_text).collect())
            .collect()
    }
}

fn cell_text(value: Value) -> String {
    match value {
        Value::String(s) => s,
        Value::Null => String::new(),
        Value::Bool(true) => "TRUE".to_string(),
        Value::Bool(false) => "FALSE".to_string(),
        other => other.to_string(),
    }
}

/// `POST /spreadsheets/{id}/values:batchUpdate` body.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BatchUpdateValuesRequest {
    pub value_input_option: String,
    pub data: Vec<ValueRange>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BatchUpdateValuesResponse {
    #[serde(default)]
    pub total_updated_cells: u64,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AppendValuesResponse {
    #[serde(default)]
    pub updates: Option<UpdateValuesResponse>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateValuesResponse {
    #[serde(default)]
    pub updated_range: String,
    #[serde(default)]
    pub updated_rows: u64,
}

/// Google API error envelope.
#[derive(Debug, Clone, Deserialize)]
pub struct ApiErrorResponse {
    pub error: ApiError,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ApiError {
    #[serde(default)]
    pub code: u16,
    #[serde(default)]
    pub message: String,
    #[serde(default)]
    pub status: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mixed_cells_render_as_text() {
        let range: ValueRange = serde_json::from_value(serde_json::json!({
            "range": "'Master_Roster'!A1:C2",
            "majorDimension": "ROWS",
            "values": [["Name", "Total_XP"], ["Ann", 40, true, null]]
        }))
        .unwrap();
        assert_eq!(
            range.into_grid(),
            vec![vec!["Name", "Total_XP"], vec!["Ann", "40", "TRUE", ""]]
        );
    }

    #[test]
    fn empty_range_has_no_values_key() {
        let range: ValueRange =
            serde_json::from_str(r#"{"range":"Sheet1!A1:Z1000","majorDimension":"ROWS"}"#)
                .unwrap();
        assert!(range.into_grid().is_empty());
    }

    #[test]
    fn write_body_uses_camel_case() {
        let body = BatchUpdateValuesRequest {
            value_input_option: "RAW".into(),
            data: vec![ValueRange::rows(
                Some("'R'!E2:F2".into()),
                vec![vec!["50".into(), "Newcomer".into()]],
            )],
        };
        let json = serde_json::to_value(&body).unwrap();
        assert_eq!(json["valueInputOption"], "RAW");
        assert_eq!(json["data"][0]["majorDimension"], "ROWS");
        assert_eq!(json["data"][0]["values"][0][1], "Newcomer");
    }
}
