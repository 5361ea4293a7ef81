// SPDX-FileCopyrightText: 2026 guildxp Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! HTTP client for the Sheets v4 REST API.
//!
//! Provides [`SheetsClient`], which handles URL construction, bearer
//! authentication, and error mapping. Failed calls are returned as
//! [`GuildXpError::StorageUnavailable`] (or `NotFound` for a 404) and are
//! never retried here.

use std::time::Duration;

use guildxp_core::GuildXpError;
use reqwest::header::{AUTHORIZATION, HeaderMap, HeaderValue};
use reqwest::{RequestBuilder, StatusCode, Url};
use serde::de::DeserializeOwned;
use tracing::debug;

use crate::types::{
    ApiErrorResponse, AppendValuesResponse, BatchUpdateValuesRequest, BatchUpdateValuesResponse,
    Spreadsheet, ValueRange,
};

/// Public endpoint of the Sheets v4 API.
pub const API_BASE_URL: &str = "https://sheets.googleapis.com/v4/spreadsheets";

/// `valueInputOption` for every write. Cells are stored as sent, so long
/// Discord ids keep every digit and text starting with `=` stays text.
const RAW: &str = "RAW";

#[derive(Debug, Clone)]
pub struct SheetsClient {
    client: reqwest::Client,
    base_url: String,
}

impl SheetsClient {
    /// Build a client that authenticates every call with `access_token`.
    pub fn new(access_token: &str, base_url: &str) -> Result<Self, GuildXpError> {
        let mut auth = HeaderValue::from_str(&format!("Bearer {}", access_token.trim()))
            .map_err(|e| GuildXpError::Config(format!("invalid access token header value: {e}")))?;
        auth.set_sensitive(true);
        let mut headers = HeaderMap::new();
        headers.insert(AUTHORIZATION, auth);

        let client = reqwest::Client::builder()
            .default_headers(headers)
            .timeout(Duration::from_secs(30))
            .build()
            .map_err(GuildXpError::storage)?;

        let base_url = base_url.trim_end_matches('/').to_string();
        Url::parse(&base_url)
            .map_err(|e| GuildXpError::Config(format!("invalid sheets base_url `{base_url}`: {e}")))?;
        Ok(Self { client, base_url })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Worksheet properties of a spreadsheet.
    pub async fn spreadsheet(&self, spreadsheet_id: &str) -> Result<Spreadsheet, GuildXpError> {
        let url = self.url(spreadsheet_id, &[], &[("fields", "sheets.properties")])?;
        self.send(self.client.get(url), &format!("spreadsheet {spreadsheet_id}"))
            .await
    }

    /// Read a range, row-major.
    pub async fn get_values(
        &self,
        spreadsheet_id: &str,
        range: &str,
    ) -> Result<ValueRange, GuildXpError> {
        let url = self.url(
            spreadsheet_id,
            &["values", range],
            &[("majorDimension", "ROWS")],
        )?;
        self.send(self.client.get(url), &format!("range {range}"))
            .await
    }

    /// Append rows after the table found at `range`.
    pub async fn append_values(
        &self,
        spreadsheet_id: &str,
        range: &str,
        rows: Vec<Vec<String>>,
    ) -> Result<AppendValuesResponse, GuildXpError> {
        let url = self.url(
            spreadsheet_id,
            &["values", &format!("{range}:append")],
            &[
                ("valueInputOption", RAW),
                ("insertDataOption", "INSERT_ROWS"),
            ],
        )?;
        let body = ValueRange::rows(Some(range.to_string()), rows);
        self.send(
            self.client.post(url).json(&body),
            &format!("append to {range}"),
        )
        .await
    }

    /// Write several ranges in one call.
    pub async fn batch_update_values(
        &self,
        spreadsheet_id: &str,
        data: Vec<ValueRange>,
    ) -> Result<BatchUpdateValuesResponse, GuildXpError> {
        let url = self.url(spreadsheet_id, &["values:batchUpdate"], &[])?;
        let body = BatchUpdateValuesRequest {
            value_input_option: RAW.to_string(),
            data,
        };
        self.send(
            self.client.post(url).json(&body),
            &format!("batch update of {spreadsheet_id}"),
        )
        .await
    }

    fn url(
        &self,
        spreadsheet_id: &str,
        segments: &[&str],
        query: &[(&str, &str)],
    ) -> Result<Url, GuildXpError> {
        let mut url = Url::parse(&self.base_url)
            .map_err(|e| GuildXpError::Config(format!("invalid sheets base_url: {e}")))?;
        url.path_segments_mut()
            .map_err(|()| {
                GuildXpError::Config(format!("sheets base_url `{}` cannot take a path", self.base_url))
            })?
            .pop_if_empty()
            .push(spreadsheet_id)
            .extend(segments);
        if !query.is_empty() {
            url.query_pairs_mut().extend_pairs(query);
        }
        Ok(url)
    }

    async fn send<T: DeserializeOwned>(
        &self,
        request: RequestBuilder,
        what: &str,
    ) -> Result<T, GuildXpError> {
        let response = request.send().await.map_err(GuildXpError::storage)?;
        let status = response.status();
        debug!(status = %status, what, "sheets response received");

        let body = response.text().await.map_err(GuildXpError::storage)?;
        if status.is_success() {
            return serde_json::from_str(&body).map_err(|e| {
                GuildXpError::storage(format!("failed to parse Sheets response for {what}: {e}"))
            });
        }

        if status == StatusCode::NOT_FOUND {
            return Err(GuildXpError::not_found(what.to_string()));
        }
        let detail = match serde_json::from_str::<ApiErrorResponse>(&body) {
            Ok(api) => format!("{} ({})", api.error.message, api.error.status),
            Err(_) => body,
        };
        Err(GuildXpError::storage(format!(
            "Sheets API returned {status} for {what}: {detail}"
        )))
    }
}
