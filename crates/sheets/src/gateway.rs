//! Authenticated request wrapper around the spreadsheet endpoints, and the
//! object-safe API seam the sync operations are written against.

use std::sync::Arc;

use async_trait::async_trait;
use reqwest::Method;
use serde::Deserialize;
use serde_json::{json, Value};

use crate::config::SheetsConfig;
use crate::error::{SheetsError, SheetsResult};
use crate::token::{OAuthTokenProvider, TokenProvider};

/// Resource root for spreadsheets; the spreadsheet id is appended.
pub const SHEETS_URL: &str = "https://sheets.googleapis.com/v4/spreadsheets";

/// One sheet row as sent to and read from the values endpoints.
pub type Row = Vec<Value>;

/// Spreadsheet metadata relevant to provisioning and row deletion.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SpreadsheetMeta {
    pub title: String,
    pub sheets: Vec<SheetProperties>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SheetProperties {
    pub title: String,
    pub sheet_id: i64,
}

impl SpreadsheetMeta {
    /// Case-sensitive exact title match.
    pub fn sheet(&self, title: &str) -> Option<&SheetProperties> {
        self.sheets.iter().find(|sheet| sheet.title == title)
    }
}

/// Authenticated wrapper around the spreadsheet's read/write/batch-update
/// endpoints.
///
/// `endpoint` is appended verbatim to the spreadsheet's resource root; the
/// empty string fetches spreadsheet metadata. A fresh bearer token is
/// acquired for every request.
pub struct SheetsGateway {
    client: reqwest::Client,
    base_url: String,
    spreadsheet_id: String,
    token: Arc<dyn TokenProvider>,
}

impl SheetsGateway {
    /// Gateway for a configured credential bundle, exchanging tokens
    /// against the Google OAuth endpoint.
    pub fn new(config: &SheetsConfig) -> SheetsResult<Self> {
        config.validate()?;
        let token = Arc::new(OAuthTokenProvider::new(config));
        Ok(Self::with_endpoints(config, SHEETS_URL, token))
    }

    /// Override the API root and token provider (used by tests).
    pub fn with_endpoints(
        config: &SheetsConfig,
        base_url: impl Into<String>,
        token: Arc<dyn TokenProvider>,
    ) -> Self {
        Self {
            client: reqwest::Client::new(),
            base_url: base_url.into(),
            spreadsheet_id: config.spreadsheet_id.clone(),
            token,
        }
    }

    /// Issue one request. Non-2xx responses surface as [`SheetsError::Api`]
    /// carrying the upstream message when the body has a parseable one;
    /// transport and decode failures surface as [`SheetsError::Network`].
    pub async fn request(
        &self,
        method: Method,
        endpoint: &str,
        body: Option<Value>,
    ) -> SheetsResult<Value> {
        let token = self.token.access_token().await?;
        let url = format!("{}/{}{}", self.base_url, self.spreadsheet_id, endpoint);
        tracing::debug!(%method, %url, "sheets api request");

        let mut request = self.client.request(method, &url).bearer_auth(token);
        if let Some(body) = body {
            request = request.json(&body);
        }

        let response = request
            .send()
            .await
            .map_err(|e| SheetsError::Network(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let body: ApiErrorBody = response.json().await.unwrap_or_default();
            let message = body.error.map(|e| e.message).unwrap_or_else(|| {
                status.canonical_reason().unwrap_or("unknown error").to_string()
            });
            return Err(SheetsError::Api(status.as_u16(), message));
        }

        response
            .json()
            .await
            .map_err(|e| SheetsError::Network(e.to_string()))
    }
}

/// Object-safe seam over the wire operations the sync engine needs.
///
/// [`HttpSheetsApi`] is the real implementation;
/// [`crate::memory::InMemorySheets`] backs tests.
#[async_trait]
pub trait SheetsApi: Send + Sync {
    /// `GET ""` — spreadsheet metadata.
    async fn spreadsheet_meta(&self) -> SheetsResult<SpreadsheetMeta>;

    /// `POST ":batchUpdate"` with an addSheet request.
    async fn add_sheet(&self, title: &str) -> SheetsResult<()>;

    /// `POST ":batchUpdate"` with a deleteDimension request over the
    /// zero-based row span `[start, end)`.
    async fn delete_rows(&self, sheet_id: i64, start: i64, end: i64) -> SheetsResult<()>;

    /// `PUT "/values/{range}"` — full overwrite of a cell range.
    async fn put_values(&self, range: &str, rows: Vec<Row>) -> SheetsResult<()>;

    /// `POST "/values/{sheet}:append"` — append after the last populated row.
    async fn append_values(&self, sheet: &str, rows: Vec<Row>) -> SheetsResult<()>;

    /// `GET "/values/{range}"` — read a cell range; empty when unpopulated.
    async fn get_values(&self, range: &str) -> SheetsResult<Vec<Row>>;
}

/// [`SheetsApi`] over HTTP through a [`SheetsGateway`].
pub struct HttpSheetsApi {
    gateway: SheetsGateway,
}

impl HttpSheetsApi {
    pub fn new(gateway: SheetsGateway) -> Self {
        Self { gateway }
    }
}

#[async_trait]
impl SheetsApi for HttpSheetsApi {
    async fn spreadsheet_meta(&self) -> SheetsResult<SpreadsheetMeta> {
        let body = self.gateway.request(Method::GET, "", None).await?;
        let decoded: SpreadsheetBody =
            serde_json::from_value(body).map_err(|e| SheetsError::Network(e.to_string()))?;
        Ok(SpreadsheetMeta {
            title: decoded.properties.title,
            sheets: decoded
                .sheets
                .into_iter()
                .map(|sheet| SheetProperties {
                    title: sheet.properties.title,
                    sheet_id: sheet.properties.sheet_id,
                })
                .collect(),
        })
    }

    async fn add_sheet(&self, title: &str) -> SheetsResult<()> {
        let body = json!({
            "requests": [{ "addSheet": { "properties": { "title": title } } }]
        });
        self.gateway
            .request(Method::POST, ":batchUpdate", Some(body))
            .await?;
        Ok(())
    }

    async fn delete_rows(&self, sheet_id: i64, start: i64, end: i64) -> SheetsResult<()> {
        let body = json!({
            "requests": [{
                "deleteDimension": {
                    "range": {
                        "sheetId": sheet_id,
                        "dimension": "ROWS",
                        "startIndex": start,
                        "endIndex": end,
                    }
                }
            }]
        });
        self.gateway
            .request(Method::POST, ":batchUpdate", Some(body))
            .await?;
        Ok(())
    }

    async fn put_values(&self, range: &str, rows: Vec<Row>) -> SheetsResult<()> {
        let body = json!({ "values": rows, "majorDimension": "ROWS" });
        self.gateway
            .request(Method::PUT, &format!("/values/{range}"), Some(body))
            .await?;
        Ok(())
    }

    async fn append_values(&self, sheet: &str, rows: Vec<Row>) -> SheetsResult<()> {
        let body = json!({ "values": rows, "majorDimension": "ROWS" });
        self.gateway
            .request(Method::POST, &format!("/values/{sheet}:append"), Some(body))
            .await?;
        Ok(())
    }

    async fn get_values(&self, range: &str) -> SheetsResult<Vec<Row>> {
        let body = self
            .gateway
            .request(Method::GET, &format!("/values/{range}"), None)
            .await?;
        let decoded: ValuesBody =
            serde_json::from_value(body).map_err(|e| SheetsError::Network(e.to_string()))?;
        Ok(decoded.values)
    }
}

#[derive(Debug, Deserialize)]
struct SpreadsheetBody {
    properties: SpreadsheetProps,
    #[serde(default)]
    sheets: Vec<SheetBody>,
}

#[derive(Debug, Deserialize)]
struct SpreadsheetProps {
    title: String,
}

#[derive(Debug, Deserialize)]
struct SheetBody {
    properties: SheetProps,
}

#[derive(Debug, Deserialize)]
struct SheetProps {
    title: String,
    #[serde(rename = "sheetId")]
    sheet_id: i64,
}

#[derive(Debug, Default, Deserialize)]
struct ValuesBody {
    #[serde(default)]
    values: Vec<Row>,
}

#[derive(Debug, Default, Deserialize)]
struct ApiErrorBody {
    error: Option<ApiErrorDetail>,
}

#[derive(Debug, Deserialize)]
struct ApiErrorDetail {
    message: String,
}
