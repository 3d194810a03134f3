//! # Google Sheets Contact Store
//!
//! Appends contact rows to a Google spreadsheet through the Sheets v4 REST API.
//! The header row is written once, before the first append, when the sheet's
//! first row is empty.

use async_trait::async_trait;
use reqwest::{Client, Response, Url};
use serde::Deserialize;
use serde_json::json;
use tokio::sync::OnceCell;
use tracing::{debug, info};

use crate::config::SheetsConfig;
use crate::contact::{ContactRecord, CONTACT_HEADER};
use crate::errors::StoreError;
use crate::store::ContactStore;

/// Response body of a `values.get` call; `values` is omitted for empty ranges
#[derive(Debug, Default, Deserialize)]
struct ValueRange {
    #[serde(default)]
    values: Vec<Vec<String>>,
}

/// Contact ledger kept in a Google spreadsheet
#[derive(Debug)]
pub struct SheetsContactStore {
    client: Client,
    config: SheetsConfig,
    header_ready: OnceCell<()>,
}

impl SheetsContactStore {
    pub fn new(config: SheetsConfig) -> Self {
        Self::with_client(Client::new(), config)
    }

    pub fn with_client(client: Client, config: SheetsConfig) -> Self {
        Self {
            client,
            config,
            header_ready: OnceCell::new(),
        }
    }

    /// A1 range on the configured sheet, quoting the sheet name
    fn range(&self, cells: &str) -> String {
        format!("'{}'!{}", self.config.sheet_name.replace('\'', "''"), cells)
    }

    /// `{base}/v4/spreadsheets/{id}/values/{range}{suffix}`
    fn values_url(&self, range: &str, suffix: &str) -> Result<Url, StoreError> {
        let mut url = Url::parse(&self.config.api_base)
            .map_err(|e| StoreError::InvalidEndpoint(e.to_string()))?;
        url.path_segments_mut()
            .map_err(|_| StoreError::InvalidEndpoint("base URL cannot carry a path".to_string()))?
            .pop_if_empty()
            .extend(["v4", "spreadsheets", self.config.spreadsheet_id.as_str(), "values"])
            .push(&format!("{range}{suffix}"));
        Ok(url)
    }

    async fn check(response: Response) -> Result<Response, StoreError> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }
        let body = response.text().await.unwrap_or_default();
        Err(StoreError::Rejected {
            status: status.as_u16(),
            body,
        })
    }

    async fn append_rows(&self, rows: Vec<Vec<String>>) -> Result<(), StoreError> {
        let url = self.values_url(&self.range("A1"), ":append")?;
        let response = self
            .client
            .post(url)
            .bearer_auth(&self.config.access_token)
            .query(&[
                ("valueInputOption", "RAW"),
                ("insertDataOption", "INSERT_ROWS"),
            ])
            .json(&json!({ "values": rows }))
            .send()
            .await?;
        Self::check(response).await?;
        Ok(())
    }

    /// Write the header row if the sheet's first row is empty
    async fn ensure_header(&self) -> Result<(), StoreError> {
        let url = self.values_url(&self.range("A1:F1"), "")?;
        let response = self
            .client
            .get(url)
            .bearer_auth(&self.config.access_token)
            .send()
            .await?;
        let existing: ValueRange = Self::check(response).await?.json().await?;

        if existing.values.iter().any(|row| !row.is_empty()) {
            debug!(sheet = %self.config.sheet_name, "Contact sheet header already present");
            return Ok(());
        }

        info!(sheet = %self.config.sheet_name, "Writing contact sheet header");
        let header = CONTACT_HEADER.iter().map(|c| c.to_string()).collect();
        self.append_rows(vec![header]).await
    }
}

#[async_trait]
impl ContactStore for SheetsContactStore {
    async fn append(&self, record: &ContactRecord) -> Result<(), StoreError> {
        self.header_ready
            .get_or_try_init(|| self.ensure_header())
            .await?;
        self.append_rows(vec![record.to_row()]).await?;
        debug!(user_id = record.user_id, "Contact row appended to spreadsheet");
        Ok(())
    }
}
