//! Contact store abstraction and backend selection.

use std::sync::Arc;

use anyhow::{Context, Result};
use async_trait::async_trait;
use sqlx::postgres::PgPoolOptions;
use tracing::info;

use crate::config::StoreConfig;
use crate::contact::ContactRecord;
use crate::db::{self, PgContactStore};
use crate::errors::StoreError;
use crate::sheets::SheetsContactStore;

/// Append-only ledger of shared contacts
///
/// Implementations never update or delete rows. Every successful
/// contact share appends one record, repeated shares included.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ContactStore: Send + Sync {
    /// Append one record to the ledger
    async fn append(&self, record: &ContactRecord) -> Result<(), StoreError>;
}

/// Build the configured backend, preparing its schema where needed
pub async fn build_store(config: &StoreConfig) -> Result<Arc<dyn ContactStore>> {
    match config {
        StoreConfig::Sheets(sheets) => {
            info!(
                spreadsheet_id = %sheets.spreadsheet_id,
                sheet = %sheets.sheet_name,
                "Using Google Sheets contact store"
            );
            Ok(Arc::new(SheetsContactStore::new(sheets.clone())))
        }
        StoreConfig::Postgres { database_url } => {
            info!("Using PostgreSQL contact store");
            let pool = PgPoolOptions::new()
                .max_connections(5)
                .connect(database_url)
                .await
                .context("Failed to connect to the contact database")?;
            db::init_database_schema(&pool).await?;
            Ok(Arc::new(PgContactStore::new(pool)))
        }
    }
}
