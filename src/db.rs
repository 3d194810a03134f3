use anyhow::{Context, Result};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::postgres::PgPool;
use sqlx::Row;
use tracing::{debug, info};

use crate::contact::ContactRecord;
use crate::errors::StoreError;
use crate::store::ContactStore;

/// Initialize the database schema
pub async fn init_database_schema(pool: &PgPool) -> Result<()> {
    info!("Initializing database schema...");

    sqlx::query(
        "CREATE TABLE IF NOT EXISTS contacts (
            id BIGSERIAL PRIMARY KEY,
            shared_at TIMESTAMPTZ NOT NULL,
            first_name TEXT NOT NULL,
            last_name TEXT NOT NULL DEFAULT '',
            phone_number TEXT NOT NULL,
            username TEXT NOT NULL DEFAULT '',
            user_id BIGINT NOT NULL
        )",
    )
    .execute(pool)
    .await
    .context("Failed to create contacts table")?;

    sqlx::query("CREATE INDEX IF NOT EXISTS contacts_user_id_idx ON contacts (user_id)")
        .execute(pool)
        .await
        .context("Failed to create contacts user index")?;

    info!("Database schema initialized successfully");
    Ok(())
}

/// Append a contact row and return its id
pub async fn append_contact(pool: &PgPool, record: &ContactRecord) -> Result<i64, sqlx::Error> {
    let row = sqlx::query(
        "INSERT INTO contacts (shared_at, first_name, last_name, phone_number, username, user_id)
         VALUES ($1, $2, $3, $4, $5, $6)
         RETURNING id",
    )
    .bind(record.timestamp)
    .bind(&record.first_name)
    .bind(&record.last_name)
    .bind(&record.phone_number)
    .bind(&record.username)
    .bind(record.user_id as i64)
    .fetch_one(pool)
    .await?;

    let id: i64 = row.try_get("id")?;
    debug!(user_id = record.user_id, contact_id = id, "Contact row appended");
    Ok(id)
}

/// All rows shared by one Telegram user, oldest first
pub async fn list_contacts_for_user(pool: &PgPool, user_id: u64) -> Result<Vec<ContactRecord>> {
    let rows = sqlx::query(
        "SELECT shared_at, first_name, last_name, phone_number, username, user_id
         FROM contacts WHERE user_id = $1 ORDER BY id",
    )
    .bind(user_id as i64)
    .fetch_all(pool)
    .await
    .context("Failed to list contacts")?;

    rows.into_iter()
        .map(|row| -> Result<ContactRecord> {
            Ok(ContactRecord {
                timestamp: row.try_get::<DateTime<Utc>, _>("shared_at")?,
                first_name: row.try_get("first_name")?,
                last_name: row.try_get("last_name")?,
                phone_number: row.try_get("phone_number")?,
                username: row.try_get("username")?,
                user_id: row.try_get::<i64, _>("user_id")? as u64,
            })
        })
        .collect()
}

/// PostgreSQL-backed contact ledger
#[derive(Clone, Debug)]
pub struct PgContactStore {
    pool: PgPool,
}

impl PgContactStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }
}

#[async_trait]
impl ContactStore for PgContactStore {
    async fn append(&self, record: &ContactRecord) -> Result<(), StoreError> {
        append_contact(&self.pool, record).await?;
        Ok(())
    }
}
