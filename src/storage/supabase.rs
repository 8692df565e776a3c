use std::time::Duration;

use reqwest::{Client, Response};
use tracing::info;

use crate::model::{InstructorRecord, StorageError};

/// Client for the hosted Supabase table, talking to its PostgREST
/// endpoint. Constructed once at startup and passed into the runner.
pub struct SupabaseStorage {
    client: Client,
    base_url: String,
    api_key: String,
    table: String,
}

impl SupabaseStorage {
    pub fn new(base_url: &str, api_key: &str, table: &str) -> Result<Self, reqwest::Error> {
        let client = Client::builder().timeout(Duration::from_secs(30)).build()?;
        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key: api_key.to_string(),
            table: table.to_string(),
        })
    }

    fn table_url(&self) -> String {
        format!("{}/rest/v1/{}", self.base_url, self.table)
    }

    /// Upserts the batch, resolving conflicts on `on_conflict`. Zero rows
    /// short-circuits without touching the network.
    pub async fn upsert_rows(
        &self,
        rows: &[InstructorRecord],
        on_conflict: &str,
    ) -> Result<(), StorageError> {
        if rows.is_empty() {
            info!("No rows to insert");
            return Ok(());
        }
        let response = self
            .client
            .post(self.table_url())
            .query(&[("on_conflict", on_conflict)])
            .header("apikey", &self.api_key)
            .bearer_auth(&self.api_key)
            .header("Prefer", "resolution=merge-duplicates,return=minimal")
            .json(rows)
            .send()
            .await?;
        self.check(response, rows.len()).await
    }

    /// Plain insert without conflict resolution.
    pub async fn insert_rows(&self, rows: &[InstructorRecord]) -> Result<(), StorageError> {
        if rows.is_empty() {
            info!("No rows to insert");
            return Ok(());
        }
        let response = self
            .client
            .post(self.table_url())
            .header("apikey", &self.api_key)
            .bearer_auth(&self.api_key)
            .header("Prefer", "return=minimal")
            .json(rows)
            .send()
            .await?;
        self.check(response, rows.len()).await
    }

    async fn check(&self, response: Response, count: usize) -> Result<(), StorageError> {
        let status = response.status();
        if status.is_success() {
            info!("✅ Upserted {} rows → {}", count, self.table);
            return Ok(());
        }
        let body = response.text().await.unwrap_or_else(|_| "unknown".into());
        Err(StorageError::Api {
            status: status.as_u16(),
            body,
        })
    }
}
