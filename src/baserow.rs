//! Baserow REST client: paginated table reads and settings writes
//!
//! Reads follow pagination transparently: page 1 first to learn the total
//! count, the remaining pages concurrently, concatenated in page order. Any
//! page failure aborts the whole table fetch with no partial results.

use futures::future::try_join_all;
use reqwest::Client;
use serde::de::DeserializeOwned;
use tracing::{debug, info, warn};

use crate::config::{Config, TableIds};
use crate::error::{Error, Result};
use crate::models::{
    ClientRecord, ConversionRecord, InteractionRecord, RowPage, SettingsRecord, SettingsUpdate,
};

/// HTTP client for the Baserow rows API, authenticated with a static token.
pub struct BaserowClient {
    http: Client,
    base_url: String,
    token: String,
    page_size: usize,
}

impl BaserowClient {
    pub fn new(config: &Config) -> Result<Self> {
        config.validate()?;

        let http = Client::builder()
            .user_agent(concat!("bot_dashboard/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(Error::Http)?;

        Ok(Self {
            http,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            token: config.token.clone(),
            page_size: config.page_size.max(1),
        })
    }

    fn auth_header(&self) -> String {
        format!("Token {}", self.token)
    }

    async fn fetch_page<T: DeserializeOwned>(&self, table: u64, page: usize) -> Result<RowPage<T>> {
        let url = format!("{}/{}/", self.base_url, table);
        let response = self
            .http
            .get(&url)
            .query(&[
                ("user_field_names", "true".to_string()),
                ("page", page.to_string()),
                ("size", self.page_size.to_string()),
            ])
            .header("Authorization", self.auth_header())
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(Error::ApiStatus {
                table,
                status: status.as_u16(),
            });
        }

        let page_data: RowPage<T> = response.json().await?;
        debug!(table, page, rows = page_data.results.len(), "Fetched page");
        Ok(page_data)
    }

    /// Fetch the complete ordered contents of a table, following
    /// pagination until all rows are collected.
    pub async fn fetch_all_rows<T: DeserializeOwned>(&self, table: u64) -> Result<Vec<T>> {
        let first: RowPage<T> = self.fetch_page(table, 1).await?;
        let total = first.count;
        let total_pages = total.div_ceil(self.page_size).max(1);
        let mut rows = first.results;

        if total_pages > 1 {
            // try_join_all keeps results in request order, so page order
            // survives out-of-order completion.
            let pending = (2..=total_pages).map(|page| self.fetch_page::<T>(table, page));
            let pages = try_join_all(pending).await?;
            for page_data in pages {
                rows.extend(page_data.results);
            }
        }

        info!(table, rows = rows.len(), pages = total_pages, "Fetched all rows");
        Ok(rows)
    }

    /// Apply a partial settings update to one row. Only the mapped fields
    /// reach the remote; the caller refetches afterwards, there is no
    /// optimistic update.
    pub async fn update_settings(
        &self,
        table: u64,
        row_id: i64,
        update: &SettingsUpdate,
    ) -> Result<SettingsRecord> {
        let url = format!("{}/{}/{}/", self.base_url, table, row_id);
        let response = self
            .http
            .patch(&url)
            .query(&[("user_field_names", "true".to_string())])
            .header("Authorization", self.auth_header())
            .json(&update.remote_payload())
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(Error::ApiStatus {
                table,
                status: status.as_u16(),
            });
        }

        let row: SettingsRecord = response.json().await?;
        info!(table, row_id, "Updated settings row");
        Ok(row)
    }

    /// Fetch all four dashboard tables concurrently. Each table gets its
    /// own result so partial failures stay observable per table.
    pub async fn load_dashboard(&self, tables: &TableIds) -> DashboardLoad {
        let (clients, interactions, conversions, settings) = tokio::join!(
            self.fetch_all_rows::<ClientRecord>(tables.clients),
            self.fetch_all_rows::<InteractionRecord>(tables.interactions),
            self.fetch_all_rows::<ConversionRecord>(tables.conversions),
            self.fetch_all_rows::<SettingsRecord>(tables.settings),
        );

        let load = DashboardLoad {
            clients,
            interactions,
            conversions,
            settings,
        };

        for (table, err) in load.failures() {
            warn!(table, error = %err, "Table load failed");
        }

        load
    }
}

/// The fresh working set; fully replaced on every load, never cached.
#[derive(Debug, Clone)]
pub struct DashboardData {
    pub clients: Vec<ClientRecord>,
    pub interactions: Vec<InteractionRecord>,
    pub conversions: Vec<ConversionRecord>,
    pub settings: Vec<SettingsRecord>,
}

/// Per-table load results for one dashboard refresh.
#[derive(Debug)]
pub struct DashboardLoad {
    pub clients: Result<Vec<ClientRecord>>,
    pub interactions: Result<Vec<InteractionRecord>>,
    pub conversions: Result<Vec<ConversionRecord>>,
    pub settings: Result<Vec<SettingsRecord>>,
}

impl DashboardLoad {
    /// Names and errors of the tables that failed to load.
    pub fn failures(&self) -> Vec<(&'static str, &Error)> {
        let mut failed = Vec::new();
        if let Err(err) = &self.clients {
            failed.push(("clients", err));
        }
        if let Err(err) = &self.interactions {
            failed.push(("interactions", err));
        }
        if let Err(err) = &self.conversions {
            failed.push(("conversions", err));
        }
        if let Err(err) = &self.settings {
            failed.push(("settings", err));
        }
        failed
    }

    /// Collapse to all-or-nothing: the first table error fails the whole
    /// load, matching the dashboard's single retry banner.
    pub fn into_data(self) -> Result<DashboardData> {
        Ok(DashboardData {
            clients: self.clients?,
            interactions: self.interactions?,
            conversions: self.conversions?,
            settings: self.settings?,
        })
    }
}
