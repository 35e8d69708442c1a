use std::time::Duration;

use async_trait::async_trait;
use moka::future::Cache;
use reqwest::{Client, StatusCode};
use serde::Deserialize;
use thiserror::Error;
use tracing::{info, warn};

#[derive(Debug, Clone, Deserialize)]
pub struct DirectoryAccount {
    pub id: String,
    pub name: String,
    pub email: String,
    pub role: String,
}

#[derive(Debug, Error)]
pub enum DirectoryError {
    #[error("directory lookup failed")]
    Transport(#[from] anyhow::Error),
}

/// Directory collaborator: resolves notification audiences. Accounts are
/// owned by an external identity service; this side only reads.
#[async_trait]
pub trait Directory: Send + Sync {
    async fn query_by_role(&self, role: &str) -> Result<Vec<DirectoryAccount>, DirectoryError>;

    async fn find_by_id(&self, id: &str) -> Result<Option<DirectoryAccount>, DirectoryError>;
}

/// HTTP directory client with a TTL cache in front of the role query. The
/// audience for a role changes rarely while request events arrive in bursts,
/// so role lookups are cached; lookups by id are not.
pub struct HttpDirectory {
    client: Client,
    base_url: String,
    role_cache: Cache<String, Vec<DirectoryAccount>>,
}

impl HttpDirectory {
    pub fn new(base_url: String, cache_ttl: Duration) -> Self {
        Self {
            client: Client::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
            role_cache: Cache::builder()
                .max_capacity(64)
                .time_to_live(cache_ttl)
                .build(),
        }
    }

    /// Prefetch the audience for a role so the first request event does not
    /// pay the lookup. Failures are logged and swallowed; the cache stays
    /// cold and the next event fetches on demand.
    pub async fn warmup(&self, role: &str) {
        match self.fetch_by_role(role).await {
            Ok(accounts) => {
                info!(role, count = accounts.len(), "directory audience warmed up");
                self.role_cache.insert(role.to_string(), accounts).await;
            }
            Err(e) => warn!(role, error = %e, "directory warmup failed"),
        }
    }

    async fn fetch_by_role(&self, role: &str) -> Result<Vec<DirectoryAccount>, DirectoryError> {
        let url = format!("{}/accounts", self.base_url);
        let response = self
            .client
            .get(&url)
            .query(&[("role", role)])
            .send()
            .await
            .map_err(anyhow::Error::from)?;

        if !response.status().is_success() {
            let status = response.status();
            return Err(DirectoryError::Transport(anyhow::anyhow!(
                "directory query for role {role:?} returned {status}"
            )));
        }

        let accounts = response
            .json::<Vec<DirectoryAccount>>()
            .await
            .map_err(anyhow::Error::from)?;
        Ok(accounts)
    }
}

#[async_trait]
impl Directory for HttpDirectory {
    async fn query_by_role(&self, role: &str) -> Result<Vec<DirectoryAccount>, DirectoryError> {
        if let Some(hit) = self.role_cache.get(role).await {
            return Ok(hit);
        }
        let accounts = self.fetch_by_role(role).await?;
        self.role_cache
            .insert(role.to_string(), accounts.clone())
            .await;
        Ok(accounts)
    }

    async fn find_by_id(&self, id: &str) -> Result<Option<DirectoryAccount>, DirectoryError> {
        let url = format!("{}/accounts/{}", self.base_url, id);
        let response = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(anyhow::Error::from)?;

        if response.status() == StatusCode::NOT_FOUND {
            return Ok(None);
        }
        if !response.status().is_success() {
            let status = response.status();
            return Err(DirectoryError::Transport(anyhow::anyhow!(
                "directory lookup for account {id:?} returned {status}"
            )));
        }

        let account = response
            .json::<DirectoryAccount>()
            .await
            .map_err(anyhow::Error::from)?;
        Ok(Some(account))
    }
}
