use super::LayoutStore;
use crate::error::StoreError;
use crate::Result;
use blockpage_core::{BlockId, BlockLayoutRecord};
use reqwest::{Client, Response, Url};
use serde::de::DeserializeOwned;
use std::time::Duration;

/// Base URL of a locally running layout service
pub const DEFAULT_BASE_URL: &str = "http://localhost:8080";

/// REST client for the layout persistence service
#[derive(Debug, Clone)]
pub struct HttpLayoutStore {
    client: Client,
    base_url: Url,
}

impl HttpLayoutStore {
    /// Create a client for the service at `base_url`
    pub fn new(base_url: &str) -> Result<Self> {
        Self::with_timeout(base_url, None)
    }

    /// Create a client with an overall per-request timeout
    pub fn with_timeout(base_url: &str, timeout: Option<Duration>) -> Result<Self> {
        let base_url = parse_base_url(base_url)?;

        let mut builder = Client::builder();
        if let Some(timeout) = timeout {
            builder = builder.timeout(timeout);
        }
        let client = builder.build()?;

        Ok(Self { client, base_url })
    }

    /// The service base URL
    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    fn endpoint(&self, segments: &[&str]) -> Result<Url> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|_| StoreError::InvalidBaseUrl(self.base_url.to_string()))?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }
}

fn parse_base_url(base_url: &str) -> Result<Url> {
    let url = Url::parse(base_url.trim())
        .map_err(|_| StoreError::InvalidBaseUrl(base_url.to_string()))?;
    if !matches!(url.scheme(), "http" | "https") || url.cannot_be_a_base() {
        return Err(StoreError::InvalidBaseUrl(base_url.to_string()));
    }
    Ok(url)
}

/// Turn non-2xx responses into [`StoreError::Status`]
async fn check(resp: Response) -> Result<Response> {
    let status = resp.status();
    if status.is_success() {
        return Ok(resp);
    }
    let message = resp.text().await.unwrap_or_default();
    Err(StoreError::Status {
        status: status.as_u16(),
        message,
    })
}

/// Read a successful response body as JSON
async fn decode<T: DeserializeOwned>(resp: Response) -> Result<T> {
    let bytes = check(resp).await?.bytes().await?;
    Ok(serde_json::from_slice(&bytes)?)
}

impl LayoutStore for HttpLayoutStore {
    async fn create(&self, record: BlockLayoutRecord) -> Result<BlockLayoutRecord> {
        let url = self.endpoint(&["create-page-component"])?;
        tracing::debug!("POST {} ({})", url, record.uuid);
        let resp = self.client.post(url).json(&record).send().await?;
        decode(resp).await
    }

    async fn update_by_uuid(&self, record: BlockLayoutRecord) -> Result<BlockLayoutRecord> {
        let url = self.endpoint(&["update-page-component-by-uuid"])?;
        tracing::debug!("PUT {} ({})", url, record.uuid);
        let resp = self.client.put(url).json(&record).send().await?;
        decode(resp).await
    }

    async fn list_by_page_path(&self, page_path: &str) -> Result<Vec<BlockLayoutRecord>> {
        let mut url = self.endpoint(&["page-components", "by-url"])?;
        url.query_pairs_mut().append_pair("pagePath", page_path);
        tracing::debug!("GET {}", url);
        let resp = self.client.get(url).send().await?;
        decode(resp).await
    }

    async fn delete_by_uuid(&self, uuid: &BlockId) -> Result<()> {
        let url = self.endpoint(&["page-component", "by-uuid", uuid.as_str()])?;
        tracing::debug!("DELETE {}", url);
        let resp = self.client.delete(url).send().await?;
        check(resp).await?;
        Ok(())
    }
}
