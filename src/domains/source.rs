use async_trait::async_trait;
use reqwest::Client;

use crate::common::{errors::FetchError, http::HttpClient};

/// Where the remote host list comes from.
#[async_trait]
pub trait HostListSource: Send + Sync {
    async fn fetch_text(&self, url: &str) -> Result<String, FetchError>;
}

pub struct HttpHostListSource {
    client: Client,
}

impl HttpHostListSource {
    pub fn new(timeout_secs: u64) -> Result<Self, reqwest::Error> {
        Ok(Self {
            client: HttpClient::new(timeout_secs)?,
        })
    }
}

#[async_trait]
impl HostListSource for HttpHostListSource {
    async fn fetch_text(&self, url: &str) -> Result<String, FetchError> {
        let resp = self.client.get(url).send().await?;
        let status = resp.status();
        if !status.is_success() {
            return Err(FetchError::Status(status.as_u16()));
        }
        Ok(resp.text().await?)
    }
}
