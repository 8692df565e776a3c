use std::time::Duration;

use reqwest::Client;
use tracing::info;

use crate::fetch::Fetcher;
use crate::model::{FetchError, FetchRequest, Page};

/// Forwards the lookup through a remote fetch proxy (ScraperAPI-style):
/// the relay receives the real target URL as a query parameter, performs
/// the outbound request itself and returns the raw HTML. One attempt per
/// call; the relay does its own retrying.
pub struct RelayFetcher {
    client: Client,
    endpoint: String,
    api_key: String,
    country_code: String,
    render_js: bool,
}

impl RelayFetcher {
    pub fn new(
        endpoint: String,
        api_key: String,
        country_code: String,
        render_js: bool,
    ) -> Result<Self, reqwest::Error> {
        // Relay calls cover the upstream fetch too, so the timeout is
        // much longer than for direct requests.
        let client = Client::builder().timeout(Duration::from_secs(70)).build()?;
        Ok(Self {
            client,
            endpoint,
            api_key,
            country_code,
            render_js,
        })
    }
}

#[async_trait::async_trait]
impl Fetcher for RelayFetcher {
    async fn fetch(&self, req: &FetchRequest) -> Result<Page, FetchError> {
        info!("Relaying fetch of {} via {}", req.url, self.endpoint);
        let response = self
            .client
            .get(&self.endpoint)
            .query(&[
                ("api_key", self.api_key.as_str()),
                ("url", req.url.as_str()),
                ("country_code", self.country_code.as_str()),
                ("render", if self.render_js { "true" } else { "false" }),
            ])
            .send()
            .await
            .map_err(|e| FetchError::Transport(e.to_string()))?;

        let status = response.status().as_u16();
        if !response.status().is_success() {
            return Err(FetchError::Transport(format!(
                "fetch proxy returned HTTP {status}"
            )));
        }
        let html = response
            .text()
            .await
            .map_err(|e| FetchError::Transport(e.to_string()))?;
        Ok(Page { html, status })
    }
}
