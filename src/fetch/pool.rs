use std::time::Duration;

use reqwest::{Client, Proxy, StatusCode};
use tracing::{info, warn};

use crate::fetch::{Fetcher, browser_headers};
use crate::model::{FetchError, FetchRequest, Page};

/// Trial-and-error across an ordered list of raw HTTP proxies: one GET
/// per candidate with a short timeout, first HTTP 200 wins. Anything else
/// is logged and the next candidate is tried.
pub struct ProxyPoolFetcher {
    candidates: Vec<String>,
    timeout: Duration,
}

impl ProxyPoolFetcher {
    pub fn new(candidates: Vec<String>) -> Self {
        Self {
            candidates,
            timeout: Duration::from_secs(15),
        }
    }

    fn client_via(&self, addr: &str) -> Result<Client, reqwest::Error> {
        Client::builder()
            .proxy(Proxy::all(addr)?)
            .default_headers(browser_headers())
            .timeout(self.timeout)
            .build()
    }
}

#[async_trait::async_trait]
impl Fetcher for ProxyPoolFetcher {
    async fn fetch(&self, req: &FetchRequest) -> Result<Page, FetchError> {
        for (index, addr) in self.candidates.iter().enumerate() {
            info!(
                "Trying proxy {}/{}: {}",
                index + 1,
                self.candidates.len(),
                addr
            );
            let client = match self.client_via(addr) {
                Ok(c) => c,
                Err(e) => {
                    warn!("Unusable proxy {}: {}", addr, e);
                    continue;
                }
            };
            match client.get(&req.url).send().await {
                Ok(response) if response.status() == StatusCode::OK => {
                    match response.text().await {
                        Ok(html) => {
                            info!("✅ Proxy {} delivered the page", addr);
                            return Ok(Page {
                                html,
                                status: StatusCode::OK.as_u16(),
                            });
                        }
                        Err(e) => warn!("Proxy {} body read failed: {}", addr, e),
                    }
                }
                Ok(response) => {
                    warn!("Proxy {} returned HTTP {}", addr, response.status().as_u16())
                }
                Err(e) => warn!("Proxy {} failed: {}", addr, e),
            }
        }
        Err(FetchError::ExhaustedProxies(self.candidates.len()))
    }
}
