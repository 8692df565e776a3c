use std::time::Duration;

use reqwest::Client;
use tokio::time::sleep;
use tracing::{info, warn};

use crate::fetch::{Fetcher, browser_headers};
use crate::model::{FetchError, FetchRequest, Page};

/// Bounded retry policy for direct requests. The defaults mirror the
/// production session settings; tests shrink the durations.
#[derive(Debug, Clone)]
pub struct RetryPolicy {
    /// Total attempts, including the first.
    pub max_attempts: u32,
    /// First backoff sleep; doubles after every further failed attempt.
    pub backoff_base: Duration,
    /// Sleep taken once when attempts exhaust on HTTP 429.
    pub cooldown: Duration,
    /// Extra plain attempts after the cooldown.
    pub cooldown_retries: u32,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 5,
            backoff_base: Duration::from_millis(1200),
            cooldown: Duration::from_secs(30),
            cooldown_retries: 1,
        }
    }
}

impl RetryPolicy {
    /// Statuses worth another attempt. 403 is deliberately absent: the
    /// target uses it for cloud-IP blocks, which never clear within a
    /// backoff window.
    fn is_retryable_status(status: u16) -> bool {
        matches!(status, 408 | 425 | 429 | 500 | 502 | 503 | 504)
    }

    /// Backoff before attempt `failed + 1`, given `failed` failures so far.
    fn backoff_delay(&self, failed: u32) -> Duration {
        self.backoff_base * (1u32 << (failed.saturating_sub(1)).min(16))
    }
}

/// Outcome of a single GET, classified for the retry loop.
enum Attempt {
    Ok(Page),
    Fatal(FetchError),
    Retry { status: Option<u16>, detail: String },
}

/// Plain GET against the target with a browser-like header set and the
/// bounded retry/backoff policy.
pub struct DirectFetcher {
    client: Client,
    policy: RetryPolicy,
}

impl DirectFetcher {
    pub fn new(policy: RetryPolicy) -> Result<Self, reqwest::Error> {
        let client = Client::builder()
            .default_headers(browser_headers())
            .timeout(Duration::from_secs(25))
            .build()?;
        Ok(Self { client, policy })
    }

    async fn try_once(&self, url: &str) -> Attempt {
        let response = match self.client.get(url).send().await {
            Ok(r) => r,
            // Connection and read errors are transient as far as the
            // policy is concerned.
            Err(e) => {
                return Attempt::Retry {
                    status: None,
                    detail: e.to_string(),
                };
            }
        };

        let status = response.status().as_u16();
        if response.status().is_success() {
            return match response.text().await {
                Ok(html) => Attempt::Ok(Page { html, status }),
                Err(e) => Attempt::Retry {
                    status: None,
                    detail: format!("body read failed: {e}"),
                },
            };
        }

        if status == 403 {
            return Attempt::Fatal(FetchError::Blocked);
        }
        if RetryPolicy::is_retryable_status(status) {
            return Attempt::Retry {
                status: Some(status),
                detail: format!("HTTP {status}"),
            };
        }
        Attempt::Fatal(FetchError::Transport(format!("HTTP {status} for {url}")))
    }
}

#[async_trait::async_trait]
impl Fetcher for DirectFetcher {
    async fn fetch(&self, req: &FetchRequest) -> Result<Page, FetchError> {
        let mut rate_limited = false;

        for attempt in 1..=self.policy.max_attempts {
            if attempt > 1 {
                sleep(self.policy.backoff_delay(attempt - 1)).await;
            }
            match self.try_once(&req.url).await {
                Attempt::Ok(page) => return Ok(page),
                Attempt::Fatal(err) => return Err(err),
                Attempt::Retry { status, detail } => {
                    rate_limited = status == Some(429);
                    warn!(
                        "Attempt {}/{} for {} failed: {}",
                        attempt, self.policy.max_attempts, req.url, detail
                    );
                }
            }
        }

        // The automatic policy is spent. If the last answer was a 429 the
        // site is throttling us, not failing: take one long cooldown and
        // try again without backoff.
        if rate_limited && self.policy.cooldown_retries > 0 {
            for _ in 0..self.policy.cooldown_retries {
                info!(
                    "⏳ Rate limited — cooling down {:?} before one more try",
                    self.policy.cooldown
                );
                sleep(self.policy.cooldown).await;
                match self.try_once(&req.url).await {
                    Attempt::Ok(page) => return Ok(page),
                    Attempt::Fatal(err) => return Err(err),
                    Attempt::Retry { detail, .. } => {
                        warn!("Cooldown retry for {} failed: {}", req.url, detail);
                    }
                }
            }
            return Err(FetchError::RateLimited);
        }

        Err(FetchError::ExhaustedRetries(self.policy.max_attempts))
    }
}
